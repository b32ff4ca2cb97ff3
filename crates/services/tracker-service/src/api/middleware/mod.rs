//! Request middleware.

mod context;

pub use context::context_middleware;
