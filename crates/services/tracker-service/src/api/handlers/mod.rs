//! HTTP handlers.

pub mod auth_handler;
pub mod bookmark_handler;
pub mod bug_handler;
pub mod health_handler;
pub mod lookup_handler;
pub mod project_handler;
pub mod tag_handler;
pub mod user_handler;

pub use auth_handler::auth_routes;
pub use bookmark_handler::bookmark_routes;
pub use bug_handler::bug_routes;
pub use health_handler::health_routes;
pub use lookup_handler::lookup_routes;
pub use project_handler::project_routes;
pub use tag_handler::tag_routes;
pub use user_handler::user_routes;
