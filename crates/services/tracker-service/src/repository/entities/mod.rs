//! SeaORM entities.

pub mod bookmark;
pub mod bug;
pub mod project;
pub mod tag;
pub mod user;
