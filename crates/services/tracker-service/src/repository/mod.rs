//! Repository layer for data access.

mod bookmark_repository;
mod bug_repository;
pub mod entities;
mod lookup_repository;
pub mod paginator;
mod project_repository;
mod tag_repository;
mod user_repository;

pub use bookmark_repository::{BookmarkRepository, BookmarkStore};
pub use bug_repository::{BugRepository, BugStore};
pub use lookup_repository::{LookupRepository, LookupStore};
pub use paginator::{CountRow, Paginator};
pub use project_repository::{ProjectRepository, ProjectStore};
pub use tag_repository::{TagRepository, TagStore};
pub use user_repository::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use bookmark_repository::MockBookmarkRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use bug_repository::MockBugRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use lookup_repository::MockLookupRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use project_repository::MockProjectRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use tag_repository::MockTagRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
