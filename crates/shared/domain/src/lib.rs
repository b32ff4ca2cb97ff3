//! Domain layer - Core tracker entities, query specifications and policies.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! Nothing here performs I/O.

pub mod bug;
pub mod catalog;
pub mod constants;
pub mod error;
pub mod pagination;
pub mod password;
pub mod policy;
pub mod project;
pub mod query;
pub mod record;
pub mod user;
pub mod validation;

pub use bug::{resolve_end_date, toggle_status, Bug, BugDraft, BugInput};
pub use catalog::{Bookmark, BookmarkInput, Lookup, LookupInput, LookupKind, Tag, TagInput};
pub use constants::*;
pub use error::{DomainError, DomainResult, FieldErrors};
pub use pagination::{parse_page, PageResult, PageSizes, PageWindow};
pub use password::Password;
pub use policy::{Principal, RequestContext};
pub use project::{Project, ProjectDraft, ProjectInput, ProjectStats};
pub use query::{
    BookmarkQuery, BookmarkSortKey, BugFilters, BugQuery, BugSortKey, CategoryFilter, ListParams,
    OwnerScope, Ordering, PriorityFilter, ProjectQuery, ProjectSortKey, QuerySpec, SortDirection,
    SortKey, StatusFilter, TagQuery, TagSortKey, UserId, UserQuery, UserSortKey,
};
pub use record::{RecordKey, SaveTarget};
pub use user::{User, UserDraft, UserInput, UserProfile, UserRole};
pub use validation::{validate_fields, validate_input, Normalize};
