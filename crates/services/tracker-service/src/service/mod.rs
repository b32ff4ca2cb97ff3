//! Application services layer - Use cases and business logic.
//!
//! Every call takes an explicit [`RequestContext`]; authorization is
//! decided here, before any write reaches a repository.

mod auth_service;
mod bookmark_service;
mod bug_service;
pub mod container;
mod lookup_service;
mod project_service;
mod tag_service;
mod user_service;

use tracing::warn;

use common::AppResult;
use domain::{RequestContext, UserId};

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use bookmark_service::{BookmarkManager, BookmarkService};
pub use bug_service::{BugManager, BugService};
pub use lookup_service::{LookupManager, LookupService};
pub use project_service::{ProjectManager, ProjectService};
pub use tag_service::{TagManager, TagService};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;

/// Owner-or-admin check that logs refusals.
pub(crate) fn authorize_owner(
    ctx: &RequestContext,
    owner_id: UserId,
    resource: &'static str,
    id: i32,
) -> AppResult<()> {
    ctx.authorize_owner(owner_id).map_err(|err| {
        warn!(caller = ?ctx.caller_id(), resource, id, "Access refused");
        err.into()
    })
}
