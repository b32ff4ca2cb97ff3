//! Service Container - Centralized service access.
//!
//! Repositories are built once from the connection and shared between the
//! services that need them.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::{
    AuthService, Authenticator, BookmarkManager, BookmarkService, BugManager, BugService,
    LookupManager, LookupService, ProjectManager, ProjectService, TagManager, TagService,
    UserManager, UserService,
};
use crate::config::TrackerServiceConfig;
use crate::repository::{BookmarkStore, BugStore, LookupStore, ProjectStore, TagStore, UserStore};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn bugs(&self) -> Arc<dyn BugService>;

    fn projects(&self) -> Arc<dyn ProjectService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn tags(&self) -> Arc<dyn TagService>;

    fn bookmarks(&self) -> Arc<dyn BookmarkService>;

    fn lookups(&self) -> Arc<dyn LookupService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth: Arc<dyn AuthService>,
    bugs: Arc<dyn BugService>,
    projects: Arc<dyn ProjectService>,
    users: Arc<dyn UserService>,
    tags: Arc<dyn TagService>,
    bookmarks: Arc<dyn BookmarkService>,
    lookups: Arc<dyn LookupService>,
}

impl Services {
    /// Create service container from database connection and config
    pub fn from_connection(db: Arc<DatabaseConnection>, config: &TrackerServiceConfig) -> Self {
        let deadline = config.query_timeout();
        let pages = &config.pagination;

        let bug_repo = Arc::new(BugStore::new(db.clone(), deadline));
        let project_repo = Arc::new(ProjectStore::new(db.clone(), deadline));
        let user_repo = Arc::new(UserStore::new(db.clone(), deadline));
        let lookup_repo = Arc::new(LookupStore::new(db.clone(), deadline));
        let tag_repo = Arc::new(TagStore::new(db.clone(), deadline));
        let bookmark_repo = Arc::new(BookmarkStore::new(db, deadline));

        Self {
            auth: Arc::new(Authenticator::new(user_repo.clone(), config.jwt.clone())),
            bugs: Arc::new(BugManager::new(
                bug_repo.clone(),
                project_repo.clone(),
                lookup_repo.clone(),
                pages.bugs,
            )),
            projects: Arc::new(ProjectManager::new(
                project_repo.clone(),
                bug_repo.clone(),
                pages.projects,
            )),
            users: Arc::new(UserManager::new(
                user_repo,
                project_repo,
                bug_repo,
                pages.users,
            )),
            tags: Arc::new(TagManager::new(tag_repo, pages.tags)),
            bookmarks: Arc::new(BookmarkManager::new(bookmark_repo, pages.bookmarks)),
            lookups: Arc::new(LookupManager::new(lookup_repo)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth.clone()
    }

    fn bugs(&self) -> Arc<dyn BugService> {
        self.bugs.clone()
    }

    fn projects(&self) -> Arc<dyn ProjectService> {
        self.projects.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.users.clone()
    }

    fn tags(&self) -> Arc<dyn TagService> {
        self.tags.clone()
    }

    fn bookmarks(&self) -> Arc<dyn BookmarkService> {
        self.bookmarks.clone()
    }

    fn lookups(&self) -> Arc<dyn LookupService> {
        self.lookups.clone()
    }
}
