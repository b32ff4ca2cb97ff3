//! User service - account management and profiles.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::try_join;
use tracing::{info, warn};

use crate::repository::{BugRepository, ProjectRepository, UserRepository};
use common::{AppError, AppResult, OptionExt};
use domain::{
    parse_page, validate_fields, DomainError, FieldErrors, ListParams, Normalize, OwnerScope,
    PageResult, Password, QuerySpec, RequestContext, SaveTarget, User, UserDraft, UserInput,
    UserProfile, UserQuery, UserRole, STATUS_CLOSED,
};

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// All accounts (administrators only)
    async fn list_users(&self, ctx: RequestContext, params: ListParams)
        -> AppResult<PageResult<User>>;

    /// The caller's own account, or any account for administrators
    async fn get_user(&self, ctx: RequestContext, id: i32) -> AppResult<User>;

    /// The caller's account with its projects and bug counts
    async fn get_profile(&self, ctx: RequestContext) -> AppResult<UserProfile>;

    /// Edit an account; creating one here is reserved to administrators
    async fn save_user(&self, ctx: RequestContext, input: UserInput) -> AppResult<User>;

    /// Remove an account with everything it owns (administrators only)
    async fn delete_user(&self, ctx: RequestContext, id: i32) -> AppResult<()>;
}

/// Concrete implementation of UserService using repositories.
pub struct UserManager {
    users: Arc<dyn UserRepository>,
    projects: Arc<dyn ProjectRepository>,
    bugs: Arc<dyn BugRepository>,
    page_size: u64,
}

impl UserManager {
    pub fn new(
        users: Arc<dyn UserRepository>,
        projects: Arc<dyn ProjectRepository>,
        bugs: Arc<dyn BugRepository>,
        page_size: u64,
    ) -> Self {
        Self {
            users,
            projects,
            bugs,
            page_size,
        }
    }
}

/// Field checks shared by account creation, registration and edits.
///
/// Expects a normalized input. Yields the password hash to store (`None`
/// keeps the current one).
/// Rejected fields come back together as `InvalidFields`.
pub(crate) async fn check_account(
    users: &dyn UserRepository,
    input: &UserInput,
    target: SaveTarget,
) -> AppResult<Option<String>> {
    let mut errors: FieldErrors = validate_fields(input);

    // An empty password on edit keeps the stored one
    let password = input.password.as_deref().filter(|plain| !plain.is_empty());
    let password_hash = match password {
        Some(plain) => match Password::new(plain) {
            Ok(password) => Some(password.into_string()),
            Err(DomainError::Password(message)) => {
                errors.add("password", message);
                None
            }
            Err(other) => return Err(other.into()),
        },
        None => {
            if target.is_insert() {
                errors.add("password", "Password is required");
            }
            None
        }
    };

    if !users
        .find_for_uniqueness(&input.login, target.id())
        .await?
        .is_empty()
    {
        errors.add("login", "This login is already taken");
    }

    errors.into_result()?;
    Ok(password_hash)
}

#[async_trait]
impl UserService for UserManager {
    async fn list_users(
        &self,
        ctx: RequestContext,
        params: ListParams,
    ) -> AppResult<PageResult<User>> {
        ctx.require_admin()?;
        let query: UserQuery = QuerySpec::from_sort(OwnerScope::Unrestricted, &params);
        let page = parse_page(params.page.as_deref());

        self.users.find_paginated(query, page, self.page_size).await
    }

    async fn get_user(&self, ctx: RequestContext, id: i32) -> AppResult<User> {
        ctx.authorize_owner(id)?;
        self.users.find_by_id(id).await?.ok_or_not_found()
    }

    async fn get_profile(&self, ctx: RequestContext) -> AppResult<UserProfile> {
        let id = ctx.require_authenticated()?;
        let scope = OwnerScope::Owner(id);

        let (user, projects, bugs_all, bugs_done) = try_join!(
            self.users.find_by_id(id),
            self.projects.find_options(scope),
            self.bugs.count(scope, None, None),
            self.bugs.count(scope, None, Some(STATUS_CLOSED)),
        )?;

        Ok(UserProfile {
            user: user.ok_or_not_found()?,
            projects,
            bugs_all,
            bugs_done,
        })
    }

    async fn save_user(&self, ctx: RequestContext, input: UserInput) -> AppResult<User> {
        ctx.require_authenticated()?;
        let input = input.normalized();
        let target = input.id.target();

        let current_role = match target {
            SaveTarget::Insert => {
                ctx.require_admin()?;
                UserRole::User
            }
            SaveTarget::Update(id) => {
                ctx.authorize_owner(id)?;
                self.users.find_by_id(id).await?.ok_or_not_found()?.role
            }
        };

        let role = input.role.unwrap_or(current_role);
        if role != current_role && !ctx.is_admin() {
            warn!(caller = ?ctx.caller_id(), "Role change refused");
            return Err(AppError::Forbidden);
        }

        let password_hash = check_account(self.users.as_ref(), &input, target).await?;
        let draft = UserDraft {
            login: input.login,
            password_hash,
            role,
        };

        self.users.save(target, draft).await
    }

    async fn delete_user(&self, ctx: RequestContext, id: i32) -> AppResult<()> {
        ctx.require_admin()?;
        self.users.find_by_id(id).await?.ok_or_not_found()?;
        self.users.delete_cascade(id).await?;
        info!(user_id = id, "User removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockBugRepository, MockProjectRepository, MockUserRepository};
    use domain::RecordKey;
    use mockall::predicate::eq;

    fn account(id: i32, role: UserRole) -> User {
        User {
            id,
            login: format!("user{}", id),
            password_hash: "$argon2id$stored".into(),
            role,
        }
    }

    fn manager(users: MockUserRepository) -> UserManager {
        manager_with(users, MockProjectRepository::new(), MockBugRepository::new())
    }

    fn manager_with(
        users: MockUserRepository,
        projects: MockProjectRepository,
        bugs: MockBugRepository,
    ) -> UserManager {
        UserManager::new(Arc::new(users), Arc::new(projects), Arc::new(bugs), 10)
    }

    fn edit(id: i32) -> UserInput {
        UserInput {
            id: RecordKey::from(id),
            login: format!("user{}", id),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_listing_users_requires_admin() {
        let mut users = MockUserRepository::new();
        users.expect_find_paginated().never();

        let service = manager(users);
        let ctx = RequestContext::authenticated(3, UserRole::User);
        let result = service.list_users(ctx, ListParams::default()).await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_self_edit_keeps_password_when_absent() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .with(eq(3))
            .returning(|id| Ok(Some(account(id, UserRole::User))));
        users
            .expect_find_for_uniqueness()
            .returning(|_, _| Ok(vec![]));
        users
            .expect_save()
            .withf(|target, draft| {
                *target == SaveTarget::Update(3)
                    && draft.password_hash.is_none()
                    && draft.role == UserRole::User
            })
            .returning(|_, draft| {
                Ok(User {
                    id: 3,
                    login: draft.login,
                    password_hash: "$argon2id$stored".into(),
                    role: draft.role,
                })
            });

        let service = manager(users);
        let ctx = RequestContext::authenticated(3, UserRole::User);
        assert!(service.save_user(ctx, edit(3)).await.is_ok());
    }

    #[tokio::test]
    async fn test_user_cannot_promote_self() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(account(id, UserRole::User))));
        users.expect_save().never();

        let service = manager(users);
        let ctx = RequestContext::authenticated(3, UserRole::User);
        let input = UserInput {
            role: Some(UserRole::Admin),
            ..edit(3)
        };
        let result = service.save_user(ctx, input).await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_editing_another_account_is_forbidden() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().never();
        users.expect_save().never();

        let service = manager(users);
        let ctx = RequestContext::authenticated(3, UserRole::User);
        let result = service.save_user(ctx, edit(4)).await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_taken_login_and_short_password_are_field_errors() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_for_uniqueness()
            .with(eq("alice"), eq(None))
            .returning(|_, _| Ok(vec![account(8, UserRole::User)]));
        users.expect_save().never();

        let service = manager(users);
        let ctx = RequestContext::authenticated(1, UserRole::Admin);
        let input = UserInput {
            login: "alice".into(),
            password: Some("123".into()),
            ..Default::default()
        };
        match service.save_user(ctx, input).await {
            Err(AppError::InvalidFields(fields)) => {
                assert!(fields.contains("login"));
                assert!(fields.contains("password"));
            }
            other => panic!("expected field errors, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_user_requires_admin_and_cascades() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(account(id, UserRole::User))));
        users
            .expect_delete_cascade()
            .with(eq(6))
            .times(1)
            .returning(|_| Ok(()));

        let service = manager(users);
        let user = RequestContext::authenticated(6, UserRole::User);
        assert!(matches!(
            service.delete_user(user, 6).await,
            Err(AppError::Forbidden)
        ));

        let admin = RequestContext::authenticated(1, UserRole::Admin);
        assert!(service.delete_user(admin, 6).await.is_ok());
    }

    #[tokio::test]
    async fn test_profile_collects_projects_and_counts() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(account(id, UserRole::User))));

        let mut projects = MockProjectRepository::new();
        projects
            .expect_find_options()
            .with(eq(OwnerScope::Owner(2)))
            .returning(|_| Ok(vec![]));

        let mut bugs = MockBugRepository::new();
        bugs.expect_count()
            .with(eq(OwnerScope::Owner(2)), eq(None), eq(None))
            .returning(|_, _, _| Ok(7));
        bugs.expect_count()
            .with(eq(OwnerScope::Owner(2)), eq(None), eq(Some(STATUS_CLOSED)))
            .returning(|_, _, _| Ok(3));

        let service = manager_with(users, projects, bugs);
        let ctx = RequestContext::authenticated(2, UserRole::User);
        let profile = service.get_profile(ctx).await.unwrap();
        assert_eq!(profile.user.id, 2);
        assert_eq!((profile.bugs_all, profile.bugs_done), (7, 3));
    }
}
