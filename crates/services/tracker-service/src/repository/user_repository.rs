//! User repository, including the account cascade on delete.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{
    sea_query::{Expr, Func, Query},
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, NotSet,
    QueryFilter, QueryOrder, Select, Set, TransactionTrait, Unchanged,
};
use tracing::{debug, info};

use super::entities::bug::{self, Entity as BugEntity};
use super::entities::project::{self, Entity as ProjectEntity};
use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use super::paginator::{count_distinct, order_of, within_deadline, Paginator};
use common::{AppError, AppResult};
use domain::{Ordering, PageResult, SaveTarget, User, UserDraft, UserQuery, UserSortKey};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_paginated(
        &self,
        query: UserQuery,
        page: u64,
        page_size: u64,
    ) -> AppResult<PageResult<User>>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>>;

    /// Case-insensitive login lookup
    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>>;

    /// Accounts whose login matches case-insensitively, minus `exclude_id`
    async fn find_for_uniqueness(&self, login: &str, exclude_id: Option<i32>)
        -> AppResult<Vec<User>>;

    /// A `None` password hash keeps the stored one on update
    async fn save(&self, target: SaveTarget, draft: UserDraft) -> AppResult<User>;

    /// Remove the account with its projects and every bug it owns or
    /// that lives in one of its projects
    async fn delete_cascade(&self, id: i32) -> AppResult<()>;
}

/// SeaORM-backed user repository.
pub struct UserStore {
    db: Arc<DatabaseConnection>,
    paginator: Paginator,
}

impl UserStore {
    pub fn new(db: Arc<DatabaseConnection>, deadline: Duration) -> Self {
        let paginator = Paginator::new(db.clone(), deadline);
        Self { db, paginator }
    }

    fn deadline(&self) -> Duration {
        self.paginator.deadline()
    }
}

fn login_matches(login: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col(user::Column::Login))).eq(login.to_lowercase())
}

pub fn ordered(select: Select<UserEntity>, ordering: &Ordering<UserSortKey>) -> Select<UserEntity> {
    ordering
        .terms()
        .iter()
        .fold(select, |select, (key, direction)| {
            let column = match key {
                UserSortKey::Login => user::Column::Login,
                UserSortKey::Role => user::Column::RoleId,
            };
            select.order_by(column, order_of(*direction))
        })
        .order_by_asc(user::Column::Id)
}

/// Bugs reported by the user or filed under one of the user's projects.
fn owned_bugs(user_id: i32) -> Condition {
    Condition::any()
        .add(bug::Column::OwnerId.eq(user_id))
        .add(
            bug::Column::ProjectId.in_subquery(
                Query::select()
                    .column(project::Column::Id)
                    .from(ProjectEntity)
                    .and_where(project::Column::OwnerId.eq(user_id))
                    .to_owned(),
            ),
        )
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_paginated(
        &self,
        query: UserQuery,
        page: u64,
        page_size: u64,
    ) -> AppResult<PageResult<User>> {
        debug!(?query, page, page_size, "Listing users");
        let base = UserEntity::find();
        let count = count_distinct(base.clone(), user::Column::Id);
        let data = ordered(base, &query.ordering);

        let page = self
            .paginator
            .paginate(data, count, page, page_size)
            .await?;
        Ok(page.map(User::from))
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let select = UserEntity::find_by_id(id);
        let result = within_deadline(self.deadline(), select.one(self.db.as_ref())).await?;
        Ok(result.map(User::from))
    }

    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>> {
        let result = within_deadline(
            self.deadline(),
            UserEntity::find().filter(login_matches(login)).one(self.db.as_ref()),
        )
        .await?;
        Ok(result.map(User::from))
    }

    async fn find_for_uniqueness(
        &self,
        login: &str,
        exclude_id: Option<i32>,
    ) -> AppResult<Vec<User>> {
        let mut select = UserEntity::find().filter(login_matches(login));
        if let Some(id) = exclude_id {
            select = select.filter(user::Column::Id.ne(id));
        }

        let models = within_deadline(self.deadline(), select.all(self.db.as_ref())).await?;
        Ok(models.into_iter().map(User::from).collect())
    }

    async fn save(&self, target: SaveTarget, draft: UserDraft) -> AppResult<User> {
        if target.is_insert() && draft.password_hash.is_none() {
            return Err(AppError::validation("Password is required"));
        }

        let mut active = ActiveModel {
            id: NotSet,
            login: Set(draft.login),
            password_hash: draft.password_hash.map(Set).unwrap_or(NotSet),
            role_id: Set(draft.role.id()),
        };

        let model = match target {
            SaveTarget::Insert => {
                within_deadline(self.deadline(), active.insert(self.db.as_ref())).await?
            }
            SaveTarget::Update(id) => {
                active.id = Unchanged(id);
                within_deadline(self.deadline(), active.update(self.db.as_ref())).await?
            }
        };

        info!(user_id = model.id, role_id = model.role_id, "User saved");
        Ok(User::from(model))
    }

    async fn delete_cascade(&self, id: i32) -> AppResult<()> {
        let deadline = self.deadline();
        let txn = within_deadline(deadline, self.db.begin()).await?;

        let bugs = within_deadline(
            deadline,
            BugEntity::delete_many().filter(owned_bugs(id)).exec(&txn),
        )
        .await?;
        let projects = within_deadline(
            deadline,
            ProjectEntity::delete_many()
                .filter(project::Column::OwnerId.eq(id))
                .exec(&txn),
        )
        .await?;

        let result = within_deadline(deadline, UserEntity::delete_by_id(id).exec(&txn)).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        within_deadline(deadline, txn.commit()).await?;
        info!(
            user_id = id,
            projects_deleted = projects.rows_affected,
            bugs_deleted = bugs.rows_affected,
            "User deleted with owned records"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn test_login_lookup_is_case_insensitive() {
        let rendered = UserEntity::find()
            .filter(login_matches("Alice"))
            .build(DbBackend::Postgres)
            .to_string();

        assert!(
            rendered.contains(r#"LOWER("login") = 'alice'"#),
            "{}",
            rendered
        );
    }

    #[test]
    fn test_cascade_reaches_bugs_in_owned_projects() {
        let rendered = BugEntity::delete_many()
            .filter(owned_bugs(5))
            .build(DbBackend::Postgres)
            .to_string();

        assert!(rendered.contains(r#""bugs"."owner_id" = 5"#), "{}", rendered);
        assert!(rendered.contains(" OR "), "{}", rendered);
        assert!(
            rendered.contains(r#""bugs"."project_id" IN (SELECT "id" FROM "projects""#),
            "{}",
            rendered
        );
    }
}
