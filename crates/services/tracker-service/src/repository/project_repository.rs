//! Project repository, including the explicit bug cascade on delete.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet,
    QueryFilter, QueryOrder, Select, Set, TransactionTrait, Unchanged,
};
use tracing::{debug, info};

use super::entities::bug::{self, Entity as BugEntity};
use super::entities::project::{self, ActiveModel, Entity as ProjectEntity};
use super::paginator::{count_distinct, order_of, within_deadline, Paginator};
use common::{AppError, AppResult};
use domain::{
    Ordering, OwnerScope, PageResult, Project, ProjectDraft, ProjectQuery, ProjectSortKey,
    SaveTarget, UserId,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Project repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn find_paginated(
        &self,
        query: ProjectQuery,
        page: u64,
        page_size: u64,
    ) -> AppResult<PageResult<Project>>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Project>>;

    /// Projects of `owner_id` whose name matches case-insensitively
    async fn find_for_uniqueness(
        &self,
        name: &str,
        exclude_id: Option<i32>,
        owner_id: UserId,
    ) -> AppResult<Vec<Project>>;

    /// Every project in scope by name, for pickers and dashboards
    async fn find_options(&self, scope: OwnerScope) -> AppResult<Vec<Project>>;

    async fn save(&self, target: SaveTarget, draft: ProjectDraft) -> AppResult<Project>;

    /// Delete the project's bugs, then the project, in one transaction
    async fn delete_cascade(&self, id: i32) -> AppResult<()>;
}

/// SeaORM-backed project repository.
pub struct ProjectStore {
    db: Arc<DatabaseConnection>,
    paginator: Paginator,
}

impl ProjectStore {
    pub fn new(db: Arc<DatabaseConnection>, deadline: Duration) -> Self {
        let paginator = Paginator::new(db.clone(), deadline);
        Self { db, paginator }
    }

    fn deadline(&self) -> Duration {
        self.paginator.deadline()
    }
}

pub fn filtered(scope: OwnerScope) -> Select<ProjectEntity> {
    match scope {
        OwnerScope::Owner(owner) => ProjectEntity::find().filter(project::Column::OwnerId.eq(owner)),
        OwnerScope::Unrestricted => ProjectEntity::find(),
    }
}

/// Same owner, same name ignoring case, other than `exclude_id`.
pub fn uniqueness_select(
    name: &str,
    exclude_id: Option<i32>,
    owner_id: UserId,
) -> Select<ProjectEntity> {
    let select = ProjectEntity::find()
        .filter(Expr::expr(Func::lower(Expr::col(project::Column::Name))).eq(name.to_lowercase()))
        .filter(project::Column::OwnerId.eq(owner_id));
    match exclude_id {
        Some(id) => select.filter(project::Column::Id.ne(id)),
        None => select,
    }
}

pub fn ordered(
    select: Select<ProjectEntity>,
    ordering: &Ordering<ProjectSortKey>,
) -> Select<ProjectEntity> {
    ordering
        .terms()
        .iter()
        .fold(select, |select, (key, direction)| {
            let column = match key {
                ProjectSortKey::Name => project::Column::Name,
                ProjectSortKey::StartDate => project::Column::StartDate,
                ProjectSortKey::EndDate => project::Column::EndDate,
            };
            select.order_by(column, order_of(*direction))
        })
        .order_by_asc(project::Column::Id)
}

#[async_trait]
impl ProjectRepository for ProjectStore {
    async fn find_paginated(
        &self,
        query: ProjectQuery,
        page: u64,
        page_size: u64,
    ) -> AppResult<PageResult<Project>> {
        debug!(?query, page, page_size, "Listing projects");
        let base = filtered(query.scope);
        let count = count_distinct(base.clone(), project::Column::Id);
        let data = ordered(base, &query.ordering);

        let page = self
            .paginator
            .paginate(data, count, page, page_size)
            .await?;
        Ok(page.map(Project::from))
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Project>> {
        let select = ProjectEntity::find_by_id(id);
        let result = within_deadline(self.deadline(), select.one(self.db.as_ref())).await?;
        Ok(result.map(Project::from))
    }

    async fn find_for_uniqueness(
        &self,
        name: &str,
        exclude_id: Option<i32>,
        owner_id: UserId,
    ) -> AppResult<Vec<Project>> {
        let select = uniqueness_select(name, exclude_id, owner_id);
        let models = within_deadline(self.deadline(), select.all(self.db.as_ref())).await?;
        Ok(models.into_iter().map(Project::from).collect())
    }

    async fn find_options(&self, scope: OwnerScope) -> AppResult<Vec<Project>> {
        let select = filtered(scope)
            .order_by_asc(project::Column::Name)
            .order_by_asc(project::Column::Id);
        let models = within_deadline(self.deadline(), select.all(self.db.as_ref())).await?;
        Ok(models.into_iter().map(Project::from).collect())
    }

    async fn save(&self, target: SaveTarget, draft: ProjectDraft) -> AppResult<Project> {
        let mut active = ActiveModel {
            id: NotSet,
            name: Set(draft.name),
            description: Set(draft.description),
            start_date: Set(draft.start_date),
            end_date: Set(draft.end_date),
            owner_id: Set(draft.owner_id),
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

        info!(project_id = model.id, owner_id = model.owner_id, "Project saved");
        Ok(Project::from(model))
    }

    async fn delete_cascade(&self, id: i32) -> AppResult<()> {
        let deadline = self.deadline();
        // Dropping the transaction without commit rolls it back
        let txn = within_deadline(deadline, self.db.begin()).await?;

        let bugs = within_deadline(
            deadline,
            BugEntity::delete_many()
                .filter(bug::Column::ProjectId.eq(id))
                .exec(&txn),
        )
        .await?;

        let result =
            within_deadline(deadline, ProjectEntity::delete_by_id(id).exec(&txn)).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        within_deadline(deadline, txn.commit()).await?;
        info!(
            project_id = id,
            bugs_deleted = bugs.rows_affected,
            "Project deleted with its bugs"
        );
        Ok(())
    }
}
