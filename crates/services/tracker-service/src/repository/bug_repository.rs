//! Bug repository: query composition and persistence.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, NotSet,
    QueryFilter, QueryOrder, Select, Set, Unchanged,
};
use tracing::{debug, info};

use super::entities::bug::{self, ActiveModel, Entity as BugEntity};
use super::paginator::{count_distinct, order_of, within_deadline, Paginator};
use common::{AppError, AppResult};
use domain::{
    Bug, BugDraft, BugFilters, BugQuery, BugSortKey, OwnerScope, Ordering, PageResult,
    SaveTarget, UserId,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Bug repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BugRepository: Send + Sync {
    /// One page of bugs matching the query
    async fn find_paginated(
        &self,
        query: BugQuery,
        page: u64,
        page_size: u64,
    ) -> AppResult<PageResult<Bug>>;

    /// A miss is `None`, not an error
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Bug>>;

    /// Bugs of `owner_id` whose name matches case-insensitively
    async fn find_for_uniqueness(
        &self,
        name: &str,
        exclude_id: Option<i32>,
        owner_id: UserId,
    ) -> AppResult<Vec<Bug>>;

    /// Insert, or update every non-id column of an existing row
    async fn save(&self, target: SaveTarget, draft: BugDraft) -> AppResult<Bug>;

    async fn delete(&self, id: i32) -> AppResult<()>;

    /// Number of bugs in scope, optionally for one project and one status
    async fn count(
        &self,
        scope: OwnerScope,
        project_id: Option<i32>,
        status_id: Option<i32>,
    ) -> AppResult<u64>;
}

/// SeaORM-backed bug repository.
pub struct BugStore {
    db: Arc<DatabaseConnection>,
    paginator: Paginator,
}

impl BugStore {
    pub fn new(db: Arc<DatabaseConnection>, deadline: Duration) -> Self {
        let paginator = Paginator::new(db.clone(), deadline);
        Self { db, paginator }
    }

    fn deadline(&self) -> Duration {
        self.paginator.deadline()
    }
}

/// Scope and filter conditions, without ordering.
pub fn filtered(scope: OwnerScope, filters: &BugFilters) -> Select<BugEntity> {
    let mut condition = Condition::all();

    if let OwnerScope::Owner(owner) = scope {
        condition = condition.add(bug::Column::OwnerId.eq(owner));
    }
    if let Some(project_id) = filters.project_id {
        condition = condition.add(bug::Column::ProjectId.eq(project_id));
    }
    if let Some(ids) = filters.priority.priority_ids() {
        condition = condition.add(bug::Column::PriorityId.is_in(ids.iter().copied()));
    }
    if let Some(status_id) = filters.status.status_id() {
        condition = condition.add(bug::Column::StatusId.eq(status_id));
    }
    if let Some(ids) = filters.category.type_ids() {
        condition = condition.add(bug::Column::TypeId.is_in(ids.iter().copied()));
    }

    BugEntity::find().filter(condition)
}

/// Whitelisted ordering, with the id as a final tie-breaker.
pub fn ordered(select: Select<BugEntity>, ordering: &Ordering<BugSortKey>) -> Select<BugEntity> {
    ordering
        .terms()
        .iter()
        .fold(select, |select, (key, direction)| {
            select.order_by(column_for(*key), order_of(*direction))
        })
        .order_by_asc(bug::Column::Id)
}

/// Same owner, same name ignoring case, other than `exclude_id`.
pub fn uniqueness_select(
    name: &str,
    exclude_id: Option<i32>,
    owner_id: UserId,
) -> Select<BugEntity> {
    let select = BugEntity::find()
        .filter(Expr::expr(Func::lower(Expr::col(bug::Column::Name))).eq(name.to_lowercase()))
        .filter(bug::Column::OwnerId.eq(owner_id));
    match exclude_id {
        Some(id) => select.filter(bug::Column::Id.ne(id)),
        None => select,
    }
}

fn column_for(key: BugSortKey) -> bug::Column {
    match key {
        BugSortKey::Name => bug::Column::Name,
        BugSortKey::StartDate => bug::Column::StartDate,
        BugSortKey::EndDate => bug::Column::EndDate,
        BugSortKey::Priority => bug::Column::PriorityId,
        BugSortKey::Status => bug::Column::StatusId,
        BugSortKey::Type => bug::Column::TypeId,
    }
}

fn active_model(draft: BugDraft) -> ActiveModel {
    ActiveModel {
        id: NotSet,
        name: Set(draft.name),
        description: Set(draft.description),
        reproduction: Set(draft.reproduction),
        expected_result: Set(draft.expected_result),
        start_date: Set(draft.start_date),
        end_date: Set(draft.end_date),
        type_id: Set(draft.type_id),
        priority_id: Set(draft.priority_id),
        status_id: Set(draft.status_id),
        project_id: Set(draft.project_id),
        owner_id: Set(draft.owner_id),
    }
}

#[async_trait]
impl BugRepository for BugStore {
    async fn find_paginated(
        &self,
        query: BugQuery,
        page: u64,
        page_size: u64,
    ) -> AppResult<PageResult<Bug>> {
        debug!(?query, page, page_size, "Listing bugs");
        let base = filtered(query.scope, &query.filters);
        let count = count_distinct(base.clone(), bug::Column::Id);
        let data = ordered(base, &query.ordering);

        let page = self
            .paginator
            .paginate(data, count, page, page_size)
            .await?;
        Ok(page.map(Bug::from))
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Bug>> {
        let select = BugEntity::find_by_id(id);
        let result = within_deadline(self.deadline(), select.one(self.db.as_ref())).await?;
        Ok(result.map(Bug::from))
    }

    async fn find_for_uniqueness(
        &self,
        name: &str,
        exclude_id: Option<i32>,
        owner_id: UserId,
    ) -> AppResult<Vec<Bug>> {
        let select = uniqueness_select(name, exclude_id, owner_id);
        let models = within_deadline(self.deadline(), select.all(self.db.as_ref())).await?;
        Ok(models.into_iter().map(Bug::from).collect())
    }

    async fn save(&self, target: SaveTarget, draft: BugDraft) -> AppResult<Bug> {
        let mut active = active_model(draft);
        let model = match target {
            SaveTarget::Insert => {
                within_deadline(self.deadline(), active.insert(self.db.as_ref())).await?
            }
            SaveTarget::Update(id) => {
                active.id = Unchanged(id);
                within_deadline(self.deadline(), active.update(self.db.as_ref())).await?
            }
        };

        info!(bug_id = model.id, status_id = model.status_id, "Bug saved");
        Ok(Bug::from(model))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let delete = BugEntity::delete_by_id(id);
        let result = within_deadline(self.deadline(), delete.exec(self.db.as_ref())).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        info!(bug_id = id, "Bug deleted");
        Ok(())
    }

    async fn count(
        &self,
        scope: OwnerScope,
        project_id: Option<i32>,
        status_id: Option<i32>,
    ) -> AppResult<u64> {
        let mut select = filtered(
            scope,
            &BugFilters {
                project_id,
                ..Default::default()
            },
        );
        if let Some(status_id) = status_id {
            select = select.filter(bug::Column::StatusId.eq(status_id));
        }

        let row = within_deadline(
            self.deadline(),
            count_distinct(select, bug::Column::Id).one(self.db.as_ref()),
        )
        .await?;
        Ok(row.map(|r| r.total_results.max(0) as u64).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{CategoryFilter, ListParams, PriorityFilter, StatusFilter};
    use sea_orm::{DbBackend, QueryTrait};

    fn sql(select: Select<BugEntity>) -> String {
        select.build(DbBackend::Postgres).to_string()
    }

    #[test]
    fn test_bug_name_uniqueness_select() {
        let rendered = sql(uniqueness_select("Login Broken", Some(9), 2));

        assert!(rendered.contains(r#"LOWER("name") = 'login broken'"#), "{}", rendered);
        assert!(rendered.contains(r#""bugs"."owner_id" = 2"#), "{}", rendered);
        assert!(rendered.contains(r#""bugs"."id" <> 9"#), "{}", rendered);
    }

    #[test]
    fn test_owner_scope_restricts_rows() {
        let rendered = sql(filtered(OwnerScope::Owner(7), &BugFilters::default()));
        assert!(rendered.contains(r#""bugs"."owner_id" = 7"#), "{}", rendered);

        let rendered = sql(filtered(OwnerScope::Unrestricted, &BugFilters::default()));
        assert!(!rendered.contains("owner_id\" ="), "{}", rendered);
    }

    #[test]
    fn test_filters_compose() {
        let filters = BugFilters {
            priority: PriorityFilter::Important,
            status: StatusFilter::Open,
            category: CategoryFilter::FrontEnd,
            project_id: Some(3),
        };
        let rendered = sql(filtered(OwnerScope::Owner(1), &filters));

        assert!(rendered.contains(r#""bugs"."project_id" = 3"#), "{}", rendered);
        assert!(rendered.contains(r#""bugs"."priority_id" IN (1, 2)"#), "{}", rendered);
        assert!(rendered.contains(r#""bugs"."status_id" = 1"#), "{}", rendered);
        assert!(rendered.contains(r#""bugs"."type_id" IN (1, 2)"#), "{}", rendered);
    }

    #[test]
    fn test_default_ordering() {
        let query = BugQuery::from_params(OwnerScope::Unrestricted, &ListParams::default());
        let rendered = sql(ordered(filtered(query.scope, &query.filters), &query.ordering));

        assert!(
            rendered.contains(
                r#"ORDER BY "bugs"."status_id" ASC, "bugs"."end_date" DESC, "bugs"."priority_id" ASC, "bugs"."id" ASC"#
            ),
            "{}",
            rendered
        );
    }

    #[test]
    fn test_unknown_sort_field_never_reaches_sql() {
        let params = ListParams {
            sort: Some("name; DROP TABLE bugs".into()),
            direction: Some("desc".into()),
            ..Default::default()
        };
        let query = BugQuery::from_params(OwnerScope::Owner(1), &params);
        let rendered = sql(ordered(filtered(query.scope, &query.filters), &query.ordering));

        assert!(!rendered.contains("DROP"), "{}", rendered);
        assert!(rendered.contains(r#""bugs"."status_id" ASC"#), "{}", rendered);
    }

    #[test]
    fn test_count_query_shape() {
        let select = count_distinct(filtered(OwnerScope::Owner(2), &BugFilters::default()), bug::Column::Id);
        let rendered = select.into_statement(DbBackend::Postgres).to_string();

        assert!(
            rendered.contains(r#"COUNT(DISTINCT "bugs"."id") AS "total_results""#),
            "{}",
            rendered
        );
        assert!(!rendered.contains("ORDER BY"), "{}", rendered);
        assert!(!rendered.contains("LIMIT"), "{}", rendered);
    }
}
