//! Count-then-fetch pagination over SeaORM selects.
//!
//! Repositories hand over a data query (filters and ordering) and a count
//! query built from the same filters. The count runs first to bound the
//! page; the two statements are not wrapped in a transaction.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use sea_orm::{
    sea_query::{Expr, Func, SimpleExpr},
    DatabaseConnection, DbErr, EntityTrait, FromQueryResult, Order, QuerySelect, Select,
    SelectModel, Selector,
};
use tracing::{debug, warn};

use common::{AppError, AppResult};
use domain::{PageResult, PageWindow, SortDirection};

/// Row shape of every count query.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct CountRow {
    pub total_results: i64,
}

/// `SELECT COUNT(DISTINCT <entity>.<id>) AS total_results` over the filtered rows.
pub fn count_distinct<E: EntityTrait>(
    filtered: Select<E>,
    id: E::Column,
) -> Selector<SelectModel<CountRow>> {
    filtered
        .select_only()
        .column_as(
            SimpleExpr::from(Func::count_distinct(Expr::col((E::default(), id)))),
            "total_results",
        )
        .into_model::<CountRow>()
}

pub fn order_of(direction: SortDirection) -> Order {
    match direction {
        SortDirection::Asc => Order::Asc,
        SortDirection::Desc => Order::Desc,
    }
}

/// Await a query, failing with `Timeout` once the deadline passes.
pub async fn within_deadline<T, F>(deadline: Duration, query: F) -> AppResult<T>
where
    F: Future<Output = Result<T, DbErr>>,
{
    match tokio::time::timeout(deadline, query).await {
        Ok(result) => result.map_err(AppError::from),
        Err(_) => {
            warn!(deadline_ms = deadline.as_millis() as u64, "Query deadline exceeded");
            Err(AppError::Timeout)
        }
    }
}

/// Executes paginated queries against one connection.
#[derive(Clone)]
pub struct Paginator {
    db: Arc<DatabaseConnection>,
    deadline: Duration,
}

impl Paginator {
    pub fn new(db: Arc<DatabaseConnection>, deadline: Duration) -> Self {
        Self { db, deadline }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Count, clamp the requested page, then fetch that page.
    pub async fn paginate<E>(
        &self,
        data: Select<E>,
        count: Selector<SelectModel<CountRow>>,
        requested_page: u64,
        page_size: u64,
    ) -> AppResult<PageResult<E::Model>>
    where
        E: EntityTrait,
        E::Model: Send + Sync,
    {
        let total = within_deadline(self.deadline, count.one(self.db.as_ref()))
            .await?
            .map(|row| row.total_results.max(0) as u64);

        let window = PageWindow::resolve(total, requested_page, page_size);
        debug!(
            requested_page,
            page = window.page,
            total_pages = window.total_pages,
            page_size = window.page_size,
            "Resolved page window"
        );

        let rows = within_deadline(
            self.deadline,
            data.offset(window.offset())
                .limit(window.limit())
                .all(self.db.as_ref()),
        )
        .await?;

        Ok(window.into_result(rows))
    }
}
