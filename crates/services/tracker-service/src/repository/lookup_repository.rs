//! Lookup tables (types, priorities, statuses, roles).
//!
//! The four tables share one `(id, name)` shape, so statements are built
//! with `sea_query` against the table named by [`LookupKind`] instead of
//! one entity per table.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{
    sea_query::{Alias, Expr, Order, Query, SelectStatement},
    ConnectionTrait, DatabaseConnection, FromQueryResult,
};
use tracing::info;

use super::paginator::within_deadline;
use common::{AppError, AppResult};
use domain::{Lookup, LookupKind, SaveTarget};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[derive(Debug, FromQueryResult)]
struct LookupRow {
    id: i32,
    name: String,
}

impl From<LookupRow> for Lookup {
    fn from(row: LookupRow) -> Self {
        Lookup {
            id: row.id,
            name: row.name,
        }
    }
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait LookupRepository: Send + Sync {
    /// Every row of one table, by id
    async fn list(&self, kind: LookupKind) -> AppResult<Vec<Lookup>>;

    async fn find_by_id(&self, kind: LookupKind, id: i32) -> AppResult<Option<Lookup>>;

    async fn save(&self, kind: LookupKind, target: SaveTarget, name: String) -> AppResult<Lookup>;

    async fn delete(&self, kind: LookupKind, id: i32) -> AppResult<()>;
}

pub struct LookupStore {
    db: Arc<DatabaseConnection>,
    deadline: Duration,
}

impl LookupStore {
    pub fn new(db: Arc<DatabaseConnection>, deadline: Duration) -> Self {
        Self { db, deadline }
    }
}

fn table(kind: LookupKind) -> Alias {
    Alias::new(kind.table())
}

fn select_rows(kind: LookupKind) -> SelectStatement {
    Query::select()
        .columns([Alias::new("id"), Alias::new("name")])
        .from(table(kind))
        .to_owned()
}

#[async_trait]
impl LookupRepository for LookupStore {
    async fn list(&self, kind: LookupKind) -> AppResult<Vec<Lookup>> {
        let stmt = select_rows(kind)
            .order_by(Alias::new("id"), Order::Asc)
            .to_owned();
        let backend = self.db.get_database_backend();

        let rows = within_deadline(
            self.deadline,
            LookupRow::find_by_statement(backend.build(&stmt)).all(self.db.as_ref()),
        )
        .await?;
        Ok(rows.into_iter().map(Lookup::from).collect())
    }

    async fn find_by_id(&self, kind: LookupKind, id: i32) -> AppResult<Option<Lookup>> {
        let stmt = select_rows(kind)
            .and_where(Expr::col(Alias::new("id")).eq(id))
            .to_owned();
        let backend = self.db.get_database_backend();

        let row = within_deadline(
            self.deadline,
            LookupRow::find_by_statement(backend.build(&stmt)).one(self.db.as_ref()),
        )
        .await?;
        Ok(row.map(Lookup::from))
    }

    async fn save(&self, kind: LookupKind, target: SaveTarget, name: String) -> AppResult<Lookup> {
        let returning = Query::returning().columns([Alias::new("id"), Alias::new("name")]);
        let backend = self.db.get_database_backend();

        let statement = match target {
            SaveTarget::Insert => {
                let mut insert = Query::insert();
                insert
                    .into_table(table(kind))
                    .columns([Alias::new("name")])
                    .values([name.into()])
                    .map_err(|e| AppError::internal(e.to_string()))?
                    .returning(returning);
                backend.build(&insert)
            }
            SaveTarget::Update(id) => {
                let update = Query::update()
                    .table(table(kind))
                    .value(Alias::new("name"), name)
                    .and_where(Expr::col(Alias::new("id")).eq(id))
                    .returning(returning)
                    .to_owned();
                backend.build(&update)
            }
        };

        let row = within_deadline(
            self.deadline,
            LookupRow::find_by_statement(statement).one(self.db.as_ref()),
        )
        .await?
        .ok_or(AppError::NotFound)?;

        info!(table = kind.table(), lookup_id = row.id, "Lookup saved");
        Ok(Lookup::from(row))
    }

    async fn delete(&self, kind: LookupKind, id: i32) -> AppResult<()> {
        let stmt = Query::delete()
            .from_table(table(kind))
            .and_where(Expr::col(Alias::new("id")).eq(id))
            .to_owned();
        let backend = self.db.get_database_backend();

        let result = within_deadline(self.deadline, self.db.execute(backend.build(&stmt))).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        info!(table = kind.table(), lookup_id = id, "Lookup deleted");
        Ok(())
    }
}
