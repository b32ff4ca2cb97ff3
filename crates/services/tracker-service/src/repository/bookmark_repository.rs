//! Bookmark repository.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, NotSet, QueryOrder, Set, Unchanged,
};
use tracing::info;

use super::entities::bookmark::{self, ActiveModel, Entity as BookmarkEntity};
use super::paginator::{count_distinct, order_of, within_deadline, Paginator};
use common::{AppError, AppResult};
use domain::{Bookmark, BookmarkQuery, BookmarkSortKey, PageResult, SaveTarget};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BookmarkRepository: Send + Sync {
    async fn find_paginated(
        &self,
        query: BookmarkQuery,
        page: u64,
        page_size: u64,
    ) -> AppResult<PageResult<Bookmark>>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Bookmark>>;

    /// Stamps `modified_at`; `created_at` is written on insert only
    async fn save(&self, target: SaveTarget, title: String, url: String) -> AppResult<Bookmark>;

    async fn delete(&self, id: i32) -> AppResult<()>;
}

pub struct BookmarkStore {
    db: Arc<DatabaseConnection>,
    paginator: Paginator,
}

impl BookmarkStore {
    pub fn new(db: Arc<DatabaseConnection>, deadline: Duration) -> Self {
        let paginator = Paginator::new(db.clone(), deadline);
        Self { db, paginator }
    }
}

#[async_trait]
impl BookmarkRepository for BookmarkStore {
    async fn find_paginated(
        &self,
        query: BookmarkQuery,
        page: u64,
        page_size: u64,
    ) -> AppResult<PageResult<Bookmark>> {
        let base = BookmarkEntity::find();
        let count = count_distinct(base.clone(), bookmark::Column::Id);
        let data = query
            .ordering
            .terms()
            .iter()
            .fold(base, |select, (key, direction)| match key {
                BookmarkSortKey::Title => {
                    select.order_by(bookmark::Column::Title, order_of(*direction))
                }
            })
            .order_by_asc(bookmark::Column::Id);

        let page = self
            .paginator
            .paginate(data, count, page, page_size)
            .await?;
        Ok(page.map(Bookmark::from))
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Bookmark>> {
        let result = within_deadline(
            self.paginator.deadline(),
            BookmarkEntity::find_by_id(id).one(self.db.as_ref()),
        )
        .await?;
        Ok(result.map(Bookmark::from))
    }

    async fn save(&self, target: SaveTarget, title: String, url: String) -> AppResult<Bookmark> {
        let now = Utc::now();
        let mut active = ActiveModel {
            id: NotSet,
            title: Set(title),
            url: Set(url),
            created_at: NotSet,
            modified_at: Set(now),
        };

        let deadline = self.paginator.deadline();
        let model = match target {
            SaveTarget::Insert => {
                active.created_at = Set(now);
                within_deadline(deadline, active.insert(self.db.as_ref())).await?
            }
            SaveTarget::Update(id) => {
                active.id = Unchanged(id);
                within_deadline(deadline, active.update(self.db.as_ref())).await?
            }
        };

        info!(bookmark_id = model.id, "Bookmark saved");
        Ok(Bookmark::from(model))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = within_deadline(
            self.paginator.deadline(),
            BookmarkEntity::delete_by_id(id).exec(self.db.as_ref()),
        )
        .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        info!(bookmark_id = id, "Bookmark deleted");
        Ok(())
    }
}
