//! Tag repository.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set, Unchanged,
};
use tracing::info;

use super::entities::tag::{self, ActiveModel, Entity as TagEntity};
use super::paginator::{count_distinct, order_of, within_deadline, Paginator};
use common::{AppError, AppResult};
use domain::{PageResult, SaveTarget, Tag, TagQuery, TagSortKey};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn find_paginated(
        &self,
        query: TagQuery,
        page: u64,
        page_size: u64,
    ) -> AppResult<PageResult<Tag>>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Tag>>;

    /// Tag names are unique across the whole catalog
    async fn find_for_uniqueness(&self, name: &str, exclude_id: Option<i32>)
        -> AppResult<Vec<Tag>>;

    async fn save(&self, target: SaveTarget, name: String) -> AppResult<Tag>;

    async fn delete(&self, id: i32) -> AppResult<()>;
}

pub struct TagStore {
    db: Arc<DatabaseConnection>,
    paginator: Paginator,
}

impl TagStore {
    pub fn new(db: Arc<DatabaseConnection>, deadline: Duration) -> Self {
        let paginator = Paginator::new(db.clone(), deadline);
        Self { db, paginator }
    }
}

#[async_trait]
impl TagRepository for TagStore {
    async fn find_paginated(
        &self,
        query: TagQuery,
        page: u64,
        page_size: u64,
    ) -> AppResult<PageResult<Tag>> {
        let base = TagEntity::find();
        let count = count_distinct(base.clone(), tag::Column::Id);
        let data = query
            .ordering
            .terms()
            .iter()
            .fold(base, |select, (key, direction)| match key {
                TagSortKey::Name => select.order_by(tag::Column::Name, order_of(*direction)),
            })
            .order_by_asc(tag::Column::Id);

        let page = self
            .paginator
            .paginate(data, count, page, page_size)
            .await?;
        Ok(page.map(Tag::from))
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Tag>> {
        let result = within_deadline(
            self.paginator.deadline(),
            TagEntity::find_by_id(id).one(self.db.as_ref()),
        )
        .await?;
        Ok(result.map(Tag::from))
    }

    async fn find_for_uniqueness(
        &self,
        name: &str,
        exclude_id: Option<i32>,
    ) -> AppResult<Vec<Tag>> {
        let mut select = TagEntity::find()
            .filter(Expr::expr(Func::lower(Expr::col(tag::Column::Name))).eq(name.to_lowercase()));
        if let Some(id) = exclude_id {
            select = select.filter(tag::Column::Id.ne(id));
        }

        let deadline = self.paginator.deadline();
        let models = within_deadline(deadline, select.all(self.db.as_ref())).await?;
        Ok(models.into_iter().map(Tag::from).collect())
    }

    async fn save(&self, target: SaveTarget, name: String) -> AppResult<Tag> {
        let mut active = ActiveModel {
            id: NotSet,
            name: Set(name),
        };

        let deadline = self.paginator.deadline();
        let model = match target {
            SaveTarget::Insert => within_deadline(deadline, active.insert(self.db.as_ref())).await?,
            SaveTarget::Update(id) => {
                active.id = Unchanged(id);
                within_deadline(deadline, active.update(self.db.as_ref())).await?
            }
        };

        info!(tag_id = model.id, "Tag saved");
        Ok(Tag::from(model))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = within_deadline(
            self.paginator.deadline(),
            TagEntity::delete_by_id(id).exec(self.db.as_ref()),
        )
        .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        info!(tag_id = id, "Tag deleted");
        Ok(())
    }
}
