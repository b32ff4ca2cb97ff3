//! Bookmark use cases.

use std::sync::Arc;

use async_trait::async_trait;

use crate::repository::BookmarkRepository;
use common::{AppResult, OptionExt};
use domain::{
    parse_page, validate_input, Bookmark, BookmarkInput, BookmarkQuery, ListParams, Normalize,
    OwnerScope,
    PageResult, QuerySpec, RequestContext, SaveTarget,
};

#[async_trait]
pub trait BookmarkService: Send + Sync {
    async fn list_bookmarks(
        &self,
        ctx: RequestContext,
        params: ListParams,
    ) -> AppResult<PageResult<Bookmark>>;

    async fn get_bookmark(&self, ctx: RequestContext, id: i32) -> AppResult<Bookmark>;

    async fn save_bookmark(&self, ctx: RequestContext, input: BookmarkInput)
        -> AppResult<Bookmark>;

    async fn delete_bookmark(&self, ctx: RequestContext, id: i32) -> AppResult<()>;
}

pub struct BookmarkManager {
    bookmarks: Arc<dyn BookmarkRepository>,
    page_size: u64,
}

impl BookmarkManager {
    pub fn new(bookmarks: Arc<dyn BookmarkRepository>, page_size: u64) -> Self {
        Self {
            bookmarks,
            page_size,
        }
    }
}

#[async_trait]
impl BookmarkService for BookmarkManager {
    async fn list_bookmarks(
        &self,
        ctx: RequestContext,
        params: ListParams,
    ) -> AppResult<PageResult<Bookmark>> {
        ctx.require_authenticated()?;
        let query: BookmarkQuery = QuerySpec::from_sort(OwnerScope::Unrestricted, &params);
        let page = parse_page(params.page.as_deref());
        self.bookmarks
            .find_paginated(query, page, self.page_size)
            .await
    }

    async fn get_bookmark(&self, ctx: RequestContext, id: i32) -> AppResult<Bookmark> {
        ctx.require_authenticated()?;
        self.bookmarks.find_by_id(id).await?.ok_or_not_found()
    }

    async fn save_bookmark(
        &self,
        ctx: RequestContext,
        input: BookmarkInput,
    ) -> AppResult<Bookmark> {
        ctx.require_authenticated()?;
        let input = input.normalized();
        let target = input.id.target();
        if let SaveTarget::Update(id) = target {
            self.bookmarks.find_by_id(id).await?.ok_or_not_found()?;
        }
        validate_input(&input)?;

        self.bookmarks
            .save(target, input.title, input.url)
            .await
    }

    async fn delete_bookmark(&self, ctx: RequestContext, id: i32) -> AppResult<()> {
        ctx.require_authenticated()?;
        self.bookmarks.delete(id).await
    }
}
