//! Tag catalog use cases.

use std::sync::Arc;

use async_trait::async_trait;

use crate::repository::TagRepository;
use common::{AppResult, OptionExt};
use domain::{
    parse_page, validate_fields, ListParams, Normalize, OwnerScope, PageResult, QuerySpec,
    RequestContext, SaveTarget, Tag, TagInput, TagQuery,
};

#[async_trait]
pub trait TagService: Send + Sync {
    async fn list_tags(&self, ctx: RequestContext, params: ListParams)
        -> AppResult<PageResult<Tag>>;

    async fn get_tag(&self, ctx: RequestContext, id: i32) -> AppResult<Tag>;

    async fn save_tag(&self, ctx: RequestContext, input: TagInput) -> AppResult<Tag>;

    async fn delete_tag(&self, ctx: RequestContext, id: i32) -> AppResult<()>;
}

pub struct TagManager {
    tags: Arc<dyn TagRepository>,
    page_size: u64,
}

impl TagManager {
    pub fn new(tags: Arc<dyn TagRepository>, page_size: u64) -> Self {
        Self { tags, page_size }
    }
}

#[async_trait]
impl TagService for TagManager {
    async fn list_tags(
        &self,
        ctx: RequestContext,
        params: ListParams,
    ) -> AppResult<PageResult<Tag>> {
        ctx.require_authenticated()?;
        let query: TagQuery = QuerySpec::from_sort(OwnerScope::Unrestricted, &params);
        let page = parse_page(params.page.as_deref());
        self.tags.find_paginated(query, page, self.page_size).await
    }

    async fn get_tag(&self, ctx: RequestContext, id: i32) -> AppResult<Tag> {
        ctx.require_authenticated()?;
        self.tags.find_by_id(id).await?.ok_or_not_found()
    }

    async fn save_tag(&self, ctx: RequestContext, input: TagInput) -> AppResult<Tag> {
        ctx.require_authenticated()?;
        let input = input.normalized();
        let target = input.id.target();
        if let SaveTarget::Update(id) = target {
            self.tags.find_by_id(id).await?.ok_or_not_found()?;
        }

        let mut errors = validate_fields(&input);
        if !input.name.is_empty()
            && !self
                .tags
                .find_for_uniqueness(&input.name, target.id())
                .await?
                .is_empty()
        {
            errors.add("name", "A tag with this name already exists");
        }
        errors.into_result()?;

        self.tags.save(target, input.name).await
    }

    async fn delete_tag(&self, ctx: RequestContext, id: i32) -> AppResult<()> {
        ctx.require_authenticated()?;
        self.tags.delete(id).await
    }
}
