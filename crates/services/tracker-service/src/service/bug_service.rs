//! Bug use cases: listing, saving, status changes and dashboard counts.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use super::authorize_owner;
use crate::repository::{BugRepository, LookupRepository, ProjectRepository};
use common::{AppResult, OptionExt};
use domain::{
    parse_page, resolve_end_date, toggle_status, validate_fields, Bug, BugDraft, BugInput,
    BugQuery, FieldErrors, ListParams, LookupKind, Normalize, OwnerScope, PageResult, PageSizes,
    RequestContext, SaveTarget, STATUS_CLOSED, STATUS_OPEN,
};

/// Bug service trait for dependency injection.
#[async_trait]
pub trait BugService: Send + Sync {
    /// Bugs visible to the caller, filtered, sorted and paged
    async fn list_bugs(&self, ctx: RequestContext, params: ListParams)
        -> AppResult<PageResult<Bug>>;

    /// Bugs of one project the caller owns (any project for administrators)
    async fn list_project_bugs(
        &self,
        ctx: RequestContext,
        project_id: i32,
        params: ListParams,
    ) -> AppResult<PageResult<Bug>>;

    async fn get_bug(&self, ctx: RequestContext, id: i32) -> AppResult<Bug>;

    /// Insert or update, keyed by the id carried in the input
    async fn save_bug(&self, ctx: RequestContext, input: BugInput) -> AppResult<Bug>;

    /// Toggle open and closed
    async fn change_bug_status(&self, ctx: RequestContext, id: i32) -> AppResult<Bug>;

    async fn delete_bug(&self, ctx: RequestContext, id: i32) -> AppResult<()>;

    /// Bugs in the caller's scope, optionally for one project, optionally closed only
    async fn count_bugs(
        &self,
        ctx: RequestContext,
        project_id: Option<i32>,
        done_only: bool,
    ) -> AppResult<u64>;
}

/// Concrete implementation of BugService using repositories.
pub struct BugManager {
    bugs: Arc<dyn BugRepository>,
    projects: Arc<dyn ProjectRepository>,
    lookups: Arc<dyn LookupRepository>,
    page_sizes: PageSizes,
}

impl BugManager {
    pub fn new(
        bugs: Arc<dyn BugRepository>,
        projects: Arc<dyn ProjectRepository>,
        lookups: Arc<dyn LookupRepository>,
        page_sizes: PageSizes,
    ) -> Self {
        Self {
            bugs,
            projects,
            lookups,
            page_sizes,
        }
    }

    async fn owned_bug(&self, ctx: &RequestContext, id: i32) -> AppResult<Bug> {
        ctx.require_authenticated()?;
        let bug = self.bugs.find_by_id(id).await?.ok_or_not_found()?;
        authorize_owner(ctx, bug.owner_id, "bug", id)?;
        Ok(bug)
    }
}

#[async_trait]
impl BugService for BugManager {
    async fn list_bugs(
        &self,
        ctx: RequestContext,
        params: ListParams,
    ) -> AppResult<PageResult<Bug>> {
        let scope = ctx.list_scope()?;
        let query = BugQuery::from_params(scope, &params);
        let page = parse_page(params.page.as_deref());

        self.bugs
            .find_paginated(query, page, self.page_sizes.for_context(&ctx))
            .await
    }

    async fn list_project_bugs(
        &self,
        ctx: RequestContext,
        project_id: i32,
        params: ListParams,
    ) -> AppResult<PageResult<Bug>> {
        ctx.require_authenticated()?;
        let project = self
            .projects
            .find_by_id(project_id)
            .await?
            .ok_or_not_found()?;
        authorize_owner(&ctx, project.owner_id, "project", project_id)?;

        // Every bug filed under an accessible project is listed
        let query =
            BugQuery::from_params(OwnerScope::Unrestricted, &params).for_project(project_id);
        let page = parse_page(params.page.as_deref());

        self.bugs
            .find_paginated(query, page, self.page_sizes.for_context(&ctx))
            .await
    }

    async fn get_bug(&self, ctx: RequestContext, id: i32) -> AppResult<Bug> {
        self.owned_bug(&ctx, id).await
    }

    async fn save_bug(&self, ctx: RequestContext, input: BugInput) -> AppResult<Bug> {
        let caller = ctx.require_authenticated()?;
        let input = input.normalized();
        let target = input.id.target();

        let existing = match target {
            SaveTarget::Update(id) => Some(self.owned_bug(&ctx, id).await?),
            SaveTarget::Insert => None,
        };

        validate_fields(&input).into_result()?;
        let mut errors = FieldErrors::new();

        match self.projects.find_by_id(input.project_id).await? {
            Some(project) => authorize_owner(&ctx, project.owner_id, "project", project.id)?,
            None => errors.add("project_id", "Unknown project"),
        }

        let status_id = input
            .status_id
            .or(existing.as_ref().map(|bug| bug.status_id))
            .unwrap_or(STATUS_OPEN);
        let references = [
            (LookupKind::Type, "type_id", input.type_id),
            (LookupKind::Priority, "priority_id", input.priority_id),
            (LookupKind::Status, "status_id", status_id),
        ];
        for (kind, field, id) in references {
            if self.lookups.find_by_id(kind, id).await?.is_none() {
                errors.add(field, format!("Unknown {}", kind.table()));
            }
        }

        let owner_id = existing.as_ref().map_or(caller, |bug| bug.owner_id);
        let clashes = self
            .bugs
            .find_for_uniqueness(&input.name, target.id(), owner_id)
            .await?;
        if !clashes.is_empty() {
            errors.add("name", "A bug with this name already exists");
        }

        if !errors.is_empty() {
            debug!(fields = %errors, "Bug rejected");
        }
        errors.into_result()?;

        let today = Utc::now().date_naive();
        let draft = BugDraft {
            name: input.name,
            description: input.description,
            reproduction: input.reproduction,
            expected_result: input.expected_result,
            start_date: existing
                .as_ref()
                .map_or(Some(today), |bug| bug.start_date),
            end_date: resolve_end_date(
                existing.as_ref().map(|bug| (bug.status_id, bug.end_date)),
                status_id,
                today,
            ),
            type_id: input.type_id,
            priority_id: input.priority_id,
            status_id,
            project_id: input.project_id,
            owner_id,
        };

        self.bugs.save(target, draft).await
    }

    async fn change_bug_status(&self, ctx: RequestContext, id: i32) -> AppResult<Bug> {
        let bug = self.owned_bug(&ctx, id).await?;
        let status_id = toggle_status(bug.status_id);

        let mut draft = bug.to_draft();
        draft.status_id = status_id;
        draft.end_date = resolve_end_date(
            Some((bug.status_id, bug.end_date)),
            status_id,
            Utc::now().date_naive(),
        );

        let saved = self.bugs.save(SaveTarget::Update(id), draft).await?;
        info!(bug_id = id, from = bug.status_id, to = status_id, "Bug status changed");
        Ok(saved)
    }

    async fn delete_bug(&self, ctx: RequestContext, id: i32) -> AppResult<()> {
        self.owned_bug(&ctx, id).await?;
        self.bugs.delete(id).await
    }

    async fn count_bugs(
        &self,
        ctx: RequestContext,
        project_id: Option<i32>,
        done_only: bool,
    ) -> AppResult<u64> {
        let scope = ctx.list_scope()?;
        let status = done_only.then_some(STATUS_CLOSED);
        self.bugs.count(scope, project_id, status).await
    }
}
