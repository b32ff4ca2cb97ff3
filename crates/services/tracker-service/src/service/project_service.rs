//! Project use cases.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::try_join;
use tracing::info;

use super::authorize_owner;
use crate::repository::{BugRepository, ProjectRepository};
use common::{AppResult, OptionExt};
use domain::{
    parse_page, validate_fields, ListParams, Normalize, OwnerScope, PageResult, PageSizes, Project,
    ProjectDraft, ProjectInput, ProjectQuery, ProjectStats, QuerySpec, RequestContext,
    SaveTarget, STATUS_CLOSED,
};

/// Project service trait for dependency injection.
#[async_trait]
pub trait ProjectService: Send + Sync {
    async fn list_projects(
        &self,
        ctx: RequestContext,
        params: ListParams,
    ) -> AppResult<PageResult<Project>>;

    async fn get_project(&self, ctx: RequestContext, id: i32) -> AppResult<Project>;

    async fn save_project(&self, ctx: RequestContext, input: ProjectInput) -> AppResult<Project>;

    /// Deletes the project's bugs, then the project
    async fn delete_project(&self, ctx: RequestContext, id: i32) -> AppResult<()>;

    async fn project_stats(&self, ctx: RequestContext, id: i32) -> AppResult<ProjectStats>;

    /// Unpaged projects in scope, for pickers
    async fn project_options(&self, ctx: RequestContext) -> AppResult<Vec<Project>>;
}

pub struct ProjectManager {
    projects: Arc<dyn ProjectRepository>,
    bugs: Arc<dyn BugRepository>,
    page_sizes: PageSizes,
}

impl ProjectManager {
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        bugs: Arc<dyn BugRepository>,
        page_sizes: PageSizes,
    ) -> Self {
        Self {
            projects,
            bugs,
            page_sizes,
        }
    }

    async fn owned_project(&self, ctx: &RequestContext, id: i32) -> AppResult<Project> {
        ctx.require_authenticated()?;
        let project = self.projects.find_by_id(id).await?.ok_or_not_found()?;
        authorize_owner(ctx, project.owner_id, "project", id)?;
        Ok(project)
    }
}

#[async_trait]
impl ProjectService for ProjectManager {
    async fn list_projects(
        &self,
        ctx: RequestContext,
        params: ListParams,
    ) -> AppResult<PageResult<Project>> {
        let query: ProjectQuery = QuerySpec::from_sort(ctx.list_scope()?, &params);
        let page = parse_page(params.page.as_deref());

        self.projects
            .find_paginated(query, page, self.page_sizes.for_context(&ctx))
            .await
    }

    async fn get_project(&self, ctx: RequestContext, id: i32) -> AppResult<Project> {
        self.owned_project(&ctx, id).await
    }

    async fn save_project(&self, ctx: RequestContext, input: ProjectInput) -> AppResult<Project> {
        let caller = ctx.require_authenticated()?;
        let input = input.normalized();
        let target = input.id.target();

        let existing = match target {
            SaveTarget::Update(id) => Some(self.owned_project(&ctx, id).await?),
            SaveTarget::Insert => None,
        };

        let mut errors = validate_fields(&input);
        let dates = input.dates().map_err(|date_errors| errors.merge(date_errors)).ok();

        let owner_id = existing.as_ref().map_or(caller, |project| project.owner_id);
        if !input.name.is_empty()
            && !self
                .projects
                .find_for_uniqueness(&input.name, target.id(), owner_id)
                .await?
                .is_empty()
        {
            errors.add("name", "A project with this name already exists");
        }
        errors.into_result()?;

        let (start_date, end_date) = dates.unwrap_or_default();
        let draft = ProjectDraft {
            name: input.name,
            description: input.description,
            start_date,
            end_date,
            owner_id,
        };

        self.projects.save(target, draft).await
    }

    async fn delete_project(&self, ctx: RequestContext, id: i32) -> AppResult<()> {
        self.owned_project(&ctx, id).await?;
        self.projects.delete_cascade(id).await?;
        info!(project_id = id, "Project removed");
        Ok(())
    }

    async fn project_stats(&self, ctx: RequestContext, id: i32) -> AppResult<ProjectStats> {
        let project = self.owned_project(&ctx, id).await?;

        let (bugs_all, bugs_done) = try_join!(
            self.bugs.count(OwnerScope::Unrestricted, Some(id), None),
            self.bugs
                .count(OwnerScope::Unrestricted, Some(id), Some(STATUS_CLOSED)),
        )?;

        Ok(ProjectStats {
            project,
            bugs_all,
            bugs_done,
        })
    }

    async fn project_options(&self, ctx: RequestContext) -> AppResult<Vec<Project>> {
        self.projects.find_options(ctx.list_scope()?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockBugRepository, MockProjectRepository};
    use common::AppError;
    use domain::{RecordKey, UserRole};
    use mockall::predicate::eq;

    fn project(id: i32, owner_id: i32) -> Project {
        Project {
            id,
            name: "Storefront".into(),
            description: None,
            start_date: None,
            end_date: None,
            owner_id,
        }
    }

    fn manager(projects: MockProjectRepository, bugs: MockBugRepository) -> ProjectManager {
        ProjectManager::new(
            Arc::new(projects),
            Arc::new(bugs),
            PageSizes { user: 10, admin: 20 },
        )
    }

    fn named(name: &str) -> ProjectInput {
        ProjectInput {
            name: name.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_same_name_allowed_for_different_owners() {
        let mut projects = MockProjectRepository::new();
        projects
            .expect_find_for_uniqueness()
            .with(eq("Storefront"), eq(None), eq(2))
            .returning(|_, _, _| Ok(vec![]));
        projects
            .expect_save()
            .withf(|target, draft| *target == SaveTarget::Insert && draft.owner_id == 2)
            .returning(|_, draft| Ok(project(8, draft.owner_id)));

        let service = manager(projects, MockBugRepository::new());
        let ctx = RequestContext::authenticated(2, UserRole::User);
        let saved = service.save_project(ctx, named("Storefront")).await.unwrap();
        assert_eq!(saved.owner_id, 2);
    }

    #[tokio::test]
    async fn test_same_name_for_same_owner_is_a_field_error() {
        let mut projects = MockProjectRepository::new();
        projects
            .expect_find_for_uniqueness()
            .with(eq("storefront"), eq(None), eq(1))
            .returning(|_, _, owner| Ok(vec![project(3, owner)]));
        projects.expect_save().never();

        let service = manager(projects, MockBugRepository::new());
        let ctx = RequestContext::authenticated(1, UserRole::User);
        match service.save_project(ctx, named("storefront")).await {
            Err(AppError::InvalidFields(fields)) => assert!(fields.contains("name")),
            other => panic!("expected field errors, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_padded_short_name_is_rejected_after_trim() {
        let mut projects = MockProjectRepository::new();
        projects
            .expect_find_for_uniqueness()
            .with(eq("ab"), eq(None), eq(1))
            .returning(|_, _, _| Ok(vec![]));
        projects.expect_save().never();

        let service = manager(projects, MockBugRepository::new());
        let ctx = RequestContext::authenticated(1, UserRole::User);
        match service.save_project(ctx, named("  ab  ")).await {
            Err(AppError::InvalidFields(fields)) => assert!(fields.contains("name")),
            other => panic!("expected field errors, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_padded_name_is_checked_and_stored_trimmed() {
        let mut projects = MockProjectRepository::new();
        projects
            .expect_find_for_uniqueness()
            .with(eq("Storefront"), eq(None), eq(1))
            .returning(|_, _, _| Ok(vec![]));
        projects
            .expect_save()
            .withf(|_, draft| draft.name == "Storefront")
            .returning(|_, draft| Ok(project(4, draft.owner_id)));

        let service = manager(projects, MockBugRepository::new());
        let ctx = RequestContext::authenticated(1, UserRole::User);
        assert!(service.save_project(ctx, named("\tStorefront  ")).await.is_ok());
    }

    #[tokio::test]
    async fn test_end_before_start_is_rejected() {
        let mut projects = MockProjectRepository::new();
        projects
            .expect_find_for_uniqueness()
            .returning(|_, _, _| Ok(vec![]));
        projects.expect_save().never();

        let service = manager(projects, MockBugRepository::new());
        let input = ProjectInput {
            start_date: Some("2024-05-10".into()),
            end_date: Some("2024-05-01".into()),
            ..named("Storefront")
        };
        let ctx = RequestContext::authenticated(1, UserRole::User);
        match service.save_project(ctx, input).await {
            Err(AppError::InvalidFields(fields)) => assert!(fields.contains("end_date")),
            other => panic!("expected field errors, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_admin_edit_keeps_owner() {
        let mut projects = MockProjectRepository::new();
        projects
            .expect_find_by_id()
            .with(eq(5))
            .returning(|id| Ok(Some(project(id, 9))));
        projects
            .expect_find_for_uniqueness()
            .with(eq("Storefront"), eq(Some(5)), eq(9))
            .returning(|_, _, _| Ok(vec![]));
        projects
            .expect_save()
            .withf(|target, draft| *target == SaveTarget::Update(5) && draft.owner_id == 9)
            .returning(|_, draft| Ok(project(5, draft.owner_id)));

        let service = manager(projects, MockBugRepository::new());
        let input = ProjectInput {
            id: RecordKey::new("5"),
            ..named("Storefront")
        };
        let ctx = RequestContext::authenticated(1, UserRole::Admin);
        assert_eq!(service.save_project(ctx, input).await.unwrap().owner_id, 9);
    }

    #[tokio::test]
    async fn test_cascade_only_after_authorization() {
        let mut projects = MockProjectRepository::new();
        projects
            .expect_find_by_id()
            .returning(|id| Ok(Some(project(id, 9))));
        projects.expect_delete_cascade().never();

        let service = manager(projects, MockBugRepository::new());
        let ctx = RequestContext::authenticated(2, UserRole::User);
        let result = service.delete_project(ctx, 4).await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_owner_deletes_with_cascade() {
        let mut projects = MockProjectRepository::new();
        projects
            .expect_find_by_id()
            .returning(|id| Ok(Some(project(id, 2))));
        projects
            .expect_delete_cascade()
            .with(eq(4))
            .times(1)
            .returning(|_| Ok(()));

        let service = manager(projects, MockBugRepository::new());
        let ctx = RequestContext::authenticated(2, UserRole::User);
        assert!(service.delete_project(ctx, 4).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_unknown_project_is_not_found() {
        let mut projects = MockProjectRepository::new();
        projects.expect_find_by_id().returning(|_| Ok(None));
        projects.expect_delete_cascade().never();

        let service = manager(projects, MockBugRepository::new());
        let ctx = RequestContext::authenticated(1, UserRole::Admin);
        let result = service.delete_project(ctx, 4).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_stats_count_all_and_closed() {
        let mut projects = MockProjectRepository::new();
        projects
            .expect_find_by_id()
            .returning(|id| Ok(Some(project(id, 2))));

        let mut bugs = MockBugRepository::new();
        bugs.expect_count()
            .with(eq(OwnerScope::Unrestricted), eq(Some(4)), eq(None))
            .returning(|_, _, _| Ok(12));
        bugs.expect_count()
            .with(eq(OwnerScope::Unrestricted), eq(Some(4)), eq(Some(STATUS_CLOSED)))
            .returning(|_, _, _| Ok(5));

        let service = manager(projects, bugs);
        let ctx = RequestContext::authenticated(2, UserRole::User);
        let stats = service.project_stats(ctx, 4).await.unwrap();
        assert_eq!((stats.bugs_all, stats.bugs_done), (12, 5));
    }
}
