//! Project handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};

use common::AppResult;
use domain::{
    pagination::{BugPage, ProjectPage},
    ListParams, Project, ProjectInput, ProjectStats, RequestContext,
};

use crate::api::extractors::JsonBody;
use crate::api::state::AppState;

/// Create project routes
pub fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_projects).post(save_project))
        .route("/options", get(project_options))
        .route("/:id", get(get_project).delete(delete_project))
        .route("/:id/bugs", get(list_project_bugs))
        .route("/:id/stats", get(project_stats))
}

/// List projects visible to the caller
#[utoipa::path(
    get,
    path = "/projects",
    tag = "Projects",
    security(("bearer_auth" = [])),
    params(ListParams),
    responses(
        (status = 200, description = "One page of projects", body = ProjectPage),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_projects(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<ProjectPage>> {
    let page = state.services.projects().list_projects(ctx, params).await?;
    Ok(Json(page))
}

/// Insert or update a project; a numeric `id` selects the row to update
#[utoipa::path(
    post,
    path = "/projects",
    tag = "Projects",
    security(("bearer_auth" = [])),
    request_body = ProjectInput,
    responses(
        (status = 200, description = "Saved project", body = Project),
        (status = 400, description = "Invalid fields"),
        (status = 403, description = "Forbidden - not the owner"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn save_project(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<ProjectInput>,
) -> AppResult<Json<Project>> {
    let project = state.services.projects().save_project(ctx, input).await?;
    Ok(Json(project))
}

/// Projects the caller may file bugs into, by name
#[utoipa::path(
    get,
    path = "/projects/options",
    tag = "Projects",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Project choices", body = Vec<Project>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn project_options(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Project>>> {
    let options = state.services.projects().project_options(ctx).await?;
    Ok(Json(options))
}

/// Get project by ID
#[utoipa::path(
    get,
    path = "/projects/{id}",
    tag = "Projects",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project", body = Project),
        (status = 403, description = "Forbidden - not the owner"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn get_project(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Project>> {
    let project = state.services.projects().get_project(ctx, id).await?;
    Ok(Json(project))
}

/// Delete a project together with its bugs
#[utoipa::path(
    delete,
    path = "/projects/{id}",
    tag = "Projects",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 204, description = "Project and its bugs deleted"),
        (status = 403, description = "Forbidden - not the owner"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn delete_project(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.projects().delete_project(ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Bugs of one project
#[utoipa::path(
    get,
    path = "/projects/{id}/bugs",
    tag = "Projects",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Project ID"), ListParams),
    responses(
        (status = 200, description = "One page of the project's bugs", body = BugPage),
        (status = 403, description = "Forbidden - not the owner"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn list_project_bugs(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<BugPage>> {
    let page = state
        .services
        .bugs()
        .list_project_bugs(ctx, id, params)
        .await?;
    Ok(Json(page))
}

/// Project with its bug counters
#[utoipa::path(
    get,
    path = "/projects/{id}/stats",
    tag = "Projects",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project statistics", body = ProjectStats),
        (status = 403, description = "Forbidden - not the owner"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn project_stats(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ProjectStats>> {
    let stats = state.services.projects().project_stats(ctx, id).await?;
    Ok(Json(stats))
}
