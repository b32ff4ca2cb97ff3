//! Bug handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use common::AppResult;
use domain::{pagination::BugPage, Bug, BugInput, ListParams, RequestContext};

use crate::api::extractors::JsonBody;
use crate::api::state::AppState;

/// Raw counter filters; unparsable values are ignored.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CountParams {
    /// Restrict to one project
    pub project: Option<String>,
    /// `true` or `1` counts closed bugs only
    pub done: Option<String>,
}

impl CountParams {
    fn project_id(&self) -> Option<i32> {
        self.project.as_deref().and_then(|p| p.trim().parse().ok())
    }

    fn done_only(&self) -> bool {
        matches!(self.done.as_deref(), Some("true") | Some("1"))
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CountResponse {
    pub count: u64,
}

/// Create bug routes
pub fn bug_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bugs).post(save_bug))
        .route("/count", get(count_bugs))
        .route("/:id", get(get_bug).delete(delete_bug))
        .route("/:id/status", post(change_bug_status))
}

/// List bugs visible to the caller
#[utoipa::path(
    get,
    path = "/bugs",
    tag = "Bugs",
    security(("bearer_auth" = [])),
    params(ListParams),
    responses(
        (status = 200, description = "One page of bugs", body = BugPage),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_bugs(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<BugPage>> {
    let page = state.services.bugs().list_bugs(ctx, params).await?;
    Ok(Json(page))
}

/// Insert or update a bug; a numeric `id` selects the row to update
#[utoipa::path(
    post,
    path = "/bugs",
    tag = "Bugs",
    security(("bearer_auth" = [])),
    request_body = BugInput,
    responses(
        (status = 200, description = "Saved bug", body = Bug),
        (status = 400, description = "Invalid fields"),
        (status = 403, description = "Forbidden - not the owner"),
        (status = 404, description = "Bug not found")
    )
)]
pub async fn save_bug(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<BugInput>,
) -> AppResult<Json<Bug>> {
    let bug = state.services.bugs().save_bug(ctx, input).await?;
    Ok(Json(bug))
}

/// Count bugs in the caller's scope
#[utoipa::path(
    get,
    path = "/bugs/count",
    tag = "Bugs",
    security(("bearer_auth" = [])),
    params(CountParams),
    responses(
        (status = 200, description = "Bug count", body = CountResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn count_bugs(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
    Query(params): Query<CountParams>,
) -> AppResult<Json<CountResponse>> {
    let count = state
        .services
        .bugs()
        .count_bugs(ctx, params.project_id(), params.done_only())
        .await?;
    Ok(Json(CountResponse { count }))
}

/// Get bug by ID
#[utoipa::path(
    get,
    path = "/bugs/{id}",
    tag = "Bugs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Bug ID")),
    responses(
        (status = 200, description = "Bug", body = Bug),
        (status = 403, description = "Forbidden - not the owner"),
        (status = 404, description = "Bug not found")
    )
)]
pub async fn get_bug(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Bug>> {
    let bug = state.services.bugs().get_bug(ctx, id).await?;
    Ok(Json(bug))
}

/// Delete bug
#[utoipa::path(
    delete,
    path = "/bugs/{id}",
    tag = "Bugs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Bug ID")),
    responses(
        (status = 204, description = "Bug deleted"),
        (status = 403, description = "Forbidden - not the owner"),
        (status = 404, description = "Bug not found")
    )
)]
pub async fn delete_bug(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.bugs().delete_bug(ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Toggle a bug between open and closed
#[utoipa::path(
    post,
    path = "/bugs/{id}/status",
    tag = "Bugs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Bug ID")),
    responses(
        (status = 200, description = "Bug with its new status", body = Bug),
        (status = 403, description = "Forbidden - not the owner"),
        (status = 404, description = "Bug not found")
    )
)]
pub async fn change_bug_status(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Bug>> {
    let bug = state.services.bugs().change_bug_status(ctx, id).await?;
    Ok(Json(bug))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_params_ignore_garbage() {
        let params = CountParams {
            project: Some("abc".into()),
            done: Some("yes".into()),
        };
        assert_eq!(params.project_id(), None);
        assert!(!params.done_only());

        let params = CountParams {
            project: Some(" 12 ".into()),
            done: Some("1".into()),
        };
        assert_eq!(params.project_id(), Some(12));
        assert!(params.done_only());
    }
}
