//! User handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};

use common::AppResult;
use domain::{pagination::UserPage, ListParams, RequestContext, User, UserInput, UserProfile};

use crate::api::extractors::JsonBody;
use crate::api::state::AppState;

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(save_user))
        .route("/me", get(get_profile))
        .route("/:id", get(get_user).delete(delete_user))
}

/// List all users (admin only)
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(ListParams),
    responses(
        (status = 200, description = "One page of users", body = UserPage),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn list_users(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<UserPage>> {
    let page = state.services.users().list_users(ctx, params).await?;
    Ok(Json(page))
}

/// Create (admin only) or edit an account
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = UserInput,
    responses(
        (status = 200, description = "Saved user", body = User),
        (status = 400, description = "Invalid fields"),
        (status = 403, description = "Forbidden - Can only edit own account unless admin"),
        (status = 404, description = "User not found")
    )
)]
pub async fn save_user(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<UserInput>,
) -> AppResult<Json<User>> {
    let user = state.services.users().save_user(ctx, input).await?;
    Ok(Json(user))
}

/// Dashboard of the current user
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserProfile),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_profile(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
) -> AppResult<Json<UserProfile>> {
    let profile = state.services.users().get_profile(ctx).await?;
    Ok(Json(profile))
}

/// Get user by ID (own account or admin)
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 403, description = "Forbidden - Can only view own account unless admin"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<User>> {
    let user = state.services.users().get_user(ctx, id).await?;
    Ok(Json(user))
}

/// Delete a user with their projects and bugs (admin only)
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.users().delete_user(ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
