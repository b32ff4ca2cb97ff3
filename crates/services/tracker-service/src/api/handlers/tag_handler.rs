//! Tag handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};

use common::AppResult;
use domain::{pagination::TagPage, ListParams, RequestContext, Tag, TagInput};

use crate::api::extractors::JsonBody;
use crate::api::state::AppState;

pub fn tag_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tags).post(save_tag))
        .route("/:id", get(get_tag).delete(delete_tag))
}

#[utoipa::path(
    get,
    path = "/tags",
    tag = "Tags",
    security(("bearer_auth" = [])),
    params(ListParams),
    responses(
        (status = 200, description = "One page of tags", body = TagPage),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_tags(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<TagPage>> {
    let page = state.services.tags().list_tags(ctx, params).await?;
    Ok(Json(page))
}

#[utoipa::path(
    post,
    path = "/tags",
    tag = "Tags",
    security(("bearer_auth" = [])),
    request_body = TagInput,
    responses(
        (status = 200, description = "Saved tag", body = Tag),
        (status = 400, description = "Invalid fields")
    )
)]
pub async fn save_tag(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<TagInput>,
) -> AppResult<Json<Tag>> {
    let tag = state.services.tags().save_tag(ctx, input).await?;
    Ok(Json(tag))
}

#[utoipa::path(
    get,
    path = "/tags/{id}",
    tag = "Tags",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Tag", body = Tag),
        (status = 404, description = "Tag not found")
    )
)]
pub async fn get_tag(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Tag>> {
    let tag = state.services.tags().get_tag(ctx, id).await?;
    Ok(Json(tag))
}

#[utoipa::path(
    delete,
    path = "/tags/{id}",
    tag = "Tags",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Tag ID")),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 404, description = "Tag not found")
    )
)]
pub async fn delete_tag(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.tags().delete_tag(ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
