//! Bookmark handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};

use common::AppResult;
use domain::{pagination::BookmarkPage, Bookmark, BookmarkInput, ListParams, RequestContext};

use crate::api::extractors::JsonBody;
use crate::api::state::AppState;

pub fn bookmark_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bookmarks).post(save_bookmark))
        .route("/:id", get(get_bookmark).delete(delete_bookmark))
}

/// Bookmarks, alphabetically by title
#[utoipa::path(
    get,
    path = "/bookmarks",
    tag = "Bookmarks",
    security(("bearer_auth" = [])),
    params(ListParams),
    responses(
        (status = 200, description = "One page of bookmarks", body = BookmarkPage),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_bookmarks(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<BookmarkPage>> {
    let page = state.services.bookmarks().list_bookmarks(ctx, params).await?;
    Ok(Json(page))
}

#[utoipa::path(
    post,
    path = "/bookmarks",
    tag = "Bookmarks",
    security(("bearer_auth" = [])),
    request_body = BookmarkInput,
    responses(
        (status = 200, description = "Saved bookmark", body = Bookmark),
        (status = 400, description = "Invalid fields"),
        (status = 404, description = "Bookmark not found")
    )
)]
pub async fn save_bookmark(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<BookmarkInput>,
) -> AppResult<Json<Bookmark>> {
    let bookmark = state.services.bookmarks().save_bookmark(ctx, input).await?;
    Ok(Json(bookmark))
}

#[utoipa::path(
    get,
    path = "/bookmarks/{id}",
    tag = "Bookmarks",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Bookmark ID")),
    responses(
        (status = 200, description = "Bookmark", body = Bookmark),
        (status = 404, description = "Bookmark not found")
    )
)]
pub async fn get_bookmark(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Bookmark>> {
    let bookmark = state.services.bookmarks().get_bookmark(ctx, id).await?;
    Ok(Json(bookmark))
}

#[utoipa::path(
    delete,
    path = "/bookmarks/{id}",
    tag = "Bookmarks",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Bookmark ID")),
    responses(
        (status = 204, description = "Bookmark deleted"),
        (status = 404, description = "Bookmark not found")
    )
)]
pub async fn delete_bookmark(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.bookmarks().delete_bookmark(ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
