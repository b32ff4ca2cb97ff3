//! Lookup table handlers (`types`, `priorities`, `statuses`, `roles`).

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get},
    Router,
};

use common::AppResult;
use domain::{Lookup, LookupInput, LookupKind, RequestContext};

use crate::api::extractors::ValidatedJson;
use crate::api::state::AppState;

pub fn lookup_routes() -> Router<AppState> {
    Router::new()
        .route("/:kind", get(list_lookups).post(save_lookup))
        .route("/:kind/:id", delete(delete_lookup))
}

#[utoipa::path(
    get,
    path = "/lookups/{kind}",
    tag = "Lookups",
    security(("bearer_auth" = [])),
    params(("kind" = String, Path, description = "types, priorities, statuses or roles")),
    responses(
        (status = 200, description = "Every row of the table, by id", body = Vec<Lookup>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Unknown lookup table")
    )
)]
pub async fn list_lookups(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> AppResult<Json<Vec<Lookup>>> {
    let kind: LookupKind = kind.parse()?;
    let rows = state.services.lookups().list_lookups(ctx, kind).await?;
    Ok(Json(rows))
}

/// Insert or rename a lookup row (admin only, roles are read-only)
#[utoipa::path(
    post,
    path = "/lookups/{kind}",
    tag = "Lookups",
    security(("bearer_auth" = [])),
    params(("kind" = String, Path, description = "types, priorities or statuses")),
    request_body = LookupInput,
    responses(
        (status = 200, description = "Saved row", body = Lookup),
        (status = 400, description = "Invalid fields"),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn save_lookup(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
    Path(kind): Path<String>,
    ValidatedJson(input): ValidatedJson<LookupInput>,
) -> AppResult<Json<Lookup>> {
    let kind: LookupKind = kind.parse()?;
    let row = state.services.lookups().save_lookup(ctx, kind, input).await?;
    Ok(Json(row))
}

#[utoipa::path(
    delete,
    path = "/lookups/{kind}/{id}",
    tag = "Lookups",
    security(("bearer_auth" = [])),
    params(
        ("kind" = String, Path, description = "types, priorities or statuses"),
        ("id" = i32, Path, description = "Row ID")
    ),
    responses(
        (status = 204, description = "Row deleted"),
        (status = 400, description = "Row still referenced by bugs"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Row not found")
    )
)]
pub async fn delete_lookup(
    Extension(ctx): Extension<RequestContext>,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, i32)>,
) -> AppResult<StatusCode> {
    let kind: LookupKind = kind.parse()?;
    state.services.lookups().delete_lookup(ctx, kind, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
