//! Request context middleware.
//!
//! Every request leaves here with a `RequestContext` extension: anonymous
//! without an `Authorization` header, the token holder otherwise. The
//! holder's role is read from storage, not from the token. A header that is
//! present but not a valid bearer token is rejected.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use common::{AppError, AppResult};
use domain::{RequestContext, BEARER_TOKEN_PREFIX};

use crate::api::state::AppState;

pub async fn context_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let ctx = match bearer_token(&request)? {
        Some(token) => {
            let auth = state.services.auth();
            let claims = auth.verify_token(token)?;
            auth.resolve_context(&claims).await?
        }
        None => RequestContext::anonymous(),
    };
    debug!(caller = ?ctx.caller_id(), admin = ctx.is_admin(), "Request context resolved");

    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

/// `None` without a header; `Unauthorized` for anything but `Bearer <token>`.
fn bearer_token(request: &Request<Body>) -> AppResult<Option<&str>> {
    let Some(header) = request.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };

    header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix(BEARER_TOKEN_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(Some)
        .ok_or(AppError::Unauthorized)
}
