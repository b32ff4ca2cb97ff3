//! Authentication handlers.

use axum::{extract::State, http::StatusCode, response::Json, routing::post, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use common::AppResult;
use domain::{Normalize, User, UserInput};

use crate::api::extractors::{JsonBody, ValidatedJson};
use crate::api::state::AppState;
use crate::service::TokenResponse;

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Login is required"))]
    #[schema(example = "alice")]
    pub login: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "secret123")]
    pub password: String,
}

impl Normalize for LoginRequest {
    fn normalized(self) -> Self {
        Self {
            login: self.login.trim().to_string(),
            ..self
        }
    }
}

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Register a regular account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Authentication",
    request_body = UserInput,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid fields")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<UserInput>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.services.auth().register(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Exchange credentials for a token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state
        .services
        .auth()
        .login(payload.login, payload.password)
        .await?;
    Ok(Json(token))
}
