//! Route configuration.

use axum::{middleware, Router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    auth_routes, bookmark_routes, bug_routes, health_routes, lookup_routes, project_routes,
    tag_routes, user_routes,
};
use super::middleware::context_middleware;
use super::openapi::ApiDoc;
use super::state::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/auth", auth_routes())
        .nest("/bugs", bug_routes())
        .nest("/projects", project_routes())
        .nest("/users", user_routes())
        .nest("/tags", tag_routes())
        .nest("/bookmarks", bookmark_routes())
        .nest("/lookups", lookup_routes())
        // Every API request carries a RequestContext, anonymous included
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            context_middleware,
        ));

    Router::new()
        .nest("/health", health_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
