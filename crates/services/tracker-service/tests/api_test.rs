//! Integration tests for API endpoints.
//!
//! The router runs over the real service container; storage is a mocked
//! connection queued with the rows each request reads.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};
use serde_json::{json, Value as Json};
use tower::ServiceExt;

use domain::{User, UserRole};
use tracker_service_lib::api::{create_router, AppState};
use tracker_service_lib::config::TrackerServiceConfig;
use tracker_service_lib::infra::Database;
use tracker_service_lib::repository::entities::{bug, user};
use tracker_service_lib::service::{ServiceContainer, Services};

// =============================================================================
// Helpers
// =============================================================================

fn test_config() -> TrackerServiceConfig {
    let mut config = TrackerServiceConfig::default();
    config.jwt.secret = "test-secret-key-for-testing-only-32chars".to_string();
    config
}

struct TestApp {
    router: Router,
    services: Services,
}

impl TestApp {
    fn new(connection: DatabaseConnection) -> Self {
        let db = Database::from_connection(connection);
        let services = Services::from_connection(db.get_connection(), &test_config());
        let state = AppState::new(Arc::new(services.clone()), db);
        Self {
            router: create_router(state),
            services,
        }
    }

    fn without_storage() -> Self {
        Self::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn token_for(&self, id: i32, role: UserRole) -> String {
        let user = User {
            id,
            login: format!("user{}", id),
            password_hash: String::new(),
            role,
        };
        self.services
            .auth()
            .issue_token(&user)
            .expect("token")
            .access_token
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Json) {
        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = if bytes.is_empty() {
            Json::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, body)
    }
}

fn account(id: i32, role: UserRole) -> user::Model {
    user::Model {
        id,
        login: format!("user{}", id),
        password_hash: String::new(),
        role_id: role.id(),
    }
}

/// Storage with the token holder's account queued for the context lookup.
fn signed_in(id: i32, role: UserRole) -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![account(id, role)]])
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).expect("request")
}

fn post_json(uri: &str, token: &str, body: String) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .expect("request")
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_anonymous_bug_listing_is_unauthorized() {
    let app = TestApp::without_storage();
    let (status, body) = app.send(get("/bugs", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_tampered_token_is_unauthorized() {
    let app = TestApp::without_storage();
    let (status, body) = app.send(get("/bugs", Some("not-a-jwt"))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_ERROR");
}

#[tokio::test]
async fn test_non_bearer_scheme_is_unauthorized() {
    let app = TestApp::without_storage();
    let request = Request::builder()
        .uri("/projects")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .expect("request");

    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_of_deleted_account_is_unauthorized() {
    let connection = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();
    let app = TestApp::new(connection);
    let token = app.token_for(7, UserRole::User);

    let (status, body) = app.send(get("/bugs", Some(&token))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_demoted_admin_token_loses_admin_rights() {
    let app = TestApp::new(signed_in(1, UserRole::User).into_connection());
    // Signed while the account was still an admin
    let token = app.token_for(1, UserRole::Admin);

    let (status, body) = app
        .send(post_json(
            "/lookups/priorities",
            &token,
            json!({ "name": "Urgent" }).to_string(),
        ))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

// =============================================================================
// Bugs
// =============================================================================

#[tokio::test]
async fn test_invalid_page_falls_back_to_first_page() {
    let count = BTreeMap::from([("total_results", Value::BigInt(Some(0)))]);
    let connection = signed_in(7, UserRole::User)
        .append_query_results([vec![count]])
        .append_query_results([Vec::<bug::Model>::new()])
        .into_connection();
    let app = TestApp::new(connection);
    let token = app.token_for(7, UserRole::User);

    let (status, body) = app
        .send(get("/bugs?page=abc&sort=bogus&priority=whatever", Some(&token)))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["total_pages"], 1);
    assert_eq!(body["page_size"], 10);
    assert_eq!(body["rows"], json!([]));
}

#[tokio::test]
async fn test_blank_bug_name_reports_field_errors() {
    let app = TestApp::new(signed_in(7, UserRole::User).into_connection());
    let token = app.token_for(7, UserRole::User);
    let payload = json!({
        "name": "  ",
        "type_id": 1,
        "priority_id": 1,
        "project_id": 1
    });

    let (status, body) = app
        .send(post_json("/bugs", &token, payload.to_string()))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_FIELDS");
    assert!(body["error"]["fields"]["name"].is_array());
}

#[tokio::test]
async fn test_malformed_json_is_a_bad_request() {
    let app = TestApp::new(signed_in(7, UserRole::User).into_connection());
    let token = app.token_for(7, UserRole::User);

    let (status, body) = app
        .send(post_json("/projects", &token, "{\"name\":".to_string()))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

// =============================================================================
// Lookups
// =============================================================================

#[tokio::test]
async fn test_unknown_lookup_table_is_not_found() {
    let app = TestApp::new(signed_in(1, UserRole::Admin).into_connection());
    let token = app.token_for(1, UserRole::Admin);

    let (status, _) = app.send(get("/lookups/widgets", Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_roles_cannot_be_written() {
    let app = TestApp::new(signed_in(1, UserRole::Admin).into_connection());
    let token = app.token_for(1, UserRole::Admin);

    let (status, body) = app
        .send(post_json(
            "/lookups/roles",
            &token,
            json!({ "name": "ROLE_AUDITOR" }).to_string(),
        ))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_pings_database() {
    let connection = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();
    let app = TestApp::new(connection);

    let (status, body) = app.send(get("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"]["status"], "healthy");
}
