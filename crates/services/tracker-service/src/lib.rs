//! Tracker Service Library
//!
//! Multi-tenant bug tracker: projects owned by users, bugs filed into
//! projects, per-owner visibility with an administrator override. Served
//! as a JSON API over sea-orm repositories.

pub mod api;
pub mod config;
pub mod infra;
pub mod repository;
pub mod service;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use common::{AppError, AppResult};
use domain::{validate_input, Password, SaveTarget, User, UserDraft, UserInput, UserRole};

use crate::api::{create_router, AppState};
use crate::config::TrackerServiceConfig;
use crate::infra::Database;
use crate::repository::{UserRepository, UserStore};
use crate::service::Services;

/// Run the HTTP server, overriding the configured bind address.
pub async fn run_server(host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = TrackerServiceConfig::from_env()?;
    config.service.host = host.to_string();
    config.service.port = port;
    run_server_with_config(config).await
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = TrackerServiceConfig::from_env()?;
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Bootstrap an administrator account (for CLI commands).
pub async fn create_admin(login: &str, password: &str) -> Result<User, Box<dyn std::error::Error>> {
    let config = TrackerServiceConfig::from_env()?;
    let db = Database::connect(&config.database).await?;
    let users = UserStore::new(db.get_connection(), config.query_timeout());

    let user = insert_admin(&users, login, password).await?;
    info!(user_id = user.id, login = %user.login, "Administrator created");
    Ok(user)
}

async fn insert_admin(users: &dyn UserRepository, login: &str, password: &str) -> AppResult<User> {
    let login = login.trim();
    validate_input(&UserInput {
        login: login.to_string(),
        ..Default::default()
    })?;

    if !users.find_for_uniqueness(login, None).await?.is_empty() {
        return Err(AppError::conflict(format!("Login '{}'", login)));
    }

    let hash = Password::new(password)?;
    users
        .save(
            SaveTarget::Insert,
            UserDraft {
                login: login.to_string(),
                password_hash: Some(hash.into_string()),
                role: UserRole::Admin,
            },
        )
        .await
}

/// Run the HTTP server with the given configuration.
async fn run_server_with_config(
    config: TrackerServiceConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize database
    let db = Database::connect(&config.database).await?;

    // Build services and app state
    let services = Services::from_connection(db.get_connection(), &config);
    let state = AppState::new(Arc::new(services), db);

    let app = create_router(state);

    // Build address
    let addr: SocketAddr = format!("{}:{}", config.service.host, config.service.port).parse()?;
    info!("Tracker service listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
