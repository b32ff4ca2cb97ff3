//! Tracker service configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use common::{DatabaseConfig, JwtConfig, PaginationConfig, ServiceConfig};
use domain::{PageSizes, MIN_JWT_SECRET_LENGTH};

/// Development-only fallback, rejected in release builds.
const INSECURE_DEV_SECRET: &str = "insecure-development-secret-change-me-now";

/// Tracker service configuration.
#[derive(Debug, Clone, Default)]
pub struct TrackerServiceConfig {
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub pagination: PaginationConfig,
}

impl TrackerServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let pagination = defaults.pagination;

        let config = Self {
            service: ServiceConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.service.host),
                port: parse_or("SERVER_PORT", defaults.service.port)?,
                log_level: env::var("RUST_LOG").unwrap_or(defaults.service.log_level),
                ..defaults.service
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
                max_connections: parse_or(
                    "DATABASE_MAX_CONNECTIONS",
                    defaults.database.max_connections,
                )?,
                min_connections: parse_or(
                    "DATABASE_MIN_CONNECTIONS",
                    defaults.database.min_connections,
                )?,
                connect_timeout_secs: parse_or(
                    "DATABASE_CONNECT_TIMEOUT_SECS",
                    defaults.database.connect_timeout_secs,
                )?,
                query_timeout_ms: parse_or("QUERY_TIMEOUT_MS", defaults.database.query_timeout_ms)?,
            },
            jwt: JwtConfig {
                secret: jwt_secret()?,
                expiration_hours: parse_or("JWT_EXPIRATION_HOURS", defaults.jwt.expiration_hours)?,
            },
            pagination: PaginationConfig {
                bugs: PageSizes {
                    user: parse_or("BUGS_PER_PAGE", pagination.bugs.user)?,
                    admin: parse_or("BUGS_PER_PAGE_ADMIN", pagination.bugs.admin)?,
                },
                projects: PageSizes {
                    user: parse_or("PROJECTS_PER_PAGE", pagination.projects.user)?,
                    admin: parse_or("PROJECTS_PER_PAGE_ADMIN", pagination.projects.admin)?,
                },
                users: parse_or("USERS_PER_PAGE", pagination.users)?,
                tags: parse_or("TAGS_PER_PAGE", pagination.tags)?,
                bookmarks: parse_or("BOOKMARKS_PER_PAGE", pagination.bookmarks)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.database.query_timeout_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.pagination;
        let sizes = [
            ("BUGS_PER_PAGE", p.bugs.user),
            ("BUGS_PER_PAGE_ADMIN", p.bugs.admin),
            ("PROJECTS_PER_PAGE", p.projects.user),
            ("PROJECTS_PER_PAGE_ADMIN", p.projects.admin),
            ("USERS_PER_PAGE", p.users),
            ("TAGS_PER_PAGE", p.tags),
            ("BOOKMARKS_PER_PAGE", p.bookmarks),
        ];
        if let Some((key, _)) = sizes.iter().find(|(_, size)| *size == 0) {
            return Err(ConfigError::Invalid(key.to_string(), "must be positive".into()));
        }
        if self.database.query_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "QUERY_TIMEOUT_MS".into(),
                "must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(String),
    #[error("{0} is invalid: {1}")]
    Invalid(String, String),
}

fn parse_or<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(key.to_string(), format!("'{}'", raw))),
        Err(_) => Ok(default),
    }
}

fn jwt_secret() -> Result<String, ConfigError> {
    match env::var("JWT_SECRET") {
        Ok(secret) if secret.len() >= MIN_JWT_SECRET_LENGTH => Ok(secret),
        Ok(_) => Err(ConfigError::Invalid(
            "JWT_SECRET".into(),
            format!("must be at least {} characters", MIN_JWT_SECRET_LENGTH),
        )),
        Err(_) if cfg!(debug_assertions) => {
            tracing::warn!("JWT_SECRET not set, using an insecure development secret");
            Ok(INSECURE_DEV_SECRET.to_string())
        }
        Err(_) => Err(ConfigError::Missing("JWT_SECRET".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_page_sizes() {
        let config = TrackerServiceConfig::default();
        assert_eq!(config.pagination.bugs.user, 10);
        assert_eq!(config.pagination.bugs.admin, 20);
        assert_eq!(config.pagination.tags, 3);
        assert_eq!(config.query_timeout(), Duration::from_millis(5000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let mut config = TrackerServiceConfig::default();
        config.pagination.users = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(key, _)) if key == "USERS_PER_PAGE"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = TrackerServiceConfig::default();
        config.jwt.secret = "super-secret-value-that-is-long-enough".into();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("password@localhost"));
    }
}
