//! User domain entity and related types.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::{ROLE_ADMIN, ROLE_ADMIN_ID, ROLE_USER, ROLE_USER_ID};
use crate::record::RecordKey;
use crate::validation::{trimmed, Normalize};

/// User roles, stored as seeded role ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum UserRole {
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
    #[serde(rename = "ROLE_USER")]
    User,
}

impl UserRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    pub fn id(&self) -> i32 {
        match self {
            UserRole::Admin => ROLE_ADMIN_ID,
            UserRole::User => ROLE_USER_ID,
        }
    }

    /// Unknown ids fall back to the least privileged role.
    pub fn from_id(id: i32) -> Self {
        match id {
            ROLE_ADMIN_ID => UserRole::Admin,
            _ => UserRole::User,
        }
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => UserRole::Admin,
            _ => UserRole::User,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "{}", ROLE_ADMIN),
            UserRole::User => write!(f, "{}", ROLE_USER),
        }
    }
}

/// User domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct User {
    pub id: i32,
    pub login: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: UserRole,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Submitted user record. Without an id this registers a new account;
/// with one it edits login, password or role of an existing account.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserInput {
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub id: RecordKey,
    #[validate(length(min = 4, max = 32, message = "Login must be between 4 and 32 characters"))]
    pub login: String,
    /// Plain password. Required on insert, optional on update.
    pub password: Option<String>,
    /// Role change (administrators only)
    pub role: Option<UserRole>,
}

impl Normalize for UserInput {
    fn normalized(self) -> Self {
        Self {
            login: trimmed(self.login),
            ..self
        }
    }
}

/// What the user repository persists.
#[derive(Debug, Clone, PartialEq)]
pub struct UserDraft {
    pub login: String,
    /// `None` keeps the stored hash on update.
    pub password_hash: Option<String>,
    pub role: UserRole,
}

/// Dashboard view of one account.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserProfile {
    pub user: User,
    pub projects: Vec<crate::Project>,
    pub bugs_all: u64,
    pub bugs_done: u64,
}
