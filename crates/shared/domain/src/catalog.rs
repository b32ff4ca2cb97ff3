//! Tags, bookmarks and the admin-managed lookup tables.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::DomainError;
use crate::record::RecordKey;
use crate::validation::{not_blank, trimmed, Normalize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Tag {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TagInput {
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub id: RecordKey,
    #[validate(
        custom(function = "not_blank"),
        length(max = 45, message = "Name must be at most 45 characters")
    )]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Bookmark {
    pub id: i32,
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookmarkInput {
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub id: RecordKey,
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Title must be at most 255 characters")
    )]
    pub title: String,
    #[validate(url(message = "Not a valid URL"))]
    pub url: String,
}

impl Normalize for TagInput {
    fn normalized(self) -> Self {
        Self {
            name: trimmed(self.name),
            ..self
        }
    }
}

impl Normalize for BookmarkInput {
    fn normalized(self) -> Self {
        Self {
            title: trimmed(self.title),
            url: trimmed(self.url),
            ..self
        }
    }
}

/// Which lookup table a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum LookupKind {
    Type,
    Priority,
    Status,
    Role,
}

impl LookupKind {
    pub fn table(&self) -> &'static str {
        match self {
            LookupKind::Type => "types",
            LookupKind::Priority => "priorities",
            LookupKind::Status => "statuses",
            LookupKind::Role => "roles",
        }
    }

    /// Roles are seeded and never edited.
    pub fn is_editable(&self) -> bool {
        !matches!(self, LookupKind::Role)
    }
}

impl FromStr for LookupKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "type" | "types" => Ok(LookupKind::Type),
            "priority" | "priorities" => Ok(LookupKind::Priority),
            "status" | "statuses" => Ok(LookupKind::Status),
            "role" | "roles" => Ok(LookupKind::Role),
            other => Err(DomainError::not_found(format!("lookup '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Lookup {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LookupInput {
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub id: RecordKey,
    #[validate(
        custom(function = "not_blank"),
        length(max = 45, message = "Name must be at most 45 characters")
    )]
    pub name: String,
}

impl Normalize for LookupInput {
    fn normalized(self) -> Self {
        Self {
            name: trimmed(self.name),
            ..self
        }
    }
}
