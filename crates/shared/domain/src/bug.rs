//! Bug entity, its save input and status rules.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::{STATUS_CLOSED, STATUS_OPEN};
use crate::query::UserId;
use crate::record::RecordKey;
use crate::validation::{not_blank, trimmed, Normalize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Bug {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub reproduction: Option<String>,
    pub expected_result: Option<String>,
    pub start_date: Option<NaiveDate>,
    /// Set while the bug is closed
    pub end_date: Option<NaiveDate>,
    pub type_id: i32,
    pub priority_id: i32,
    pub status_id: i32,
    pub project_id: i32,
    pub owner_id: UserId,
}

impl Bug {
    pub fn is_closed(&self) -> bool {
        self.status_id == STATUS_CLOSED
    }

    /// Draft that reproduces this row as stored.
    pub fn to_draft(&self) -> BugDraft {
        BugDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            reproduction: self.reproduction.clone(),
            expected_result: self.expected_result.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            type_id: self.type_id,
            priority_id: self.priority_id,
            status_id: self.status_id,
            project_id: self.project_id,
            owner_id: self.owner_id,
        }
    }
}

/// Submitted bug record.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BugInput {
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub id: RecordKey,
    #[validate(
        custom(function = "not_blank"),
        length(min = 3, max = 45, message = "Name must be between 3 and 45 characters")
    )]
    pub name: String,
    #[validate(length(max = 1024, message = "Description must be at most 1024 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 1024, message = "Reproduction must be at most 1024 characters"))]
    pub reproduction: Option<String>,
    #[validate(length(max = 1024, message = "Expected result must be at most 1024 characters"))]
    pub expected_result: Option<String>,
    pub type_id: i32,
    pub priority_id: i32,
    /// Defaults to open on insert, unchanged on update
    pub status_id: Option<i32>,
    pub project_id: i32,
}

impl Normalize for BugInput {
    fn normalized(self) -> Self {
        Self {
            name: trimmed(self.name),
            ..self
        }
    }
}

/// What the bug repository persists.
#[derive(Debug, Clone, PartialEq)]
pub struct BugDraft {
    pub name: String,
    pub description: Option<String>,
    pub reproduction: Option<String>,
    pub expected_result: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub type_id: i32,
    pub priority_id: i32,
    pub status_id: i32,
    pub project_id: i32,
    pub owner_id: UserId,
}

/// Open becomes closed; anything else becomes open.
pub fn toggle_status(status_id: i32) -> i32 {
    if status_id == STATUS_OPEN {
        STATUS_CLOSED
    } else {
        STATUS_OPEN
    }
}

/// End date after a save. Entering closed stamps `today`, staying closed
/// keeps the stored date, any other status clears it.
pub fn resolve_end_date(
    previous: Option<(i32, Option<NaiveDate>)>,
    new_status: i32,
    today: NaiveDate,
) -> Option<NaiveDate> {
    if new_status != STATUS_CLOSED {
        return None;
    }
    match previous {
        Some((STATUS_CLOSED, Some(stamped))) => Some(stamped),
        _ => Some(today),
    }
}
