//! Project entity and its save input.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::ZERO_DATES;
use crate::error::FieldErrors;
use crate::query::UserId;
use crate::record::RecordKey;
use crate::validation::{not_blank, trimmed, Normalize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub owner_id: UserId,
}

/// Submitted project record.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ProjectInput {
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
    /// `YYYY-MM-DD`; empty or zero dates mean no date
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// What the project repository persists.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDraft {
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub owner_id: UserId,
}

/// Bug counts shown alongside a project.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ProjectStats {
    pub project: Project,
    pub bugs_all: u64,
    pub bugs_done: u64,
}

impl Normalize for ProjectInput {
    fn normalized(self) -> Self {
        Self {
            name: trimmed(self.name),
            ..self
        }
    }
}

impl ProjectInput {
    /// Parse both dates, normalizing placeholders to `None`. An end date
    /// before the start date is rejected.
    pub fn dates(&self) -> Result<(Option<NaiveDate>, Option<NaiveDate>), FieldErrors> {
        let mut errors = FieldErrors::new();
        let start = parse_optional_date(self.start_date.as_deref())
            .map_err(|e| errors.add("start_date", e))
            .ok()
            .flatten();
        let end = parse_optional_date(self.end_date.as_deref())
            .map_err(|e| errors.add("end_date", e))
            .ok()
            .flatten();

        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                errors.add("end_date", "End date must not be before start date");
            }
        }

        if errors.is_empty() {
            Ok((start, end))
        } else {
            Err(errors)
        }
    }
}

/// `None`, empty and zero-date placeholders all mean "no date".
pub fn parse_optional_date(raw: Option<&str>) -> Result<Option<NaiveDate>, String> {
    let Some(raw) = raw.map(str::trim) else {
        return Ok(None);
    };
    if ZERO_DATES.contains(&raw) {
        return Ok(None);
    }

    let date_part = raw.split_whitespace().next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("'{}' is not a valid date", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_NAME_LENGTH;

    fn input(name: &str) -> ProjectInput {
        ProjectInput {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_zero_dates_normalize_to_none() {
        assert_eq!(parse_optional_date(Some("0000-00-00")), Ok(None));
        assert_eq!(parse_optional_date(Some("0000-00-00 00:00:00")), Ok(None));
        assert_eq!(parse_optional_date(Some("")), Ok(None));
        assert_eq!(parse_optional_date(None), Ok(None));
        assert_eq!(
            parse_optional_date(Some("2024-03-01")),
            Ok(NaiveDate::from_ymd_opt(2024, 3, 1))
        );
        assert!(parse_optional_date(Some("yesterday")).is_err());
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let project = ProjectInput {
            start_date: Some("2024-03-10".into()),
            end_date: Some("2024-03-01".into()),
            ..input("Tracker")
        };
        let errors = project.dates().unwrap_err();
        assert!(errors.contains("end_date"));
    }

    #[test]
    fn test_name_rules() {
        assert!(input("Tracker").validate().is_ok());
        assert!(input("ab").validate().is_err());
        assert!(input("   ").validate().is_err());
        assert!(input(&"n".repeat(MAX_NAME_LENGTH as usize + 1)).validate().is_err());
    }

    #[test]
    fn test_name_length_counts_trimmed_value() {
        let padded = input("  ab  ").normalized();
        assert_eq!(padded.name, "ab");
        assert!(padded.validate().is_err());

        let longest = format!("  {}  ", "n".repeat(MAX_NAME_LENGTH as usize));
        let normalized = input(&longest).normalized();
        assert_eq!(normalized.name.len(), MAX_NAME_LENGTH as usize);
        assert!(normalized.validate().is_ok());
    }
}
