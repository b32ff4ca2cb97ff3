//! Shared field validators.

use validator::{Validate, ValidationError};

use crate::error::{DomainResult, FieldErrors};

/// Rejects empty and whitespace-only values.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("not_blank");
        err.message = Some("This value should not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Submitted records whose free-text keys are trimmed before they are
/// validated and stored. Length rules apply to the trimmed value.
pub trait Normalize: Sized {
    fn normalized(self) -> Self;
}

/// Trimmed copy, reusing the allocation when nothing is trimmed.
pub(crate) fn trimmed(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}

/// Run derived validation, collecting failures per field.
pub fn validate_fields<T: Validate>(input: &T) -> FieldErrors {
    match input.validate() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => FieldErrors::from(errors),
    }
}

/// Derived validation as a result.
pub fn validate_input<T: Validate>(input: &T) -> DomainResult<()> {
    validate_fields(input).into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trimmed_strips_both_ends() {
        assert_eq!(trimmed("  ab \t".to_string()), "ab");
        assert_eq!(trimmed("ab".to_string()), "ab");
        assert_eq!(trimmed("   ".to_string()), "");
    }
}
