//! Record identity for the single save entry point.
//!
//! A submitted record carries its id as raw input. Only a positive, all-digit
//! id selects an update; anything else (absent, empty, negative, non-numeric,
//! out of range) selects an insert.

use serde::{Deserialize, Deserializer};

/// Raw id as submitted by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordKey(Option<String>);

impl RecordKey {
    /// No id submitted.
    pub fn none() -> Self {
        Self(None)
    }

    pub fn new(raw: impl Into<String>) -> Self {
        Self(Some(raw.into()))
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Resolve the save dispatch for this key.
    pub fn target(&self) -> SaveTarget {
        SaveTarget::from_raw(self.as_str())
    }
}

impl From<i32> for RecordKey {
    fn from(id: i32) -> Self {
        Self(Some(id.to_string()))
    }
}

impl<'de> Deserialize<'de> for RecordKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Integer(i64),
            Float(f64),
        }

        Ok(match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::Text(s)) => RecordKey(Some(s)),
            Some(Raw::Integer(n)) => RecordKey(Some(n.to_string())),
            Some(Raw::Float(f)) => RecordKey(Some(f.to_string())),
            None => RecordKey(None),
        })
    }
}

/// Whether a save inserts a new row or updates an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTarget {
    Insert,
    Update(i32),
}

impl SaveTarget {
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
                match s.parse::<i32>() {
                    Ok(id) if id > 0 => SaveTarget::Update(id),
                    _ => SaveTarget::Insert,
                }
            }
            _ => SaveTarget::Insert,
        }
    }

    pub fn id(&self) -> Option<i32> {
        match self {
            SaveTarget::Insert => None,
            SaveTarget::Update(id) => Some(*id),
        }
    }

    pub fn is_insert(&self) -> bool {
        matches!(self, SaveTarget::Insert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_string_selects_update() {
        assert_eq!(SaveTarget::from_raw(Some("7")), SaveTarget::Update(7));
        assert_eq!(SaveTarget::from_raw(Some("0042")), SaveTarget::Update(42));
    }

    #[test]
    fn test_anything_else_selects_insert() {
        for raw in [None, Some(""), Some("0"), Some("-3"), Some("7a"), Some(" 7"), Some("1.5")] {
            assert_eq!(SaveTarget::from_raw(raw), SaveTarget::Insert, "{:?}", raw);
        }
        assert_eq!(SaveTarget::from_raw(Some("99999999999")), SaveTarget::Insert);
    }

    #[test]
    fn test_record_key_deserializes_strings_numbers_and_null() {
        #[derive(Deserialize)]
        struct Form {
            #[serde(default)]
            id: RecordKey,
        }

        let parse = |json: &str| serde_json::from_str::<Form>(json).unwrap().id.target();

        assert_eq!(parse(r#"{"id":"7"}"#), SaveTarget::Update(7));
        assert_eq!(parse(r#"{"id":7}"#), SaveTarget::Update(7));
        assert_eq!(parse(r#"{"id":null}"#), SaveTarget::Insert);
        assert_eq!(parse(r#"{}"#), SaveTarget::Insert);
        assert_eq!(parse(r#"{"id":"new"}"#), SaveTarget::Insert);
        assert_eq!(parse(r#"{"id":-1}"#), SaveTarget::Insert);
    }
}
