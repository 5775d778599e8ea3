//! Reference table types.

use serde::Deserialize;
use std::collections::HashMap;

/// Country code (e.g. "US") to country name (e.g. "United States").
pub type CountryNameIndex = HashMap<String, String>;

/// One row of the democracy index table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DemocracyRecord {
    /// Country name, matched exactly against the country name index.
    #[serde(default)]
    pub country: String,

    /// Democracy score as published; usually a numeric string.
    #[serde(rename = "democracyCountries_score2024", default)]
    pub score: serde_json::Value,

    /// Regime category (e.g. "Full democracy").
    #[serde(rename = "democracyCountries_category", default)]
    pub category: serde_json::Value,
}

impl DemocracyRecord {
    /// Build a record with a string score, as the published table stores them.
    pub fn new(country: impl Into<String>, score: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            score: serde_json::Value::String(score.into()),
            category: serde_json::Value::String(category.into()),
        }
    }

    /// Category as display text. Non-string values use their JSON form.
    pub fn category_text(&self) -> String {
        match &self.category {
            serde_json::Value::Null => String::new(),
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// The two tables, fully loaded.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub countries: CountryNameIndex,
    pub democracies: Vec<DemocracyRecord>,
}

impl ReferenceData {
    /// Country name for a code, if known.
    pub fn country_name(&self, code: &str) -> Option<&str> {
        self.countries.get(code).map(String::as_str)
    }

    /// First democracy record whose country name matches exactly.
    pub fn democracy(&self, country_name: &str) -> Option<&DemocracyRecord> {
        self.democracies.iter().find(|r| r.country == country_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_field_names() {
        let json = r#"{
            "country": "Norway",
            "democracyCountries_score2024": "9.81",
            "democracyCountries_category": "Full democracy",
            "flagCode": "NO"
        }"#;
        let record: DemocracyRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record, DemocracyRecord::new("Norway", "9.81", "Full democracy"));
    }

    #[test]
    fn test_category_text() {
        let mut record = DemocracyRecord::new("X", "1", "Authoritarian");
        assert_eq!(record.category_text(), "Authoritarian");
        record.category = serde_json::Value::Null;
        assert_eq!(record.category_text(), "");
        record.category = serde_json::json!(3);
        assert_eq!(record.category_text(), "3");
    }

    #[test]
    fn test_first_match_wins() {
        let data = ReferenceData {
            countries: CountryNameIndex::new(),
            democracies: vec![
                DemocracyRecord::new("Atlantis", "9.00", "first"),
                DemocracyRecord::new("Atlantis", "1.00", "second"),
            ],
        };
        assert_eq!(data.democracy("Atlantis").unwrap().category_text(), "first");
        assert!(data.democracy("atlantis").is_none());
    }
}
