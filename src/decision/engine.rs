//! Country code to verdict.

use std::fmt;
use thiserror::Error;

use crate::data::ReferenceData;

/// Minimum democracy index score that counts as a democracy.
pub const DEMOCRACY_THRESHOLD: f64 = 8.01;

/// The answer to "do I live in a democracy?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Yes,
    No,
    /// No country code, unknown code, or no democracy record.
    Unknown,
}

impl Verdict {
    /// Verdict for a known score.
    pub fn from_score(score: f64) -> Self {
        if score >= DEMOCRACY_THRESHOLD {
            Verdict::Yes
        } else {
            Verdict::No
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Yes => "Yes",
            Verdict::No => "No",
            Verdict::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the renderer needs for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionResult {
    pub country_code: String,
    /// Empty when the code could not be resolved.
    pub country_name: String,
    /// True when a democracy record matched the country name.
    pub found: bool,
    pub score: f64,
    pub category: String,
    pub verdict: Verdict,
}

impl DecisionResult {
    fn unknown(country_code: &str, country_name: &str) -> Self {
        Self {
            country_code: country_code.to_string(),
            country_name: country_name.to_string(),
            found: false,
            score: 0.0,
            category: String::new(),
            verdict: Verdict::Unknown,
        }
    }
}

/// A matched democracy record carries a score that is not a number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Could not parse democracy score: {value:?} for {country}")]
pub struct ScoreParseError {
    pub country: String,
    pub value: String,
}

/// Decide the verdict for `country_code` against loaded reference data.
pub fn decide(data: &ReferenceData, country_code: &str) -> Result<DecisionResult, ScoreParseError> {
    if country_code.is_empty() {
        return Ok(DecisionResult::unknown("", ""));
    }

    let Some(country_name) = data.country_name(country_code) else {
        return Ok(DecisionResult::unknown(country_code, ""));
    };
    tracing::debug!(country_code, country_name, "Resolved country");

    let Some(record) = data.democracy(country_name) else {
        return Ok(DecisionResult::unknown(country_code, country_name));
    };

    let score = parse_score(&record.score).ok_or_else(|| ScoreParseError {
        country: country_name.to_string(),
        value: score_text(&record.score),
    })?;
    let category = record.category_text();
    tracing::debug!(score, category = %category, "Matched democracy record");

    Ok(DecisionResult {
        country_code: country_code.to_string(),
        country_name: country_name.to_string(),
        found: true,
        score,
        category,
        verdict: Verdict::from_score(score),
    })
}

fn parse_score(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

fn score_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
