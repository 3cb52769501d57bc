//! Assessment date and score validation.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::registry::ScoreType;

/// Date-only formats accepted for assessment dates.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%y"];

/// Timestamp formats accepted for assessment dates.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S"];

/// Human-readable list of accepted date formats, for error messages.
pub const ACCEPTED_DATE_FORMATS: &str = "YYYY-MM-DD, YYYY-MM-DD HH:MM:SS or MM/DD/YY";

/// Ratings that mean "not awarded".
const NOT_AWARDED: &str = "FALSE";

/// Parses an assessment date in any accepted format.
///
/// Returns `None` if the value matches none of them.
#[must_use]
pub fn parse_assessment_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Canonicalizes a raw score cell.
///
/// Metric scores pass through unchanged. Ratings are trimmed and
/// upper-cased, with `0`/`1` spelled out as `FALSE`/`TRUE`.
#[must_use]
pub fn normalize_score_value(score_type: ScoreType, value: &str) -> String {
    match score_type {
        ScoreType::Metric => value.to_string(),
        ScoreType::Rating => match value.trim() {
            "0" => "FALSE".to_string(),
            "1" => "TRUE".to_string(),
            other => other.to_uppercase(),
        },
    }
}

/// A validated assessment score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentScore {
    Metric(f64),
    Rating(String),
}

impl AssessmentScore {
    /// Builds a score from a raw cell. Empty cells and `FALSE` ratings
    /// yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns the normalized value if a metric score does not parse.
    pub fn from_cell(score_type: ScoreType, value: &str) -> Result<Option<Self>, String> {
        let normalized = normalize_score_value(score_type, value);
        let trimmed = normalized.trim();
        if trimmed.is_empty() || trimmed == NOT_AWARDED {
            return Ok(None);
        }

        match score_type {
            ScoreType::Metric => trimmed
                .parse::<f64>()
                .map(|score| Some(Self::Metric(score)))
                .map_err(|_| trimmed.to_string()),
            ScoreType::Rating => Ok(Some(Self::Rating(normalized))),
        }
    }
}
