//! Header-matching registry for CSV imports.
//!
//! Property columns are defined in `config/columns.toml`, green assessment
//! programs and the assessment date column in `config/assessments.toml`.
//! Both files are embedded at compile time and compiled once by
//! [`default_config`].

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::ImportError;

const COLUMNS_TOML: &str = include_str!("../config/columns.toml");
const ASSESSMENTS_TOML: &str = include_str!("../config/assessments.toml");

static DEFAULT_CONFIG: LazyLock<ImportConfig> = LazyLock::new(|| {
    let mut config = ImportConfig::from_toml_str(COLUMNS_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse column registry: {e}"));
    let assessments = ImportConfig::from_toml_str(ASSESSMENTS_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse assessment registry: {e}"));
    config.date = assessments.date;
    config.assessments = assessments.assessments;
    config
});

/// Property fields a CSV column can be mapped to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum PropertyField {
    #[serde(rename = "state")]
    #[strum(serialize = "state")]
    State,
    #[serde(rename = "city")]
    #[strum(serialize = "city")]
    City,
    #[serde(rename = "postal_code")]
    #[strum(serialize = "postal_code")]
    PostalCode,
    #[serde(rename = "address_line_1")]
    #[strum(serialize = "address_line_1")]
    AddressLine1,
    #[serde(rename = "address_line_2")]
    #[strum(serialize = "address_line_2")]
    AddressLine2,
    #[serde(rename = "year_built")]
    #[strum(serialize = "year_built")]
    YearBuilt,
    #[serde(rename = "conditioned_floor_area")]
    #[strum(serialize = "conditioned_floor_area")]
    ConditionedFloorArea,
    #[serde(rename = "property_name")]
    #[strum(serialize = "property_name")]
    PropertyName,
    #[serde(rename = "custom_id_1")]
    #[strum(serialize = "custom_id_1")]
    CustomId1,
    #[serde(rename = "ubid")]
    #[strum(serialize = "ubid")]
    Ubid,
}

/// How a header pattern is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchMode {
    /// Must match at the start of the header.
    Prefix,
    /// May match anywhere in the header.
    Search,
}

/// Whether an assessment score is a number or a rating label.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ScoreType {
    /// Numeric score, e.g. a HERS index.
    Metric,
    /// Label such as `GOLD` or `TRUE`.
    Rating,
}

/// A compiled header pattern.
#[derive(Debug, Clone)]
pub struct HeaderPattern {
    regex: Regex,
}

impl HeaderPattern {
    /// Compiles `pattern` for the given mode.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Pattern`] if the regex is invalid.
    pub fn new(pattern: &str, mode: MatchMode) -> Result<Self, ImportError> {
        let source = match mode {
            MatchMode::Prefix => format!("^(?:{pattern})"),
            MatchMode::Search => pattern.to_string(),
        };
        let regex = Regex::new(&source).map_err(|e| ImportError::Pattern {
            pattern: pattern.to_string(),
            source: e,
        })?;
        Ok(Self { regex })
    }

    /// Returns `true` if the lower-cased `header` matches.
    #[must_use]
    pub fn matches(&self, header: &str) -> bool {
        self.regex.is_match(&header.to_lowercase())
    }
}

/// Maps matching headers to a property field.
#[derive(Debug, Clone)]
pub struct ColumnRule {
    pub field: PropertyField,
    pub pattern: HeaderPattern,
}

/// A green assessment program.
#[derive(Debug, Clone)]
pub struct AssessmentRule {
    /// Program name, e.g. `"HERS Index Score"`.
    pub name: String,
    /// Header pattern for short-format files.
    pub pattern: HeaderPattern,
    pub score: ScoreType,
}

/// Compiled column and assessment registry.
#[derive(Debug, Clone, Default)]
pub struct ImportConfig {
    pub columns: Vec<ColumnRule>,
    /// Pattern for the assessment date column.
    pub date: Option<HeaderPattern>,
    pub assessments: Vec<AssessmentRule>,
}

#[derive(Deserialize)]
struct PatternEntry {
    pattern: String,
    mode: MatchMode,
}

#[derive(Deserialize)]
struct ColumnEntry {
    field: PropertyField,
    pattern: String,
    mode: MatchMode,
}

#[derive(Deserialize)]
struct AssessmentEntry {
    name: String,
    pattern: String,
    mode: MatchMode,
    score: ScoreType,
}

#[derive(Deserialize)]
struct RegistryFile {
    #[serde(default)]
    columns: Vec<ColumnEntry>,
    date: Option<PatternEntry>,
    #[serde(default)]
    assessments: Vec<AssessmentEntry>,
}

impl ImportConfig {
    /// Parses a registry document with optional `[[columns]]`, `[date]`
    /// and `[[assessments]]` sections.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError`] if the TOML is malformed or a pattern does
    /// not compile.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ImportError> {
        let file: RegistryFile = toml::de::from_str(toml_str)?;

        let columns = file
            .columns
            .iter()
            .map(|entry| {
                Ok(ColumnRule {
                    field: entry.field,
                    pattern: HeaderPattern::new(&entry.pattern, entry.mode)?,
                })
            })
            .collect::<Result<_, ImportError>>()?;

        let date = file
            .date
            .map(|entry| HeaderPattern::new(&entry.pattern, entry.mode))
            .transpose()?;

        let assessments = file
            .assessments
            .into_iter()
            .map(|entry| {
                Ok(AssessmentRule {
                    pattern: HeaderPattern::new(&entry.pattern, entry.mode)?,
                    name: entry.name,
                    score: entry.score,
                })
            })
            .collect::<Result<_, ImportError>>()?;

        Ok(Self {
            columns,
            date,
            assessments,
        })
    }

    /// Looks up an assessment program by exact name.
    #[must_use]
    pub fn assessment(&self, name: &str) -> Option<&AssessmentRule> {
        self.assessments.iter().find(|a| a.name == name)
    }
}

/// Returns the built-in registry.
///
/// # Panics
///
/// Panics if an embedded TOML file is malformed.
#[must_use]
pub fn default_config() -> &'static ImportConfig {
    &DEFAULT_CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn loads_embedded_registry() {
        let config = default_config();
        assert_eq!(config.columns.len(), 10);
        assert_eq!(config.assessments.len(), 7);
        assert!(config.date.is_some());
    }

    #[test]
    fn fields_and_assessment_names_are_unique() {
        let config = default_config();

        let mut fields = BTreeSet::new();
        for rule in &config.columns {
            assert!(fields.insert(rule.field), "Duplicate field: {}", rule.field);
        }

        let mut names = BTreeSet::new();
        for rule in &config.assessments {
            assert!(
                names.insert(rule.name.as_str()),
                "Duplicate assessment: {}",
                rule.name
            );
        }
    }

    #[test]
    fn prefix_patterns_are_anchored() {
        let pattern = HeaderPattern::new("city", MatchMode::Prefix).unwrap();
        assert!(pattern.matches("City"));
        assert!(pattern.matches("city_name"));
        assert!(!pattern.matches("home city"));

        let pattern = HeaderPattern::new("leed", MatchMode::Search).unwrap();
        assert!(pattern.matches("LEED for Homes"));
        assert!(pattern.matches("Certified LEED"));
    }

    #[test]
    fn postal_code_pattern_accepts_zip_and_postal() {
        let config = default_config();
        let rule = config
            .columns
            .iter()
            .find(|r| r.field == PropertyField::PostalCode)
            .unwrap();
        assert!(rule.pattern.matches("Postal Code"));
        assert!(rule.pattern.matches("zip_code"));
        assert!(!rule.pattern.matches("code"));
    }

    #[test]
    fn rejects_invalid_pattern() {
        let toml_str = "[[columns]]\nfield = \"city\"\npattern = \"(\"\nmode = \"prefix\"\n";
        assert!(matches!(
            ImportConfig::from_toml_str(toml_str),
            Err(ImportError::Pattern { .. })
        ));
    }

    #[test]
    fn rejects_unknown_field() {
        let toml_str = "[[columns]]\nfield = \"roof\"\npattern = \"roof\"\nmode = \"prefix\"\n";
        assert!(matches!(
            ImportConfig::from_toml_str(toml_str),
            Err(ImportError::Config(_))
        ));
    }

    #[test]
    fn finds_assessment_by_name() {
        let rule = default_config().assessment("HERS Index Score").unwrap();
        assert_eq!(rule.score, ScoreType::Metric);
        assert!(default_config().assessment("hers index score").is_none());
    }
}
