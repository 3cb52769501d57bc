//! Mapping CSV headers onto property fields and assessment programs.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

use crate::registry::{ImportConfig, PropertyField};

/// Destination table for property column mappings.
pub const PROPERTY_STATE_TABLE: &str = "PropertyState";

/// Header whose presence selects [`AssessmentFormat::Long`].
pub const ASSESSMENT_NAME_COLUMN: &str = "green_assessment_name";

/// Prefix of the per-assessment columns in long-format files.
pub const LONG_FORMAT_PREFIX: &str = "green_assessment_property_";

/// One header-to-field assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Target field or assessment program name.
    pub to_field: String,
    /// Target table, always [`PROPERTY_STATE_TABLE`].
    pub to_table_name: String,
    /// Source header as it appears in the file.
    pub from_field: String,
}

/// Builds a [`ColumnMapping`] into the property state table.
#[must_use]
pub fn mapping_entry(to_field: &str, from_field: &str) -> ColumnMapping {
    ColumnMapping {
        to_field: to_field.to_string(),
        to_table_name: PROPERTY_STATE_TABLE.to_string(),
        from_field: from_field.to_string(),
    }
}

/// Layout of green assessment data in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AssessmentFormat {
    /// One assessment per row, named in `green_assessment_name`.
    Long,
    /// One column per assessment program.
    Short,
}

/// Column assignments detected from a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedColumns {
    /// Property field mappings, in header order.
    pub mappings: Vec<ColumnMapping>,
    /// Assessment mappings; `to_field` is the program name.
    pub assessments: Vec<ColumnMapping>,
    /// Header holding the assessment date.
    pub date_column: Option<String>,
    pub format: AssessmentFormat,
}

impl DetectedColumns {
    /// Returns the first header mapped to `field`.
    #[must_use]
    pub fn column_for(&self, field: PropertyField) -> Option<&str> {
        self.mappings
            .iter()
            .find(|m| m.to_field == field.as_ref())
            .map(|m| m.from_field.as_str())
    }

    /// Returns `true` if `header` feeds a property field, an assessment or
    /// the assessment date.
    #[must_use]
    pub fn is_mapped(&self, header: &str) -> bool {
        self.mappings
            .iter()
            .chain(&self.assessments)
            .any(|m| m.from_field == header)
            || self.date_column.as_deref() == Some(header)
    }
}

/// Matches every header against the registry.
///
/// A header may map to several targets; the first header matching the
/// date pattern becomes the date column.
#[must_use]
pub fn detect_mappings<S: AsRef<str>>(headers: &[S], config: &ImportConfig) -> DetectedColumns {
    let mut mappings = Vec::new();
    let mut assessments = Vec::new();
    let mut date_column = None;

    for header in headers {
        let header = header.as_ref();
        for rule in &config.columns {
            if rule.pattern.matches(header) {
                mappings.push(mapping_entry(rule.field.as_ref(), header));
            }
        }

        for rule in &config.assessments {
            if rule.pattern.matches(header) {
                assessments.push(mapping_entry(&rule.name, header));
            }
        }

        if date_column.is_none()
            && config.date.as_ref().is_some_and(|p| p.matches(header))
        {
            date_column = Some(header.to_string());
        }
    }

    let format = if headers.iter().any(|h| h.as_ref() == ASSESSMENT_NAME_COLUMN) {
        AssessmentFormat::Long
    } else {
        AssessmentFormat::Short
    };

    log::debug!(
        "Detected {} property columns, {} assessment columns, {format} format",
        mappings.len(),
        assessments.len()
    );

    DetectedColumns {
        mappings,
        assessments,
        date_column,
        format,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::default_config;

    #[test]
    fn builds_expected_mapping_entry() {
        let entry = mapping_entry("state", "State Name");
        assert_eq!(
            entry,
            ColumnMapping {
                to_field: "state".to_string(),
                to_table_name: "PropertyState".to_string(),
                from_field: "State Name".to_string(),
            }
        );
    }

    #[test]
    fn detects_property_columns() {
        let headers = [
            "Address Line 1",
            "Address Line 2",
            "City",
            "State",
            "Postal Code",
            "Year Built",
            "Internal ID",
            "Development Name",
            "Notes",
        ];
        let detected = detect_mappings(&headers, default_config());

        assert_eq!(
            detected.column_for(PropertyField::AddressLine1),
            Some("Address Line 1")
        );
        assert_eq!(
            detected.column_for(PropertyField::AddressLine2),
            Some("Address Line 2")
        );
        assert_eq!(
            detected.column_for(PropertyField::PostalCode),
            Some("Postal Code")
        );
        assert_eq!(
            detected.column_for(PropertyField::CustomId1),
            Some("Internal ID")
        );
        assert_eq!(
            detected.column_for(PropertyField::PropertyName),
            Some("Development Name")
        );
        assert!(!detected.is_mapped("Notes"));
        assert_eq!(detected.format, AssessmentFormat::Short);
    }

    #[test]
    fn detects_assessment_columns_and_date() {
        let headers = [
            "address_line_1",
            "HERS Index",
            "LEED Certification",
            "National Green Building Standard",
            "Assessment Completion Date",
        ];
        let detected = detect_mappings(&headers, default_config());

        let names: Vec<&str> = detected
            .assessments
            .iter()
            .map(|m| m.to_field.as_str())
            .collect();
        assert_eq!(
            names,
            ["HERS Index Score", "LEED for Homes", "NGBS New Construction"]
        );
        assert_eq!(
            detected.date_column.as_deref(),
            Some("Assessment Completion Date")
        );
    }

    #[test]
    fn detects_long_format() {
        let headers = [
            "address_line_1",
            "green_assessment_name",
            "green_assessment_property_date",
        ];
        let detected = detect_mappings(&headers, default_config());
        assert_eq!(detected.format, AssessmentFormat::Long);
        assert_eq!(
            detected.date_column.as_deref(),
            Some("green_assessment_property_date")
        );
    }
}
