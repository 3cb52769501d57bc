#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CSV import of properties and green assessments.
//!
//! Headers are matched against the registry in [`registry`] to find the
//! address, postal code, state and identifier columns plus any green
//! assessment columns. Each row is then matched against the repository
//! with [`helix_property::find_or_create`] and its assessments are
//! attached to the resulting property id.
//!
//! Two assessment layouts are supported (see [`AssessmentFormat`]):
//! *short* files have one column per program, *long* files name the
//! program in a `green_assessment_name` column and carry one assessment
//! per row.

pub mod mapping;
pub mod progress;
pub mod registry;
pub mod validation;

use std::collections::BTreeMap;
use std::io::Read;

use chrono::NaiveDate;
use csv::StringRecord;
use helix_property::{NewProperty, PropertyRepository, RawAddress, StoreError, find_or_create};
use serde::Serialize;

pub use mapping::{
    AssessmentFormat, ColumnMapping, DetectedColumns, detect_mappings, mapping_entry,
};
pub use progress::{NullProgress, ProgressCallback};
pub use registry::{ImportConfig, PropertyField, ScoreType, default_config};
pub use validation::{
    ACCEPTED_DATE_FORMATS, AssessmentScore, normalize_score_value, parse_assessment_date,
};

use mapping::{ASSESSMENT_NAME_COLUMN, LONG_FORMAT_PREFIX};
use registry::AssessmentRule;

/// Property fields kept in `extra_data` rather than dedicated columns.
const EXTRA_DATA_FIELDS: &[PropertyField] = &[
    PropertyField::YearBuilt,
    PropertyField::ConditionedFloorArea,
    PropertyField::PropertyName,
];

/// Errors that abort an import.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The file has no column for a required field.
    #[error("Missing required column for {0}")]
    MissingColumn(PropertyField),

    /// The CSV data cannot be read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// An assessment date is in an unsupported format.
    #[error(
        "Row {row}: incorrect date format '{value}', should be {formats}",
        formats = ACCEPTED_DATE_FORMATS
    )]
    InvalidDate {
        /// 1-based data row.
        row: u64,
        /// The rejected cell.
        value: String,
    },

    /// A metric assessment score is not a number.
    #[error("Row {row}: invalid score '{value}' for {assessment}")]
    InvalidScore {
        /// 1-based data row.
        row: u64,
        /// Program name.
        assessment: String,
        /// The rejected cell, after normalization.
        value: String,
    },

    /// A long-format row names an assessment missing from the registry.
    #[error("Row {row}: unknown green assessment '{name}'")]
    UnknownAssessment {
        /// 1-based data row.
        row: u64,
        /// Name as given in the file.
        name: String,
    },

    /// The registry TOML is malformed.
    #[error("Registry error: {0}")]
    Config(#[from] toml::de::Error),

    /// A registry header pattern does not compile.
    #[error("Invalid header pattern '{pattern}': {source}")]
    Pattern {
        /// The pattern as written in the registry.
        pattern: String,
        /// Compilation error.
        source: regex::Error,
    },

    /// The property repository failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A green assessment attached to a property during import.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GreenAssessmentRecord {
    /// Property the assessment belongs to.
    pub property_id: u64,
    /// Program name, e.g. `"HERS Index Score"`.
    pub assessment: String,
    pub score: AssessmentScore,
    /// Completion date, if the file has one.
    pub date: Option<NaiveDate>,
    /// Issuing body (long-format files only).
    pub source: Option<String>,
    /// Program version (long-format files only).
    pub version: Option<String>,
    /// Reference URLs (long-format files only).
    pub urls: Vec<String>,
}

/// Summary of a finished import.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    /// Data rows read.
    pub rows: u64,
    /// Rows that created a new property.
    pub created: u64,
    /// Rows matched to an existing property.
    pub matched: u64,
    /// Rows without a street address.
    pub skipped: u64,
    /// Assessments attached, in file order.
    pub assessments: Vec<GreenAssessmentRecord>,
}

/// A data row with access by header name.
struct Row<'a> {
    number: u64,
    headers: &'a [String],
    record: &'a StringRecord,
}

impl<'a> Row<'a> {
    /// Returns the non-empty value under `header`.
    fn get(&self, header: &str) -> Option<&'a str> {
        let index = self.headers.iter().position(|h| h == header)?;
        self.record
            .get(index)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    fn field(&self, detected: &DetectedColumns, field: PropertyField) -> Option<&'a str> {
        detected.column_for(field).and_then(|h| self.get(h))
    }

    fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.record.iter().map(str::trim))
    }
}

/// Imports properties and green assessments from CSV data.
///
/// Every row with a street address is matched or created in `repo` under
/// `organization`. Rows without one are counted in
/// [`ImportReport::skipped`].
///
/// # Errors
///
/// Returns [`ImportError`] if the CSV is unreadable, the address column is
/// missing, a date or metric score is malformed, a long-format row names
/// an unknown assessment, or the repository fails.
pub fn import_csv<R: Read>(
    reader: R,
    repo: &mut impl PropertyRepository,
    config: &ImportConfig,
    organization: Option<u64>,
    progress: &dyn ProgressCallback,
) -> Result<ImportReport, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let detected = detect_mappings(&headers, config);
    if detected.column_for(PropertyField::AddressLine1).is_none() {
        return Err(ImportError::MissingColumn(PropertyField::AddressLine1));
    }

    let records = reader.records().collect::<Result<Vec<_>, _>>()?;
    progress.set_total(records.len() as u64);
    progress.set_message("Importing properties".to_string());

    let mut report = ImportReport::default();

    for (number, record) in (1..).zip(&records) {
        let row = Row {
            number,
            headers: &headers,
            record,
        };
        report.rows += 1;

        let Some(property) = new_property(&row, &detected, organization) else {
            log::warn!("Row {number}: no street address, skipping");
            report.skipped += 1;
            progress.inc(1);
            continue;
        };

        // Validate the row before touching the repository.
        let pending = match detected.format {
            AssessmentFormat::Short => short_assessments(&row, &detected, config)?,
            AssessmentFormat::Long => long_assessment(&row, config)?.into_iter().collect(),
        };

        let (stored, created) = find_or_create(&mut *repo, property)?;
        if created {
            report.created += 1;
        } else {
            report.matched += 1;
        }

        report
            .assessments
            .extend(pending.into_iter().map(|pending| pending.attach(stored.id)));
        progress.inc(1);
    }

    progress.finish(format!(
        "Imported {} rows ({} created, {} matched, {} skipped)",
        report.rows, report.created, report.matched, report.skipped
    ));
    log::info!(
        "Imported {} rows: {} created, {} matched, {} skipped, {} assessments",
        report.rows,
        report.created,
        report.matched,
        report.skipped,
        report.assessments.len()
    );

    Ok(report)
}

fn new_property(
    row: &Row<'_>,
    detected: &DetectedColumns,
    organization: Option<u64>,
) -> Option<NewProperty> {
    let address_line_1 = row.field(detected, PropertyField::AddressLine1)?;
    let field = |f| row.field(detected, f).map(str::to_string);

    let mut extra_data: BTreeMap<String, String> = EXTRA_DATA_FIELDS
        .iter()
        .filter_map(|&f| Some((f.to_string(), field(f)?)))
        .collect();

    for (header, value) in row.iter() {
        if !value.is_empty()
            && !detected.is_mapped(header)
            && header != ASSESSMENT_NAME_COLUMN
            && !header.starts_with(LONG_FORMAT_PREFIX)
        {
            extra_data.insert(header.to_string(), value.to_string());
        }
    }

    Some(NewProperty {
        organization_id: organization,
        ubid: field(PropertyField::Ubid),
        custom_id_1: field(PropertyField::CustomId1),
        address: RawAddress {
            address_line_1: Some(address_line_1.to_string()),
            address_line_2: field(PropertyField::AddressLine2),
            postal_code: field(PropertyField::PostalCode),
        },
        city: field(PropertyField::City),
        state: field(PropertyField::State),
        extra_data,
    })
}

/// An assessment validated from a row, awaiting its property id.
struct PendingAssessment {
    assessment: String,
    score: AssessmentScore,
    date: Option<NaiveDate>,
    source: Option<String>,
    version: Option<String>,
    urls: Vec<String>,
}

impl PendingAssessment {
    fn attach(self, property_id: u64) -> GreenAssessmentRecord {
        GreenAssessmentRecord {
            property_id,
            assessment: self.assessment,
            score: self.score,
            date: self.date,
            source: self.source,
            version: self.version,
            urls: self.urls,
        }
    }
}

fn assessment_date(row: &Row<'_>, value: Option<&str>) -> Result<Option<NaiveDate>, ImportError> {
    value
        .map(|value| {
            parse_assessment_date(value).ok_or_else(|| ImportError::InvalidDate {
                row: row.number,
                value: value.to_string(),
            })
        })
        .transpose()
}

fn parse_score(
    row: &Row<'_>,
    rule: &AssessmentRule,
    value: &str,
) -> Result<Option<AssessmentScore>, ImportError> {
    AssessmentScore::from_cell(rule.score, value).map_err(|value| ImportError::InvalidScore {
        row: row.number,
        assessment: rule.name.clone(),
        value,
    })
}

fn short_assessments(
    row: &Row<'_>,
    detected: &DetectedColumns,
    config: &ImportConfig,
) -> Result<Vec<PendingAssessment>, ImportError> {
    let date = assessment_date(row, detected.date_column.as_deref().and_then(|c| row.get(c)))?;

    let mut pending = Vec::new();
    for mapping in &detected.assessments {
        let Some(rule) = config.assessment(&mapping.to_field) else {
            continue;
        };
        let value = row.get(&mapping.from_field).unwrap_or_default();
        if let Some(score) = parse_score(row, rule, value)? {
            pending.push(PendingAssessment {
                assessment: rule.name.clone(),
                score,
                date,
                source: None,
                version: None,
                urls: Vec::new(),
            });
        }
    }

    Ok(pending)
}

fn long_assessment(
    row: &Row<'_>,
    config: &ImportConfig,
) -> Result<Option<PendingAssessment>, ImportError> {
    let Some(name) = row.get(ASSESSMENT_NAME_COLUMN) else {
        return Ok(None);
    };
    let rule = config
        .assessment(name)
        .ok_or_else(|| ImportError::UnknownAssessment {
            row: row.number,
            name: name.to_string(),
        })?;

    let column = |suffix: &str| row.get(&format!("{LONG_FORMAT_PREFIX}{suffix}"));

    let date = assessment_date(row, column("date"))?;
    let Some(score) = parse_score(row, rule, column(rule.score.as_ref()).unwrap_or_default())? else {
        return Ok(None);
    };

    Ok(Some(PendingAssessment {
        assessment: rule.name.clone(),
        score,
        date,
        source: column("source").map(str::to_string),
        version: column("version").map(str::to_string),
        urls: column("url").map(str::to_string).into_iter().collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use helix_property::MemoryPropertyStore;

    const SHORT_CSV: &str = "\
Address Line 1,Address Line 2,City,State,Postal Code,Internal ID,HERS Index Score,LEED for Homes,Assessment Date,Notes
123 Main Street,,Burlington,Vermont,5401,INT-1,52,Gold,2017-06-30,corner lot
123 MAIN ST,,Burlington,VT,05401,,48,0,06/30/17,
,,Burlington,VT,05401,,60,,,
9 Oak Avenue,Apt 2,Montpelier,VT,5602,,,platinum,,
";

    const LONG_CSV: &str = "\
address_line_1,postal_code,green_assessment_name,green_assessment_property_source,green_assessment_property_version,green_assessment_property_date,green_assessment_property_url,green_assessment_property_metric,green_assessment_property_rating
12 Birch Rd,05401,HERS Index Score,Rater Co,2006,2018-01-15,https://example.org/hers/1,61,
12 Birch Road,05401,ENERGY STAR Certified Homes,EPA,3.1,2018-02-01,,,1
";

    fn import(csv: &str, store: &mut MemoryPropertyStore) -> Result<ImportReport, ImportError> {
        import_csv(csv.as_bytes(), store, default_config(), Some(1), &NullProgress)
    }

    #[test]
    fn imports_short_format() {
        let mut store = MemoryPropertyStore::new();
        let report = import(SHORT_CSV, &mut store).unwrap();

        assert_eq!(report.rows, 4);
        assert_eq!(report.created, 2);
        assert_eq!(report.matched, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(store.len(), 2);

        let summary: Vec<(u64, &str, &AssessmentScore)> = report
            .assessments
            .iter()
            .map(|a| (a.property_id, a.assessment.as_str(), &a.score))
            .collect();
        assert_eq!(
            summary,
            [
                (1, "HERS Index Score", &AssessmentScore::Metric(52.0)),
                (
                    1,
                    "LEED for Homes",
                    &AssessmentScore::Rating("GOLD".to_string())
                ),
                (1, "HERS Index Score", &AssessmentScore::Metric(48.0)),
                (
                    2,
                    "LEED for Homes",
                    &AssessmentScore::Rating("PLATINUM".to_string())
                ),
            ]
        );
        assert_eq!(report.assessments[0].date, NaiveDate::from_ymd_opt(2017, 6, 30));
        assert_eq!(report.assessments[2].date, NaiveDate::from_ymd_opt(2017, 6, 30));
        assert_eq!(report.assessments[3].date, None);
    }

    #[test]
    fn stores_normalized_fields_and_extra_data() {
        let mut store = MemoryPropertyStore::new();
        import(SHORT_CSV, &mut store).unwrap();

        let first = store.get(1).unwrap().unwrap();
        assert_eq!(first.normalized_address.as_deref(), Some("123 main st"));
        assert_eq!(first.postal_code.as_deref(), Some("05401"));
        assert_eq!(first.state.as_deref(), Some("VT"));
        assert_eq!(first.custom_id_1.as_deref(), Some("INT-1"));
        assert_eq!(first.organization_id, Some(1));
        assert_eq!(
            first.extra_data.get("Notes").map(String::as_str),
            Some("corner lot")
        );
        assert!(!first.extra_data.contains_key("HERS Index Score"));

        let second = store.get(2).unwrap().unwrap();
        assert_eq!(second.normalized_address.as_deref(), Some("9 oak ave apt 2"));
        assert_eq!(second.postal_code.as_deref(), Some("05602"));
    }

    #[test]
    fn imports_long_format() {
        let mut store = MemoryPropertyStore::new();
        let report = import(LONG_CSV, &mut store).unwrap();

        assert_eq!((report.created, report.matched), (1, 1));
        assert_eq!(
            report.assessments,
            [
                GreenAssessmentRecord {
                    property_id: 1,
                    assessment: "HERS Index Score".to_string(),
                    score: AssessmentScore::Metric(61.0),
                    date: NaiveDate::from_ymd_opt(2018, 1, 15),
                    source: Some("Rater Co".to_string()),
                    version: Some("2006".to_string()),
                    urls: vec!["https://example.org/hers/1".to_string()],
                },
                GreenAssessmentRecord {
                    property_id: 1,
                    assessment: "ENERGY STAR Certified Homes".to_string(),
                    score: AssessmentScore::Rating("TRUE".to_string()),
                    date: NaiveDate::from_ymd_opt(2018, 2, 1),
                    source: Some("EPA".to_string()),
                    version: Some("3.1".to_string()),
                    urls: Vec::new(),
                },
            ]
        );

        let record = store.get(1).unwrap().unwrap();
        assert!(record.extra_data.is_empty());
    }

    #[test]
    fn matches_existing_store_records() {
        let mut store = MemoryPropertyStore::from_csv_reader(
            "id,organization_id,address_line_1,postal_code\n7,1,123 Main St,05401\n".as_bytes(),
        )
        .unwrap();
        let report = import(SHORT_CSV, &mut store).unwrap();
        assert_eq!(report.matched, 2);
        assert_eq!(report.assessments[0].property_id, 7);
    }

    #[test]
    fn rejects_invalid_date() {
        let csv = "address_line_1,assessment_date\n1 Elm St,June 30\n";
        let mut store = MemoryPropertyStore::new();
        let err = import(csv, &mut store).unwrap_err();
        assert!(matches!(
            err,
            ImportError::InvalidDate { row: 1, ref value } if value == "June 30"
        ));
        assert!(err.to_string().ends_with(ACCEPTED_DATE_FORMATS));
        assert!(store.is_empty());
    }

    #[test]
    fn rejects_non_numeric_metric() {
        let csv = "address_line_1,hers_score\n1 Elm St,n/a\n";
        let err = import(csv, &mut MemoryPropertyStore::new()).unwrap_err();
        assert!(matches!(err, ImportError::InvalidScore { row: 1, .. }));
    }

    #[test]
    fn rejects_unknown_long_format_assessment() {
        let csv = "address_line_1,green_assessment_name\n1 Elm St,Gold Star\n";
        let err = import(csv, &mut MemoryPropertyStore::new()).unwrap_err();
        assert!(matches!(
            err,
            ImportError::UnknownAssessment { row: 1, ref name } if name == "Gold Star"
        ));
    }

    #[test]
    fn requires_address_column() {
        let csv = "city,state\nBurlington,VT\n";
        let err = import(csv, &mut MemoryPropertyStore::new()).unwrap_err();
        assert!(matches!(
            err,
            ImportError::MissingColumn(PropertyField::AddressLine1)
        ));
    }
}
