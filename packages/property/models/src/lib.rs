#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Property record and match query types.
//!
//! These types describe properties as persisted by a repository and the
//! queries used to find them. Normalization and matching logic live in
//! `helix_property`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Free-form address input as it arrives from an upload or API call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAddress {
    /// Street line, e.g. `"123 Main Street"`.
    pub address_line_1: Option<String>,
    /// Secondary line, e.g. `"Apt 4"`.
    pub address_line_2: Option<String>,
    /// Postal code as provided (possibly with dropped leading zeros).
    pub postal_code: Option<String>,
}

/// A property to be added to a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProperty {
    /// Owning organization.
    pub organization_id: Option<u64>,
    /// Unique building identifier.
    pub ubid: Option<String>,
    /// Organization-specific external identifier.
    pub custom_id_1: Option<String>,
    /// Address as provided.
    pub address: RawAddress,
    /// City name.
    pub city: Option<String>,
    /// State name or abbreviation as provided.
    pub state: Option<String>,
    /// Additional source columns.
    #[serde(default)]
    pub extra_data: BTreeMap<String, String>,
}

/// A persisted property with its matchable, normalized fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRecord {
    /// Primary key.
    pub id: u64,
    /// Owning organization.
    pub organization_id: Option<u64>,
    /// Unique building identifier.
    pub ubid: Option<String>,
    /// Organization-specific external identifier.
    pub custom_id_1: Option<String>,
    /// Street line as provided.
    pub address_line_1: Option<String>,
    /// Secondary line as provided.
    pub address_line_2: Option<String>,
    /// City name.
    pub city: Option<String>,
    /// Two-letter state abbreviation (when recognized).
    pub state: Option<String>,
    /// Postal code, zero-padded to at least five characters.
    pub postal_code: Option<String>,
    /// Canonical address used as the matching key.
    pub normalized_address: Option<String>,
    /// Additional source columns.
    #[serde(default)]
    pub extra_data: BTreeMap<String, String>,
}

/// Parameters for finding existing properties.
///
/// Strategies are tried in priority order: `property_id`, then
/// `property_uid`, then `street` + `postal_code`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMatchQuery {
    /// Explicit property primary key.
    pub property_id: Option<u64>,
    /// UBID or custom id, matched case-insensitively as a substring.
    pub property_uid: Option<String>,
    /// Street address, normalized before matching.
    pub street: Option<String>,
    /// Postal code, normalized before matching.
    pub postal_code: Option<String>,
    /// Restricts matches to one organization.
    pub organization: Option<u64>,
}

/// The strategy that produced a [`PropertyMatch`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchStrategy {
    /// Direct primary key lookup.
    Id,
    /// UBID / custom id substring match.
    ExternalId,
    /// Canonical address equality.
    NormalizedAddress,
}

/// Result of a property lookup. An empty result is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMatch {
    /// Strategy that produced the records, `None` if nothing matched.
    pub strategy: Option<MatchStrategy>,
    /// Matching properties.
    pub records: Vec<PropertyRecord>,
}

impl PropertyMatch {
    /// A result with no matches.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            strategy: None,
            records: Vec::new(),
        }
    }

    /// Returns `true` if nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
