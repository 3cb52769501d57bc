#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Property repository and matching for HELIX.
//!
//! A [`PropertyRepository`] stores properties keyed by id and answers
//! three kinds of lookups: by id, by external identifier substring, and by
//! canonical address. [`find::propertyview_find`] chains these in priority
//! order so that matching degrades gracefully when identifiers are
//! missing from an import.

pub mod find;
pub mod memory;

use helix_address::{normalize_postal_code, normalize_state, normalize_with_extra_data};
pub use helix_property_models::{
    MatchStrategy, NewProperty, PropertyMatch, PropertyMatchQuery, PropertyRecord, RawAddress,
};

pub use find::{find_or_create, propertyview_find};
pub use memory::MemoryPropertyStore;

/// Errors from property store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// CSV parsing or writing error.
    #[error("CSV error in {path}: {source}")]
    Csv {
        /// Path (or `<reader>`) of the CSV data.
        path: String,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Two records share the same id.
    #[error("Duplicate property id: {0}")]
    DuplicateId(u64),

    /// No id is left after the given one.
    #[error("Property id {0} leaves no room for further ids")]
    IdOverflow(u64),

    /// A stored `extra_data` column is not a JSON object of strings.
    #[error("Invalid extra_data: {0}")]
    ExtraData(#[from] serde_json::Error),
}

/// Storage collaborator for property records.
///
/// All postal code arguments are expected to be normalized already.
pub trait PropertyRepository {
    /// Returns the property with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing store cannot be read.
    fn get(&self, id: u64) -> Result<Option<PropertyRecord>, StoreError>;

    /// Returns properties whose UBID or custom id contains `uid`,
    /// ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing store cannot be read.
    fn find_by_external_id(
        &self,
        uid: &str,
        organization: Option<u64>,
        postal_code: Option<&str>,
    ) -> Result<Vec<PropertyRecord>, StoreError>;

    /// Returns properties whose stored normalized address equals
    /// `normalized_address`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing store cannot be read.
    fn find_by_normalized_address(
        &self,
        normalized_address: &str,
        organization: Option<u64>,
        postal_code: Option<&str>,
    ) -> Result<Vec<PropertyRecord>, StoreError>;

    /// Stores a new property and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing store cannot be written.
    fn insert(&mut self, property: NewProperty) -> Result<PropertyRecord, StoreError>;
}

/// Builds a persisted record from `property`, normalizing its address,
/// postal code and state.
///
/// The stored `normalized_address` comes from the same normalizer used by
/// the matcher, so a record always matches a query for its own address.
#[must_use]
pub fn normalize_property(id: u64, property: NewProperty) -> PropertyRecord {
    let NewProperty {
        organization_id,
        ubid,
        custom_id_1,
        address,
        city,
        state,
        mut extra_data,
    } = property;

    let normalized_address = address.address_line_1.as_deref().and_then(|line1| {
        normalize_with_extra_data(
            line1,
            address.address_line_2.as_deref().unwrap_or_default(),
            &mut extra_data,
        )
    });

    PropertyRecord {
        id,
        organization_id,
        ubid: non_empty(ubid),
        custom_id_1: non_empty(custom_id_1),
        address_line_1: address.address_line_1,
        address_line_2: non_empty(address.address_line_2),
        city: non_empty(city),
        state: non_empty(state).map(|s| normalize_state(s.trim())),
        postal_code: non_empty(address.postal_code).map(|p| normalize_postal_code(&p)),
        normalized_address,
        extra_data,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Returns `true` if `record` passes the optional organization and postal
/// code filters.
#[must_use]
pub fn matches_filters(
    record: &PropertyRecord,
    organization: Option<u64>,
    postal_code: Option<&str>,
) -> bool {
    organization.is_none_or(|org| record.organization_id == Some(org))
        && postal_code.is_none_or(|code| record.postal_code.as_deref() == Some(code))
}
