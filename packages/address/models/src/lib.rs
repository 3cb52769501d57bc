#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for HELIX address tagging and normalization.
//!
//! This crate contains only data types. The tagging rules, lookup tables
//! and the canonicalization pipeline live in `helix_address`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A component label produced by an address tagger.
///
/// Variants are declared in canonical assembly order, so iterating a
/// [`TaggedAddress`] yields components in the order they are joined.
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
pub enum AddressLabel {
    /// House number, possibly a range (`123-125`).
    AddressNumber,
    /// Directional before the street name (`N` in `N Main St`).
    StreetNamePreDirectional,
    /// The street name itself.
    StreetName,
    /// Street suffix (`St`, `Avenue`).
    StreetNamePostType,
    /// Directional after the street suffix (`NW` in `Main St NW`).
    StreetNamePostDirectional,
    /// Building-level designator (`Bldg`, `Floor`).
    SubaddressType,
    /// Identifier following a [`Self::SubaddressType`].
    SubaddressIdentifier,
    /// Unit-level designator (`Apt`, `Suite`, `#`).
    OccupancyType,
    /// Identifier following a [`Self::OccupancyType`].
    OccupancyIdentifier,
}

/// Labeled components of a single free-form address.
///
/// Absent labels are simply missing from the map; there are no empty
/// placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedAddress {
    components: BTreeMap<AddressLabel, String>,
}

impl TaggedAddress {
    /// Creates an empty tagging result.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            components: BTreeMap::new(),
        }
    }

    /// Returns the value tagged with `label`, if any.
    #[must_use]
    pub fn get(&self, label: AddressLabel) -> Option<&str> {
        self.components.get(&label).map(String::as_str)
    }

    /// Returns `true` if `label` has already been assigned.
    #[must_use]
    pub fn contains(&self, label: AddressLabel) -> bool {
        self.components.contains_key(&label)
    }

    /// Assigns `value` to `label`, replacing any earlier value.
    pub fn insert(&mut self, label: AddressLabel, value: impl Into<String>) {
        self.components.insert(label, value.into());
    }

    /// Appends `value` to an already assigned label, separated by a space.
    /// Assigns it if the label is not present yet.
    pub fn append(&mut self, label: AddressLabel, value: &str) {
        self.components
            .entry(label)
            .and_modify(|existing| {
                existing.push(' ');
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    /// Returns `true` if no component was tagged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Iterates components in canonical assembly order.
    pub fn iter(&self) -> impl Iterator<Item = (AddressLabel, &str)> {
        self.components.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// How a [`NormalizedAddress`] was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Normalization {
    /// The tagger split the address and each component was canonicalized.
    Tagged,
    /// The tagger rejected the address; the cleaned raw input was used.
    Fallback {
        /// Why the tagger rejected the input.
        reason: String,
    },
}

/// A canonical address string together with how it was derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedAddress {
    /// Lowercase canonical address used as a matching key.
    pub value: String,
    /// Whether tagging succeeded or the raw fallback was used.
    pub normalization: Normalization,
}

impl NormalizedAddress {
    /// Returns `true` if the raw-string fallback produced this value.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self.normalization, Normalization::Fallback { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterates_in_assembly_order() {
        let mut tagged = TaggedAddress::new();
        tagged.insert(AddressLabel::OccupancyIdentifier, "5");
        tagged.insert(AddressLabel::StreetName, "main");
        tagged.insert(AddressLabel::AddressNumber, "123");

        let labels: Vec<AddressLabel> = tagged.iter().map(|(label, _)| label).collect();
        assert_eq!(
            labels,
            vec![
                AddressLabel::AddressNumber,
                AddressLabel::StreetName,
                AddressLabel::OccupancyIdentifier,
            ]
        );
    }

    #[test]
    fn appends_to_existing_label() {
        let mut tagged = TaggedAddress::new();
        tagged.append(AddressLabel::OccupancyIdentifier, "5");
        tagged.append(AddressLabel::OccupancyIdentifier, "b");
        assert_eq!(tagged.get(AddressLabel::OccupancyIdentifier), Some("5 b"));
    }

    #[test]
    fn label_display_matches_tag_names() {
        assert_eq!(
            AddressLabel::StreetNamePreDirectional.to_string(),
            "StreetNamePreDirectional"
        );
        assert_eq!(
            "OccupancyType".parse::<AddressLabel>().ok(),
            Some(AddressLabel::OccupancyType)
        );
    }

    #[test]
    fn labels_sort_in_assembly_order() {
        let labels = [
            AddressLabel::AddressNumber,
            AddressLabel::StreetNamePreDirectional,
            AddressLabel::StreetName,
            AddressLabel::StreetNamePostType,
            AddressLabel::StreetNamePostDirectional,
            AddressLabel::SubaddressType,
            AddressLabel::SubaddressIdentifier,
            AddressLabel::OccupancyType,
            AddressLabel::OccupancyIdentifier,
        ];
        for window in labels.windows(2) {
            assert!(window[0] < window[1]);
        }
    }

    #[test]
    fn detects_fallback() {
        let normalized = NormalizedAddress {
            value: "x".to_string(),
            normalization: Normalization::Fallback {
                reason: "bad".to_string(),
            },
        };
        assert!(normalized.is_fallback());
    }
}
