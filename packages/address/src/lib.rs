#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Street address canonicalization for property matching.
//!
//! Produces a stable lowercase key from free-form address lines so that
//! records imported from independently authored files collapse onto the
//! same property. "123 Main Street", "123 MAIN ST" and "123 main st."
//! all normalize to `123 main st`.
//!
//! # Pipeline
//!
//! 1. **Tag**: an [`AddressTagger`] splits the address into labeled
//!    components (number, directionals, street name, suffix, units).
//! 2. **Normalize**: each component is canonicalized by the functions in
//!    [`components`].
//! 3. **Assemble**: components are joined in a fixed order, then a
//!    whole-string suffix abbreviation pass runs and the result is
//!    lowercased.
//!
//! If tagging fails the lightly cleaned input is used as-is, and the
//! reason is kept in [`Normalization::Fallback`].
//!
//! ```rust
//! use helix_address::normalize_address_str;
//!
//! assert_eq!(
//!     normalize_address_str("123 Main Street", "Apartment 4").as_deref(),
//!     Some("123 main st apt 4")
//! );
//! assert_eq!(normalize_address_str("", ""), None);
//! ```

pub mod components;
pub mod states;
pub mod synonyms;
pub mod tagger;

use std::collections::BTreeMap;
use std::sync::LazyLock;

pub use components::{
    normalize_address_direction, normalize_address_number, normalize_address_post_type,
    normalize_secondary_address,
};
pub use helix_address_models::{AddressLabel, Normalization, NormalizedAddress, TaggedAddress};
pub use states::normalize_state;
pub use tagger::{AddressTagger, RuleTagger, TagError};

/// Key under which [`normalize_with_extra_data`] records a tagging failure.
pub const FALLBACK_EXTRA_DATA_KEY: &str = "normalization_fallback";

/// Minimum postal code length; shorter values are left-padded with zeros.
pub const POSTAL_CODE_LENGTH: usize = 5;

/// Characters left behind by upstream encoding failures.
const REPLACEMENT_CHARACTERS: &[char] = &['\u{FFFD}'];

static DEFAULT_NORMALIZER: LazyLock<AddressNormalizer<RuleTagger>> =
    LazyLock::new(AddressNormalizer::default);

/// Canonicalizes address lines using a pluggable [`AddressTagger`].
#[derive(Debug, Clone, Default)]
pub struct AddressNormalizer<T> {
    tagger: T,
}

impl<T: AddressTagger> AddressNormalizer<T> {
    /// Creates a normalizer backed by `tagger`.
    #[must_use]
    pub const fn new(tagger: T) -> Self {
        Self { tagger }
    }

    /// Normalizes `line1` (plus optional `line2`) to a canonical string.
    ///
    /// Returns `None` if `line1` is empty.
    #[must_use]
    pub fn normalize(&self, line1: &str, line2: &str) -> Option<String> {
        self.normalize_with_diagnostics(line1, line2)
            .map(|normalized| normalized.value)
    }

    /// Normalizes address lines and reports whether tagging succeeded.
    ///
    /// `line2` is appended to `line1` before tagging so secondary unit
    /// information in the second line is captured. Returns `None` if
    /// `line1` is empty or whitespace.
    #[must_use]
    pub fn normalize_with_diagnostics(
        &self,
        line1: &str,
        line2: &str,
    ) -> Option<NormalizedAddress> {
        if line1.trim().is_empty() {
            return None;
        }

        let line1 = strip_replacement_characters(line1);
        let line2 = strip_replacement_characters(line2);
        let input = if line2.trim().is_empty() {
            line1.clone()
        } else {
            format!("{line1} {line2}")
        };

        let (value, normalization) = match self.tagger.tag(&input) {
            Ok(tagged) => match assemble(&tagged) {
                Some(assembled) => (assembled, Normalization::Tagged),
                None => fallback(&line1, "no address components tagged".to_string()),
            },
            Err(e) => fallback(&line1, e.to_string()),
        };

        Some(NormalizedAddress {
            value: value.trim().to_string(),
            normalization,
        })
    }
}

fn fallback(line1: &str, reason: String) -> (String, Normalization) {
    log::debug!("Falling back to raw address '{line1}': {reason}");
    (line1.to_lowercase(), Normalization::Fallback { reason })
}

fn strip_replacement_characters(value: &str) -> String {
    value.replace(REPLACEMENT_CHARACTERS, "")
}

/// Joins canonicalized components in label order.
///
/// Returns `None` if every component normalized to an empty string.
fn assemble(tagged: &TaggedAddress) -> Option<String> {
    let parts: Vec<String> = tagged
        .iter()
        .map(|(label, value)| match label {
            AddressLabel::AddressNumber
            | AddressLabel::SubaddressIdentifier
            | AddressLabel::OccupancyIdentifier => normalize_address_number(value),
            AddressLabel::StreetNamePreDirectional | AddressLabel::StreetNamePostDirectional => {
                normalize_address_direction(value)
            }
            AddressLabel::StreetName => value.to_string(),
            AddressLabel::StreetNamePostType => normalize_address_post_type(value),
            AddressLabel::SubaddressType | AddressLabel::OccupancyType => {
                normalize_secondary_address(value)
            }
        })
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        return None;
    }

    let joined = parts.join(" ").to_lowercase();
    Some(components::abbreviate_street_types(&joined))
}

/// Normalizes an address with the built-in [`RuleTagger`].
///
/// Returns `None` if `line1` is empty. See [`AddressNormalizer`].
#[must_use]
pub fn normalize_address_str(line1: &str, line2: &str) -> Option<String> {
    DEFAULT_NORMALIZER.normalize(line1, line2)
}

/// Normalizes an address with the built-in [`RuleTagger`], keeping the
/// [`Normalization`] diagnostic.
#[must_use]
pub fn normalize_address_with_diagnostics(line1: &str, line2: &str) -> Option<NormalizedAddress> {
    DEFAULT_NORMALIZER.normalize_with_diagnostics(line1, line2)
}

/// Normalizes an address and records a tagging failure in `extra_data`
/// under [`FALLBACK_EXTRA_DATA_KEY`]. `extra_data` is left untouched when
/// tagging succeeds.
pub fn normalize_with_extra_data(
    line1: &str,
    line2: &str,
    extra_data: &mut BTreeMap<String, String>,
) -> Option<String> {
    let normalized = normalize_address_with_diagnostics(line1, line2)?;
    if let Normalization::Fallback { reason } = normalized.normalization {
        extra_data.insert(FALLBACK_EXTRA_DATA_KEY.to_string(), reason);
    }
    Some(normalized.value)
}

/// Normalizes a postal code to at least [`POSTAL_CODE_LENGTH`] characters.
///
/// Restores leading zeros dropped by spreadsheets (`5720` → `05720`).
#[must_use]
pub fn normalize_postal_code(value: &str) -> String {
    let trimmed = value.trim();
    format!("{trimmed:0>width$}", width = POSTAL_CODE_LENGTH)
}
