//! Canonicalization of individual tagged address components.
//!
//! Every function here is total: unknown input passes through lowercased
//! (and de-dotted where noted) rather than failing.

use regex::Regex;
use std::sync::LazyLock;

use crate::synonyms;

/// Matches a house number range such as `123-125`, `123/125`, `123 125`
/// or `123 - 125`. At least one separator character or whitespace must
/// sit between the two numeric runs. Only the start of the value is
/// anchored; anything after the end run is discarded.
static ADDRESS_NUMBER_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<start>[0-9]+)(?:\s[\\/-]?\s?|[\\/-]\s?)(?P<end>[0-9]+)").expect("valid regex")
});

/// Lowercases and strips periods.
fn lower_without_periods(value: &str) -> String {
    value.to_lowercase().replace('.', "")
}

/// Normalizes a compass direction to its short form (`Northwest` → `nw`).
#[must_use]
pub fn normalize_address_direction(direction: &str) -> String {
    let direction = lower_without_periods(direction);
    synonyms::direction_abbreviation(&direction).map_or(direction, str::to_string)
}

/// Normalizes a street suffix to its USPS abbreviation (`Avenue` → `ave`).
#[must_use]
pub fn normalize_address_post_type(post_type: &str) -> String {
    let value = lower_without_periods(post_type);
    synonyms::suffix_abbreviation(&value).map_or(value, str::to_string)
}

/// Normalizes the numeric portion of an address.
///
/// - strips leading zeros
/// - rewrites ranges with a single dash and no whitespace
/// - restores leading digits omitted from the end of a range
///   (`123-25` → `123-125`)
#[must_use]
pub fn normalize_address_number(address_number: &str) -> String {
    if let Some(caps) = ADDRESS_NUMBER_RANGE_RE.captures(address_number) {
        let start = caps["start"].trim_start_matches('0');
        let mut end = caps["end"].trim_start_matches('0').to_string();

        if end.len() < start.len() {
            let prefix_len = start.len() - end.len();
            end.insert_str(0, &start[..prefix_len]);
        }

        return format!("{start}-{end}");
    }

    address_number.trim_start_matches('0').to_string()
}

/// Normalizes a secondary unit designator (`Apartment` → `apt`).
///
/// Replacement is plain substring replacement, so a known word is also
/// rewritten when embedded in a longer one.
#[must_use]
pub fn normalize_secondary_address(secondary: &str) -> String {
    let mut value = lower_without_periods(secondary);
    for (word, abbrev) in synonyms::SECONDARY_REPLACEMENTS {
        if value.contains(word) {
            value = value.replace(word, abbrev);
        }
    }
    value
}

/// Abbreviates every full street suffix word in an already assembled,
/// lowercase address (`123 main street` → `123 main st`).
#[must_use]
pub fn abbreviate_street_types(address: &str) -> String {
    address
        .split_whitespace()
        .map(|token| synonyms::suffix_abbreviation(token).unwrap_or(token))
        .collect::<Vec<_>>()
        .join(" ")
}
