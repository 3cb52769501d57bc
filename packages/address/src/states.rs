//! US state and territory name lookup.

use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Full state/territory names mapped to USPS two-letter codes.
///
/// Covers the 50 states, the District of Columbia, and the five inhabited
/// territories.
pub static STATES: &[(&str, &str)] = &[
    ("Alaska", "AK"),
    ("Alabama", "AL"),
    ("Arkansas", "AR"),
    ("American Samoa", "AS"),
    ("Arizona", "AZ"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("District of Columbia", "DC"),
    ("Delaware", "DE"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Guam", "GU"),
    ("Hawaii", "HI"),
    ("Iowa", "IA"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Massachusetts", "MA"),
    ("Maryland", "MD"),
    ("Maine", "ME"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Missouri", "MO"),
    ("Northern Mariana Islands", "MP"),
    ("Mississippi", "MS"),
    ("Montana", "MT"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Nebraska", "NE"),
    ("New Hampshire", "NH"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("Nevada", "NV"),
    ("New York", "NY"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Puerto Rico", "PR"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Virginia", "VA"),
    ("Virgin Islands", "VI"),
    ("Vermont", "VT"),
    ("Washington", "WA"),
    ("Wisconsin", "WI"),
    ("West Virginia", "WV"),
    ("Wyoming", "WY"),
];

/// Lowercased full names mapped to codes, so lookups ignore casing of
/// connecting words such as "of".
static STATES_BY_LOWERCASE_NAME: LazyLock<BTreeMap<String, &'static str>> = LazyLock::new(|| {
    STATES
        .iter()
        .map(|(name, code)| (name.to_lowercase(), *code))
        .collect()
});

/// Normalizes a state value to its two-letter USPS abbreviation.
///
/// Values of two characters or fewer are assumed to be abbreviations
/// already and are uppercased. Longer values are looked up by name
/// regardless of case; unknown names are returned unchanged.
#[must_use]
pub fn normalize_state(value: &str) -> String {
    if value.chars().count() <= 2 {
        return value.to_uppercase();
    }

    let key = value.split_whitespace().collect::<Vec<_>>().join(" ");
    STATES_BY_LOWERCASE_NAME
        .get(&key.to_lowercase())
        .map_or_else(|| value.to_string(), |code| (*code).to_string())
}
