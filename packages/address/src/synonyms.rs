#![allow(clippy::too_many_lines)]
//! Directional, street suffix, and secondary unit tables.
//!
//! Every key is lowercase with periods removed. The tables are built once
//! on first use and never mutated.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

/// Maps full compass words to their one or two letter abbreviation.
static DIRECTIONS: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    BTreeMap::from([
        ("east", "e"),
        ("west", "w"),
        ("north", "n"),
        ("south", "s"),
        ("northeast", "ne"),
        ("northwest", "nw"),
        ("southeast", "se"),
        ("southwest", "sw"),
    ])
});

/// Maps full street suffix words to their USPS abbreviation.
///
/// Source: USPS Publication 28 (Appendix C) street suffix abbreviations.
static STREET_SUFFIXES: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    BTreeMap::from([
        ("alley", "aly"),
        ("annex", "anx"),
        ("arcade", "arc"),
        ("avenue", "ave"),
        ("bayou", "byu"),
        ("beach", "bch"),
        ("bend", "bnd"),
        ("bluff", "blf"),
        ("bluffs", "blfs"),
        ("bottom", "btm"),
        ("boulevard", "blvd"),
        ("branch", "br"),
        ("bridge", "brg"),
        ("brook", "brk"),
        ("brooks", "brks"),
        ("burg", "bg"),
        ("burgs", "bgs"),
        ("bypass", "byp"),
        ("camp", "cp"),
        ("canyon", "cyn"),
        ("cape", "cpe"),
        ("causeway", "cswy"),
        ("center", "ctr"),
        ("circle", "cir"),
        ("circles", "cirs"),
        ("cliff", "clf"),
        ("cliffs", "clfs"),
        ("club", "clb"),
        ("common", "cmn"),
        ("commons", "cmns"),
        ("corner", "cor"),
        ("corners", "cors"),
        ("course", "crse"),
        ("court", "ct"),
        ("courts", "cts"),
        ("cove", "cv"),
        ("coves", "cvs"),
        ("creek", "crk"),
        ("crescent", "cres"),
        ("crest", "crst"),
        ("crossing", "xing"),
        ("crossroad", "xrd"),
        ("crossroads", "xrds"),
        ("curve", "curv"),
        ("dale", "dl"),
        ("dam", "dm"),
        ("divide", "dv"),
        ("drive", "dr"),
        ("drives", "drs"),
        ("estate", "est"),
        ("estates", "ests"),
        ("expressway", "expy"),
        ("extension", "ext"),
        ("extensions", "exts"),
        ("falls", "fls"),
        ("ferry", "fry"),
        ("field", "fld"),
        ("fields", "flds"),
        ("flat", "flt"),
        ("flats", "flts"),
        ("ford", "frd"),
        ("fords", "frds"),
        ("forest", "frst"),
        ("forge", "frg"),
        ("forges", "frgs"),
        ("fork", "frk"),
        ("forks", "frks"),
        ("fort", "ft"),
        ("freeway", "fwy"),
        ("garden", "gdn"),
        ("gardens", "gdns"),
        ("gateway", "gtwy"),
        ("glen", "gln"),
        ("glens", "glns"),
        ("green", "grn"),
        ("greens", "grns"),
        ("grove", "grv"),
        ("groves", "grvs"),
        ("harbor", "hbr"),
        ("harbors", "hbrs"),
        ("haven", "hvn"),
        ("heights", "hts"),
        ("highway", "hwy"),
        ("hill", "hl"),
        ("hills", "hls"),
        ("hollow", "holw"),
        ("inlet", "inlt"),
        ("island", "is"),
        ("islands", "iss"),
        ("junction", "jct"),
        ("junctions", "jcts"),
        ("key", "ky"),
        ("keys", "kys"),
        ("knoll", "knl"),
        ("knolls", "knls"),
        ("lake", "lk"),
        ("lakes", "lks"),
        ("landing", "lndg"),
        ("lane", "ln"),
        ("light", "lgt"),
        ("lights", "lgts"),
        ("loaf", "lf"),
        ("lock", "lck"),
        ("locks", "lcks"),
        ("lodge", "ldg"),
        ("manor", "mnr"),
        ("manors", "mnrs"),
        ("meadow", "mdw"),
        ("meadows", "mdws"),
        ("mill", "ml"),
        ("mills", "mls"),
        ("mission", "msn"),
        ("mount", "mt"),
        ("mountain", "mtn"),
        ("mountains", "mtns"),
        ("neck", "nck"),
        ("orchard", "orch"),
        ("overlook", "ovlk"),
        ("parkway", "pkwy"),
        ("parkways", "pkwys"),
        ("passage", "psge"),
        ("pine", "pne"),
        ("pines", "pnes"),
        ("place", "pl"),
        ("plain", "pln"),
        ("plains", "plns"),
        ("plaza", "plz"),
        ("point", "pt"),
        ("points", "pts"),
        ("port", "prt"),
        ("ports", "prts"),
        ("prairie", "pr"),
        ("radial", "radl"),
        ("ranch", "rnch"),
        ("rapid", "rpd"),
        ("rapids", "rpds"),
        ("rest", "rst"),
        ("ridge", "rdg"),
        ("ridges", "rdgs"),
        ("river", "riv"),
        ("road", "rd"),
        ("roads", "rds"),
        ("route", "rte"),
        ("shoal", "shl"),
        ("shoals", "shls"),
        ("shore", "shr"),
        ("shores", "shrs"),
        ("skyway", "skwy"),
        ("spring", "spg"),
        ("springs", "spgs"),
        ("square", "sq"),
        ("squares", "sqs"),
        ("station", "sta"),
        ("stravenue", "stra"),
        ("stream", "strm"),
        ("street", "st"),
        ("streets", "sts"),
        ("summit", "smt"),
        ("terrace", "ter"),
        ("throughway", "trwy"),
        ("trace", "trce"),
        ("track", "trak"),
        ("trail", "trl"),
        ("trailer", "trlr"),
        ("tunnel", "tunl"),
        ("turnpike", "tpke"),
        ("union", "un"),
        ("unions", "uns"),
        ("valley", "vly"),
        ("valleys", "vlys"),
        ("viaduct", "via"),
        ("view", "vw"),
        ("views", "vws"),
        ("village", "vlg"),
        ("villages", "vlgs"),
        ("ville", "vl"),
        ("vista", "vis"),
        ("well", "wl"),
        ("wells", "wls"),
    ])
});

/// Non-standard suffix abbreviations seen in source data, mapped to the
/// USPS abbreviation.
static SUFFIX_ALIASES: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    BTreeMap::from([
        ("av", "ave"),
        ("blv", "blvd"),
        ("cntr", "ctr"),
        ("pky", "pkwy"),
        ("str", "st"),
    ])
});

/// Suffixes whose full form and abbreviation are the same word.
static SELF_ABBREVIATED_SUFFIXES: &[&str] = &[
    "loop", "mall", "pass", "path", "pike", "row", "run", "spur", "walk", "way",
];

/// Every recognized suffix spelling (full, abbreviated, or alias).
static SUFFIX_SPELLINGS: LazyLock<BTreeSet<&'static str>> = LazyLock::new(|| {
    STREET_SUFFIXES
        .iter()
        .flat_map(|(full, abbrev)| [*full, *abbrev])
        .chain(SUFFIX_ALIASES.keys().copied())
        .chain(SELF_ABBREVIATED_SUFFIXES.iter().copied())
        .collect()
});

/// Secondary unit words replaced inside secondary designators, in the
/// order they are applied.
pub static SECONDARY_REPLACEMENTS: &[(&str, &str)] = &[
    ("apartment", "apt"),
    ("building", "bldg"),
    ("floor", "fl"),
    ("suite", "ste"),
    ("room", "rm"),
    ("department", "dept"),
];

/// Which component family a secondary designator belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesignatorKind {
    /// Building-level (`bldg`, `fl`).
    Subaddress,
    /// Unit-level (`apt`, `ste`, `#`).
    Occupancy,
}

/// Maps every recognized secondary designator spelling to its family.
static DESIGNATORS: LazyLock<BTreeMap<&'static str, DesignatorKind>> = LazyLock::new(|| {
    use DesignatorKind::{Occupancy, Subaddress};

    BTreeMap::from([
        ("building", Subaddress),
        ("bldg", Subaddress),
        ("floor", Subaddress),
        ("fl", Subaddress),
        ("department", Subaddress),
        ("dept", Subaddress),
        ("wing", Subaddress),
        ("pier", Subaddress),
        ("hangar", Subaddress),
        ("hngr", Subaddress),
        ("apartment", Occupancy),
        ("apt", Occupancy),
        ("suite", Occupancy),
        ("ste", Occupancy),
        ("room", Occupancy),
        ("rm", Occupancy),
        ("unit", Occupancy),
        ("lot", Occupancy),
        ("space", Occupancy),
        ("spc", Occupancy),
        ("trailer", Occupancy),
        ("trlr", Occupancy),
        ("office", Occupancy),
        ("ofc", Occupancy),
        ("penthouse", Occupancy),
        ("ph", Occupancy),
        ("#", Occupancy),
    ])
});

/// Returns the abbreviation for a full compass word, if it is one.
#[must_use]
pub fn direction_abbreviation(word: &str) -> Option<&'static str> {
    DIRECTIONS.get(word).copied()
}

/// Returns the canonical abbreviation for a street suffix spelling.
///
/// Full words and non-standard aliases map to the USPS abbreviation.
/// Returns `None` for words that are already canonical or unknown.
#[must_use]
pub fn suffix_abbreviation(word: &str) -> Option<&'static str> {
    STREET_SUFFIXES
        .get(word)
        .or_else(|| SUFFIX_ALIASES.get(word))
        .copied()
}

/// Returns `true` if the (lowercase, period-free) token is a compass
/// direction in full or abbreviated form.
#[must_use]
pub fn is_directional(token: &str) -> bool {
    DIRECTIONS.contains_key(token) || DIRECTIONS.values().any(|abbrev| *abbrev == token)
}

/// Returns `true` if the (lowercase, period-free) token is a street
/// suffix in any recognized spelling.
#[must_use]
pub fn is_street_type(token: &str) -> bool {
    SUFFIX_SPELLINGS.contains(token)
}

/// Returns the family of a secondary designator, if the token is one.
#[must_use]
pub fn designator_kind(token: &str) -> Option<DesignatorKind> {
    DESIGNATORS.get(token).copied()
}
