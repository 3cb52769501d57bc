//! Splitting free-form street addresses into labeled components.
//!
//! The [`AddressTagger`] trait is the seam between the canonicalization
//! pipeline and whatever does the parsing. [`RuleTagger`] is the built-in
//! deterministic implementation for single-line US street addresses.

use helix_address_models::{AddressLabel, TaggedAddress};

use crate::synonyms::{self, DesignatorKind};

/// Range separators that may appear as their own token (`123 - 125`).
const RANGE_SEPARATORS: &[char] = &['-', '/', '\\'];

/// Errors raised when an address cannot be tagged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    /// Two tokens claimed the same component label.
    #[error("Repeated label {label}: '{first}' and '{second}'")]
    RepeatedLabel {
        /// The label assigned twice.
        label: AddressLabel,
        /// Value already tagged with the label.
        first: String,
        /// Conflicting token.
        second: String,
    },

    /// The address contains a character the tagger cannot handle.
    #[error("Unsupported character {character:?} at byte {position}")]
    Encoding {
        /// The offending character.
        character: char,
        /// Byte offset in the input.
        position: usize,
    },
}

/// Splits an address string into labeled components.
pub trait AddressTagger: Send + Sync {
    /// Tags `address`.
    ///
    /// # Errors
    ///
    /// Returns [`TagError`] if the address is irreconcilable (conflicting
    /// labels) or contains unsupported characters.
    fn tag(&self, address: &str) -> Result<TaggedAddress, TagError>;
}

/// Rule-based tagger for US street addresses.
///
/// Recognizes, in order: a leading house number (including ranges split
/// across tokens), the street section (pre-directional, name, suffix,
/// post-directional), and any number of secondary unit designators each
/// followed by an identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleTagger;

impl AddressTagger for RuleTagger {
    fn tag(&self, address: &str) -> Result<TaggedAddress, TagError> {
        if let Some((position, character)) = address.char_indices().find(|(_, c)| !c.is_ascii())
        {
            return Err(TagError::Encoding {
                character,
                position,
            });
        }

        let tokens: Vec<&str> = address
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .collect();

        let mut tagged = TaggedAddress::new();

        let (number, consumed) = take_address_number(&tokens);
        if let Some(number) = number {
            tagged.insert(AddressLabel::AddressNumber, number);
        }

        let rest = &tokens[consumed..];
        // A designator only starts the unit section once at least one
        // street token has been seen.
        let unit_start = rest
            .iter()
            .skip(1)
            .position(|t| classify_designator(t).is_some())
            .map_or(rest.len(), |i| i + 1);

        tag_street(&rest[..unit_start], &mut tagged);
        tag_units(&rest[unit_start..], &mut tagged)?;

        log::trace!("Tagged '{address}' as {tagged:?}");

        Ok(tagged)
    }
}

/// Lowercases and removes periods for table lookups.
fn lookup_key(token: &str) -> String {
    token.to_ascii_lowercase().replace('.', "")
}

fn is_all_digits(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

fn is_separator(token: &str) -> bool {
    token.len() == 1 && token.starts_with(RANGE_SEPARATORS)
}

/// Extracts the house number from the leading tokens.
///
/// Returns the number (if any) and how many tokens it consumed.
fn take_address_number(tokens: &[&str]) -> (Option<String>, usize) {
    let Some(first) = tokens.first() else {
        return (None, 0);
    };
    if !first.starts_with(|c: char| c.is_ascii_digit()) {
        return (None, 0);
    }

    match tokens.get(1..) {
        // `123- 125`
        Some([next, ..]) if first.ends_with(RANGE_SEPARATORS) && is_all_digits(next) => {
            (Some(format!("{first} {next}")), 2)
        }
        // `123 - 125`
        Some([sep, end, ..]) if is_separator(sep) && is_all_digits(end) => {
            (Some(format!("{first} {sep} {end}")), 3)
        }
        // `123 -125`
        Some([next, ..])
            if next.starts_with(RANGE_SEPARATORS) && is_all_digits(&next[1..]) =>
        {
            (Some(format!("{first} {next}")), 2)
        }
        // `123 125 Main St`
        Some([next, _, ..]) if is_all_digits(first) && is_all_digits(next) => {
            (Some(format!("{first} {next}")), 2)
        }
        _ => (Some((*first).to_string()), 1),
    }
}

/// Tags the street section, peeling suffix and directionals off the ends.
///
/// A component is only split off while at least one other token remains
/// for the street name, so `123 North St` keeps `North` as the name.
fn tag_street(tokens: &[&str], tagged: &mut TaggedAddress) {
    let mut street = tokens;

    if let [head @ .., last] = street
        && !head.is_empty()
        && synonyms::is_directional(&lookup_key(last))
    {
        tagged.insert(AddressLabel::StreetNamePostDirectional, *last);
        street = head;
    }

    if let [head @ .., last] = street
        && !head.is_empty()
        && synonyms::is_street_type(&lookup_key(last))
    {
        tagged.insert(AddressLabel::StreetNamePostType, *last);
        street = head;
    }

    if let [first, tail @ ..] = street
        && !tail.is_empty()
        && synonyms::is_directional(&lookup_key(first))
    {
        tagged.insert(AddressLabel::StreetNamePreDirectional, *first);
        street = tail;
    }

    if !street.is_empty() {
        tagged.insert(AddressLabel::StreetName, street.join(" "));
    }
}

/// A recognized secondary unit designator token.
struct Designator<'a> {
    type_label: AddressLabel,
    id_label: AddressLabel,
    text: &'a str,
    /// Identifier glued to the designator (`#5` carries `5`).
    inline: Option<&'a str>,
}

/// Classifies a token as a secondary unit designator.
fn classify_designator(token: &str) -> Option<Designator<'_>> {
    let (designator, inline) = match token.strip_prefix('#') {
        Some(id) if !id.is_empty() => ("#", Some(id)),
        _ => (token, None),
    };

    let kind = synonyms::designator_kind(&lookup_key(designator))?;
    let (type_label, id_label) = match kind {
        DesignatorKind::Subaddress => (
            AddressLabel::SubaddressType,
            AddressLabel::SubaddressIdentifier,
        ),
        DesignatorKind::Occupancy => (
            AddressLabel::OccupancyType,
            AddressLabel::OccupancyIdentifier,
        ),
    };

    Some(Designator {
        type_label,
        id_label,
        text: designator,
        inline,
    })
}

/// Tags secondary unit designators and their identifiers.
///
/// A `#` right after a designator that has no identifier yet marks that
/// identifier (`Apt #5`, `Unit # 5`) rather than starting a new unit.
fn tag_units(tokens: &[&str], tagged: &mut TaggedAddress) -> Result<(), TagError> {
    let mut identifier_label = None;
    let mut awaiting_identifier = false;

    for token in tokens {
        if awaiting_identifier && let Some(id) = token.strip_prefix('#') {
            if let (Some(label), false) = (identifier_label, id.is_empty()) {
                tagged.append(label, id);
                awaiting_identifier = false;
            }
        } else if let Some(designator) = classify_designator(token) {
            if let Some(first) = tagged.get(designator.type_label) {
                return Err(TagError::RepeatedLabel {
                    label: designator.type_label,
                    first: first.to_string(),
                    second: (*token).to_string(),
                });
            }
            tagged.insert(designator.type_label, designator.text);
            if let Some(id) = designator.inline {
                tagged.insert(designator.id_label, id);
            }
            identifier_label = Some(designator.id_label);
            awaiting_identifier = designator.inline.is_none();
        } else if let Some(label) = identifier_label {
            tagged.append(label, token);
            awaiting_identifier = false;
        }
    }

    Ok(())
}
