//! Priority-ordered property matching.

use helix_address::{normalize_address_str, normalize_postal_code};

use crate::{
    MatchStrategy, NewProperty, PropertyMatch, PropertyMatchQuery, PropertyRecord,
    PropertyRepository, StoreError,
};

/// Finds existing properties for `query`.
///
/// Strategies are tried in order and the first non-empty result wins:
///
/// 1. `property_id`: direct lookup, no other filters.
/// 2. `property_uid`: case-insensitive substring match on UBID or custom
///    id, narrowed by organization and postal code.
/// 3. `street` + `postal_code`: the street is normalized and compared
///    against each record's `normalized_address`.
///
/// No match is not an error: an empty [`PropertyMatch`] is returned.
///
/// # Errors
///
/// Returns [`StoreError`] if the repository fails.
pub fn propertyview_find(
    repo: &impl PropertyRepository,
    query: &PropertyMatchQuery,
) -> Result<PropertyMatch, StoreError> {
    let postal_code = query
        .postal_code
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .map(normalize_postal_code);

    if let Some(id) = query.property_id {
        if let Some(record) = repo.get(id)? {
            return Ok(matched(MatchStrategy::Id, vec![record]));
        }
        log::debug!("No property with id {id}");
    }

    if let Some(uid) = query.property_uid.as_deref().map(str::trim)
        && !uid.is_empty()
    {
        let records = repo.find_by_external_id(uid, query.organization, postal_code.as_deref())?;
        if !records.is_empty() {
            return Ok(matched(MatchStrategy::ExternalId, records));
        }
        log::debug!("No property with external id '{uid}'");
    }

    if let Some(street) = query.street.as_deref()
        && let Some(postal_code) = postal_code.as_deref()
        && let Some(normalized) = normalize_address_str(street, "")
    {
        let records =
            repo.find_by_normalized_address(&normalized, query.organization, Some(postal_code))?;
        if !records.is_empty() {
            return Ok(matched(MatchStrategy::NormalizedAddress, records));
        }
        log::debug!("No property at '{normalized}' {postal_code}");
    }

    Ok(PropertyMatch::none())
}

const fn matched(strategy: MatchStrategy, records: Vec<PropertyRecord>) -> PropertyMatch {
    PropertyMatch {
        strategy: Some(strategy),
        records,
    }
}

/// Returns the existing property matching `property`, or inserts it.
///
/// External ids are tried first and must equal a stored UBID or custom
/// id (ignoring case). Then the normalized address (both lines) is tried
/// within the same postal code. When several records match, the
/// lowest id is used. The returned flag is `true` if a new record was
/// created.
///
/// # Errors
///
/// Returns [`StoreError`] if the repository fails.
pub fn find_or_create(
    repo: &mut impl PropertyRepository,
    property: NewProperty,
) -> Result<(PropertyRecord, bool), StoreError> {
    if let Some(record) = find_existing(repo, &property)? {
        log::debug!("Matched existing property {}", record.id);
        return Ok((record, false));
    }

    repo.insert(property).map(|record| (record, true))
}

fn find_existing(
    repo: &impl PropertyRepository,
    property: &NewProperty,
) -> Result<Option<PropertyRecord>, StoreError> {
    let address = &property.address;
    let postal_code = address
        .postal_code
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .map(normalize_postal_code);

    let mut by_uid = Vec::new();
    for uid in [&property.ubid, &property.custom_id_1]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .map(str::trim)
        .filter(|uid| !uid.is_empty())
    {
        by_uid.extend(
            repo.find_by_external_id(uid, property.organization_id, postal_code.as_deref())?
                .into_iter()
                .filter(|record| has_external_id(record, uid)),
        );
    }
    if let Some(record) = by_uid.into_iter().min_by_key(|r| r.id) {
        return Ok(Some(record));
    }

    // Secondary units take part in address identity.
    let Some(normalized) = address.address_line_1.as_deref().and_then(|line1| {
        normalize_address_str(line1, address.address_line_2.as_deref().unwrap_or_default())
    }) else {
        return Ok(None);
    };

    Ok(repo
        .find_by_normalized_address(&normalized, property.organization_id, postal_code.as_deref())?
        .into_iter()
        .min_by_key(|r| r.id))
}

/// Returns `true` if `record` carries `uid` as its UBID or custom id,
/// ignoring case.
fn has_external_id(record: &PropertyRecord, uid: &str) -> bool {
    [&record.ubid, &record.custom_id_1]
        .into_iter()
        .flatten()
        .any(|id| id.trim().to_lowercase() == uid.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryPropertyStore, RawAddress};

    const STORE_CSV: &str = "\
id,organization_id,ubid,custom_id_1,address_line_1,address_line_2,city,state,postal_code
1,1,87G8Q2CV+WX,,123 Main Street,,Burlington,VT,05401
2,1,,INT-0042,55 Elm St,,Montpelier,VT,05602
3,2,,,55 Elm Street,,Montpelier,VT,05602
";

    fn store() -> MemoryPropertyStore {
        MemoryPropertyStore::from_csv_reader(STORE_CSV.as_bytes()).unwrap()
    }

    fn ids(found: &PropertyMatch) -> Vec<u64> {
        found.records.iter().map(|r| r.id).collect()
    }

    fn new_property(line1: &str, line2: Option<&str>, postal_code: &str) -> NewProperty {
        NewProperty {
            organization_id: Some(1),
            address: RawAddress {
                address_line_1: Some(line1.to_string()),
                address_line_2: line2.map(str::to_string),
                postal_code: Some(postal_code.to_string()),
            },
            ..NewProperty::default()
        }
    }

    #[test]
    fn id_takes_precedence_over_address() {
        let query = PropertyMatchQuery {
            property_id: Some(1),
            street: Some("55 Elm St".to_string()),
            postal_code: Some("05602".to_string()),
            ..PropertyMatchQuery::default()
        };
        let found = propertyview_find(&store(), &query).unwrap();
        assert_eq!(found.strategy, Some(MatchStrategy::Id));
        assert_eq!(ids(&found), vec![1]);
    }

    #[test]
    fn missing_id_falls_through() {
        let query = PropertyMatchQuery {
            property_id: Some(99),
            property_uid: Some("int-0042".to_string()),
            ..PropertyMatchQuery::default()
        };
        let found = propertyview_find(&store(), &query).unwrap();
        assert_eq!(found.strategy, Some(MatchStrategy::ExternalId));
        assert_eq!(ids(&found), vec![2]);
    }

    #[test]
    fn external_id_uses_normalized_postal_code() {
        let query = PropertyMatchQuery {
            property_uid: Some("87g8q2".to_string()),
            postal_code: Some("5401".to_string()),
            ..PropertyMatchQuery::default()
        };
        let found = propertyview_find(&store(), &query).unwrap();
        assert_eq!(ids(&found), vec![1]);
    }

    #[test]
    fn matches_by_normalized_address() {
        let query = PropertyMatchQuery {
            street: Some("55 ELM STREET".to_string()),
            postal_code: Some("5602".to_string()),
            ..PropertyMatchQuery::default()
        };
        let found = propertyview_find(&store(), &query).unwrap();
        assert_eq!(found.strategy, Some(MatchStrategy::NormalizedAddress));
        assert_eq!(ids(&found), vec![2, 3]);

        let query = PropertyMatchQuery {
            organization: Some(2),
            ..query
        };
        assert_eq!(ids(&propertyview_find(&store(), &query).unwrap()), vec![3]);
    }

    #[test]
    fn address_requires_postal_code() {
        let query = PropertyMatchQuery {
            street: Some("55 Elm St".to_string()),
            ..PropertyMatchQuery::default()
        };
        assert!(propertyview_find(&store(), &query).unwrap().is_empty());
    }

    #[test]
    fn no_match_is_empty() {
        let query = PropertyMatchQuery {
            property_id: Some(42),
            property_uid: Some("nope".to_string()),
            street: Some("1 Nowhere Rd".to_string()),
            postal_code: Some("99999".to_string()),
            organization: None,
        };
        let found = propertyview_find(&store(), &query).unwrap();
        assert_eq!(found, PropertyMatch::none());

        let found = propertyview_find(&store(), &PropertyMatchQuery::default()).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn find_or_create_reuses_existing() {
        let mut store = store();
        let (record, created) =
            find_or_create(&mut store, new_property("123 MAIN ST.", None, "5401")).unwrap();
        assert!(!created);
        assert_eq!(record.id, 1);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn find_or_create_inserts_new() {
        let mut store = store();
        let (record, created) =
            find_or_create(&mut store, new_property("9 Oak Avenue", None, "05401")).unwrap();
        assert!(created);
        assert_eq!(record.id, 4);
        assert_eq!(record.normalized_address.as_deref(), Some("9 oak ave"));

        let (again, created) =
            find_or_create(&mut store, new_property("9 Oak Ave", None, "05401")).unwrap();
        assert!(!created);
        assert_eq!(again.id, 4);
    }

    #[test]
    fn find_or_create_requires_exact_external_id() {
        let mut store = MemoryPropertyStore::new();
        let mut existing = new_property("500 Oak Ave", None, "05401");
        existing.custom_id_1 = Some("INT-12".to_string());
        let (existing, _) = find_or_create(&mut store, existing).unwrap();

        let mut incoming = new_property("9 Birch Rd", None, "05401");
        incoming.custom_id_1 = Some("INT-1".to_string());
        let (record, created) = find_or_create(&mut store, incoming).unwrap();
        assert!(created);
        assert_ne!(record.id, existing.id);
        assert_eq!(record.normalized_address.as_deref(), Some("9 birch rd"));

        let mut again = new_property("500 Oak Avenue West", None, "05401");
        again.custom_id_1 = Some("int-12".to_string());
        let (record, created) = find_or_create(&mut store, again).unwrap();
        assert!(!created);
        assert_eq!(record.id, existing.id);
    }

    #[test]
    fn find_or_create_tries_custom_id_after_ubid() {
        let mut store = store();
        let mut property = new_property("1 Somewhere Else", None, "05602");
        property.ubid = Some("UNKNOWN-UBID".to_string());
        property.custom_id_1 = Some("int-0042".to_string());

        let (record, created) = find_or_create(&mut store, property).unwrap();
        assert!(!created);
        assert_eq!(record.id, 2);
    }

    #[test]
    fn find_or_create_distinguishes_units() {
        let mut store = MemoryPropertyStore::new();
        let (a, _) =
            find_or_create(&mut store, new_property("10 Pine St", Some("Apt 1"), "05401")).unwrap();
        let (b, created) =
            find_or_create(&mut store, new_property("10 Pine St", Some("Apt 2"), "05401")).unwrap();
        assert!(created);
        assert_ne!(a.id, b.id);

        let (c, created) = find_or_create(
            &mut store,
            new_property("10 Pine Street", Some("Apartment 2"), "05401"),
        )
        .unwrap();
        assert!(!created);
        assert_eq!(c.id, b.id);
    }
}
