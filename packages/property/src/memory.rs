//! In-memory property store, optionally loaded from and saved to CSV.

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    NewProperty, PropertyRecord, PropertyRepository, RawAddress, StoreError, matches_filters,
    normalize_property,
};

/// Labels used in errors for CSV data that is not backed by a file.
const READER_LABEL: &str = "<reader>";
const WRITER_LABEL: &str = "<writer>";

/// One row of a property store CSV file.
///
/// `extra_data` is stored as a JSON object in a single column.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PropertyRow {
    id: Option<u64>,
    organization_id: Option<u64>,
    ubid: Option<String>,
    custom_id_1: Option<String>,
    address_line_1: Option<String>,
    address_line_2: Option<String>,
    city: Option<String>,
    state: Option<String>,
    postal_code: Option<String>,
    extra_data: Option<String>,
}

impl TryFrom<&PropertyRecord> for PropertyRow {
    type Error = serde_json::Error;

    fn try_from(record: &PropertyRecord) -> Result<Self, Self::Error> {
        let extra_data = if record.extra_data.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&record.extra_data)?)
        };

        Ok(Self {
            id: Some(record.id),
            organization_id: record.organization_id,
            ubid: record.ubid.clone(),
            custom_id_1: record.custom_id_1.clone(),
            address_line_1: record.address_line_1.clone(),
            address_line_2: record.address_line_2.clone(),
            city: record.city.clone(),
            state: record.state.clone(),
            postal_code: record.postal_code.clone(),
            extra_data,
        })
    }
}

impl TryFrom<PropertyRow> for NewProperty {
    type Error = serde_json::Error;

    fn try_from(row: PropertyRow) -> Result<Self, Self::Error> {
        let extra_data = match row.extra_data.as_deref().map(str::trim) {
            Some(json) if !json.is_empty() => serde_json::from_str(json)?,
            _ => BTreeMap::new(),
        };

        Ok(Self {
            organization_id: row.organization_id,
            ubid: row.ubid,
            custom_id_1: row.custom_id_1,
            address: RawAddress {
                address_line_1: row.address_line_1,
                address_line_2: row.address_line_2,
                postal_code: row.postal_code,
            },
            city: row.city,
            state: row.state,
            extra_data,
        })
    }
}

/// A [`PropertyRepository`] held entirely in memory.
///
/// Ids are assigned in increasing order starting at 1.
#[derive(Debug, Clone)]
pub struct MemoryPropertyStore {
    records: BTreeMap<u64, PropertyRecord>,
    next_id: u64,
}

impl Default for MemoryPropertyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPropertyStore {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Loads a store from a CSV file.
    ///
    /// Expected columns: `id, organization_id, ubid, custom_id_1,
    /// address_line_1, address_line_2, city, state, postal_code,
    /// extra_data`. Rows without an `id` are assigned the next free id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be parsed, contains
    /// duplicate ids, or runs out of ids.
    pub fn from_csv_path(path: &Path) -> Result<Self, StoreError> {
        let reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| StoreError::Csv {
                path: path.display().to_string(),
                source: e,
            })?;
        Self::from_csv(reader, &path.display().to_string())
    }

    /// Loads a store from CSV data. See [`Self::from_csv_path`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the data cannot be parsed or contains
    /// duplicate ids.
    pub fn from_csv_reader(reader: impl Read) -> Result<Self, StoreError> {
        let reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        Self::from_csv(reader, READER_LABEL)
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>, label: &str) -> Result<Self, StoreError> {
        let mut store = Self::new();
        let mut pending = Vec::new();

        for result in reader.deserialize::<PropertyRow>() {
            let row = result.map_err(|e| StoreError::Csv {
                path: label.to_string(),
                source: e,
            })?;

            match row.id {
                Some(id) => store.insert_with_id(id, row.try_into()?)?,
                None => pending.push(row),
            }
        }

        // Rows without ids are numbered after every explicit id is known.
        for row in pending {
            store.insert(row.try_into()?)?;
        }

        log::info!("Loaded {} properties from {label}", store.len());

        Ok(store)
    }

    /// Writes every record as CSV, in id order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if writing fails.
    pub fn write_csv(&self, writer: impl Write) -> Result<(), StoreError> {
        let mut writer = csv::Writer::from_writer(writer);
        for record in self.records.values() {
            writer
                .serialize(PropertyRow::try_from(record)?)
                .map_err(|e| StoreError::Csv {
                    path: WRITER_LABEL.to_string(),
                    source: e,
                })?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Inserts a property with an explicit id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] if the id is taken, or
    /// [`StoreError::IdOverflow`] if `id` is the largest possible id.
    pub fn insert_with_id(&mut self, id: u64, property: NewProperty) -> Result<(), StoreError> {
        if self.records.contains_key(&id) {
            return Err(StoreError::DuplicateId(id));
        }
        let next_id = id.checked_add(1).ok_or(StoreError::IdOverflow(id))?;
        self.records.insert(id, normalize_property(id, property));
        self.next_id = self.next_id.max(next_id);
        Ok(())
    }

    /// Number of stored properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the store holds no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates records in id order.
    pub fn records(&self) -> impl Iterator<Item = &PropertyRecord> {
        self.records.values()
    }

    fn filtered(
        &self,
        organization: Option<u64>,
        postal_code: Option<&str>,
        predicate: impl Fn(&PropertyRecord) -> bool,
    ) -> Vec<PropertyRecord> {
        self.records
            .values()
            .filter(|r| matches_filters(r, organization, postal_code) && predicate(r))
            .cloned()
            .collect()
    }
}

impl PropertyRepository for MemoryPropertyStore {
    fn get(&self, id: u64) -> Result<Option<PropertyRecord>, StoreError> {
        Ok(self.records.get(&id).cloned())
    }

    fn find_by_external_id(
        &self,
        uid: &str,
        organization: Option<u64>,
        postal_code: Option<&str>,
    ) -> Result<Vec<PropertyRecord>, StoreError> {
        let needle = uid.to_lowercase();
        Ok(self.filtered(organization, postal_code, |record| {
            [&record.ubid, &record.custom_id_1]
                .into_iter()
                .flatten()
                .any(|id| id.to_lowercase().contains(&needle))
        }))
    }

    fn find_by_normalized_address(
        &self,
        normalized_address: &str,
        organization: Option<u64>,
        postal_code: Option<&str>,
    ) -> Result<Vec<PropertyRecord>, StoreError> {
        Ok(self.filtered(organization, postal_code, |record| {
            record.normalized_address.as_deref() == Some(normalized_address)
        }))
    }

    fn insert(&mut self, property: NewProperty) -> Result<PropertyRecord, StoreError> {
        let id = self.next_id;
        let next_id = id.checked_add(1).ok_or(StoreError::IdOverflow(id))?;
        let record = normalize_property(id, property);
        self.records.insert(id, record.clone());
        self.next_id = next_id;
        log::debug!(
            "Created property {id} at {:?}",
            record.normalized_address.as_deref().unwrap_or_default()
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORE_CSV: &str = "\
id,organization_id,ubid,custom_id_1,address_line_1,address_line_2,city,state,postal_code
10,1,87G8Q2CV+WX,,123 Main Street,,Burlington,Vermont,5401
,1,,INT-0042,55 Elm St,Apt 4,Montpelier,VT,05602
";

    #[test]
    fn loads_csv_and_assigns_missing_ids() {
        let store = MemoryPropertyStore::from_csv_reader(STORE_CSV.as_bytes()).unwrap();
        assert_eq!(store.len(), 2);

        let first = store.get(10).unwrap().unwrap();
        assert_eq!(first.normalized_address.as_deref(), Some("123 main st"));
        assert_eq!(first.postal_code.as_deref(), Some("05401"));
        assert_eq!(first.state.as_deref(), Some("VT"));
        assert_eq!(first.custom_id_1, None);

        let second = store.get(11).unwrap().unwrap();
        assert_eq!(second.normalized_address.as_deref(), Some("55 elm st apt 4"));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let csv = "id,address_line_1\n1,1 Elm St\n1,2 Elm St\n";
        let err = MemoryPropertyStore::from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(1)));
    }

    #[test]
    fn finds_by_external_id_substring() {
        let store = MemoryPropertyStore::from_csv_reader(STORE_CSV.as_bytes()).unwrap();

        let found = store.find_by_external_id("int-00", None, None).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 11);

        let found = store.find_by_external_id("87g8", Some(1), Some("05401")).unwrap();
        assert_eq!(found.len(), 1);

        assert!(
            store
                .find_by_external_id("87g8", Some(2), None)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn finds_by_normalized_address() {
        let store = MemoryPropertyStore::from_csv_reader(STORE_CSV.as_bytes()).unwrap();
        let found = store
            .find_by_normalized_address("123 main st", None, Some("05401"))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 10);

        assert!(
            store
                .find_by_normalized_address("123 main st", None, Some("05402"))
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn rejects_ids_without_successor() {
        let csv = "id,address_line_1\n18446744073709551615,1 Elm St\n";
        let err = MemoryPropertyStore::from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::IdOverflow(u64::MAX)));

        let mut store = MemoryPropertyStore::new();
        store
            .insert_with_id(u64::MAX - 1, NewProperty::default())
            .unwrap();
        let err = store.insert(NewProperty::default()).unwrap_err();
        assert!(matches!(err, StoreError::IdOverflow(u64::MAX)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn rejects_malformed_extra_data() {
        let csv = "id,address_line_1,extra_data\n1,1 Elm St,not json\n";
        let err = MemoryPropertyStore::from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::ExtraData(_)));
    }

    #[test]
    fn writes_csv_round_trip() {
        let mut store = MemoryPropertyStore::from_csv_reader(STORE_CSV.as_bytes()).unwrap();
        let mut property = NewProperty {
            address: RawAddress {
                address_line_1: Some("12 Peña St".to_string()),
                ..RawAddress::default()
            },
            ..NewProperty::default()
        };
        property
            .extra_data
            .insert("year_built".to_string(), "1990".to_string());
        property
            .extra_data
            .insert("Notes".to_string(), "corner lot, \"blue\" door".to_string());
        let inserted = store.insert(property).unwrap();
        assert_eq!(inserted.extra_data.len(), 3);

        let mut out = Vec::new();
        store.write_csv(&mut out).unwrap();

        let reloaded = MemoryPropertyStore::from_csv_reader(out.as_slice()).unwrap();
        assert_eq!(
            reloaded.records().collect::<Vec<_>>(),
            store.records().collect::<Vec<_>>()
        );
    }

    #[test]
    fn assigns_increasing_ids() {
        let mut store = MemoryPropertyStore::new();
        let a = store.insert(NewProperty::default()).unwrap();
        let b = store.insert(NewProperty::default()).unwrap();
        assert_eq!((a.id, b.id), (1, 2));
    }
}
