use std::collections::HashMap;

use anyhow::anyhow;
use geojson::{feature::Id, JsonObject};
use serde_json::Value;

use crate::geofile::feature::id_label;

/// One materialized row of a related collection.
pub type Row = Vec<Value>;

/// Outcome of looking up a related accessor on a record.
#[derive(Debug, Clone, PartialEq)]
pub enum RelationLookup<T> {
    Found(T),
    /// The record has no accessor with the requested name.
    NotAvailable,
}

impl<T> RelationLookup<T> {
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> RelationLookup<U> {
        match self {
            RelationLookup::Found(value) => RelationLookup::Found(f(value)),
            RelationLookup::NotAvailable => RelationLookup::NotAvailable,
        }
    }

    pub fn found(self) -> Option<T> {
        match self {
            RelationLookup::Found(value) => Some(value),
            RelationLookup::NotAvailable => None,
        }
    }
}

impl<T> From<Option<T>> for RelationLookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => RelationLookup::Found(value),
            None => RelationLookup::NotAvailable,
        }
    }
}

/// Lookup capabilities a record must provide to be decoded into a feature.
///
/// Attribute lookups return an error when the attribute does not exist. Relation lookups report
/// a missing accessor as [`RelationLookup::NotAvailable`] instead, the decoder tolerates those.
/// The relation methods default to `NotAvailable`, so records without related data only need to
/// implement the attribute methods.
pub trait Record {
    /// Unique identifier of the record.
    fn id(&self) -> Id;

    /// Plain scalar attribute by name.
    fn attribute(&self, name: &str) -> anyhow::Result<Value>;

    /// Structured geometry attribute by name.
    fn geometry(&self, name: &str) -> anyhow::Result<geo::Geometry> {
        Err(anyhow!(
            "Record {} has no geometry attribute '{}'",
            id_label(&self.id()),
            name
        ))
    }

    /// Serialized blob attribute by name.
    fn blob(&self, name: &str) -> anyhow::Result<Vec<u8>> {
        Err(anyhow!(
            "Record {} has no blob attribute '{}'",
            id_label(&self.id()),
            name
        ))
    }

    /// Number of records in the related collection accessed as `accessor`, e.g. `comment_set`.
    fn related_count(&self, _accessor: &str) -> RelationLookup<u64> {
        RelationLookup::NotAvailable
    }

    /// All rows of the related collection `name`, in collection order.
    fn related_rows(&self, _name: &str) -> RelationLookup<Vec<Row>> {
        RelationLookup::NotAvailable
    }

    /// Human readable label for the coded value of field `name`.
    fn display_label(&self, _name: &str) -> RelationLookup<String> {
        RelationLookup::NotAvailable
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn id(&self) -> Id {
        (**self).id()
    }

    fn attribute(&self, name: &str) -> anyhow::Result<Value> {
        (**self).attribute(name)
    }

    fn geometry(&self, name: &str) -> anyhow::Result<geo::Geometry> {
        (**self).geometry(name)
    }

    fn blob(&self, name: &str) -> anyhow::Result<Vec<u8>> {
        (**self).blob(name)
    }

    fn related_count(&self, accessor: &str) -> RelationLookup<u64> {
        (**self).related_count(accessor)
    }

    fn related_rows(&self, name: &str) -> RelationLookup<Vec<Row>> {
        (**self).related_rows(name)
    }

    fn display_label(&self, name: &str) -> RelationLookup<String> {
        (**self).display_label(name)
    }
}

/// Record backed by in-memory lookup tables.
#[derive(Debug, Clone)]
pub struct MemoryRecord {
    id: Id,
    attributes: JsonObject,
    geometries: HashMap<String, geo::Geometry>,
    blobs: HashMap<String, Vec<u8>>,
    related_counts: HashMap<String, u64>,
    related_rows: HashMap<String, Vec<Row>>,
    display_labels: HashMap<String, String>,
}

impl MemoryRecord {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            attributes: JsonObject::new(),
            geometries: HashMap::new(),
            blobs: HashMap::new(),
            related_counts: HashMap::new(),
            related_rows: HashMap::new(),
            display_labels: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn with_geometry(mut self, name: &str, geometry: impl Into<geo::Geometry>) -> Self {
        self.geometries.insert(name.to_string(), geometry.into());
        self
    }

    pub fn with_blob(mut self, name: &str, blob: impl Into<Vec<u8>>) -> Self {
        self.blobs.insert(name.to_string(), blob.into());
        self
    }

    /// Register a related collection under its accessor name, e.g. `comment_set`.
    pub fn with_related_count(mut self, accessor: &str, count: u64) -> Self {
        self.related_counts.insert(accessor.to_string(), count);
        self
    }

    pub fn with_related_rows(mut self, name: &str, rows: Vec<Row>) -> Self {
        self.related_rows.insert(name.to_string(), rows);
        self
    }

    pub fn with_display_label(mut self, name: &str, label: &str) -> Self {
        self.display_labels
            .insert(name.to_string(), label.to_string());
        self
    }
}

impl Record for MemoryRecord {
    fn id(&self) -> Id {
        self.id.clone()
    }

    fn attribute(&self, name: &str) -> anyhow::Result<Value> {
        self.attributes.get(name).cloned().ok_or_else(|| {
            anyhow!(
                "Record {} has no attribute '{}'",
                id_label(&self.id),
                name
            )
        })
    }

    fn geometry(&self, name: &str) -> anyhow::Result<geo::Geometry> {
        self.geometries.get(name).cloned().ok_or_else(|| {
            anyhow!(
                "Record {} has no geometry attribute '{}'",
                id_label(&self.id),
                name
            )
        })
    }

    fn blob(&self, name: &str) -> anyhow::Result<Vec<u8>> {
        self.blobs.get(name).cloned().ok_or_else(|| {
            anyhow!(
                "Record {} has no blob attribute '{}'",
                id_label(&self.id),
                name
            )
        })
    }

    fn related_count(&self, accessor: &str) -> RelationLookup<u64> {
        self.related_counts.get(accessor).copied().into()
    }

    fn related_rows(&self, name: &str) -> RelationLookup<Vec<Row>> {
        self.related_rows.get(name).cloned().into()
    }

    fn display_label(&self, name: &str) -> RelationLookup<String> {
        self.display_labels.get(name).cloned().into()
    }
}

#[cfg(test)]
mod tests {
    use geojson::feature::Id;
    use rstest::rstest;
    use serde_json::{json, Value};

    use super::{MemoryRecord, Record, RelationLookup};

    /// Record with only an id and attributes, relying on the default relation lookups.
    struct PlainRecord;

    impl Record for PlainRecord {
        fn id(&self) -> Id {
            Id::String("plain".to_string())
        }

        fn attribute(&self, name: &str) -> anyhow::Result<Value> {
            match name {
                "city" => Ok(json!("Cambridge")),
                _ => Err(anyhow::anyhow!("no attribute {}", name)),
            }
        }
    }

    #[rstest]
    fn test_default_lookups() {
        let record = PlainRecord;
        assert_eq!(json!("Cambridge"), record.attribute("city").unwrap());
        assert!(record.geometry("geom").is_err());
        assert!(record.blob("geometry").is_err());
        assert_eq!(RelationLookup::NotAvailable, record.related_count("comment_set"));
        assert_eq!(RelationLookup::NotAvailable, record.related_rows("tags"));
        assert_eq!(RelationLookup::NotAvailable, record.display_label("status"));
    }

    #[rstest]
    fn test_memory_record_lookups() {
        let record = MemoryRecord::new(Id::Number(3.into()))
            .with_attribute("name", "Central Square")
            .with_related_count("comment_set", 2)
            .with_related_rows("tags", vec![vec![json!(1), json!("red line")]])
            .with_display_label("status", "Open");

        assert_eq!(json!("Central Square"), record.attribute("name").unwrap());
        assert!(record.attribute("missing").is_err());
        assert_eq!(RelationLookup::Found(2), record.related_count("comment_set"));
        assert_eq!(RelationLookup::NotAvailable, record.related_count("comment"));
        assert_eq!(
            Some(vec![vec![json!(1), json!("red line")]]),
            record.related_rows("tags").found()
        );
        assert_eq!(
            RelationLookup::Found("Open".to_string()),
            record.display_label("status")
        );
    }

    #[rstest]
    fn test_reference_is_record() {
        let record = MemoryRecord::new(Id::Number(1.into())).with_attribute("name", "Kendall");
        let by_ref: &MemoryRecord = &record;
        assert_eq!(record.id(), Record::id(&by_ref));
        assert_eq!(json!("Kendall"), Record::attribute(&by_ref, "name").unwrap());
    }

    #[rstest]
    #[case(RelationLookup::Found(2_u64), RelationLookup::Found(4_u64))]
    #[case(RelationLookup::NotAvailable, RelationLookup::NotAvailable)]
    fn test_relation_lookup_map(
        #[case] lookup: RelationLookup<u64>,
        #[case] expected: RelationLookup<u64>,
    ) {
        assert_eq!(expected, lookup.map(|count| count * 2));
    }
}
