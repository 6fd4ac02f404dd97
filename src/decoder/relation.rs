use serde::Deserialize;
use serde_json::Value;

use super::record::{Record, RelationLookup};

/// Placeholder written for a missing related accessor under [`MissingRelationPolicy::Sentinel`].
pub const MISSING_RELATION_SENTINEL: &str = "AttributeError";

/// How a property is derived from a record's related data.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Count of the related `<name>_set` collection.
    SetCount,
    /// All rows of the related `<name>` collection.
    ValuesList,
    /// Display label of the coded field `<name>`.
    Display,
}

impl RelationKind {
    pub fn name(&self) -> &'static str {
        match self {
            RelationKind::SetCount => "set_count",
            RelationKind::ValuesList => "values_list",
            RelationKind::Display => "display",
        }
    }
}

/// A derived property to compute for every record.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RelationDirective {
    pub kind: RelationKind,
    pub name: String,
}

impl RelationDirective {
    pub fn new(kind: RelationKind, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
        }
    }

    /// Key of the property this directive writes, `<name>_<kind>`.
    pub fn property_key(&self) -> String {
        format!("{}_{}", self.name, self.kind.name())
    }

    /// Look up the related data on `record` and convert it to a property value.
    pub fn resolve<R: Record + ?Sized>(&self, record: &R) -> RelationLookup<Value> {
        match self.kind {
            RelationKind::SetCount => record
                .related_count(&format!("{}_set", self.name))
                .map(Value::from),
            RelationKind::ValuesList => record
                .related_rows(&self.name)
                .map(|rows| Value::Array(rows.into_iter().map(Value::Array).collect())),
            RelationKind::Display => record.display_label(&self.name).map(Value::String),
        }
    }
}

/// What to write for a directive whose related accessor is missing on a record.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingRelationPolicy {
    /// Write [`MISSING_RELATION_SENTINEL`].
    #[default]
    Sentinel,
    /// Write `null`.
    Null,
    /// Leave the property unset.
    Omit,
}

impl MissingRelationPolicy {
    /// Value to store for a missing relation, `None` if nothing should be stored.
    pub fn placeholder(&self) -> Option<Value> {
        match self {
            MissingRelationPolicy::Sentinel => {
                Some(Value::String(MISSING_RELATION_SENTINEL.to_string()))
            }
            MissingRelationPolicy::Null => Some(Value::Null),
            MissingRelationPolicy::Omit => None,
        }
    }
}
