use geojson::{feature::Id, JsonObject};

/// A record decoded into a geospatial feature.
///
/// `properties` keeps insertion order, so keys appear in the order the decoder wrote them.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Id,
    pub geometry: Option<geojson::Geometry>,
    pub properties: JsonObject,
}

impl Feature {
    /// Create a feature with the given id, no geometry and no properties.
    pub fn new(id: Id) -> Self {
        Self {
            id,
            geometry: None,
            properties: JsonObject::new(),
        }
    }
}

/// Human readable form of a feature id, used in log and error messages.
pub fn id_label(id: &Id) -> String {
    match id {
        Id::String(id) => id.clone(),
        Id::Number(id) => id.to_string(),
    }
}
