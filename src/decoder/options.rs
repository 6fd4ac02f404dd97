use std::{fs::read_to_string, path::Path};

use anyhow::{anyhow, Context};
use geojson::JsonObject;
use serde::Deserialize;

use super::relation::{MissingRelationPolicy, RelationDirective, RelationKind};
use crate::geofile::geometry::BlobFormat;

/// Location and encoding of a serialized geometry column.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SerializedGeometry {
    pub attribute: String,
    pub format: BlobFormat,
}

impl Default for SerializedGeometry {
    fn default() -> Self {
        Self {
            attribute: "geometry".to_string(),
            format: BlobFormat::default(),
        }
    }
}

/// Where a feature's geometry comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometrySource<'a> {
    None,
    /// Structured geometry attribute with this name.
    Attribute(&'a str),
    SerializedBlob(&'a SerializedGeometry),
}

/// Configuration of a [`crate::FeatureDecoder`]. Every field is optional, an unset field
/// disables its step.
///
/// Can be built in code:
/// ```
/// use feature_decoder::{DecoderOptions, RelationKind};
///
/// let options = DecoderOptions::new()
///     .with_geometry_attribute("geometry")
///     .with_properties(&["city", "state"])
///     .with_relation(RelationKind::SetCount, "comment");
/// ```
///
/// or read from YAML:
/// ```yaml
/// geometry_attribute: geometry
/// properties: [city, state]
/// style:
///   color: "#004070"
///   weight: 4
/// relations:
///   - kind: set_count
///     name: comment
/// ```
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DecoderOptions {
    geometry_attribute: Option<String>,
    serialized_geometry: Option<SerializedGeometry>,
    serialized_properties: Option<String>,
    properties: Vec<String>,
    style: Option<JsonObject>,
    relations: Vec<RelationDirective>,
    missing_relation: MissingRelationPolicy,
}

impl DecoderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml_str(contents: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(contents).context("Parsing decoder options")
    }

    pub fn from_yaml_file(filepath: &Path) -> anyhow::Result<Self> {
        if !filepath.exists() {
            return Err(anyhow!("Config file {:?} not found", filepath));
        }
        let contents = read_to_string(filepath)?;
        Self::from_yaml_str(&contents)
            .with_context(|| format!("Reading decoder options from {:?}", filepath))
    }

    /// Read geometry from the structured geometry attribute `name`.
    pub fn with_geometry_attribute(mut self, name: &str) -> Self {
        self.geometry_attribute = Some(name.to_string());
        self
    }

    /// Read geometry from a serialized blob column.
    pub fn with_serialized_geometry(mut self, attribute: &str, format: BlobFormat) -> Self {
        self.serialized_geometry = Some(SerializedGeometry {
            attribute: attribute.to_string(),
            format,
        });
        self
    }

    /// Merge the JSON object stored as text in attribute `name` into the properties.
    pub fn with_serialized_properties(mut self, name: &str) -> Self {
        self.serialized_properties = Some(name.to_string());
        self
    }

    pub fn with_properties(mut self, names: &[&str]) -> Self {
        self.properties
            .extend(names.iter().map(|name| name.to_string()));
        self
    }

    pub fn with_style(mut self, style: JsonObject) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_relation(mut self, kind: RelationKind, name: &str) -> Self {
        self.relations.push(RelationDirective::new(kind, name));
        self
    }

    pub fn with_missing_relation(mut self, policy: MissingRelationPolicy) -> Self {
        self.missing_relation = policy;
        self
    }

    /// The geometry source in effect. The structured attribute wins when a serialized geometry
    /// is configured as well, see [`Self::has_ambiguous_geometry_source`].
    pub fn geometry_source(&self) -> GeometrySource<'_> {
        match (&self.geometry_attribute, &self.serialized_geometry) {
            (Some(name), _) => GeometrySource::Attribute(name),
            (None, Some(serialized)) => GeometrySource::SerializedBlob(serialized),
            (None, None) => GeometrySource::None,
        }
    }

    /// Whether both a structured and a serialized geometry source are configured.
    pub fn has_ambiguous_geometry_source(&self) -> bool {
        self.geometry_attribute.is_some() && self.serialized_geometry.is_some()
    }

    pub fn serialized_properties(&self) -> Option<&str> {
        self.serialized_properties.as_deref()
    }

    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    /// The style mapping, `None` if unset or empty.
    pub fn style(&self) -> Option<&JsonObject> {
        self.style.as_ref().filter(|style| !style.is_empty())
    }

    pub fn relations(&self) -> &[RelationDirective] {
        &self.relations
    }

    pub fn missing_relation(&self) -> MissingRelationPolicy {
        self.missing_relation
    }
}
