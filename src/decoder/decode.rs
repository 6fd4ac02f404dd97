use anyhow::{anyhow, Context};
use rayon::prelude::*;
use serde_json::Value;

use super::{
    options::{DecoderOptions, GeometrySource},
    record::{Record, RelationLookup},
};
use crate::geofile::{
    feature::{id_label, Feature},
    geometry::{decode_geometry_blob, project_geometry},
};

/// Key under which the configured style is stored in every feature's properties.
pub const STYLE_PROPERTY: &str = "style";

/// Decodes records into features according to a fixed set of options.
///
/// A decoder holds no mutable state and can be shared between threads.
///
/// Example usage:
/// ```
/// use feature_decoder::{DecoderOptions, FeatureDecoder, MemoryRecord};
/// use geojson::feature::Id;
///
/// let decoder = FeatureDecoder::new(
///     DecoderOptions::new()
///         .with_geometry_attribute("geometry")
///         .with_properties(&["city"]),
/// );
/// let records = vec![MemoryRecord::new(Id::Number(1.into()))
///     .with_geometry("geometry", geo::Point::new(42.37, -71.10))
///     .with_attribute("city", "Cambridge")];
/// let features = decoder.decode(&records).unwrap();
/// assert_eq!(1, features.len());
/// ```
#[derive(Debug, Clone)]
pub struct FeatureDecoder {
    options: DecoderOptions,
}

impl FeatureDecoder {
    pub fn new(options: DecoderOptions) -> Self {
        // TODO turn this into a construction error once existing configs set only one source.
        if options.has_ambiguous_geometry_source() {
            log::warn!(
                "Both a geometry attribute and a serialized geometry are configured, using {:?}",
                options.geometry_source()
            );
        }
        Self { options }
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Decode all records, preserving their order.
    ///
    /// Missing related accessors are tolerated and rendered according to the missing relation
    /// policy. Any other lookup or deserialization failure aborts the whole call.
    pub fn decode<I>(&self, records: I) -> anyhow::Result<Vec<Feature>>
    where
        I: IntoIterator,
        I::Item: Record,
    {
        let features = records
            .into_iter()
            .map(|record| self.decode_record(&record))
            .collect::<anyhow::Result<Vec<Feature>>>()?;
        log::debug!("Decoded {} features", features.len());
        Ok(features)
    }

    /// Like `decode`, with the records decoded in parallel. The output order matches `records`.
    pub fn decode_par<R: Record + Sync>(&self, records: &[R]) -> anyhow::Result<Vec<Feature>> {
        let features = records
            .par_iter()
            .map(|record| self.decode_record(record))
            .collect::<anyhow::Result<Vec<Feature>>>()?;
        log::debug!("Decoded {} features in parallel", features.len());
        Ok(features)
    }

    /// Decode a single record.
    ///
    /// The steps run in a fixed order and later steps overwrite properties set by earlier ones:
    /// serialized properties, then scalar properties, then the style, then relation-derived
    /// properties.
    pub fn decode_record<R: Record + ?Sized>(&self, record: &R) -> anyhow::Result<Feature> {
        let mut feature = Feature::new(record.id());
        let record_label = id_label(&feature.id);

        feature.geometry = self
            .decode_geometry(record)
            .with_context(|| format!("Decoding geometry of record {}", record_label))?;

        if let Some(name) = self.options.serialized_properties() {
            let properties = decode_serialized_properties(record, name).with_context(|| {
                format!(
                    "Decoding serialized properties '{}' of record {}",
                    name, record_label
                )
            })?;
            feature.properties.extend(properties);
        }

        for name in self.options.properties() {
            let value = record
                .attribute(name)
                .with_context(|| format!("Reading property '{}' of record {}", name, record_label))?;
            feature.properties.insert(name.clone(), value);
        }

        if let Some(style) = self.options.style() {
            feature
                .properties
                .insert(STYLE_PROPERTY.to_string(), Value::Object(style.clone()));
        }

        for directive in self.options.relations() {
            let key = directive.property_key();
            match directive.resolve(record) {
                RelationLookup::Found(value) => {
                    feature.properties.insert(key, value);
                }
                RelationLookup::NotAvailable => {
                    log::warn!(
                        "Record {} has no related data for '{}'",
                        record_label,
                        key
                    );
                    if let Some(placeholder) = self.options.missing_relation().placeholder() {
                        feature.properties.insert(key, placeholder);
                    }
                }
            }
        }

        Ok(feature)
    }

    fn decode_geometry<R: Record + ?Sized>(
        &self,
        record: &R,
    ) -> anyhow::Result<Option<geojson::Geometry>> {
        match self.options.geometry_source() {
            GeometrySource::None => Ok(None),
            GeometrySource::Attribute(name) => {
                let geometry = record.geometry(name)?;
                Ok(Some(project_geometry(&geometry)))
            }
            GeometrySource::SerializedBlob(serialized) => {
                let blob = record.blob(&serialized.attribute)?;
                Ok(Some(decode_geometry_blob(&blob, serialized.format)?))
            }
        }
    }
}

fn decode_serialized_properties<R: Record + ?Sized>(
    record: &R,
    name: &str,
) -> anyhow::Result<geojson::JsonObject> {
    let text = match record.attribute(name)? {
        Value::String(text) => text,
        other => return Err(anyhow!("Expected serialized properties text, found {}", other)),
    };
    match serde_json::from_str::<Value>(&text)? {
        Value::Object(properties) => Ok(properties),
        other => Err(anyhow!("Expected a JSON object, found {}", other)),
    }
}
