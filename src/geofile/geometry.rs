use std::io::Cursor;

use anyhow::{anyhow, Context};
use serde::Deserialize;

/// Encoding of a geometry stored serialized in a single column.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlobFormat {
    /// UTF-8 GeoJSON geometry object, e.g. `{"type": "Point", "coordinates": [1.0, 2.0]}`.
    #[default]
    #[serde(rename = "geojson")]
    GeoJson,
    /// Well-known binary.
    #[serde(rename = "wkb")]
    Wkb,
}

/// Project a structured geometry into its `{type, coordinates}` form.
pub fn project_geometry(geometry: &geo::Geometry) -> geojson::Geometry {
    geojson::Geometry::new(geojson::Value::from(geometry))
}

/// Deserialize a geometry blob in the given format.
pub fn decode_geometry_blob(blob: &[u8], format: BlobFormat) -> anyhow::Result<geojson::Geometry> {
    match format {
        BlobFormat::GeoJson => {
            let text =
                std::str::from_utf8(blob).context("GeoJSON geometry blob is not valid UTF-8")?;
            match text.parse::<geojson::GeoJson>()? {
                geojson::GeoJson::Geometry(geometry) => Ok(geometry),
                geojson::GeoJson::Feature(_) => {
                    Err(anyhow!("Expected a GeoJSON geometry, found a Feature"))
                }
                geojson::GeoJson::FeatureCollection(_) => Err(anyhow!(
                    "Expected a GeoJSON geometry, found a FeatureCollection"
                )),
            }
        }
        BlobFormat::Wkb => {
            let mut reader = Cursor::new(blob);
            let geometry = wkb::wkb_to_geom(&mut reader)
                .map_err(|err| anyhow!("Could not read geometry from WKB, {:?}", err))?;
            Ok(project_geometry(&geometry))
        }
    }
}
