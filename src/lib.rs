extern crate log;
pub mod decoder;
pub mod geofile;

pub use crate::decoder::decode::FeatureDecoder;
pub use crate::decoder::options::{DecoderOptions, GeometrySource, SerializedGeometry};
pub use crate::decoder::record::{MemoryRecord, Record, RelationLookup, Row};
pub use crate::decoder::relation::{
    MissingRelationPolicy, RelationDirective, RelationKind, MISSING_RELATION_SENTINEL,
};
pub use crate::geofile::feature::Feature;
pub use crate::geofile::geometry::BlobFormat;
