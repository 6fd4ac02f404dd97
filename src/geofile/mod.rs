pub mod feature;
pub mod geometry;
