//! File formats for dissolve input and output.
//!
//! - `geojson` - FeatureCollection ingestion, result and diagnostics writing

pub mod geojson;
