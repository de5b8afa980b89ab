use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use geo::Coord;
use polyunion::{Geometry, Polygon};
use serde_json::{json, Value};

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::dissolve::GroupResult;
use crate::group::{RawPolygon, Record};

/// Records read from a FeatureCollection, plus one diagnostic per feature
/// that could not be turned into records.
#[derive(Clone, Debug, Default)]
pub struct ReadOutput {
    pub records: Vec<Record>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Which feature properties carry the group key and member name.
#[derive(Clone, Copy, Debug)]
pub struct Properties<'a> {
    pub key: &'a str,
    pub name: &'a str,
}

impl Default for Properties<'_> {
    fn default() -> Self {
        Self { key: "provincia", name: "departamento" }
    }
}

/// Read records from a GeoJSON file.
pub fn read_records_from_file(path: &Path, properties: Properties<'_>) -> Result<ReadOutput> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read GeoJSON file: {}", path.display()))?;
    read_records(&bytes, properties)
        .with_context(|| format!("Failed to load records from {}", path.display()))
}

/// Read records from GeoJSON bytes.
///
/// `Polygon` features give one record, `MultiPolygon` features one record per
/// component. Rings are taken as written; unclosed or short rings are left
/// for member validation to reject.
pub fn read_records(bytes: &[u8], properties: Properties<'_>) -> Result<ReadOutput> {
    let value: Value = serde_json::from_slice(bytes).context("Failed to parse GeoJSON bytes")?;
    if value["type"].as_str() != Some("FeatureCollection") {
        bail!("Expected a GeoJSON FeatureCollection");
    }
    let features = value["features"].as_array()
        .ok_or_else(|| anyhow!("FeatureCollection is missing its features array"))?;

    let mut output = ReadOutput::default();
    for (idx, feature) in features.iter().enumerate() {
        let props = &feature["properties"];
        let Some(key) = property_string(&props[properties.key]) else {
            output.diagnostics.push(
                Diagnostic::new("", DiagnosticKind::SkippedFeature, format!("feature has no '{}' property", properties.key))
                    .with_member(idx),
            );
            continue;
        };
        let name = property_string(&props[properties.name]);

        match parse_geometry(&feature["geometry"]) {
            Ok(polygons) => {
                output.records.extend(polygons.into_iter().map(|polygon| Record {
                    key: key.clone(),
                    name: name.clone(),
                    polygon,
                }));
            }
            Err(err) => {
                output.diagnostics.push(
                    Diagnostic::new(key, DiagnosticKind::SkippedFeature, format!("{err:#}")).with_member(idx),
                );
            }
        }
    }
    Ok(output)
}

/// String or number property as a string; anything else counts as missing.
fn property_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_geometry(geometry: &Value) -> Result<Vec<RawPolygon>> {
    match geometry["type"].as_str() {
        Some("Polygon") => Ok(vec![parse_polygon(&geometry["coordinates"])?]),
        Some("MultiPolygon") => {
            let polygons = geometry["coordinates"].as_array()
                .ok_or_else(|| anyhow!("Invalid MultiPolygon: coordinates must be an array"))?;
            polygons.iter().map(parse_polygon).collect()
        }
        Some(other) => bail!("Unsupported geometry type: {other}"),
        None => bail!("Feature has no geometry"),
    }
}

/// Parse Polygon coordinates: `[outer, hole, hole, ...]`.
fn parse_polygon(coords: &Value) -> Result<RawPolygon> {
    let rings = coords.as_array()
        .ok_or_else(|| anyhow!("Invalid Polygon: coordinates must be an array of rings"))?;
    let mut rings = rings.iter().map(parse_ring);
    let outer = rings.next().transpose()?.unwrap_or_default();
    let holes = rings.collect::<Result<Vec<_>>>()?;
    Ok(RawPolygon::new(outer, holes))
}

/// Parse a ring: `[[x, y], [x, y], ...]`. Extra ordinates are ignored.
fn parse_ring(ring: &Value) -> Result<Vec<Coord<f64>>> {
    let positions = ring.as_array().ok_or_else(|| anyhow!("Invalid ring: expected an array of positions"))?;
    positions.iter().map(parse_position).collect()
}

fn parse_position(position: &Value) -> Result<Coord<f64>> {
    let xy = position.as_array().filter(|a| a.len() >= 2)
        .ok_or_else(|| anyhow!("Invalid position: expected [x, y]"))?;
    let x = xy[0].as_f64().ok_or_else(|| anyhow!("Invalid coordinate: x must be a number"))?;
    let y = xy[1].as_f64().ok_or_else(|| anyhow!("Invalid coordinate: y must be a number"))?;
    Ok(Coord { x, y })
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

fn polygon_coords(polygon: &Polygon) -> Vec<Vec<[f64; 2]>> {
    polygon.rings()
        .map(|ring| ring.coords().iter().map(|c| [c.x, c.y]).collect())
        .collect()
}

/// GeoJSON geometry object for a union result.
pub fn geometry_to_geojson(geometry: &Geometry) -> Value {
    match geometry {
        Geometry::Polygon(polygon) => json!({
            "type": "Polygon",
            "coordinates": polygon_coords(polygon),
        }),
        Geometry::MultiPolygon(mp) => json!({
            "type": "MultiPolygon",
            "coordinates": mp.polygons().iter().map(polygon_coords).collect::<Vec<_>>(),
        }),
    }
}

/// FeatureCollection with one feature per group.
pub fn results_to_geojson(results: &[GroupResult]) -> Value {
    let features: Vec<Value> = results.iter().map(|result| {
        json!({
            "type": "Feature",
            "geometry": geometry_to_geojson(&result.geometry),
            "properties": {
                "name": result.key,
                "members": result.members.len(),
            }
        })
    }).collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Write group results to GeoJSON bytes.
pub fn write_results_to_bytes(results: &[GroupResult]) -> Result<Vec<u8>> {
    serde_json::to_vec(&results_to_geojson(results)).context("Failed to serialize GeoJSON to bytes")
}

/// Write group results to a GeoJSON file.
pub fn write_results(path: &Path, results: &[GroupResult]) -> Result<()> {
    let bytes = write_results_to_bytes(results)?;
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write GeoJSON file: {}", path.display()))
}

/// Write diagnostics as a pretty-printed JSON array.
pub fn write_diagnostics(path: &Path, diagnostics: &[Diagnostic]) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(diagnostics).context("Failed to serialize diagnostics")?;
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write diagnostics file: {}", path.display()))
}
