// End-to-end dissolve runs: GeoJSON in, merged groups and diagnostics out.

use approx::assert_relative_eq;
use dissolve::io::geojson::{self, Properties};
use dissolve::{DiagnosticKind, DissolveConfig, DissolveError, Dissolver, RawPolygon, Record, Strategy};
use geo::{Area, Coord};
use serde_json::{json, Value};

fn ring(points: &[(f64, f64)]) -> Vec<Coord<f64>> {
    points.iter().map(|&(x, y)| Coord { x, y }).collect()
}

fn cell(x: f64, y: f64) -> RawPolygon {
    RawPolygon::new(ring(&[(x, y), (x + 1.0, y), (x + 1.0, y + 1.0), (x, y + 1.0), (x, y)]), vec![])
}

fn feature(key: &str, name: &str, coordinates: Value) -> Value {
    json!({
        "type": "Feature",
        "properties": { "provincia": key, "departamento": name },
        "geometry": { "type": "Polygon", "coordinates": coordinates }
    })
}

#[test]
fn invalid_member_is_excluded_and_reported() {
    let records = vec![
        Record::new("Catamarca", RawPolygon::new(ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]), vec![])),
        Record::new("Catamarca", cell(3.0, 3.0)),
    ];
    let output = Dissolver::new(DissolveConfig::default()).run(records);

    let result = output.result("Catamarca").unwrap();
    assert_relative_eq!(result.geometry.area(), 1.0);
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.diagnostics[0].group_key, "Catamarca");
    assert_eq!(output.diagnostics[0].member_index, Some(0));
    assert!(output.diagnostics[0].reason.starts_with("invalid ring"));
}

#[test]
fn strategies_agree_on_an_adjacent_block() {
    // 3x3 block of cells, one missing in the middle: a frame with a hole.
    let mut records = Vec::new();
    for y in 0..3 {
        for x in 0..3 {
            if (x, y) != (1, 1) {
                records.push(Record::new("frame", cell(x as f64, y as f64)));
            }
        }
    }

    let mut results = Vec::new();
    for strategy in [Strategy::LeftFold, Strategy::BalancedTree] {
        for parallel in [false, true] {
            let config = DissolveConfig { strategy, parallel, ..Default::default() };
            let output = Dissolver::new(config).run(records.clone());
            assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
            results.push(output.results[0].geometry.clone());
        }
    }

    for geometry in &results {
        assert_eq!(geometry.kind(), "Polygon");
        assert_relative_eq!(geometry.area(), 8.0);
        assert_eq!(geometry.polygons()[0].holes().len(), 1);
        assert_eq!(geometry.polygons()[0].outer().num_vertices(), 4);
    }
}

#[test]
fn union_matches_geo_area() {
    let records = vec![
        Record::new("g", RawPolygon::new(ring(&[(0.0, 0.0), (4.0, 0.0), (2.0, 4.0), (0.0, 0.0)]), vec![])),
        Record::new("g", RawPolygon::new(ring(&[(0.0, 3.0), (2.0, -1.0), (4.0, 3.0), (0.0, 3.0)]), vec![])),
        Record::new("g", cell(10.0, 10.0)),
    ];
    let output = Dissolver::new(DissolveConfig::default()).run(records);
    let geometry = &output.results[0].geometry;

    let as_geo: geo::MultiPolygon<f64> = geometry.into();
    assert_relative_eq!(as_geo.unsigned_area(), geometry.area(), epsilon = 1e-9);
    assert_eq!(geometry.num_polygons(), 2);
}

#[test]
fn group_without_valid_members_does_not_block_others() {
    let records = vec![
        Record::new("empty", RawPolygon::default()),
        Record::new("full", cell(0.0, 0.0)),
        Record::new("full", cell(1.0, 0.0)),
    ];
    let output = Dissolver::new(DissolveConfig::default()).run(records);

    assert_eq!(output.failures, vec![DissolveError::EmptyGroupAfterFiltering { key: "empty".into() }]);
    assert_relative_eq!(output.result("full").unwrap().geometry.area(), 2.0);
    assert!(output.result("empty").is_none());
}

#[test]
fn geojson_in_geojson_out() {
    let input = json!({
        "type": "FeatureCollection",
        "features": [
            feature("Salta", "Capital", json!([[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]])),
            feature("Jujuy", "Yavi", json!([[[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 6.0], [5.0, 5.0]]])),
            feature("Salta", "Cerrillos", json!([[[1.0, 0.0], [2.0, 0.0], [2.0, 1.0], [1.0, 1.0], [1.0, 0.0]]])),
            feature("Salta", "Broken", json!([[[0.0, 0.0], [1.0, 1.0], [0.0, 0.0]]])),
        ]
    });

    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("departments.geojson");
    std::fs::write(&input_path, serde_json::to_vec(&input).unwrap()).unwrap();

    let read = geojson::read_records_from_file(&input_path, Properties::default()).unwrap();
    assert!(read.diagnostics.is_empty());
    let output = Dissolver::new(DissolveConfig::default()).run(read.records);

    let output_path = dir.path().join("provinces.geojson");
    geojson::write_results(&output_path, &output.results).unwrap();
    let written: Value = serde_json::from_slice(&std::fs::read(&output_path).unwrap()).unwrap();

    let features = written["features"].as_array().unwrap();
    assert_eq!(features.len(), 2);
    assert_eq!(features[0]["properties"], json!({ "name": "Salta", "members": 2 }));
    assert_eq!(
        features[0]["geometry"],
        json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [2.0, 0.0], [2.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
        })
    );
    assert_eq!(features[1]["properties"]["name"], "Jujuy");

    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.diagnostics[0].kind, DiagnosticKind::InvalidMember);
    assert_eq!(output.diagnostics[0].member_index, Some(2));
}
