use crate::NormalizeError;
use crate::geometry::{
    self, FALLBACK_OUTLINE_POINTS, METERS_PER_DEG_LAT, MIN_OUTLINE_POINTS, to_local_plane,
};
use common::boundary::{BoundaryFeature, BoundaryGeometry};
use common::live::RawLocation;
use common::point::GeoPoint;
use common::record::NormalizedLocation;
use common::test_helper::laps::{race_start, session_lap};
use chrono::Duration;
use std::collections::{BTreeMap, HashMap};
use std::f64::consts::TAU;

fn name_table() -> HashMap<String, String> {
    HashMap::from([("monza".to_string(), "Monza".to_string())])
}

fn ring(center_lon: f64, center_lat: f64, n: usize) -> Vec<GeoPoint> {
    (0..n)
        .map(|i| {
            let angle = TAU * i as f64 / n as f64;
            GeoPoint {
                lon: center_lon + 0.01 * angle.cos(),
                lat: center_lat + 0.01 * angle.sin(),
            }
        })
        .collect()
}

#[test]
fn converts_geodetic_coordinates_to_centered_meters() {
    let coords = vec![
        GeoPoint { lon: 9.0, lat: 45.0 },
        GeoPoint { lon: 9.0, lat: 45.002 },
    ];
    let local = to_local_plane(&coords);
    assert_eq!(local.len(), 2);
    // centroid is the origin
    assert!((local[0].x + local[1].x).abs() < 1e-9);
    assert!((local[0].y + local[1].y).abs() < 1e-9);
    // 0.002 degrees of latitude apart
    let dy = local[1].y - local[0].y;
    assert!((dy - 0.002 * METERS_PER_DEG_LAT).abs() < 1e-6);
}

#[test]
fn boundary_outline_takes_a_path_as_is() {
    let features = vec![BoundaryFeature {
        name: "Autodromo Nazionale Monza".to_string(),
        geometry: BoundaryGeometry::Path(ring(9.28, 45.6, 40)),
    }];
    let outline = geometry::outline_from_boundary(&features, "monza", &name_table()).unwrap();
    assert_eq!(outline.len(), 40);
}

#[test]
fn boundary_outline_takes_the_longest_constituent_of_a_multi_path() {
    let features = vec![BoundaryFeature {
        name: "Monza".to_string(),
        geometry: BoundaryGeometry::MultiPath(vec![ring(9.28, 45.6, 5), ring(9.28, 45.6, 60)]),
    }];
    let outline = geometry::outline_from_boundary(&features, "monza", &name_table()).unwrap();
    assert_eq!(outline.len(), 60);
}

#[test]
fn boundary_outline_takes_the_outer_ring_of_a_polygon() {
    let features = vec![BoundaryFeature {
        name: "Monza".to_string(),
        geometry: BoundaryGeometry::Polygon(vec![ring(9.28, 45.6, 50), ring(9.28, 45.6, 12)]),
    }];
    let outline = geometry::outline_from_boundary(&features, "monza", &name_table()).unwrap();
    assert_eq!(outline.len(), 50);
}

#[test]
fn boundary_matching_is_a_case_insensitive_substring_search() {
    let features = vec![BoundaryFeature {
        name: "AUTODROMO NAZIONALE MONZA".to_string(),
        geometry: BoundaryGeometry::Path(ring(9.28, 45.6, 8)),
    }];
    assert!(geometry::outline_from_boundary(&features, "monza", &name_table()).is_ok());
}

#[test]
fn unknown_circuit_id_fails() {
    let result = geometry::outline_from_boundary(&[], "buddh", &name_table());
    assert!(matches!(result, Err(NormalizeError::UnknownCircuit(_))));
}

#[test]
fn missing_feature_fails() {
    let features = vec![BoundaryFeature {
        name: "Silverstone Circuit".to_string(),
        geometry: BoundaryGeometry::Path(ring(-1.0, 52.0, 8)),
    }];
    let result = geometry::outline_from_boundary(&features, "monza", &name_table());
    assert!(matches!(result, Err(NormalizeError::FeatureNotFound(_))));
}

#[test]
fn unsupported_geometry_kind_fails() {
    let features = vec![BoundaryFeature {
        name: "Monza".to_string(),
        geometry: BoundaryGeometry::Unsupported("Point".to_string()),
    }];
    let result = geometry::outline_from_boundary(&features, "monza", &name_table());
    assert!(matches!(result, Err(NormalizeError::UnsupportedGeometry(_))));
}

fn lap2_trajectory(radius: f64, samples: usize) -> Vec<RawLocation> {
    // one full lap between lap 2 start (+90 s) and lap 3 start (+180 s)
    (0..samples)
        .map(|i| {
            let angle = TAU * i as f64 / samples as f64;
            RawLocation {
                date: Some(race_start() + Duration::seconds(90 + i as i64)),
                x: radius * angle.cos(),
                y: radius * angle.sin(),
            }
        })
        .collect()
}

#[test]
fn trajectory_outline_uses_the_lap_two_window() {
    let laps = vec![
        session_lap(1, 1, 0, 90.0),
        session_lap(1, 2, 90, 90.0),
        session_lap(1, 3, 180, 90.0),
    ];
    let mut raw = lap2_trajectory(500.0, 90);
    // a sentinel and an out-of-window sample must both be ignored
    raw.push(RawLocation {
        date: Some(race_start() + Duration::seconds(100)),
        x: 0.0,
        y: 0.0,
    });
    raw.push(RawLocation {
        date: Some(race_start() + Duration::seconds(400)),
        x: 9999.0,
        y: 9999.0,
    });
    let outline = geometry::outline_from_trajectory(&raw, &laps, 1, &BTreeMap::new());
    assert!(outline.len() >= MIN_OUTLINE_POINTS);
    assert!(outline.iter().all(|p| p.x.abs() <= 500.0 + 1e-6));
    // adjacent kept points are spaced apart
    for pair in outline.windows(2) {
        assert!(pair[0].distance(&pair[1]) > geometry::MIN_OUTLINE_SPACING);
    }
}

#[test]
fn sparse_trajectory_falls_back_to_the_densest_normalized_trace() {
    // no usable lap window at all
    let laps = vec![session_lap(1, 1, 0, 90.0)];
    let mut trace: Vec<NormalizedLocation> = (0..10)
        .map(|i| NormalizedLocation {
            t: i as f64,
            x: 0.1 * i as f64,
            y: 0.0,
        })
        .collect();
    // the car leaves the grid here
    for i in 0..350 {
        trace.push(NormalizedLocation {
            t: 10.0 + i as f64,
            x: 10.0 + 10.0 * i as f64,
            y: 5.0,
        });
    }
    let normalized = BTreeMap::from([(1u32, trace.clone())]);
    let outline = geometry::outline_from_trajectory(&[], &laps, 1, &normalized);
    assert_eq!(outline.len(), FALLBACK_OUTLINE_POINTS);
    assert_eq!(outline[0].x, trace[10].x);
    assert_eq!(outline[0].y, trace[10].y);
}
