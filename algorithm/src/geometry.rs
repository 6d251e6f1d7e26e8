//! Track outline reconstruction from either of the two source pipelines:
//! named boundary geometry in geodetic degrees, or one vehicle's raw
//! trajectory samples.

use crate::NormalizeError;
use common::boundary::{BoundaryFeature, BoundaryGeometry};
use common::live::{RawLocation, SessionLap};
use common::point::{GeoPoint, Point2D};
use common::record::NormalizedLocation;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Meters per degree of latitude in the equirectangular approximation.
pub const METERS_PER_DEG_LAT: f64 = 111_320.0;

/// Minimum spacing between kept trajectory outline points, in track units.
pub const MIN_OUTLINE_SPACING: f64 = 20.0;

/// Below this point count a trajectory outline is considered too sparse
/// and the fallback extraction kicks in.
pub const MIN_OUTLINE_POINTS: usize = 20;

/// Consecutive displacement that marks a vehicle leaving the grid or pit
/// in the fallback extraction.
pub const LEAVE_GRID_DISPLACEMENT: f64 = 5.0;

/// Number of samples the fallback takes as an outline approximation.
pub const FALLBACK_OUTLINE_POINTS: usize = 300;

/// Converts geodetic coordinates to the local track plane in meters.
///
/// The origin is the centroid of the input; longitude degrees are scaled
/// by the cosine of the centroid latitude. Good to well under a meter over
/// the few kilometers a circuit spans, which is all the replay needs.
pub fn to_local_plane(coords: &[GeoPoint]) -> Vec<Point2D> {
    if coords.is_empty() {
        return vec![];
    }
    let n = coords.len() as f64;
    let center_lon = coords.iter().map(|c| c.lon).sum::<f64>() / n;
    let center_lat = coords.iter().map(|c| c.lat).sum::<f64>() / n;
    let meters_per_deg_lon = METERS_PER_DEG_LAT * center_lat.to_radians().cos();
    coords
        .iter()
        .map(|c| Point2D {
            x: (c.lon - center_lon) * meters_per_deg_lon,
            y: (c.lat - center_lat) * METERS_PER_DEG_LAT,
        })
        .collect()
}

/// Builds a track outline from named boundary geometry.
///
/// The circuit id is resolved through the supplied id → display-name
/// table, then the first feature whose name contains the display name
/// (case-insensitive) provides the coordinates: a single path as-is, a
/// multi-path geometry reduced to its longest constituent, a polygon to
/// its outer ring. Anything else is unsupported. All failures abort race
/// generation; there is no partial geometry.
pub fn outline_from_boundary(
    features: &[BoundaryFeature],
    circuit_id: &str,
    names: &HashMap<String, String>,
) -> Result<Vec<Point2D>, NormalizeError> {
    let search_name = names
        .get(circuit_id)
        .ok_or_else(|| NormalizeError::UnknownCircuit(circuit_id.to_string()))?;
    let needle = search_name.to_lowercase();
    let feature = features
        .iter()
        .find(|f| f.name.to_lowercase().contains(&needle))
        .ok_or_else(|| NormalizeError::FeatureNotFound(search_name.clone()))?;

    let coords = match &feature.geometry {
        BoundaryGeometry::Path(path) => path.clone(),
        BoundaryGeometry::MultiPath(paths) => paths
            .iter()
            .max_by_key(|p| p.len())
            .cloned()
            .unwrap_or_default(),
        BoundaryGeometry::Polygon(rings) => rings.first().cloned().unwrap_or_default(),
        BoundaryGeometry::Unsupported(kind) => {
            return Err(NormalizeError::UnsupportedGeometry(kind.clone()));
        }
    };
    debug!(
        circuit_id,
        feature = %feature.name,
        points = coords.len(),
        "resolved boundary geometry"
    );
    Ok(to_local_plane(&coords))
}

/// Builds a track outline from the reference vehicle's raw trajectory.
///
/// Only samples between the start of that vehicle's lap 2 and the start of
/// lap 3 are used; lap 1 is distorted by the formation start and the pit
/// lane. Points closer than [`MIN_OUTLINE_SPACING`] to the previously kept
/// point are dropped to compact the outline while preserving its shape.
///
/// If that leaves fewer than [`MIN_OUTLINE_POINTS`] points, the fallback
/// takes the densest normalized trace instead: from the first sample pair
/// whose displacement exceeds [`LEAVE_GRID_DISPLACEMENT`], a fixed window
/// of [`FALLBACK_OUTLINE_POINTS`] samples approximates the outline.
pub fn outline_from_trajectory(
    raw: &[RawLocation],
    laps: &[SessionLap],
    driver_number: u32,
    normalized: &BTreeMap<u32, Vec<NormalizedLocation>>,
) -> Vec<Point2D> {
    let mut outline = match reference_lap_window(laps, driver_number) {
        Some((lap_start, lap_end)) => {
            let mut samples: Vec<&RawLocation> = raw
                .iter()
                .filter(|s| !s.is_sentinel())
                .filter(|s| s.date.is_some_and(|d| d >= lap_start && d <= lap_end))
                .collect();
            samples.sort_by_key(|s| s.date);

            let mut outline: Vec<Point2D> = Vec::new();
            for sample in samples {
                let point = Point2D {
                    x: sample.x,
                    y: sample.y,
                };
                match outline.last() {
                    Some(last) if last.distance(&point) <= MIN_OUTLINE_SPACING => {}
                    _ => outline.push(point),
                }
            }
            outline
        }
        None => vec![],
    };

    if outline.len() < MIN_OUTLINE_POINTS {
        warn!(
            driver_number,
            points = outline.len(),
            "trajectory outline too sparse, falling back to densest trace"
        );
        outline = fallback_outline(normalized);
    }
    outline
}

/// Start timestamps of the reference vehicle's laps 2 and 3. When either
/// is missing, the first consecutive timestamped lap pair from lap 2
/// onward serves as the window instead.
fn reference_lap_window(
    laps: &[SessionLap],
    driver_number: u32,
) -> Option<(chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>)> {
    let mut driver_laps: Vec<&SessionLap> = laps
        .iter()
        .filter(|l| l.driver_number == driver_number)
        .collect();
    if driver_laps.is_empty() {
        // no laps for the reference vehicle, take any driver's laps
        let first = laps.first()?.driver_number;
        driver_laps = laps.iter().filter(|l| l.driver_number == first).collect();
    }
    driver_laps.sort_by_key(|l| l.lap_number);

    let start = driver_laps
        .iter()
        .find(|l| l.lap_number == 2)
        .and_then(|l| l.date_start);
    let end = driver_laps
        .iter()
        .find(|l| l.lap_number == 3)
        .and_then(|l| l.date_start);
    if let (Some(start), Some(end)) = (start, end) {
        return Some((start, end));
    }
    driver_laps.windows(2).find_map(|pair| {
        if pair[0].lap_number >= 2 {
            Some((pair[0].date_start?, pair[1].date_start?))
        } else {
            None
        }
    })
}

fn fallback_outline(normalized: &BTreeMap<u32, Vec<NormalizedLocation>>) -> Vec<Point2D> {
    let Some(points) = normalized.values().max_by_key(|locs| locs.len()) else {
        return vec![];
    };
    let start = points
        .windows(2)
        .position(|pair| {
            let dx = pair[1].x - pair[0].x;
            let dy = pair[1].y - pair[0].y;
            (dx * dx + dy * dy).sqrt() > LEAVE_GRID_DISPLACEMENT
        })
        .map(|i| i + 1)
        .unwrap_or(0);
    points
        .iter()
        .skip(start)
        .take(FALLBACK_OUTLINE_POINTS)
        .map(|p| Point2D { x: p.x, y: p.y })
        .collect()
}
