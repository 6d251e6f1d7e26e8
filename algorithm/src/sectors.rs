//! Splits a track outline into the three timed sectors.

use common::live::SessionLap;
use common::point::Point2D;
use common::record::TrackSectors;
use tracing::debug;

/// Every sector keeps at least this many outline points so it stays
/// renderable as a segment.
pub const MIN_SECTOR_POINTS: usize = 3;

/// Derives sector slices from the reference vehicle's lap 2, the first
/// clean flying lap. Returns `None` when that lap or any of its sector
/// durations is missing, or the outline is too small to split; sectors are
/// optional, consumers fall back to a single-color outline.
pub fn from_reference_lap(
    outline: &[Point2D],
    laps: &[SessionLap],
    driver_number: u32,
) -> Option<TrackSectors> {
    let lap = laps
        .iter()
        .find(|l| l.driver_number == driver_number && l.lap_number == 2)?;
    let s1 = lap.duration_sector_1?;
    let s2 = lap.duration_sector_2?;
    let s3 = lap.duration_sector_3?;
    segment(outline, s1, s2, s3)
}

/// Splits `outline` proportionally to the three sector durations.
///
/// Each sector's share of the lap time maps to an outline index via
/// `floor(point_count * fraction)`; the indices are then clamped so every
/// sector keeps at least [`MIN_SECTOR_POINTS`] points, pushing boundaries
/// forward where clamped ranges would overlap. The emitted slices share
/// their boundary points, so rendered segments join without gaps.
pub fn segment(outline: &[Point2D], s1: f64, s2: f64, s3: f64) -> Option<TrackSectors> {
    let n = outline.len();
    if n < 3 * MIN_SECTOR_POINTS {
        return None;
    }
    let total = s1 + s2 + s3;
    if total <= 0.0 {
        return None;
    }

    let idx1 = (n as f64 * (s1 / total)).floor() as usize;
    let idx2 = (n as f64 * ((s1 + s2) / total)).floor() as usize;

    let safe_idx1 = idx1.clamp(MIN_SECTOR_POINTS, n - 2 * MIN_SECTOR_POINTS);
    let safe_idx2 = idx2.clamp(safe_idx1 + MIN_SECTOR_POINTS, n - MIN_SECTOR_POINTS);
    debug!(n, safe_idx1, safe_idx2, "sector boundaries");

    Some(TrackSectors {
        sector1: outline[..=safe_idx1].to_vec(),
        sector2: outline[safe_idx1..=safe_idx2].to_vec(),
        sector3: outline[safe_idx2..].to_vec(),
    })
}
