use crate::point::{GeoCoords, Point2D};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A downsampled position sample on the playback timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedLocation {
    /// Playback time in seconds.
    pub t: f64,
    pub x: f64,
    pub y: f64,
}

/// A race-standing change on the playback timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub t: f64,
    pub position: u32,
}

/// The playback time at which the leader started a given lap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeaderLap {
    pub t: f64,
    pub lap: u32,
}

/// A flag or safety-car event mapped into playback time. The message text
/// passes through from the source unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceEvent {
    pub t: f64,
    pub category: String,
    pub flag: Option<String>,
    pub message: String,
    pub lap: Option<u32>,
}

/// One pit stop of one driver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitStop {
    pub t: f64,
    pub lap: u32,
}

/// The single fastest racing lap of the race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FastestLap {
    pub driver_number: u32,
    pub lap: u32,
    /// Real lap duration in seconds, not playback-scaled.
    pub duration: f64,
    pub t: f64,
}

/// One tire stint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StintEntry {
    pub lap_start: u32,
    pub lap_end: u32,
    pub compound: Option<String>,
}

/// Display metadata of one driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverInfo {
    pub number: u32,
    pub code: String,
    pub name: String,
    pub team: String,
    pub color: String,
}

/// The three timed track sectors as boundary-overlapping outline slices,
/// so rendered segments join without gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSectors {
    pub sector1: Vec<Point2D>,
    pub sector2: Vec<Point2D>,
    pub sector3: Vec<Point2D>,
}

/// The canonical race replay record. Both source pipelines emit exactly
/// this schema; it is computed once per race, persisted keyed by a session
/// identifier and never mutated afterwards.
///
/// Invariant: every playback time `t` in the record lies in
/// `[0, race_duration_s]`, and `race_duration_s` never exceeds the
/// playback budget of 3300 seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRaceRecord {
    pub title: String,
    pub race_date: Option<String>,
    pub circuit_name: Option<String>,
    pub circuit_coords: Option<GeoCoords>,
    pub track_outline: Vec<Point2D>,
    pub track_sectors: Option<TrackSectors>,
    pub drivers: BTreeMap<u32, DriverInfo>,
    pub locations: BTreeMap<u32, Vec<NormalizedLocation>>,
    pub positions: BTreeMap<u32, Vec<PositionSample>>,
    pub total_laps: u32,
    pub laps: Vec<LeaderLap>,
    pub events: Vec<RaceEvent>,
    pub pit_stops: BTreeMap<u32, Vec<PitStop>>,
    pub fastest_lap: Option<FastestLap>,
    pub stints: BTreeMap<u32, Vec<StintEntry>>,
    pub race_duration_s: f64,
}

impl CanonicalRaceRecord {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(record: &CanonicalRaceRecord) -> serde_json::Result<String> {
        serde_json::to_string(record)
    }
}
