//! Record shapes of the live telemetry feed.
//!
//! Field names follow the feed's snake_case JSON so the provider module can
//! deserialize responses directly into these types. Optional fields are
//! optional in the feed as well; consumers filter rather than fail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session metadata as listed by the live feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMeta {
    pub session_key: i64,
    pub session_name: String,
    pub year: Option<i32>,
    pub date_start: Option<DateTime<Utc>>,
    pub circuit_short_name: Option<String>,
    pub country_name: Option<String>,
}

impl SessionMeta {
    /// Whether this session is a sprint-format race. Sprints get a
    /// proportionally shorter playback budget.
    pub fn is_sprint(&self) -> bool {
        self.session_name == "Sprint"
    }
}

/// One roster entry of the live feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverEntry {
    pub driver_number: u32,
    pub name_acronym: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub team_name: Option<String>,
    pub team_colour: Option<String>,
}

/// A raw vehicle trajectory sample. `(0, 0)` is the feed's "no fix"
/// sentinel and is dropped during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawLocation {
    pub date: Option<DateTime<Utc>>,
    pub x: f64,
    pub y: f64,
}

impl RawLocation {
    pub fn is_sentinel(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// A per-driver lap record of the live feed, with optional per-sector
/// durations and the pit-out marker used to infer pit stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionLap {
    pub driver_number: u32,
    pub lap_number: u32,
    pub date_start: Option<DateTime<Utc>>,
    pub lap_duration: Option<f64>,
    pub duration_sector_1: Option<f64>,
    pub duration_sector_2: Option<f64>,
    pub duration_sector_3: Option<f64>,
    #[serde(default)]
    pub is_pit_out_lap: bool,
}

/// A discrete race-control message (flags, safety car, stewarding notes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceControlMessage {
    pub date: Option<DateTime<Utc>>,
    pub category: String,
    pub flag: Option<String>,
    pub message: Option<String>,
    pub lap_number: Option<u32>,
}

/// A tire stint record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StintRecord {
    pub driver_number: u32,
    pub lap_start: u32,
    pub lap_end: u32,
    pub compound: Option<String>,
}

/// A running race-standing sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub date: Option<DateTime<Utc>>,
    pub driver_number: u32,
    pub position: u32,
}
