//! Record shapes of the historical lap/results feed, after the provider
//! has flattened its nested wire format.

use serde::{Deserialize, Serialize};

/// One finishing-classification entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverResult {
    pub driver_id: String,
    pub number: u32,
    pub code: String,
    pub name: String,
    pub team: String,
    /// Display color resolved by the provider from its constructor table.
    pub team_color: String,
    pub grid: u32,
    pub status: String,
    pub finish_position: u32,
}

/// One per-driver lap timing record. `time_s` is the elapsed lap duration
/// in seconds, already parsed from the feed's `"M:SS.mmm"` string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapTiming {
    pub lap_number: u32,
    pub driver_id: String,
    pub time_s: f64,
    /// Race standing at the end of this lap.
    pub position: u32,
}

/// An explicit pit stop record. Only available from a cutoff season
/// onward; earlier seasons simply have none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitStopRecord {
    pub driver_id: String,
    pub lap_number: u32,
}
