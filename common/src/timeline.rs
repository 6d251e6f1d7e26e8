use serde::{Deserialize, Serialize};

/// One lap of a built driver timeline, with cumulative race times.
///
/// Invariants, guaranteed by the timeline builder:
/// - laps of one driver are sorted ascending by `lap_number`,
/// - `end_time == start_time + duration`,
/// - the next lap starts exactly where this one ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedLap {
    pub lap_number: u32,
    /// Race-elapsed seconds at which this lap started.
    pub start_time: f64,
    /// Race-elapsed seconds at which this lap ended.
    pub end_time: f64,
    /// Elapsed lap duration in seconds.
    pub duration: f64,
    /// Race standing at the end of this lap.
    pub position: u32,
}

/// The complete lap-time history of one driver in one race, immutable once
/// built from a fixed input set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverTimeline {
    pub driver_id: String,
    pub number: u32,
    pub code: String,
    pub name: String,
    pub team: String,
    pub color: String,
    /// Grid slot at the race start (1 = pole).
    pub grid: u32,
    pub laps: Vec<TimedLap>,
    /// Sum of all lap durations, i.e. the final `end_time`.
    pub total_time: f64,
    pub status: String,
    pub finish_position: u32,
}
