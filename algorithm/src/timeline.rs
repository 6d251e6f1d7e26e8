//! Lap-based driver motion reconstruction (the no-trajectory pipeline).
//!
//! Without intra-lap telemetry the only usable signal is the elapsed lap
//! duration, so progress within a lap is time-proportional rather than
//! distance-proportional. That is a documented simplification: a driver
//! moves along the outline at constant lap fraction per second.

use crate::locations;
use crate::time_scale::TimeScale;
use crate::track_param::TrackParam;
use common::historical::{DriverResult, LapTiming};
use common::record::{NormalizedLocation, PositionSample};
use common::timeline::{DriverTimeline, TimedLap};
use std::collections::BTreeMap;

/// Lap fraction one grid slot is placed behind the start line. The grid
/// covers roughly 200 m, so each slot sits about 0.2 % of a lap further
/// back. A historical heuristic, kept overridable rather than treated as
/// a domain fact.
pub const GRID_SLOT_SPACING: f64 = 0.002;

/// How far past the leader's finish the interpolation keeps producing
/// samples, in real seconds, so trailing cars do not vanish mid-lap.
pub const POST_RACE_HOLD_S: f64 = 60.0;

/// Real-time sampling step of the interpolation, in seconds.
pub const SAMPLE_STEP_S: f64 = 1.0;

/// Grid slot assumed for pit-lane starters, which the historical feed
/// reports as grid 0: the last conventional slot of a full field.
pub const PIT_LANE_START_SLOT: u32 = 20;

/// Builds one timeline per classified driver from results and lap timing
/// records, keyed by driver id.
///
/// Laps may arrive in any order; they are sorted ascending by lap number
/// before the cumulative start/end times are accumulated, so the final
/// `end_time` always equals the sum of all lap durations.
pub fn build_timelines(
    results: &[DriverResult],
    laps: &[LapTiming],
) -> BTreeMap<String, DriverTimeline> {
    let mut timelines: BTreeMap<String, DriverTimeline> = results
        .iter()
        .map(|r| {
            (
                r.driver_id.clone(),
                DriverTimeline {
                    driver_id: r.driver_id.clone(),
                    number: r.number,
                    code: r.code.clone(),
                    name: r.name.clone(),
                    team: r.team.clone(),
                    color: r.team_color.clone(),
                    grid: r.grid,
                    laps: vec![],
                    total_time: 0.0,
                    status: r.status.clone(),
                    finish_position: r.finish_position,
                },
            )
        })
        .collect();

    for timing in laps {
        let Some(timeline) = timelines.get_mut(&timing.driver_id) else {
            continue;
        };
        timeline.laps.push(TimedLap {
            lap_number: timing.lap_number,
            start_time: 0.0,
            end_time: 0.0,
            duration: timing.time_s,
            position: timing.position,
        });
    }

    for timeline in timelines.values_mut() {
        timeline.laps.sort_by_key(|l| l.lap_number);
        let mut elapsed = 0.0;
        for lap in &mut timeline.laps {
            lap.start_time = elapsed;
            elapsed += lap.duration;
            lap.end_time = elapsed;
        }
        timeline.total_time = elapsed;
    }
    timelines
}

fn grid_slot(timeline: &DriverTimeline) -> u32 {
    if timeline.grid == 0 {
        PIT_LANE_START_SLOT
    } else {
        timeline.grid
    }
}

/// Lap progress of a driver at race-elapsed time `t`.
///
/// Before the first lap starts the driver holds a synthetic grid slot just
/// short of the start line; within a lap progress grows time-proportional;
/// past the last recorded lap (finished or retired) the progress freezes at
/// its last computed value instead of extrapolating.
fn progress_at(timeline: &DriverTimeline, t: f64) -> Option<f64> {
    let first = timeline.laps.first()?;
    if t < first.start_time {
        return Some(1.0 - f64::from(grid_slot(timeline)) * GRID_SLOT_SPACING);
    }
    for lap in &timeline.laps {
        if t >= lap.start_time && t < lap.end_time {
            let within = if lap.duration > 0.0 {
                (t - lap.start_time) / lap.duration
            } else {
                0.0
            };
            return Some(f64::from(lap.lap_number) - 1.0 + within);
        }
    }
    // past the last lap: progress frozen at the lap boundary
    let last = timeline.laps.last()?;
    Some(f64::from(last.lap_number))
}

/// Produces playback-time location samples for one driver by sampling the
/// outline at [`SAMPLE_STEP_S`] real-time steps from 0 to `end_time`,
/// scaling to playback time and downsampling like the trajectory
/// pipeline. A driver without any lap yields no samples.
pub fn interpolate_locations(
    timeline: &DriverTimeline,
    param: &TrackParam,
    end_time: f64,
    scale: &TimeScale,
) -> Vec<NormalizedLocation> {
    if timeline.laps.is_empty() {
        return vec![];
    }
    let steps = (end_time / SAMPLE_STEP_S).floor() as usize;
    let mut points = Vec::with_capacity(steps + 1);
    for i in 0..=steps {
        let t = i as f64 * SAMPLE_STEP_S;
        let Some(progress) = progress_at(timeline, t) else {
            continue;
        };
        let pos = param.sample(progress);
        points.push(NormalizedLocation {
            t: scale.scale_elapsed(t),
            x: pos.x,
            y: pos.y,
        });
    }
    locations::downsample(points, locations::MIN_SAMPLE_SPACING_S)
}

/// Builds the race-standing timeline of one driver: the grid slot at t=0,
/// then one sample per lap on which the standing changed. Times are real
/// race seconds; the caller applies the compression factor.
pub fn position_timeline(timeline: &DriverTimeline) -> Vec<PositionSample> {
    let mut last_position = grid_slot(timeline);
    let mut positions = vec![PositionSample {
        t: 0.0,
        position: last_position,
    }];
    for lap in &timeline.laps {
        if lap.position != last_position {
            positions.push(PositionSample {
                t: lap.end_time,
                position: lap.position,
            });
            last_position = lap.position;
        }
    }
    positions
}
