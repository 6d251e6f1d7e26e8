//! Composition of the canonical race record from the outputs of the other
//! core components, for both source pipelines.

use crate::time_scale::TimeScale;
use crate::track_param::TrackParam;
use crate::{NormalizeError, events, geometry, sectors, timeline};
use chrono::{DateTime, Datelike, Duration, Utc};
use common::historical::{DriverResult, LapTiming, PitStopRecord};
use common::live::{
    DriverEntry, PositionRecord, RaceControlMessage, RawLocation, SessionLap, SessionMeta,
    StintRecord,
};
use common::point::{GeoCoords, Point2D};
use common::record::{
    CanonicalRaceRecord, DriverInfo, LeaderLap, NormalizedLocation, PositionSample,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Laps apart by more than this are not consecutive; red flags and data
/// holes would otherwise skew the average lap duration.
pub const MAX_PLAUSIBLE_LAP_MS: i64 = 300_000;

/// Average lap duration assumed when none can be measured.
pub const DEFAULT_LAP_MS: i64 = 90_000;

/// The real-time bounds of one race.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaceWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl RaceWindow {
    pub fn duration_ms(&self) -> f64 {
        (self.end - self.start).num_milliseconds() as f64
    }
}

/// Derives the race window from lap timestamps: the earliest lap start
/// opens it, and the last lap start plus one average lap duration closes
/// it. With fewer than two timestamped laps the position feed's time range
/// serves as a fallback; without that either, the race cannot be timed at
/// all.
pub fn race_window(
    laps: &[SessionLap],
    positions: &[PositionRecord],
) -> Result<RaceWindow, NormalizeError> {
    let mut stamped: Vec<(DateTime<Utc>, u32)> = laps
        .iter()
        .filter_map(|l| Some((l.date_start?, l.driver_number)))
        .collect();
    stamped.sort_by_key(|s| s.0);

    if stamped.len() >= 2 {
        let start = stamped[0].0;
        let mut by_driver: BTreeMap<u32, Vec<DateTime<Utc>>> = BTreeMap::new();
        for (date, driver) in &stamped {
            by_driver.entry(*driver).or_default().push(*date);
        }
        let mut total_ms = 0i64;
        let mut count = 0i64;
        for times in by_driver.values() {
            for pair in times.windows(2) {
                let d = (pair[1] - pair[0]).num_milliseconds();
                if d > 0 && d < MAX_PLAUSIBLE_LAP_MS {
                    total_ms += d;
                    count += 1;
                }
            }
        }
        let avg_lap_ms = if count > 0 {
            total_ms / count
        } else {
            DEFAULT_LAP_MS
        };
        let end = stamped[stamped.len() - 1].0 + Duration::milliseconds(avg_lap_ms);
        debug!(avg_lap_ms, "race window from lap data");
        return Ok(RaceWindow { start, end });
    }

    let mut times = positions.iter().filter_map(|p| p.date);
    let first = times.next().ok_or(NormalizeError::NoTimingData)?;
    let (start, end) = times.fold((first, first), |(min, max), t| (min.min(t), max.max(t)));
    debug!("race window from position data");
    Ok(RaceWindow { start, end })
}

/// Picks the reference vehicle for outline extraction: the roster entry
/// with the most lap records, earliest roster order winning ties.
pub fn outline_driver(roster: &[DriverEntry], laps: &[SessionLap]) -> Option<u32> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for lap in laps {
        *counts.entry(lap.driver_number).or_default() += 1;
    }
    let mut best: Option<(u32, usize)> = None;
    for entry in roster {
        let count = counts.get(&entry.driver_number).copied().unwrap_or(0);
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((entry.driver_number, count));
        }
    }
    best.map(|(driver, _)| driver)
}

/// Everything the live (trajectory) pipeline has fetched for one session.
/// Per-driver locations are already normalized; only the reference
/// vehicle's raw trace is still around, for outline extraction.
pub struct LiveRaceInput<'a> {
    pub session: &'a SessionMeta,
    pub drivers: &'a [DriverEntry],
    pub laps: &'a [SessionLap],
    pub control: &'a [RaceControlMessage],
    pub stints: &'a [StintRecord],
    pub positions: &'a [PositionRecord],
    pub locations: BTreeMap<u32, Vec<NormalizedLocation>>,
    pub outline_driver: u32,
    pub outline_raw: &'a [RawLocation],
    pub circuit_coords: Option<GeoCoords>,
    pub window: RaceWindow,
    pub scale: TimeScale,
}

/// Assembles the canonical record for a live-telemetry session.
pub fn assemble_live(input: LiveRaceInput) -> Result<CanonicalRaceRecord, NormalizeError> {
    let LiveRaceInput {
        session,
        drivers,
        laps,
        control,
        stints,
        positions,
        locations,
        outline_driver,
        outline_raw,
        circuit_coords,
        window,
        scale,
    } = input;

    let track_outline =
        geometry::outline_from_trajectory(outline_raw, laps, outline_driver, &locations);
    let track_sectors = sectors::from_reference_lap(&track_outline, laps, outline_driver);

    let total_laps = laps.iter().map(|l| l.lap_number).max().unwrap_or(0);

    let mut leader_laps: Vec<LeaderLap> = laps
        .iter()
        .filter(|l| l.driver_number == outline_driver)
        .filter_map(|l| {
            Some(LeaderLap {
                t: scale.map_timestamp(l.date_start?, window.start),
                lap: l.lap_number,
            })
        })
        .collect();
    leader_laps.sort_by_key(|l| l.lap);

    let driver_map: BTreeMap<u32, DriverInfo> = drivers
        .iter()
        .map(|d| (d.driver_number, driver_info(d)))
        .collect();

    let mut position_map: BTreeMap<u32, Vec<PositionSample>> = BTreeMap::new();
    for record in positions {
        let Some(date) = record.date else { continue };
        let t = scale.map_timestamp(date, window.start);
        if scale.contains(t) {
            position_map
                .entry(record.driver_number)
                .or_default()
                .push(PositionSample {
                    t,
                    position: record.position,
                });
        }
    }
    for samples in position_map.values_mut() {
        samples.sort_by(|a, b| a.t.total_cmp(&b.t));
    }

    let mut stint_map: BTreeMap<u32, Vec<common::record::StintEntry>> = BTreeMap::new();
    for stint in stints {
        stint_map
            .entry(stint.driver_number)
            .or_default()
            .push(common::record::StintEntry {
                lap_start: stint.lap_start,
                lap_end: stint.lap_end,
                compound: stint.compound.clone(),
            });
    }
    for entries in stint_map.values_mut() {
        entries.sort_by_key(|s| s.lap_start);
    }

    let year = session
        .year
        .or_else(|| session.date_start.map(|d| d.year()))
        .unwrap_or(0);
    let name = session
        .circuit_short_name
        .clone()
        .or_else(|| session.country_name.clone())
        .unwrap_or_else(|| "Unknown".to_string());
    let suffix = if session.is_sprint() { "Sprint" } else { "GP" };

    let mut record = CanonicalRaceRecord {
        title: format!("{year} {name} {suffix}"),
        race_date: session.date_start.map(|d| d.date_naive().to_string()),
        circuit_name: session.circuit_short_name.clone(),
        circuit_coords,
        track_outline,
        track_sectors,
        drivers: driver_map,
        locations,
        positions: position_map,
        total_laps,
        laps: leader_laps,
        events: events::flag_events(control, &window, &scale),
        pit_stops: events::pit_stops_from_pit_out(laps, &window, &scale),
        fastest_lap: events::fastest_lap_live(laps, &window, &scale),
        stints: stint_map,
        race_duration_s: scale.playback_duration(),
    };
    enforce_window(&mut record, &scale);
    info!(title = %record.title, "assembled live race record");
    Ok(record)
}

fn driver_info(entry: &DriverEntry) -> DriverInfo {
    let code = entry
        .name_acronym
        .clone()
        .or_else(|| {
            entry
                .last_name
                .as_ref()
                .map(|n| n.chars().take(3).collect::<String>().to_uppercase())
        })
        .unwrap_or_else(|| entry.driver_number.to_string());
    let name = entry.full_name.clone().unwrap_or_else(|| {
        format!(
            "{} {}",
            entry.first_name.as_deref().unwrap_or(""),
            entry.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    });
    DriverInfo {
        number: entry.driver_number,
        code,
        name,
        team: entry
            .team_name
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()),
        color: entry
            .team_colour
            .as_ref()
            .map(|c| format!("#{c}"))
            .unwrap_or_else(|| "#ffffff".to_string()),
    }
}

/// Everything the lap-timing pipeline has fetched for one race, outline
/// already reconstructed from boundary geometry.
pub struct HistoricalRaceInput<'a> {
    pub year: i32,
    pub race_name: &'a str,
    pub race_date: Option<&'a str>,
    pub circuit_name: Option<&'a str>,
    pub circuit_coords: Option<GeoCoords>,
    pub outline: Vec<Point2D>,
    pub results: &'a [DriverResult],
    pub laps: &'a [LapTiming],
    pub pit_stops: &'a [PitStopRecord],
}

/// Assembles the canonical record for a lap-timing race: builds the driver
/// timelines, derives the playback budget from the winner's total time and
/// interpolates every driver's motion along the parameterized outline.
///
/// Flags, sectors and stints do not exist in this feed; those parts of the
/// record are empty by design.
pub fn assemble_historical(
    input: HistoricalRaceInput,
) -> Result<CanonicalRaceRecord, NormalizeError> {
    if input.laps.is_empty() {
        return Err(NormalizeError::NoLapData);
    }
    let timelines = timeline::build_timelines(input.results, input.laps);

    let total_laps = timelines
        .values()
        .map(|t| t.laps.len())
        .max()
        .unwrap_or(0) as u32;
    let winner_time = timelines
        .values()
        .filter(|t| t.laps.len() as u32 == total_laps)
        .map(|t| t.total_time)
        .fold(f64::INFINITY, f64::min);
    if !winner_time.is_finite() || winner_time <= 0.0 {
        return Err(NormalizeError::NoLapData);
    }

    let scale = TimeScale::new(winner_time * 1000.0, false);
    info!(
        total_laps,
        winner_time,
        playback = scale.playback_duration(),
        "time compression for historical race"
    );

    let param = TrackParam::new(input.outline).ok_or(NormalizeError::DegenerateOutline)?;
    let interpolation_end = winner_time + timeline::POST_RACE_HOLD_S;

    let mut driver_map = BTreeMap::new();
    let mut location_map = BTreeMap::new();
    let mut position_map = BTreeMap::new();
    for t in timelines.values() {
        driver_map.insert(
            t.number,
            DriverInfo {
                number: t.number,
                code: t.code.clone(),
                name: t.name.clone(),
                team: t.team.clone(),
                color: t.color.clone(),
            },
        );
        location_map.insert(
            t.number,
            timeline::interpolate_locations(t, &param, interpolation_end, &scale),
        );
        position_map.insert(
            t.number,
            timeline::position_timeline(t)
                .into_iter()
                .map(|p| PositionSample {
                    t: scale.scale_elapsed(p.t),
                    position: p.position,
                })
                .collect::<Vec<_>>(),
        );
    }

    let leader_laps: Vec<LeaderLap> = timelines
        .values()
        .find(|t| t.finish_position == 1)
        .map(|leader| {
            leader
                .laps
                .iter()
                .map(|l| LeaderLap {
                    t: scale.scale_elapsed(l.end_time),
                    lap: l.lap_number,
                })
                .collect()
        })
        .unwrap_or_default();

    let mut record = CanonicalRaceRecord {
        title: format!("{} {}", input.year, input.race_name.replace(" Grand Prix", " GP")),
        race_date: input.race_date.map(str::to_string),
        circuit_name: input.circuit_name.map(str::to_string),
        circuit_coords: input.circuit_coords,
        track_outline: param.outline().to_vec(),
        track_sectors: None,
        drivers: driver_map,
        locations: location_map,
        positions: position_map,
        total_laps,
        laps: leader_laps,
        events: vec![],
        pit_stops: events::pit_stops_from_records(input.pit_stops, &timelines, &scale),
        fastest_lap: events::fastest_lap_from_timelines(&timelines, &scale),
        stints: BTreeMap::new(),
        race_duration_s: scale.playback_duration(),
    };
    enforce_window(&mut record, &scale);
    info!(title = %record.title, "assembled historical race record");
    Ok(record)
}

/// Final invariant of the record: every playback time lies in `[0, Dp]`.
/// Interpolation intentionally overshoots the window (the post-race hold),
/// so out-of-window entries are truncated here rather than treated as
/// errors.
fn enforce_window(record: &mut CanonicalRaceRecord, scale: &TimeScale) {
    for samples in record.locations.values_mut() {
        samples.retain(|s| scale.contains(s.t));
    }
    for samples in record.positions.values_mut() {
        samples.retain(|s| scale.contains(s.t));
    }
    for stops in record.pit_stops.values_mut() {
        stops.retain(|s| scale.contains(s.t));
    }
    record.laps.retain(|l| scale.contains(l.t));
    record.events.retain(|e| scale.contains(e.t));
    if let Some(fastest) = &mut record.fastest_lap {
        fastest.t = fastest.t.clamp(0.0, scale.playback_duration());
    }
}
