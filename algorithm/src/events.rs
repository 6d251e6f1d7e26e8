//! Mapping of discrete race events (flags, pit stops, the fastest lap)
//! into playback time.

use crate::assemble::RaceWindow;
use crate::time_scale::TimeScale;
use common::historical::PitStopRecord;
use common::live::{RaceControlMessage, SessionLap};
use common::record::{FastestLap, PitStop};
use common::timeline::DriverTimeline;
use std::collections::BTreeMap;

/// Race-control categories that make it into the replay.
const EVENT_CATEGORIES: [&str; 2] = ["Flag", "SafetyCar"];

/// Filters race-control messages down to flag and safety-car events and
/// maps them onto the playback timeline, sorted by time. Message text
/// passes through unchanged; anything mapping outside the playback window
/// is dropped.
pub fn flag_events(
    control: &[RaceControlMessage],
    window: &RaceWindow,
    scale: &TimeScale,
) -> Vec<common::record::RaceEvent> {
    let mut events: Vec<common::record::RaceEvent> = control
        .iter()
        .filter(|m| EVENT_CATEGORIES.contains(&m.category.as_str()))
        .filter_map(|m| {
            let t = scale.map_timestamp(m.date?, window.start);
            if !scale.contains(t) {
                return None;
            }
            Some(common::record::RaceEvent {
                t,
                category: m.category.clone(),
                flag: m.flag.clone(),
                message: m.message.clone().unwrap_or_default(),
                lap: m.lap_number,
            })
        })
        .collect();
    events.sort_by(|a, b| a.t.total_cmp(&b.t));
    events
}

/// Infers pit stops from the pit-out marker of the following lap, grouped
/// per driver. Order within a driver is whatever the feed delivered; the
/// consumer sorts.
pub fn pit_stops_from_pit_out(
    laps: &[SessionLap],
    window: &RaceWindow,
    scale: &TimeScale,
) -> BTreeMap<u32, Vec<PitStop>> {
    let mut stops: BTreeMap<u32, Vec<PitStop>> = BTreeMap::new();
    for lap in laps {
        if !lap.is_pit_out_lap {
            continue;
        }
        let Some(date) = lap.date_start else {
            continue;
        };
        let t = scale.map_timestamp(date, window.start);
        if scale.contains(t) {
            stops.entry(lap.driver_number).or_default().push(PitStop {
                t,
                lap: lap.lap_number,
            });
        }
    }
    stops
}

/// Maps explicit pit stop records onto driver timelines. A stop lands at
/// the end of its lap; stops of unclassified drivers are dropped. Eras
/// without pit data simply pass an empty record list.
pub fn pit_stops_from_records(
    records: &[PitStopRecord],
    timelines: &BTreeMap<String, DriverTimeline>,
    scale: &TimeScale,
) -> BTreeMap<u32, Vec<PitStop>> {
    let mut stops: BTreeMap<u32, Vec<PitStop>> = BTreeMap::new();
    for record in records {
        let Some(timeline) = timelines.get(&record.driver_id) else {
            continue;
        };
        let t = timeline
            .laps
            .iter()
            .find(|l| l.lap_number == record.lap_number)
            .map(|l| scale.scale_elapsed(l.end_time))
            .unwrap_or(0.0);
        stops.entry(timeline.number).or_default().push(PitStop {
            t,
            lap: record.lap_number,
        });
    }
    stops
}

/// The single fastest lap across all drivers in the live pipeline,
/// excluding lap 1 and pit-out laps. Ties keep the first encountered
/// record; the feed's ordering is not guaranteed, so a tie is
/// implementation-defined rather than a stable rule.
pub fn fastest_lap_live(
    laps: &[SessionLap],
    window: &RaceWindow,
    scale: &TimeScale,
) -> Option<FastestLap> {
    let mut fastest: Option<FastestLap> = None;
    for lap in laps {
        let Some(duration) = lap.lap_duration else {
            continue;
        };
        if lap.lap_number <= 1 || lap.is_pit_out_lap {
            continue;
        }
        if fastest.as_ref().is_none_or(|f| duration < f.duration) {
            let t = lap
                .date_start
                .map(|d| scale.map_timestamp(d, window.start))
                .unwrap_or(0.0);
            fastest = Some(FastestLap {
                driver_number: lap.driver_number,
                lap: lap.lap_number,
                duration,
                t,
            });
        }
    }
    fastest
}

/// The single fastest lap in the lap-timing pipeline, excluding lap 1.
/// The pit-out flag does not exist in this feed, so in-laps cannot be
/// filtered here.
pub fn fastest_lap_from_timelines(
    timelines: &BTreeMap<String, DriverTimeline>,
    scale: &TimeScale,
) -> Option<FastestLap> {
    let mut fastest: Option<FastestLap> = None;
    for timeline in timelines.values() {
        for lap in &timeline.laps {
            if lap.lap_number <= 1 {
                continue;
            }
            if fastest.as_ref().is_none_or(|f| lap.duration < f.duration) {
                fastest = Some(FastestLap {
                    driver_number: timeline.number,
                    lap: lap.lap_number,
                    duration: lap.duration,
                    t: scale.scale_elapsed(lap.end_time),
                });
            }
        }
    }
    fastest
}
