use crate::assemble::{self, HistoricalRaceInput, LiveRaceInput};
use crate::{NormalizeError, time_scale};
use chrono::Duration;
use common::historical::PitStopRecord;
use common::live::{
    DriverEntry, PositionRecord, RaceControlMessage, RawLocation, SessionMeta, StintRecord,
};
use common::point::GeoCoords;
use common::record::NormalizedLocation;
use common::test_helper::laps::{driver_result, lap_timings, race_start, session_lap};
use common::test_helper::outline::square_outline;
use std::collections::BTreeMap;
use test_log::test;

fn roster_entry(driver_number: u32) -> DriverEntry {
    DriverEntry {
        driver_number,
        name_acronym: None,
        first_name: None,
        last_name: None,
        full_name: None,
        team_name: None,
        team_colour: None,
    }
}

#[test]
fn race_window_closes_one_average_lap_after_the_last_lap_start() {
    // consecutive gaps of 90, 90, 91 and 92 seconds average to 90.75s
    let laps = vec![
        session_lap(44, 1, 0, 90.0),
        session_lap(44, 2, 90, 90.0),
        session_lap(44, 3, 180, 91.0),
        session_lap(44, 4, 271, 92.0),
        session_lap(44, 5, 363, 90.0),
    ];
    let window = assemble::race_window(&laps, &[]).unwrap();
    assert_eq!(window.start, race_start());
    assert_eq!(window.duration_ms(), 453_750.0);
}

#[test]
fn implausible_lap_gaps_do_not_skew_the_average() {
    // the 400s red-flag gap of car 63 must not enter the average
    let laps = vec![
        session_lap(44, 1, 0, 90.0),
        session_lap(44, 2, 90, 90.0),
        session_lap(63, 1, 1, 90.0),
        session_lap(63, 2, 401, 90.0),
    ];
    let window = assemble::race_window(&laps, &[]).unwrap();
    // only car 44's single 90s gap counts: end = 401s + 90s
    assert_eq!(window.duration_ms(), 491_000.0);
}

#[test]
fn position_feed_bounds_the_window_when_lap_data_is_missing() {
    let positions: Vec<PositionRecord> = [500_i64, 10, 100]
        .iter()
        .map(|s| PositionRecord {
            date: Some(race_start() + Duration::seconds(*s)),
            driver_number: 44,
            position: 1,
        })
        .collect();
    let window = assemble::race_window(&[], &positions).unwrap();
    assert_eq!(window.start, race_start() + Duration::seconds(10));
    assert_eq!(window.duration_ms(), 490_000.0);
}

#[test]
fn a_race_without_any_timing_cannot_be_windowed() {
    let result = assemble::race_window(&[], &[]);
    assert!(matches!(result, Err(NormalizeError::NoTimingData)));
}

#[test]
fn outline_driver_is_the_roster_entry_with_the_most_laps() {
    let roster = vec![roster_entry(44), roster_entry(63)];
    let laps = vec![
        session_lap(44, 1, 0, 90.0),
        session_lap(63, 1, 1, 90.0),
        session_lap(63, 2, 91, 90.0),
    ];
    assert_eq!(assemble::outline_driver(&roster, &laps), Some(63));
    // ties go to the earlier roster entry
    let tied = vec![session_lap(44, 1, 0, 90.0), session_lap(63, 1, 1, 90.0)];
    assert_eq!(assemble::outline_driver(&roster, &tied), Some(44));
    assert_eq!(assemble::outline_driver(&[], &laps), None);
}

#[test]
fn live_assembly_composes_the_full_record() {
    let session = SessionMeta {
        session_key: 9472,
        session_name: "Race".to_string(),
        year: Some(2024),
        date_start: Some(race_start()),
        circuit_short_name: Some("Monza".to_string()),
        country_name: Some("Italy".to_string()),
    };
    let mut hamilton = roster_entry(44);
    hamilton.first_name = Some("Lewis".to_string());
    hamilton.last_name = Some("Hamilton".to_string());
    let mut norris = roster_entry(4);
    norris.name_acronym = Some("NOR".to_string());
    norris.full_name = Some("Lando Norris".to_string());
    norris.team_name = Some("McLaren".to_string());
    norris.team_colour = Some("FF8000".to_string());
    let drivers = vec![hamilton, norris];

    // laps arrive unordered; car 4's second lap follows a stop
    let mut in_lap = session_lap(4, 2, 92, 91.0);
    in_lap.is_pit_out_lap = true;
    let laps = vec![
        session_lap(44, 2, 90, 89.5),
        session_lap(44, 1, 0, 90.0),
        session_lap(44, 3, 180, 90.0),
        session_lap(4, 1, 0, 92.0),
        in_lap,
    ];

    let control = vec![
        RaceControlMessage {
            date: Some(race_start() + Duration::seconds(60)),
            category: "Flag".to_string(),
            flag: Some("YELLOW".to_string()),
            message: Some("Debris on track".to_string()),
            lap_number: Some(1),
        },
        RaceControlMessage {
            date: Some(race_start() + Duration::seconds(70)),
            category: "Other".to_string(),
            flag: None,
            message: None,
            lap_number: None,
        },
        RaceControlMessage {
            date: Some(race_start() + Duration::seconds(9000)),
            category: "Flag".to_string(),
            flag: Some("CHEQUERED".to_string()),
            message: None,
            lap_number: None,
        },
    ];

    let stints = vec![
        StintRecord {
            driver_number: 44,
            lap_start: 2,
            lap_end: 3,
            compound: Some("HARD".to_string()),
        },
        StintRecord {
            driver_number: 44,
            lap_start: 1,
            lap_end: 1,
            compound: Some("SOFT".to_string()),
        },
    ];

    let positions = vec![
        PositionRecord {
            date: Some(race_start() + Duration::seconds(120)),
            driver_number: 4,
            position: 2,
        },
        PositionRecord {
            date: Some(race_start() + Duration::seconds(30)),
            driver_number: 4,
            position: 3,
        },
        PositionRecord {
            date: Some(race_start() + Duration::seconds(9000)),
            driver_number: 4,
            position: 1,
        },
    ];

    // 24 samples around a 200m circle inside car 44's second lap
    let outline_raw: Vec<RawLocation> = (0..24)
        .map(|i| {
            let angle = i as f64 / 24.0 * std::f64::consts::TAU;
            RawLocation {
                date: Some(race_start() + Duration::seconds(90 + i)),
                x: 200.0 * angle.cos(),
                y: 200.0 * angle.sin(),
            }
        })
        .collect();

    let mut locations = BTreeMap::new();
    locations.insert(
        44,
        vec![
            NormalizedLocation {
                t: 0.0,
                x: 200.0,
                y: 0.0,
            },
            NormalizedLocation {
                t: 80.0,
                x: -200.0,
                y: 0.0,
            },
            NormalizedLocation {
                t: 164.0,
                x: 200.0,
                y: 0.0,
            },
            NormalizedLocation {
                t: 2000.0,
                x: 200.0,
                y: 0.0,
            },
        ],
    );
    locations.insert(
        4,
        vec![NormalizedLocation {
            t: 1.0,
            x: 0.0,
            y: 200.0,
        }],
    );

    // gaps of 90, 90 and 92 seconds average to 90.666s past the last start
    let window = assemble::race_window(&laps, &positions).unwrap();
    assert_eq!(window.duration_ms(), 270_666.0);
    let scale = time_scale::TimeScale::new(window.duration_ms(), session.is_sprint());
    let k = scale.factor();

    let record = assemble::assemble_live(LiveRaceInput {
        session: &session,
        drivers: &drivers,
        laps: &laps,
        control: &control,
        stints: &stints,
        positions: &positions,
        locations,
        outline_driver: 44,
        outline_raw: &outline_raw,
        circuit_coords: Some(GeoCoords {
            lat: 45.6156,
            lon: 9.2811,
        }),
        window,
        scale,
    })
    .unwrap();

    assert_eq!(record.title, "2024 Monza GP");
    assert_eq!(record.race_date.as_deref(), Some("2024-05-05"));
    assert_eq!(record.circuit_name.as_deref(), Some("Monza"));
    assert_eq!(record.race_duration_s, 165.0);
    assert_eq!(record.total_laps, 3);

    // the lap-2 trajectory window yields the full circle, no fallback
    assert_eq!(record.track_outline.len(), 24);
    assert!(record.track_sectors.is_none());

    // roster entries with partial metadata get display fallbacks
    assert_eq!(record.drivers[&44].code, "HAM");
    assert_eq!(record.drivers[&44].name, "Lewis Hamilton");
    assert_eq!(record.drivers[&44].team, "Unknown");
    assert_eq!(record.drivers[&44].color, "#ffffff");
    assert_eq!(record.drivers[&4].code, "NOR");
    assert_eq!(record.drivers[&4].color, "#FF8000");

    // leader laps come from the reference vehicle, sorted by lap number
    let lap_numbers: Vec<u32> = record.laps.iter().map(|l| l.lap).collect();
    assert_eq!(lap_numbers, vec![1, 2, 3]);
    assert_eq!(record.laps[0].t, 0.0);
    assert_eq!(record.laps[1].t, 90.0 * k);
    assert_eq!(record.laps[2].t, 180.0 * k);

    // only the in-window flag survives; stray categories never enter
    assert_eq!(record.events.len(), 1);
    assert_eq!(record.events[0].t, 60.0 * k);
    assert_eq!(record.events[0].flag.as_deref(), Some("YELLOW"));

    // stints per driver, ordered by starting lap
    let stint_starts: Vec<u32> = record.stints[&44].iter().map(|s| s.lap_start).collect();
    assert_eq!(stint_starts, vec![1, 2]);

    // position samples sorted, the post-race one dropped
    let car4_times: Vec<f64> = record.positions[&4].iter().map(|p| p.t).collect();
    assert_eq!(car4_times, vec![30.0 * k, 120.0 * k]);
    assert_eq!(record.positions[&4][0].position, 3);

    // pit stop inferred from car 4's pit-out lap
    assert_eq!(record.pit_stops[&4][0].lap, 2);
    assert_eq!(record.pit_stops[&4][0].t, 92.0 * k);
    assert!(!record.pit_stops.contains_key(&44));

    let fastest = record.fastest_lap.as_ref().unwrap();
    assert_eq!(fastest.driver_number, 44);
    assert_eq!(fastest.lap, 2);
    assert_eq!(fastest.duration, 89.5);

    // the out-of-window location sample is truncated away
    assert_eq!(record.locations[&44].len(), 3);
    for samples in record.locations.values() {
        for sample in samples {
            assert!(sample.t >= 0.0 && sample.t <= record.race_duration_s);
        }
    }
}

fn two_driver_race<'a>(
    laps: &'a [common::historical::LapTiming],
    results: &'a [common::historical::DriverResult],
    pit_stops: &'a [PitStopRecord],
) -> HistoricalRaceInput<'a> {
    HistoricalRaceInput {
        year: 2023,
        race_name: "Monaco Grand Prix",
        race_date: Some("2023-05-28"),
        circuit_name: Some("Circuit de Monaco"),
        circuit_coords: Some(GeoCoords {
            lat: 43.7347,
            lon: 7.4206,
        }),
        outline: square_outline(400.0, 30),
        results,
        laps,
        pit_stops,
    }
}

#[test]
fn historical_assembly_compresses_the_winner_onto_the_playback_budget() {
    let results = vec![
        driver_result("alonso", 14, 1, 1),
        driver_result("stroll", 18, 2, 2),
    ];
    let mut laps = lap_timings("alonso", &[90.0, 90.0, 90.0], 1);
    laps.extend(lap_timings("stroll", &[92.0, 92.0, 92.0], 2));
    let stops = vec![PitStopRecord {
        driver_id: "stroll".to_string(),
        lap_number: 2,
    }];

    let record = assemble::assemble_historical(two_driver_race(&laps, &results, &stops)).unwrap();

    // 270s of racing squeezed onto round(270000 / 5400000 * 3300) = 165s
    assert_eq!(record.race_duration_s, 165.0);
    assert_eq!(record.total_laps, 3);
    assert_eq!(record.title, "2023 Monaco GP");
    assert_eq!(record.drivers.len(), 2);
    assert_eq!(record.drivers[&14].code, "ALO");

    let winner = &record.locations[&14];
    assert!(!winner.is_empty());
    // motion starts on the start line and ends at the playback boundary
    assert_eq!(winner[0].t, 0.0);
    assert_eq!(winner[0].x, 0.0);
    assert_eq!(winner[0].y, 0.0);
    let last = winner.last().unwrap();
    assert!(last.t > 163.0 && last.t <= 165.0);
    for sample in winner {
        assert!(sample.t >= 0.0 && sample.t <= 165.0);
    }

    // positions never change, so only the grid sample remains
    assert_eq!(record.positions[&14].len(), 1);
    assert_eq!(record.positions[&14][0].position, 1);
    assert_eq!(record.positions[&18][0].position, 2);

    assert_eq!(record.laps[0].lap, 1);
    assert!((record.laps[0].t - 55.0).abs() < 1e-9);

    let fastest = record.fastest_lap.as_ref().unwrap();
    assert_eq!(fastest.driver_number, 14);
    assert_eq!(fastest.lap, 2);
    assert_eq!(fastest.duration, 90.0);

    assert_eq!(record.pit_stops[&18][0].lap, 2);
    assert!(record.events.is_empty());
    assert!(record.track_sectors.is_none());
}

#[test]
fn the_playback_budget_never_exceeds_its_cap() {
    let results = vec![driver_result("alonso", 14, 1, 1)];
    let laps = lap_timings("alonso", &[2000.0, 2000.0, 2000.0], 1);
    let record = assemble::assemble_historical(two_driver_race(&laps, &results, &[])).unwrap();
    assert_eq!(record.race_duration_s, time_scale::MAX_RACE_DURATION_S);
}

#[test]
fn historical_assembly_rejects_races_without_laps() {
    let results = vec![driver_result("alonso", 14, 1, 1)];
    let result = assemble::assemble_historical(two_driver_race(&[], &results, &[]));
    assert!(matches!(result, Err(NormalizeError::NoLapData)));
}

#[test]
fn historical_assembly_rejects_degenerate_outlines() {
    let results = vec![driver_result("alonso", 14, 1, 1)];
    let laps = lap_timings("alonso", &[90.0], 1);
    let mut input = two_driver_race(&laps, &results, &[]);
    input.outline = vec![];
    let result = assemble::assemble_historical(input);
    assert!(matches!(result, Err(NormalizeError::DegenerateOutline)));
}
