use crate::point::Point2D;
use crate::record::{
    CanonicalRaceRecord, DriverInfo, FastestLap, LeaderLap, NormalizedLocation, PitStop,
    PositionSample,
};
use std::collections::BTreeMap;

fn get_record() -> CanonicalRaceRecord {
    let mut drivers = BTreeMap::new();
    drivers.insert(
        44,
        DriverInfo {
            number: 44,
            code: "HAM".to_string(),
            name: "Lewis Hamilton".to_string(),
            team: "Mercedes".to_string(),
            color: "#00D2BE".to_string(),
        },
    );
    let mut locations = BTreeMap::new();
    locations.insert(
        44,
        vec![
            NormalizedLocation {
                t: 0.0,
                x: 0.0,
                y: 0.0,
            },
            NormalizedLocation {
                t: 1.5,
                x: 40.0,
                y: 2.0,
            },
        ],
    );
    let mut positions = BTreeMap::new();
    positions.insert(44, vec![PositionSample { t: 0.0, position: 1 }]);
    let mut pit_stops = BTreeMap::new();
    pit_stops.insert(44, vec![PitStop { t: 801.2, lap: 24 }]);
    CanonicalRaceRecord {
        title: "2024 Monza GP".to_string(),
        race_date: Some("2024-09-01".to_string()),
        circuit_name: Some("Monza".to_string()),
        circuit_coords: None,
        track_outline: vec![
            Point2D { x: 0.0, y: 0.0 },
            Point2D { x: 100.0, y: 0.0 },
            Point2D { x: 100.0, y: 50.0 },
        ],
        track_sectors: None,
        drivers,
        locations,
        positions,
        total_laps: 53,
        laps: vec![LeaderLap { t: 58.1, lap: 2 }],
        events: vec![],
        pit_stops,
        fastest_lap: Some(FastestLap {
            driver_number: 44,
            lap: 48,
            duration: 81.046,
            t: 2950.0,
        }),
        stints: BTreeMap::new(),
        race_duration_s: 3300.0,
    }
}

#[test]
fn record_roundtrips_through_json() {
    let record = get_record();
    let json = CanonicalRaceRecord::to_json(&record)
        .unwrap_or_else(|e| panic!("Failed to serialize the record. Reason: {e}"));
    let parsed = CanonicalRaceRecord::from_json(&json)
        .unwrap_or_else(|e| panic!("Failed to deserialize the raw json. Reason: {e}"));
    assert_eq!(record, parsed);
}

#[test]
fn record_serializes_with_playback_schema_names() {
    let json = CanonicalRaceRecord::to_json(&get_record()).unwrap();
    assert!(json.contains("\"trackOutline\""));
    assert!(json.contains("\"trackSectors\""));
    assert!(json.contains("\"totalLaps\""));
    assert!(json.contains("\"pitStops\""));
    assert!(json.contains("\"fastestLap\""));
    assert!(json.contains("\"raceDurationS\""));
    // map keys are driver numbers serialized as strings
    assert!(json.contains("\"44\""));
}
