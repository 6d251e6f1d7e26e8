use crate::time_scale::{MAX_RACE_DURATION_S, TimeScale};
use chrono::Duration;
use common::test_helper::laps::race_start;

#[test]
fn reference_duration_fills_the_whole_budget() {
    let scale = TimeScale::new(5_400_000.0, false);
    assert_eq!(scale.playback_duration(), 3300.0);
}

#[test]
fn half_the_reference_duration_halves_the_budget() {
    let scale = TimeScale::new(2_700_000.0, false);
    assert_eq!(scale.playback_duration(), 1650.0);
}

#[test]
fn long_races_clamp_to_the_budget() {
    let scale = TimeScale::new(10_800_000.0, false);
    assert_eq!(scale.playback_duration(), MAX_RACE_DURATION_S);
}

#[test]
fn sprints_shrink_before_the_clamp() {
    let scale = TimeScale::new(5_400_000.0, true);
    assert_eq!(scale.playback_duration(), 2310.0);
}

#[test]
fn factor_maps_the_full_race_onto_the_window() {
    let scale = TimeScale::new(2_700_000.0, false);
    let end = scale.scale_elapsed(2700.0);
    assert!((end - scale.playback_duration()).abs() < 1e-9);
}

#[test]
fn timestamps_map_relative_to_the_race_start() {
    let scale = TimeScale::new(5_400_000.0, false);
    let at = race_start() + Duration::seconds(60);
    let t = scale.map_timestamp(at, race_start());
    assert!((t - 36.666666).abs() < 1e-3);
}

#[test]
fn window_containment() {
    let scale = TimeScale::new(5_400_000.0, false);
    assert!(scale.contains(0.0));
    assert!(scale.contains(3300.0));
    assert!(!scale.contains(-0.1));
    assert!(!scale.contains(3300.1));
}
