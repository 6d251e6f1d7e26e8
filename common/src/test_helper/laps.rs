// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::historical::{DriverResult, LapTiming};
use crate::live::SessionLap;
use chrono::{DateTime, Duration, TimeZone, Utc};

/// A fixed race start timestamp for live-pipeline tests.
pub fn race_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 5, 14, 0, 0).unwrap()
}

/// Builds lap timing records for one driver from a list of lap durations,
/// with the given running position on every lap.
pub fn lap_timings(driver_id: &str, durations: &[f64], position: u32) -> Vec<LapTiming> {
    durations
        .iter()
        .enumerate()
        .map(|(i, duration)| LapTiming {
            lap_number: i as u32 + 1,
            driver_id: driver_id.to_string(),
            time_s: *duration,
            position,
        })
        .collect()
}

/// Builds a finishing-classification entry with sensible display defaults.
pub fn driver_result(driver_id: &str, number: u32, grid: u32, finish_position: u32) -> DriverResult {
    DriverResult {
        driver_id: driver_id.to_string(),
        number,
        code: driver_id.chars().take(3).collect::<String>().to_uppercase(),
        name: driver_id.to_string(),
        team: "Test Racing".to_string(),
        team_color: "#808080".to_string(),
        grid,
        status: "Finished".to_string(),
        finish_position,
    }
}

/// Builds a live-feed lap record starting `offset_s` seconds after
/// [`race_start`].
pub fn session_lap(driver_number: u32, lap_number: u32, offset_s: i64, duration: f64) -> SessionLap {
    SessionLap {
        driver_number,
        lap_number,
        date_start: Some(race_start() + Duration::seconds(offset_s)),
        lap_duration: Some(duration),
        duration_sector_1: None,
        duration_sector_2: None,
        duration_sector_3: None,
        is_pit_out_lap: false,
    }
}
