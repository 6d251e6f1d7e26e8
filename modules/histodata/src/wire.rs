// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Wire shapes of the lap-timing archive.
//!
//! The archive wraps everything in an `MRData` envelope and serializes all
//! numbers as strings; conversion into the common types happens in the
//! client, these structs only mirror the JSON.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(rename = "MRData")]
    pub mr_data: MrData,
}

#[derive(Debug, Deserialize)]
pub struct MrData {
    #[serde(default)]
    pub total: Option<String>,
    #[serde(rename = "RaceTable", default)]
    pub race_table: Option<RaceTable>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RaceTable {
    #[serde(rename = "Races", default)]
    pub races: Vec<Race>,
}

#[derive(Debug, Deserialize)]
pub struct Race {
    #[serde(rename = "raceName")]
    pub race_name: String,
    #[serde(default)]
    pub round: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(rename = "Circuit")]
    pub circuit: Circuit,
    #[serde(rename = "Results", default)]
    pub results: Vec<ResultEntry>,
    #[serde(rename = "Laps", default)]
    pub laps: Vec<Lap>,
    #[serde(rename = "PitStops", default)]
    pub pit_stops: Vec<PitStop>,
}

#[derive(Debug, Deserialize)]
pub struct Circuit {
    #[serde(rename = "circuitId")]
    pub circuit_id: String,
    #[serde(rename = "circuitName", default)]
    pub circuit_name: Option<String>,
    #[serde(rename = "Location", default)]
    pub location: Option<Location>,
}

#[derive(Debug, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub lat: Option<String>,
    #[serde(default)]
    pub long: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResultEntry {
    pub number: String,
    pub position: String,
    pub grid: String,
    pub status: String,
    #[serde(rename = "Driver")]
    pub driver: Driver,
    #[serde(rename = "Constructor")]
    pub constructor: Constructor,
}

#[derive(Debug, Deserialize)]
pub struct Driver {
    #[serde(rename = "driverId")]
    pub driver_id: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(rename = "givenName")]
    pub given_name: String,
    #[serde(rename = "familyName")]
    pub family_name: String,
}

#[derive(Debug, Deserialize)]
pub struct Constructor {
    #[serde(rename = "constructorId")]
    pub constructor_id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Lap {
    pub number: String,
    #[serde(rename = "Timings", default)]
    pub timings: Vec<Timing>,
}

#[derive(Debug, Deserialize)]
pub struct Timing {
    #[serde(rename = "driverId")]
    pub driver_id: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PitStop {
    #[serde(rename = "driverId")]
    pub driver_id: String,
    pub lap: String,
}
