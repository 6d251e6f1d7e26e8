// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Histodata Modul for the race replay generator
//!
//! Client for the historical lap-timing archive: season listings, race
//! classifications, per-lap timing and pit stops. The archive speaks the
//! `MRData` envelope dialect with all numbers as strings; this module
//! converts responses into the common record shapes.

pub mod colors;
pub mod wire;

use async_trait::async_trait;
use common::historical::{DriverResult, LapTiming, PitStopRecord};
use common::point::GeoCoords;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Public mirror of the lap-timing archive.
pub const DEFAULT_BASE_URL: &str = "https://api.jolpi.ca/ergast/f1";

/// First season with pit stop records; earlier seasons are queried as
/// having none instead of erroring.
pub const PIT_DATA_FROM_SEASON: i32 = 2012;

/// The archive caps timing responses at about this many records per page
/// regardless of the requested limit.
pub const LAP_PAGE_SIZE: u32 = 100;

/// Attempts per request before a rate limit becomes an error.
pub const FETCH_ATTEMPTS: u32 = 3;

/// Base backoff after a rate-limit response; attempt `n` waits `n` times
/// this long.
pub const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(5);

/// Errors of the archive client.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("archive request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("archive returned status {status} for {url}")]
    Status { status: u16, url: String },
    #[error("still rate limited after {attempts} attempts: {url}")]
    RateLimited { attempts: u32, url: String },
}

/// One race of a season listing.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonRace {
    pub round: u32,
    pub race_name: String,
    pub date: Option<String>,
    pub circuit_id: String,
}

/// Everything the race classification endpoint knows about one race.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceInfo {
    pub race_name: String,
    pub date: Option<String>,
    pub circuit_id: String,
    pub circuit_name: Option<String>,
    pub coords: Option<GeoCoords>,
    pub results: Vec<DriverResult>,
}

/// The data feeds the historical archive provides.
#[async_trait]
pub trait HistoricalProvider {
    async fn season(&self, year: i32) -> Result<Vec<SeasonRace>, FetchError>;
    /// Race classification, or `None` when the round does not exist.
    async fn race(&self, year: i32, round: u32) -> Result<Option<RaceInfo>, FetchError>;
    /// All per-lap timing records of one race, merged across the
    /// archive's pagination.
    async fn laps(&self, year: i32, round: u32) -> Result<Vec<LapTiming>, FetchError>;
    /// Pit stops of one race; always empty before
    /// [`PIT_DATA_FROM_SEASON`], and empty rather than an error when the
    /// endpoint fails.
    async fn pit_stops(&self, year: i32, round: u32) -> Result<Vec<PitStopRecord>, FetchError>;
}

/// HTTP implementation of [`HistoricalProvider`].
pub struct ArchiveClient {
    base_url: String,
    client: reqwest::Client,
}

impl Default for ArchiveClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ArchiveClient {
    pub fn new(base_url: &str) -> Self {
        ArchiveClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn fetch_envelope(&self, url: &str) -> Result<wire::Envelope, FetchError> {
        for attempt in 1..=FETCH_ATTEMPTS {
            let response = self.client.get(url).send().await?;
            if response.status().as_u16() == 429 {
                let wait = RATE_LIMIT_BACKOFF * attempt;
                warn!("Rate limited on {url}, waiting {}s", wait.as_secs());
                tokio::time::sleep(wait).await;
                continue;
            }
            if !response.status().is_success() {
                return Err(FetchError::Status {
                    status: response.status().as_u16(),
                    url: url.to_string(),
                });
            }
            debug!("Fetched {url}");
            return Ok(response.json().await?);
        }
        Err(FetchError::RateLimited {
            attempts: FETCH_ATTEMPTS,
            url: url.to_string(),
        })
    }

    fn races(envelope: wire::Envelope) -> Vec<wire::Race> {
        envelope
            .mr_data
            .race_table
            .map(|t| t.races)
            .unwrap_or_default()
    }
}

#[async_trait]
impl HistoricalProvider for ArchiveClient {
    async fn season(&self, year: i32) -> Result<Vec<SeasonRace>, FetchError> {
        let url = format!("{}/{year}.json", self.base_url);
        let races = Self::races(self.fetch_envelope(&url).await?);
        Ok(races
            .into_iter()
            .map(|r| SeasonRace {
                round: r.round.as_deref().and_then(|v| v.parse().ok()).unwrap_or(0),
                race_name: r.race_name,
                date: r.date,
                circuit_id: r.circuit.circuit_id,
            })
            .collect())
    }

    async fn race(&self, year: i32, round: u32) -> Result<Option<RaceInfo>, FetchError> {
        let url = format!("{}/{year}/{round}/results.json", self.base_url);
        let mut races = Self::races(self.fetch_envelope(&url).await?);
        if races.is_empty() {
            return Ok(None);
        }
        let race = races.remove(0);
        info!(
            race = %race.race_name,
            circuit = %race.circuit.circuit_id,
            drivers = race.results.len(),
            "loaded race classification"
        );
        Ok(Some(convert_race(race)))
    }

    async fn laps(&self, year: i32, round: u32) -> Result<Vec<LapTiming>, FetchError> {
        // pagination counts timing records (laps x drivers), not laps, so
        // one lap can span two pages
        let mut timings: Vec<LapTiming> = vec![];
        let mut offset = 0u32;
        loop {
            let url = format!(
                "{}/{year}/{round}/laps.json?limit={LAP_PAGE_SIZE}&offset={offset}",
                self.base_url
            );
            let envelope = self.fetch_envelope(&url).await?;
            let total: u32 = envelope
                .mr_data
                .total
                .as_deref()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            let races = Self::races(envelope);
            let Some(race) = races.into_iter().next() else {
                break;
            };
            if race.laps.is_empty() {
                break;
            }
            for lap in &race.laps {
                timings.extend(convert_lap(lap));
            }
            offset += LAP_PAGE_SIZE;
            if offset >= total {
                break;
            }
        }
        info!(records = timings.len(), "loaded lap timing records");
        Ok(timings)
    }

    async fn pit_stops(&self, year: i32, round: u32) -> Result<Vec<PitStopRecord>, FetchError> {
        if year < PIT_DATA_FROM_SEASON {
            debug!(year, "no pit stop records for this era");
            return Ok(vec![]);
        }
        let url = format!("{}/{year}/{round}/pitstops.json", self.base_url);
        let races = match self.fetch_envelope(&url).await {
            Ok(envelope) => Self::races(envelope),
            Err(e) => {
                warn!("Failed to load pit stops, continuing without. Error: {e}");
                return Ok(vec![]);
            }
        };
        Ok(races
            .into_iter()
            .next()
            .map(|race| {
                race.pit_stops
                    .iter()
                    .map(|stop| PitStopRecord {
                        driver_id: stop.driver_id.clone(),
                        lap_number: stop.lap.parse().unwrap_or(0),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

fn convert_race(race: wire::Race) -> RaceInfo {
    RaceInfo {
        race_name: race.race_name,
        date: race.date,
        circuit_id: race.circuit.circuit_id,
        circuit_name: race.circuit.circuit_name,
        coords: race.circuit.location.as_ref().and_then(parse_coords),
        results: race.results.iter().map(convert_result).collect(),
    }
}

fn parse_coords(location: &wire::Location) -> Option<GeoCoords> {
    Some(GeoCoords {
        lat: location.lat.as_deref()?.parse().ok()?,
        lon: location.long.as_deref()?.parse().ok()?,
    })
}

fn convert_result(entry: &wire::ResultEntry) -> DriverResult {
    let code = entry.driver.code.clone().unwrap_or_else(|| {
        entry
            .driver
            .family_name
            .chars()
            .take(3)
            .collect::<String>()
            .to_uppercase()
    });
    DriverResult {
        driver_id: entry.driver.driver_id.clone(),
        number: entry.number.parse().unwrap_or(0),
        code,
        name: format!("{} {}", entry.driver.given_name, entry.driver.family_name),
        team: entry.constructor.name.clone(),
        team_color: colors::team_color(&entry.constructor.constructor_id).to_string(),
        grid: entry.grid.parse().unwrap_or(0),
        status: entry.status.clone(),
        finish_position: entry.position.parse().unwrap_or(0),
    }
}

/// One wire lap fans out into one timing record per driver; timings
/// without a parseable lap time are dropped.
fn convert_lap(lap: &wire::Lap) -> Vec<LapTiming> {
    let lap_number: u32 = lap.number.parse().unwrap_or(0);
    lap.timings
        .iter()
        .filter_map(|timing| {
            let time_s = common::serde::lap_time::parse(timing.time.as_deref()?)?;
            Some(LapTiming {
                lap_number,
                driver_id: timing.driver_id.clone(),
                time_s,
                position: timing
                    .position
                    .as_deref()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0),
            })
        })
        .collect()
}
