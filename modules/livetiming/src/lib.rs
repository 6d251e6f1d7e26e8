// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Livetiming Modul for the race replay generator
//!
//! Client for the live telemetry feed: session listing, roster, laps, race
//! control, stints, running positions and per-vehicle trajectories. The
//! feed rate limits aggressively, so every request runs through a retry
//! loop with a growing backoff.

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use common::live::{
    DriverEntry, PositionRecord, RaceControlMessage, RawLocation, SessionLap, SessionMeta,
    StintRecord,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Public endpoint of the live telemetry feed.
pub const DEFAULT_BASE_URL: &str = "https://api.openf1.org/v1";

/// First season the feed carries data for.
pub const FIRST_FEED_YEAR: i32 = 2018;

/// Attempts per request before a rate limit becomes an error.
pub const FETCH_ATTEMPTS: u32 = 3;

/// Base backoff after a rate-limit response; attempt `n` waits `n` times
/// this long.
pub const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(5);

/// Errors of the live feed client.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("live feed request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("live feed returned status {status} for {url}")]
    Status { status: u16, url: String },
    #[error("still rate limited after {attempts} attempts: {url}")]
    RateLimited { attempts: u32, url: String },
}

/// The data feeds one live session provides.
///
/// `probe` has a default implementation on top of the roster and
/// trajectory feeds; implementors only override it to avoid the extra
/// requests.
#[async_trait]
pub trait LiveTimingProvider {
    /// All completed race sessions since [`FIRST_FEED_YEAR`].
    async fn race_sessions(&self) -> Result<Vec<SessionMeta>, FetchError>;
    async fn drivers(&self, session_key: i64) -> Result<Vec<DriverEntry>, FetchError>;
    async fn laps(&self, session_key: i64) -> Result<Vec<SessionLap>, FetchError>;
    async fn race_control(&self, session_key: i64)
    -> Result<Vec<RaceControlMessage>, FetchError>;
    async fn stints(&self, session_key: i64) -> Result<Vec<StintRecord>, FetchError>;
    async fn positions(&self, session_key: i64) -> Result<Vec<PositionRecord>, FetchError>;
    /// The raw trajectory of one vehicle over the whole session.
    async fn vehicle_trajectory(
        &self,
        session_key: i64,
        driver_number: u32,
    ) -> Result<Vec<RawLocation>, FetchError>;

    /// Whether the session has usable trajectory data: the first rostered
    /// vehicle must deliver at least one non-sentinel sample.
    async fn probe(&self, session_key: i64) -> Result<bool, FetchError> {
        let drivers = self.drivers(session_key).await?;
        let Some(first) = drivers.first() else {
            return Ok(false);
        };
        let trajectory = self
            .vehicle_trajectory(session_key, first.driver_number)
            .await?;
        Ok(trajectory.iter().any(|s| !s.is_sentinel()))
    }
}

/// HTTP implementation of [`LiveTimingProvider`].
pub struct LiveTimingClient {
    base_url: String,
    client: reqwest::Client,
}

impl Default for LiveTimingClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl LiveTimingClient {
    pub fn new(base_url: &str) -> Self {
        LiveTimingClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// One feed request with rate-limit handling: a 429 response waits
    /// `attempt * `[`RATE_LIMIT_BACKOFF`] and retries, any other non-success
    /// status is an error.
    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
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
}

#[async_trait]
impl LiveTimingProvider for LiveTimingClient {
    async fn race_sessions(&self) -> Result<Vec<SessionMeta>, FetchError> {
        let now = Utc::now();
        let mut sessions: Vec<SessionMeta> = vec![];
        for year in FIRST_FEED_YEAR..=now.year() {
            let url = format!(
                "{}/sessions?session_type=Race&year={year}",
                self.base_url
            );
            sessions.extend(self.fetch_json::<Vec<SessionMeta>>(&url).await?);
        }
        // future sessions exist in the calendar but have no data yet
        sessions.retain(|s| s.date_start.is_some_and(|d| d < now));
        info!("Found {} completed race sessions", sessions.len());
        Ok(sessions)
    }

    async fn drivers(&self, session_key: i64) -> Result<Vec<DriverEntry>, FetchError> {
        let url = format!("{}/drivers?session_key={session_key}", self.base_url);
        self.fetch_json(&url).await
    }

    async fn laps(&self, session_key: i64) -> Result<Vec<SessionLap>, FetchError> {
        let url = format!("{}/laps?session_key={session_key}", self.base_url);
        self.fetch_json(&url).await
    }

    async fn race_control(
        &self,
        session_key: i64,
    ) -> Result<Vec<RaceControlMessage>, FetchError> {
        let url = format!("{}/race_control?session_key={session_key}", self.base_url);
        self.fetch_json(&url).await
    }

    async fn stints(&self, session_key: i64) -> Result<Vec<StintRecord>, FetchError> {
        let url = format!("{}/stints?session_key={session_key}", self.base_url);
        self.fetch_json(&url).await
    }

    async fn positions(&self, session_key: i64) -> Result<Vec<PositionRecord>, FetchError> {
        let url = format!("{}/position?session_key={session_key}", self.base_url);
        self.fetch_json(&url).await
    }

    async fn vehicle_trajectory(
        &self,
        session_key: i64,
        driver_number: u32,
    ) -> Result<Vec<RawLocation>, FetchError> {
        let url = format!(
            "{}/location?session_key={session_key}&driver_number={driver_number}",
            self.base_url
        );
        self.fetch_json(&url).await
    }
}
