// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Record generation from the live telemetry feed.

use algorithm::assemble::{self, LiveRaceInput};
use algorithm::locations;
use algorithm::time_scale::TimeScale;
use anyhow::{Context, bail};
use livetiming::{LiveTimingClient, LiveTimingProvider};
use std::collections::{BTreeMap, BTreeSet};
use storage::{FsRecordStorage, RecordStorage};
use tracing::{info, warn};

/// Generates the record of one live session.
///
/// The metadata feeds are fetched concurrently; the per-vehicle
/// trajectories follow one at a time and are normalized immediately, so
/// only the reference vehicle's raw trace stays in memory for the outline.
pub async fn generate(storage: &FsRecordStorage, session_key: i64) -> anyhow::Result<()> {
    if storage.is_rejected(session_key).await {
        bail!("session {session_key} is marked as having no trajectory data");
    }

    let client = LiveTimingClient::default();
    let session = client
        .race_sessions()
        .await?
        .into_iter()
        .find(|s| s.session_key == session_key)
        .with_context(|| format!("no completed race session with key {session_key}"))?;
    info!(
        session = %session.session_name,
        circuit = ?session.circuit_short_name,
        "generating live race"
    );

    if !client.probe(session_key).await? {
        warn!("No usable trajectory data, rejecting session {session_key}");
        storage.mark_rejected(session_key).await?;
        bail!("session {session_key} has no trajectory data");
    }

    let (drivers, laps, control, stints, positions) = tokio::join!(
        client.drivers(session_key),
        client.laps(session_key),
        client.race_control(session_key),
        client.stints(session_key),
        client.positions(session_key),
    );
    let (drivers, laps, control, stints, positions) =
        (drivers?, laps?, control?, stints?, positions?);

    let window = assemble::race_window(&laps, &positions)?;
    let scale = TimeScale::new(window.duration_ms(), session.is_sprint());
    let outline_driver =
        assemble::outline_driver(&drivers, &laps).context("session has an empty roster")?;

    let driver_numbers: BTreeSet<u32> = drivers.iter().map(|d| d.driver_number).collect();
    let mut location_map = BTreeMap::new();
    let mut outline_raw = vec![];
    for driver_number in driver_numbers {
        let raw = client.vehicle_trajectory(session_key, driver_number).await?;
        info!(driver_number, samples = raw.len(), "normalized trajectory");
        location_map.insert(
            driver_number,
            locations::normalize_locations(&raw, &window, &scale),
        );
        if driver_number == outline_driver {
            outline_raw = raw;
        }
    }

    let circuit_coords = session
        .circuit_short_name
        .as_deref()
        .and_then(circuits::coords_by_short_name);

    let record = assemble::assemble_live(LiveRaceInput {
        session: &session,
        drivers: &drivers,
        laps: &laps,
        control: &control,
        stints: &stints,
        positions: &positions,
        locations: location_map,
        outline_driver,
        outline_raw: &outline_raw,
        circuit_coords,
        window,
        scale,
    })?;
    storage.save(session_key, &record).await?;
    info!(title = %record.title, "stored record for session {session_key}");
    Ok(())
}
