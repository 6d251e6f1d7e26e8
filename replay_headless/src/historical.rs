// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Record generation from the historical lap-timing archive.

use algorithm::assemble::{self, HistoricalRaceInput};
use algorithm::geometry;
use anyhow::Context;
use circuits::CircuitCatalog;
use histodata::{ArchiveClient, HistoricalProvider};
use std::collections::HashMap;
use std::path::Path;
use storage::{FsRecordStorage, RecordStorage};
use tracing::{error, info};

/// Prints the rounds of one season.
pub async fn list(year: i32) -> anyhow::Result<()> {
    let client = ArchiveClient::default();
    let races = client.season(year).await?;
    for race in &races {
        println!(
            "{:>2}  {}  {}",
            race.round,
            race.date.as_deref().unwrap_or("?"),
            race.race_name
        );
    }
    println!("{} rounds in {year}", races.len());
    Ok(())
}

/// Generates one round, or every round of the season when `round` is
/// omitted. A failing round aborts a single-round run but only logs when
/// the whole season was requested; most failures are circuits without
/// boundary geometry.
pub async fn generate(
    storage: &FsRecordStorage,
    data_dir: &Path,
    year: i32,
    round: Option<u32>,
) -> anyhow::Result<()> {
    let client = ArchiveClient::default();
    let catalog_cache = data_dir.join("circuits-cache.json");
    let catalog = CircuitCatalog::load(&catalog_cache, circuits::DEFAULT_CATALOG_URL).await?;
    let names = circuits::display_names();

    if let Some(round) = round {
        let id = generate_round(storage, &client, &catalog, &names, year, round).await?;
        info!(id, "stored record for {year} round {round}");
        return Ok(());
    }

    for race in client.season(year).await? {
        match generate_round(storage, &client, &catalog, &names, year, race.round).await {
            Ok(id) => info!(id, "stored record for {year} round {}", race.round),
            Err(e) => error!("Skipping {year} round {}. Error: {e:#}", race.round),
        }
    }
    Ok(())
}

async fn generate_round(
    storage: &FsRecordStorage,
    client: &ArchiveClient,
    catalog: &CircuitCatalog,
    names: &HashMap<String, String>,
    year: i32,
    round: u32,
) -> anyhow::Result<i64> {
    let info = client
        .race(year, round)
        .await?
        .with_context(|| format!("race not found: {year} round {round}"))?;
    info!(
        race = %info.race_name,
        circuit = %info.circuit_id,
        drivers = info.results.len(),
        "generating historical race"
    );

    let outline = geometry::outline_from_boundary(catalog.features(), &info.circuit_id, names)?;
    let laps = client.laps(year, round).await?;
    let pit_stops = client.pit_stops(year, round).await?;

    let record = assemble::assemble_historical(HistoricalRaceInput {
        year,
        race_name: &info.race_name,
        race_date: info.date.as_deref(),
        circuit_name: info.circuit_name.as_deref(),
        circuit_coords: info.coords,
        outline,
        results: &info.results,
        laps: &laps,
        pit_stops: &pit_stops,
    })?;

    // negative ids keep archive records apart from live session keys
    let id = -(i64::from(year) * 100 + i64::from(round));
    storage.save(id, &record).await?;
    Ok(id)
}
