// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Headless race replay generator.
//!
//! Fetches race data from the live telemetry feed or the historical
//! lap-timing archive, normalizes it into canonical replay records and
//! stores them in the local data directory.

mod historical;
mod live;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dirs::data_local_dir;
use std::path::PathBuf;
use storage::FsRecordStorage;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate replay records from the historical lap-timing archive.
    Historical {
        /// Season to generate.
        year: i32,
        /// Round within the season; the whole season when omitted.
        round: Option<u32>,
    },
    /// List the rounds of one archive season.
    List {
        year: i32,
    },
    /// Generate a replay record from one live telemetry session.
    Live {
        session_key: i64,
    },
}

fn data_dir() -> anyhow::Result<PathBuf> {
    let mut dir = data_local_dir().context("could not determine local data directory")?;
    dir.push("replay");
    Ok(dir)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let data_dir = data_dir()?;
    let storage = FsRecordStorage::new(&data_dir);
    match cli.command {
        Command::Historical { year, round } => {
            historical::generate(&storage, &data_dir, year, round).await
        }
        Command::List { year } => historical::list(year).await,
        Command::Live { session_key } => live::generate(&storage, session_key).await,
    }
}
