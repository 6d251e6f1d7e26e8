//! The pure normalization core of the race replay generator.
//!
//! Everything in this crate is synchronous and deterministic for a fixed
//! input set: track outline reconstruction, arc-length parameterization,
//! time compression into the playback budget, per-driver interpolation,
//! sector segmentation, discrete event mapping and the final record
//! assembly. Fetching and persistence live in the provider modules; they
//! hand their results in by reference.

use thiserror::Error;

pub mod assemble;
pub mod events;
pub mod geometry;
pub mod locations;
pub mod sectors;
pub mod time_scale;
pub mod timeline;
pub mod track_param;

/// Errors of the normalization core.
///
/// Geometry failures and missing lap data abort the whole race generation;
/// everything softer (missing sectors, missing pit data, degenerate
/// per-driver traces) degrades to empty output instead.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("no circuit mapping for id '{0}'")]
    UnknownCircuit(String),

    #[error("no boundary feature matches '{0}'")]
    FeatureNotFound(String),

    #[error("unsupported boundary geometry kind '{0}'")]
    UnsupportedGeometry(String),

    #[error("track outline has too few points to parameterize")]
    DegenerateOutline,

    #[error("no lap data available")]
    NoLapData,

    #[error("no timing data available")]
    NoTimingData,
}

#[cfg(test)]
mod tests;
