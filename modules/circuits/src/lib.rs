// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Circuits Modul for the race replay generator
//!
//! Loads the circuit boundary catalog (a GeoJSON feature collection) from a
//! local cache file or the upstream repository, converts it into the common
//! boundary types and carries the static lookup tables that tie both data
//! feeds to their circuit geometry.

use common::boundary::{BoundaryFeature, BoundaryGeometry};
use common::point::{GeoCoords, GeoPoint};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Upstream location of the community-maintained circuit outlines.
pub const DEFAULT_CATALOG_URL: &str =
    "https://raw.githubusercontent.com/bacinger/f1-circuits/master/f1-circuits.geojson";

/// Lookup table from the lap-timing feed's circuit ids to the display
/// names used by the boundary catalog. Circuits missing here have no
/// published outline; generation fails cleanly for them.
const CIRCUIT_NAMES: [(&str, &str); 39] = [
    ("albert_park", "Albert Park"),
    ("bahrain", "Bahrain"),
    ("shanghai", "Shanghai"),
    ("baku", "Baku"),
    ("catalunya", "Barcelona"),
    ("monaco", "Monaco"),
    ("villeneuve", "Gilles-Villeneuve"),
    ("ricard", "Paul Ricard"),
    ("spielberg", "Red Bull Ring"),
    ("red_bull_ring", "Red Bull Ring"),
    ("silverstone", "Silverstone"),
    ("hockenheimring", "Hockenheim"),
    ("hungaroring", "Hungaroring"),
    ("spa", "Spa-Francorchamps"),
    ("monza", "Monza"),
    ("marina_bay", "Marina Bay"),
    ("suzuka", "Suzuka"),
    ("losail", "Losail"),
    ("americas", "Circuit of the Americas"),
    ("rodriguez", "Hermanos Rodríguez"),
    ("interlagos", "Interlagos"),
    ("yas_marina", "Yas Marina"),
    ("jeddah", "Jeddah"),
    ("miami", "Miami"),
    ("vegas", "Las Vegas"),
    ("zandvoort", "Zandvoort"),
    ("imola", "Enzo e Dino Ferrari"),
    ("portimao", "Algarve"),
    ("mugello", "Mugello"),
    ("nurburgring", "Nürburgring"),
    ("istanbul", "Istanbul"),
    ("sochi", "Sochi"),
    ("sepang", "Sepang"),
    ("magny_cours", "Magny-Cours"),
    ("indianapolis", "Indianapolis"),
    ("kyalami", "Kyalami"),
    ("estoril", "Estoril"),
    ("galvez", "Gálvez"),
    ("jacarepagua", "Nelson Piquet"),
];

/// Geodetic reference coordinates keyed by the live feed's short circuit
/// names, used as the map anchor of a replay.
const CIRCUIT_COORDS: [(&str, GeoCoords); 24] = [
    ("Sakhir", GeoCoords { lat: 26.0325, lon: 50.5106 }),
    ("Jeddah", GeoCoords { lat: 21.6319, lon: 39.1044 }),
    ("Melbourne", GeoCoords { lat: -37.8497, lon: 144.9680 }),
    ("Baku", GeoCoords { lat: 40.3725, lon: 49.8533 }),
    ("Miami", GeoCoords { lat: 25.9581, lon: -80.2389 }),
    ("Imola", GeoCoords { lat: 44.3439, lon: 11.7167 }),
    ("Monte Carlo", GeoCoords { lat: 43.7347, lon: 7.4206 }),
    ("Catalunya", GeoCoords { lat: 41.5700, lon: 2.2611 }),
    ("Montreal", GeoCoords { lat: 45.5000, lon: -73.5228 }),
    ("Spielberg", GeoCoords { lat: 47.2197, lon: 14.7647 }),
    ("Silverstone", GeoCoords { lat: 52.0786, lon: -1.0169 }),
    ("Hungaroring", GeoCoords { lat: 47.5789, lon: 19.2486 }),
    ("Spa-Francorchamps", GeoCoords { lat: 50.4372, lon: 5.9714 }),
    ("Zandvoort", GeoCoords { lat: 52.3888, lon: 4.5409 }),
    ("Monza", GeoCoords { lat: 45.6156, lon: 9.2811 }),
    ("Singapore", GeoCoords { lat: 1.2914, lon: 103.8640 }),
    ("Suzuka", GeoCoords { lat: 34.8431, lon: 136.5406 }),
    ("Lusail", GeoCoords { lat: 25.4900, lon: 51.4542 }),
    ("Austin", GeoCoords { lat: 30.1328, lon: -97.6411 }),
    ("Mexico City", GeoCoords { lat: 19.4042, lon: -99.0907 }),
    ("Interlagos", GeoCoords { lat: -23.7014, lon: -46.6969 }),
    ("Las Vegas", GeoCoords { lat: 36.1147, lon: -115.1728 }),
    ("Yas Marina Circuit", GeoCoords { lat: 24.4672, lon: 54.6031 }),
    ("Shanghai", GeoCoords { lat: 31.3389, lon: 121.2197 }),
];

/// Errors of the catalog loading and parsing chain.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to fetch circuit catalog: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("failed to read or write the catalog cache: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse circuit catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The id → display-name table consumed by the outline resolution.
pub fn display_names() -> HashMap<String, String> {
    CIRCUIT_NAMES
        .iter()
        .map(|(id, name)| (id.to_string(), name.to_string()))
        .collect()
}

/// Reference coordinates of a circuit by the live feed's short name.
pub fn coords_by_short_name(short_name: &str) -> Option<GeoCoords> {
    CIRCUIT_COORDS
        .iter()
        .find(|(name, _)| *name == short_name)
        .map(|(_, coords)| *coords)
}

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Properties,
    geometry: Geometry,
}

#[derive(Deserialize, Default)]
struct Properties {
    #[serde(rename = "Name", default)]
    name: Option<String>,
}

#[derive(Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: serde_json::Value,
}

/// The loaded circuit boundary catalog.
pub struct CircuitCatalog {
    features: Vec<BoundaryFeature>,
}

impl CircuitCatalog {
    /// Loads the catalog from `cache_path` if present, otherwise fetches
    /// it from `url` and writes the cache before parsing.
    pub async fn load(cache_path: &Path, url: &str) -> Result<Self, CatalogError> {
        if let Ok(json) = tokio::fs::read_to_string(cache_path).await {
            debug!("Using circuit catalog cache {}", cache_path.display());
            return Self::from_json(&json);
        }

        info!("Fetching circuit catalog from {url}");
        let json = reqwest::get(url).await?.error_for_status()?.text().await?;
        if let Err(e) = Self::write_cache(cache_path, &json).await {
            warn!(
                "Failed to cache circuit catalog in {}. Error: {}",
                cache_path.display(),
                e
            );
        }
        Self::from_json(&json)
    }

    /// Parses a GeoJSON feature collection into boundary features.
    ///
    /// Unknown geometry kinds are kept as [`BoundaryGeometry::Unsupported`]
    /// so the failure surfaces at lookup time with the feature's name
    /// attached; nameless features are dropped here.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let collection: FeatureCollection = serde_json::from_str(json)?;
        let features = collection
            .features
            .into_iter()
            .filter_map(|f| {
                let name = f.properties.name?;
                Some(BoundaryFeature {
                    name,
                    geometry: convert_geometry(&f.geometry),
                })
            })
            .collect::<Vec<_>>();
        debug!("Parsed {} boundary features", features.len());
        Ok(CircuitCatalog { features })
    }

    pub fn features(&self) -> &[BoundaryFeature] {
        &self.features
    }

    async fn write_cache(cache_path: &Path, json: &str) -> std::io::Result<()> {
        let mut file = tokio::fs::File::create(cache_path).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
        Ok(())
    }
}

fn convert_geometry(geometry: &Geometry) -> BoundaryGeometry {
    match geometry.kind.as_str() {
        "LineString" => match parse_path(&geometry.coordinates) {
            Some(path) => BoundaryGeometry::Path(path),
            None => BoundaryGeometry::Unsupported(geometry.kind.clone()),
        },
        "MultiLineString" => match parse_paths(&geometry.coordinates) {
            Some(paths) => BoundaryGeometry::MultiPath(paths),
            None => BoundaryGeometry::Unsupported(geometry.kind.clone()),
        },
        "Polygon" => match parse_paths(&geometry.coordinates) {
            Some(rings) => BoundaryGeometry::Polygon(rings),
            None => BoundaryGeometry::Unsupported(geometry.kind.clone()),
        },
        other => BoundaryGeometry::Unsupported(other.to_string()),
    }
}

/// A GeoJSON position is `[lon, lat]` with an optional altitude that is
/// ignored here.
fn parse_position(value: &serde_json::Value) -> Option<GeoPoint> {
    let parts = value.as_array()?;
    Some(GeoPoint {
        lon: parts.first()?.as_f64()?,
        lat: parts.get(1)?.as_f64()?,
    })
}

fn parse_path(value: &serde_json::Value) -> Option<Vec<GeoPoint>> {
    value.as_array()?.iter().map(parse_position).collect()
}

fn parse_paths(value: &serde_json::Value) -> Option<Vec<Vec<GeoPoint>>> {
    value.as_array()?.iter().map(parse_path).collect()
}
