use serde::{Deserialize, Serialize};

/// A point on the local track plane, in meters relative to a race-specific
/// origin. Not geodetic: each race's geometry defines its own origin.
///
/// # Example
///
/// ```rust
/// use common::point::Point2D;
///
/// let p = Point2D { x: 120.0, y: -45.5 };
/// println!("{:?}", p);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    /// Euclidean distance to `other` in meters.
    pub fn distance(&self, other: &Point2D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A geodetic coordinate in decimal degrees, as provided by boundary
/// geometry sources. Longitude first, matching the GeoJSON axis order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

/// Circuit reference coordinates carried in the canonical record for
/// consumers that need a real-world location (latitude first, the common
/// display convention).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoords {
    pub lat: f64,
    pub lon: f64,
}
