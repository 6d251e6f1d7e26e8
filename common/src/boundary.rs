use crate::point::GeoPoint;

/// One named circuit boundary feature from a geometry source.
///
/// The geometry provider parses its source format (GeoJSON) into this
/// neutral shape; unsupported geometry kinds are preserved so the core can
/// report them instead of silently skipping a matched feature.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub name: String,
    pub geometry: BoundaryGeometry,
}

/// The coordinate payload of a boundary feature.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryGeometry {
    /// A single open or closed path.
    Path(Vec<GeoPoint>),
    /// Several constituent paths; the longest one is the track itself.
    MultiPath(Vec<Vec<GeoPoint>>),
    /// A polygon as a list of rings, the first being the outer ring.
    Polygon(Vec<Vec<GeoPoint>>),
    /// Any other source geometry kind, kept by name for error reporting.
    Unsupported(String),
}
