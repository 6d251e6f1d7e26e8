use common::point::Point2D;

/// One edge of a parameterized outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSegment {
    /// Index of the edge's first point in the outline.
    pub start_idx: usize,
    /// Euclidean length of the edge in meters.
    pub length: f64,
    /// Sum of all edge lengths before this one.
    pub cum_length: f64,
}

/// An outline parameterized by cumulative traveled distance, so that a
/// position can be looked up by fractional lap progress.
///
/// The outline is treated as a closed loop: a closing edge from the last
/// point back to the first is always part of the table, which makes
/// `segments` exactly as long as the outline itself and the sum of all
/// segment lengths equal to `total_dist`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackParam {
    outline: Vec<Point2D>,
    segments: Vec<TrackSegment>,
    total_dist: f64,
}

impl TrackParam {
    /// Builds the arc-length table for `outline`. Returns `None` for
    /// outlines with fewer than two points, which cannot form a loop.
    pub fn new(outline: Vec<Point2D>) -> Option<Self> {
        if outline.len() < 2 {
            return None;
        }
        let mut segments = Vec::with_capacity(outline.len());
        let mut total_dist = 0.0;
        for i in 1..outline.len() {
            let length = outline[i - 1].distance(&outline[i]);
            segments.push(TrackSegment {
                start_idx: i - 1,
                length,
                cum_length: total_dist,
            });
            total_dist += length;
        }
        let closing = outline[outline.len() - 1].distance(&outline[0]);
        segments.push(TrackSegment {
            start_idx: outline.len() - 1,
            length: closing,
            cum_length: total_dist,
        });
        total_dist += closing;
        Some(TrackParam {
            outline,
            segments,
            total_dist,
        })
    }

    pub fn outline(&self) -> &[Point2D] {
        &self.outline
    }

    pub fn segments(&self) -> &[TrackSegment] {
        &self.segments
    }

    /// Total loop length in meters, closing edge included.
    pub fn total_dist(&self) -> f64 {
        self.total_dist
    }

    /// Returns the position at the given lap progress.
    ///
    /// Only the fractional part of `progress` is meaningful, so
    /// `sample(p)` equals `sample(p + 1)` for any real `p`, and both 0 and
    /// 1 map to the outline's first point. The segment lookup is a binary
    /// search over the monotonic cumulative-distance array; within the
    /// matched segment the position is interpolated linearly (a
    /// zero-length segment yields its start point).
    pub fn sample(&self, progress: f64) -> Point2D {
        let progress = progress - progress.floor();
        let target = progress * self.total_dist;

        let idx = self
            .segments
            .partition_point(|s| s.cum_length + s.length < target)
            .min(self.segments.len() - 1);
        let segment = &self.segments[idx];

        let factor = if segment.length > 0.0 {
            (target - segment.cum_length) / segment.length
        } else {
            0.0
        };
        let a = self.outline[segment.start_idx];
        let b = self.outline[(segment.start_idx + 1) % self.outline.len()];
        Point2D {
            x: a.x + (b.x - a.x) * factor,
            y: a.y + (b.y - a.y) * factor,
        }
    }
}
