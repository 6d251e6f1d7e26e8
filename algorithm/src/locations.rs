//! Downsampling of raw vehicle trajectories into canonical location
//! samples (the trajectory pipeline).

use crate::assemble::RaceWindow;
use crate::time_scale::TimeScale;
use common::live::RawLocation;
use common::record::NormalizedLocation;

/// Minimum playback-time spacing between kept samples. Caps the output at
/// roughly one point per playback second regardless of input density.
pub const MIN_SAMPLE_SPACING_S: f64 = 1.0;

/// Normalizes one vehicle's raw trajectory into playback-time samples.
///
/// Zero/zero sentinel samples and samples without a timestamp are
/// dropped, the rest are mapped onto the playback timeline, sorted (the
/// feed does not guarantee order) and greedily downsampled. An empty or
/// fully degenerate input yields an empty list; that driver simply has no
/// visualization, the race record is unaffected.
pub fn normalize_locations(
    raw: &[RawLocation],
    window: &RaceWindow,
    scale: &TimeScale,
) -> Vec<NormalizedLocation> {
    let mut points: Vec<NormalizedLocation> = raw
        .iter()
        .filter(|s| !s.is_sentinel())
        .filter_map(|s| {
            let date = s.date?;
            Some(NormalizedLocation {
                t: scale.map_timestamp(date, window.start),
                x: s.x,
                y: s.y,
            })
        })
        .collect();
    points.sort_by(|a, b| a.t.total_cmp(&b.t));
    downsample(points, MIN_SAMPLE_SPACING_S)
}

/// Greedy downsampling: the first sample is always kept, every later one
/// only if it is at least `min_spacing` past the last kept sample. Output
/// times are therefore strictly increasing beyond the first pair.
pub fn downsample(
    points: Vec<NormalizedLocation>,
    min_spacing: f64,
) -> Vec<NormalizedLocation> {
    let mut iter = points.into_iter();
    let Some(first) = iter.next() else {
        return vec![];
    };
    let mut last_t = first.t;
    let mut sampled = vec![first];
    for point in iter {
        if point.t - last_t >= min_spacing {
            last_t = point.t;
            sampled.push(point);
        }
    }
    sampled
}
