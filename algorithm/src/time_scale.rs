use chrono::{DateTime, Utc};

/// Maximum playback window: 3300 s (55 min), leaving room at the end of a
/// wall-clock hour for the podium display.
pub const MAX_RACE_DURATION_S: f64 = 3300.0;

/// Reference GP duration of 90 minutes. Shorter races get a
/// proportionally shorter playback window.
pub const REFERENCE_RACE_MS: f64 = 5_400_000.0;

/// Sprint-format races are compressed further.
pub const SPRINT_FACTOR: f64 = 0.7;

/// The global time compression of one race.
///
/// A single `TimeScale` is computed per race and shared by every component
/// that emits a playback time, which guarantees one consistent timeline
/// across locations, positions, laps and events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    playback_s: f64,
    factor: f64,
}

impl TimeScale {
    /// Derives the playback budget and compression factor from the real
    /// race duration in milliseconds.
    ///
    /// `base = round(duration / reference * budget)`, multiplied by
    /// [`SPRINT_FACTOR`] for sprint sessions, then clamped to the budget.
    /// The factor maps real elapsed seconds to playback seconds.
    pub fn new(real_duration_ms: f64, sprint: bool) -> Self {
        let mut base = (real_duration_ms / REFERENCE_RACE_MS * MAX_RACE_DURATION_S).round();
        if sprint {
            base = (base * SPRINT_FACTOR).round();
        }
        let playback_s = base.min(MAX_RACE_DURATION_S);
        let real_s = real_duration_ms / 1000.0;
        let factor = if real_s > 0.0 { playback_s / real_s } else { 0.0 };
        TimeScale { playback_s, factor }
    }

    /// The playback duration in seconds, at most [`MAX_RACE_DURATION_S`].
    pub fn playback_duration(&self) -> f64 {
        self.playback_s
    }

    /// The compression factor `k`, playback seconds per real second.
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Maps real elapsed seconds to playback seconds.
    pub fn scale_elapsed(&self, seconds: f64) -> f64 {
        seconds * self.factor
    }

    /// Maps an absolute timestamp to playback seconds relative to the
    /// race start.
    pub fn map_timestamp(&self, at: DateTime<Utc>, race_start: DateTime<Utc>) -> f64 {
        self.scale_elapsed((at - race_start).num_milliseconds() as f64 / 1000.0)
    }

    /// Whether a playback time lies inside the window `[0, Dp]`.
    pub fn contains(&self, t: f64) -> bool {
        (0.0..=self.playback_s).contains(&t)
    }
}
