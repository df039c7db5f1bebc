use std::time::Duration;

use super::MIN_ESTIMATE_WINDOW;

/// Turns cycle counts sampled by the timekeeper into a cycles-per-second
/// estimate which is refreshed once per window.
#[derive(Debug)]
pub(crate) struct FrequencyEstimator {
    window: Duration,
    accumulated: Duration,
    snapshot: u64,
}

impl FrequencyEstimator {
    /// Create an estimator which starts counting from `cycles`.
    ///
    /// Windows shorter than [`MIN_ESTIMATE_WINDOW`] are rounded up to it.
    pub fn new(window: Duration, cycles: u64) -> Self {
        Self {
            window: window.max(MIN_ESTIMATE_WINDOW),
            accumulated: Duration::ZERO,
            snapshot: cycles,
        }
    }

    /// Account for `elapsed` time having passed with the cycle counter now at
    /// `cycles`.
    ///
    /// Returns a new estimate once a full window has accumulated. The rate is
    /// taken over the accumulated time, which overshoots the window when
    /// ticks are longer than it or do not divide it evenly.
    pub fn advance(&mut self, elapsed: Duration, cycles: u64) -> Option<u32> {
        self.accumulated += elapsed;
        if self.accumulated < self.window {
            return None;
        }

        let delta = cycles.saturating_sub(self.snapshot);
        let per_second = delta as f64 / self.accumulated.as_secs_f64();

        self.accumulated = Duration::ZERO;
        self.snapshot = cycles;

        Some(per_second.round() as u32)
    }
}
