use std::{num::NonZeroU32, time::Duration};

use super::{PacerConfig, WaitPolicy};

/// The rate used until a caller asks for something else.
pub const DEFAULT_TARGET_HZ: u32 = 60;

/// Even when the caller is slow, at least one frame is rendered every this
/// many ticks.
pub const DEFAULT_MAX_FRAME_SKIP: u64 = 10;

/// The observed frequency is refreshed three times per second.
pub const DEFAULT_ESTIMATE_WINDOW: Duration = Duration::from_millis(300);

/// Shorter estimate windows are rounded up to this.
pub const MIN_ESTIMATE_WINDOW: Duration = Duration::from_millis(1);

impl PacerConfig {
    pub fn with_target_hz(mut self, target_hz: NonZeroU32) -> Self {
        self.target_hz = target_hz;
        self
    }

    pub fn with_max_frame_skip(mut self, max_frame_skip: u64) -> Self {
        self.max_frame_skip = max_frame_skip;
        self
    }

    /// Set the estimate window, rounded up to [`MIN_ESTIMATE_WINDOW`].
    pub fn with_estimate_window(mut self, estimate_window: Duration) -> Self {
        self.estimate_window = estimate_window.max(MIN_ESTIMATE_WINDOW);
        self
    }

    pub fn with_wait_policy(mut self, wait_policy: WaitPolicy) -> Self {
        self.wait_policy = wait_policy;
        self
    }

    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }
}

impl Default for PacerConfig {
    fn default() -> Self {
        Self {
            target_hz: NonZeroU32::new(DEFAULT_TARGET_HZ)
                .unwrap_or(NonZeroU32::MIN),
            max_frame_skip: DEFAULT_MAX_FRAME_SKIP,
            estimate_window: DEFAULT_ESTIMATE_WINDOW,
            wait_policy: WaitPolicy::default(),
            thread_name: "hertz-timekeeper".to_owned(),
        }
    }
}
