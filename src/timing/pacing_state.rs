use std::{
    num::NonZeroU32,
    sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering},
    time::Duration,
};

/// The shortest tick the timekeeper will sleep for.
pub(crate) const MIN_TICK_INTERVAL: Duration = Duration::from_micros(1);

/// Counters shared by a pacer and its timekeeper thread.
///
/// Every field is written by exactly one side, with the single exception of
/// the catch-up clamp where the pacer rewinds the tick counter. The rewind is
/// a compare-and-swap so a tick landing at the same moment is either part of
/// the dropped backlog or survives it, never lost. All accesses use relaxed
/// ordering: a reader may observe a value one tick stale, which only shifts a
/// wait or a skipped render by one tick.
#[derive(Debug)]
pub(crate) struct PacingState {
    target_hz: AtomicU32,
    running: AtomicBool,
    observed_fps: AtomicU32,
    estimate_count: AtomicU64,
    tick_count: AtomicU64,
    cycle_count: AtomicU64,
}

impl PacingState {
    pub fn new(target_hz: NonZeroU32) -> Self {
        Self {
            target_hz: AtomicU32::new(target_hz.get()),
            running: AtomicBool::new(false),
            observed_fps: AtomicU32::new(0),
            estimate_count: AtomicU64::new(0),
            tick_count: AtomicU64::new(0),
            cycle_count: AtomicU64::new(0),
        }
    }

    pub fn target_hz(&self) -> u32 {
        self.target_hz.load(Ordering::Relaxed)
    }

    pub fn set_target_hz(&self, target_hz: NonZeroU32) {
        self.target_hz.store(target_hz.get(), Ordering::Relaxed);
    }

    /// The time between two ticks at the current target rate.
    ///
    /// Never shorter than [`MIN_TICK_INTERVAL`], so rates above 1 MHz tick
    /// at 1 MHz.
    pub fn tick_interval(&self) -> Duration {
        // target_hz is only ever stored from a NonZeroU32
        (Duration::from_secs(1) / self.target_hz().max(1))
            .max(MIN_TICK_INTERVAL)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Relaxed);
    }

    pub fn observed_fps(&self) -> u32 {
        self.observed_fps.load(Ordering::Relaxed)
    }

    pub fn publish_fps(&self, fps: u32) {
        self.observed_fps.store(fps, Ordering::Relaxed);
        self.estimate_count.fetch_add(1, Ordering::Relaxed);
    }

    /// How many times the timekeeper has published an estimate.
    pub fn estimates(&self) -> u64 {
        self.estimate_count.load(Ordering::Relaxed)
    }

    pub fn ticks(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    pub fn cycles(&self) -> u64 {
        self.cycle_count.load(Ordering::Relaxed)
    }

    pub fn advance_tick(&self) {
        self.tick_count.fetch_add(1, Ordering::Relaxed);
    }

    /// True when the caller has completed more cycles than there have been
    /// ticks, meaning the next cycle has to wait.
    pub fn is_ahead(&self) -> bool {
        self.cycles() > self.ticks()
    }

    /// How many ticks the caller is behind schedule.
    pub fn drift(&self) -> u64 {
        self.ticks().saturating_sub(self.cycles())
    }

    /// Start a new cycle.
    ///
    /// When the caller has fallen more than `max_frame_skip` ticks behind,
    /// the tick counter is rewound to the cycle counter first. Returns the
    /// number of ticks dropped by that rewind, if it happened.
    pub fn begin_cycle(&self, max_frame_skip: u64) -> Option<u64> {
        let cycles = self.cycles();
        let limit = cycles.saturating_add(max_frame_skip);

        let dropped = self
            .tick_count
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |ticks| {
                (ticks > limit).then_some(cycles)
            })
            .ok()
            .map(|ticks| ticks - cycles);

        self.cycle_count.fetch_add(1, Ordering::Relaxed);
        dropped
    }

    /// True when the cycles have kept up with the ticks, so the current
    /// cycle should render.
    pub fn is_on_schedule(&self) -> bool {
        self.cycles() >= self.ticks()
    }
}
