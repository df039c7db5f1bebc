//! Locks an update/render loop to a target frequency.
//!
//! A [`Pacer`] owns a background timekeeper thread which ticks once per
//! `1 / target_hz` seconds. Each call to [`Pacer::pace`] runs one cycle: it
//! waits while the caller is ahead of the ticks, always runs the update step,
//! and runs the render step only when the caller is on schedule. A caller
//! which falls behind keeps updating but skips renders until it catches up,
//! and a caller which falls more than `max_frame_skip` ticks behind is
//! resynchronized instead of replaying the backlog.
//!
//! The process-wide [`lock`] and [`unlock`] functions drive a single shared
//! pacer for programs which only ever need one.

mod frequency_estimator;
mod global;
mod pacer;
mod pacer_config;
mod pacing_error;
mod pacing_state;
mod rate;
mod timekeeper;
mod wait_policy;

use std::{num::NonZeroU32, sync::Arc, time::Duration};

pub use self::{
    global::{lock, shutdown, unlock},
    pacer_config::{
        DEFAULT_ESTIMATE_WINDOW, DEFAULT_MAX_FRAME_SKIP, DEFAULT_TARGET_HZ,
        MIN_ESTIMATE_WINDOW,
    },
    pacing_error::PacingError,
};

use self::{pacing_state::PacingState, timekeeper::Timekeeper};

/// Paces repeated calls to an update and a render step.
///
/// The timekeeper thread is started lazily by the first call to
/// [`Pacer::pace`] and stopped by [`Pacer::stop`], [`Pacer::request_stop`],
/// or when the pacer is dropped.
pub struct Pacer {
    config: PacerConfig,
    state: Arc<PacingState>,
    timekeeper: Option<Timekeeper>,
}

/// Construction-time settings for a [`Pacer`].
#[derive(Debug, Clone)]
pub struct PacerConfig {
    /// The update frequency used until a call to `pace` requests another.
    pub target_hz: NonZeroU32,

    /// How many ticks the caller may fall behind before the tick counter is
    /// forcibly resynchronized with the cycle counter.
    pub max_frame_skip: u64,

    /// How much timekeeper time is accumulated between recomputations of
    /// the observed frequency. Shorter windows than
    /// [`MIN_ESTIMATE_WINDOW`] are treated as that minimum.
    pub estimate_window: Duration,

    /// How `pace` waits while the caller is ahead of schedule.
    pub wait_policy: WaitPolicy,

    /// Name given to the timekeeper thread.
    pub thread_name: String,
}

/// The rate argument for [`Pacer::pace`].
///
/// Signed integers convert directly: positive values request that rate,
/// zero keeps the current rate, and negative values request a stop.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Rate {
    /// Switch to (or stay at) this many updates per second.
    Hz(NonZeroU32),

    /// Keep whatever rate was last requested.
    Keep,

    /// Stop the timekeeper. No update or render runs.
    Stop,
}

/// How the pacer waits for the timekeeper when the caller is running ahead
/// of schedule.
///
/// The wait is an active one so the pacer wakes as soon as the next tick
/// lands. Yielding matches the cost of a plain spin on an idle machine while
/// giving other threads a chance to run; sleeping trades wake latency for a
/// mostly idle core at high target rates.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WaitPolicy {
    /// Busy-spin with a processor hint.
    Spin,

    /// Yield the rest of the time slice each iteration.
    Yield,

    /// Sleep for the given duration each iteration.
    Sleep(Duration),
}
