//! A single process-wide pacer for programs which only ever need one.

use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use super::{Pacer, PacerConfig, PacingError};

static GLOBAL_PACER: OnceLock<Mutex<Pacer>> = OnceLock::new();

fn global_pacer() -> MutexGuard<'static, Pacer> {
    GLOBAL_PACER
        .get_or_init(|| Mutex::new(Pacer::new(PacerConfig::default())))
        .lock()
        // a panicking update or render poisons the lock, the counters are
        // still consistent
        .unwrap_or_else(PoisonError::into_inner)
}

/// Lock the calling loop to `hz` updates per second using the process-wide
/// pacer. Returns the observed frequency.
///
/// Follows the same rate convention as [`Pacer::pace`]: positive sets the
/// rate, zero keeps it, negative stops the timekeeper. The pacer starts at
/// 60 Hz.
///
/// `update` and `render` run while the global pacer is locked, so they must
/// not call back into this module.
pub fn lock<U, F>(hz: i32, update: U, render: F) -> Result<u32, PacingError>
where
    U: FnMut(),
    F: FnMut(),
{
    global_pacer().pace(hz, update, render)
}

/// Ask the process-wide timekeeper to stop without waiting for it.
///
/// A later call to [`lock`] starts it again.
pub fn unlock() {
    global_pacer().request_stop();
}

/// Stop the process-wide timekeeper and wait for its thread to exit.
pub fn shutdown() -> Result<(), PacingError> {
    global_pacer().stop()
}
