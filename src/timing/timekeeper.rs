use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use super::{
    frequency_estimator::FrequencyEstimator, pacing_state::PacingState,
    PacingError,
};

/// The background thread which ticks at the target rate.
///
/// The thread runs until the shared state stops reporting `running`. It only
/// checks the flag between sleeps, so stopping takes up to one tick.
#[derive(Debug)]
pub(crate) struct Timekeeper {
    handle: JoinHandle<()>,
}

impl Timekeeper {
    /// Spawn a timekeeper for the given state.
    ///
    /// The caller is responsible for marking the state as running first,
    /// otherwise the thread exits immediately.
    pub fn spawn(
        state: Arc<PacingState>,
        estimate_window: Duration,
        thread_name: &str,
    ) -> Result<Self, PacingError> {
        let handle = thread::Builder::new()
            .name(thread_name.to_owned())
            .spawn(move || run(&state, estimate_window))
            .map_err(PacingError::TimekeeperSpawnFailed)?;

        log::debug!("started timekeeper thread '{}'", thread_name);

        Ok(Self { handle })
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the thread exits.
    pub fn join(self) -> Result<(), PacingError> {
        self.handle.join().map_err(|_| {
            log::warn!("the timekeeper thread panicked");
            PacingError::TimekeeperPanicked
        })
    }
}

fn run(state: &PacingState, estimate_window: Duration) {
    scopeguard::defer! {
        log::debug!("timekeeper stopped after {} ticks", state.ticks());
    }

    let mut estimator = FrequencyEstimator::new(estimate_window, state.cycles());
    while state.is_running() {
        state.advance_tick();

        let interval = state.tick_interval();
        spin_sleep::sleep(interval);

        if let Some(fps) = estimator.advance(interval, state.cycles()) {
            log::trace!("observed {} fps at {} hz", fps, state.target_hz());
            state.publish_fps(fps);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{num::NonZeroU32, time::Instant};

    use super::*;

    fn running_state(hz: u32) -> Arc<PacingState> {
        let state = Arc::new(PacingState::new(NonZeroU32::new(hz).unwrap()));
        state.set_running(true);
        state
    }

    #[test]
    fn exits_immediately_when_not_running() {
        let state = Arc::new(PacingState::new(NonZeroU32::new(60).unwrap()));
        let timekeeper = Timekeeper::spawn(
            state.clone(),
            Duration::from_millis(300),
            "test-timekeeper",
        )
        .unwrap();

        timekeeper.join().unwrap();
        assert_eq!(state.ticks(), 0);
    }

    #[test]
    fn ticks_until_stopped() {
        let state = running_state(200);
        let timekeeper = Timekeeper::spawn(
            state.clone(),
            Duration::from_millis(300),
            "test-timekeeper",
        )
        .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while state.ticks() < 5 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        state.set_running(false);
        timekeeper.join().unwrap();

        let ticks = state.ticks();
        assert!(ticks >= 5, "only {} ticks", ticks);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(state.ticks(), ticks);
    }

    #[test]
    fn publishes_an_estimate_once_the_window_fills() {
        let state = running_state(100);
        let timekeeper = Timekeeper::spawn(
            state.clone(),
            Duration::from_millis(50),
            "test-timekeeper",
        )
        .unwrap();

        // Pretend to be a caller which keeps pace with every tick.
        let deadline = Instant::now() + Duration::from_secs(5);
        while state.observed_fps() == 0 && Instant::now() < deadline {
            if !state.is_ahead() {
                state.begin_cycle(10);
            }
            thread::yield_now();
        }
        state.set_running(false);
        timekeeper.join().unwrap();

        assert!(state.observed_fps() > 0);
    }
}
