use std::sync::Arc;

use super::{
    pacing_state::PacingState, Pacer, PacerConfig, PacingError, Rate,
    Timekeeper,
};

/// The value `pace` returns for a stop request.
const STOP_ACKNOWLEDGED: u32 = 1;

impl Pacer {
    /// Create a pacer. No thread is started until the first call to `pace`.
    pub fn new(config: PacerConfig) -> Self {
        let state = Arc::new(PacingState::new(config.target_hz));
        Self {
            config,
            state,
            timekeeper: None,
        }
    }

    /// Run one cycle of the caller's loop.
    ///
    /// Blocks while the caller is ahead of the timekeeper, then always runs
    /// `update` and runs `render` only when the caller is on schedule.
    /// Returns the most recently observed frequency in cycles per second.
    ///
    /// `rate` accepts a [`Rate`] or a signed integer: a positive rate becomes
    /// the new target, zero keeps the current target, and a negative rate
    /// behaves like [`Pacer::request_stop`], returning `1` without running
    /// either step. Calling `pace` after a stop starts a new timekeeper.
    ///
    /// This must be called from a tight loop for the pacing to hold.
    pub fn pace<R, U, F>(
        &mut self,
        rate: R,
        mut update: U,
        mut render: F,
    ) -> Result<u32, PacingError>
    where
        R: Into<Rate>,
        U: FnMut(),
        F: FnMut(),
    {
        let rate = rate.into();
        if let Rate::Hz(hz) = rate {
            self.state.set_target_hz(hz);
        }
        if rate == Rate::Stop {
            self.request_stop();
            return Ok(STOP_ACKNOWLEDGED);
        }

        self.ensure_timekeeper()?;
        self.throttle();

        if let Some(dropped) =
            self.state.begin_cycle(self.config.max_frame_skip)
        {
            log::debug!("fell {} ticks behind, resynchronizing", dropped);
        }

        update();
        if self.state.is_on_schedule() {
            render();
        }

        Ok(self.state.observed_fps())
    }

    /// Ask the timekeeper to stop without waiting for it.
    ///
    /// The thread notices at the end of its current tick. Requesting a stop
    /// on a pacer which is already stopped, or was never started, does
    /// nothing.
    pub fn request_stop(&self) {
        if self.state.is_running() {
            log::debug!("timekeeper stop requested");
        }
        self.state.set_running(false);
    }

    /// Stop the timekeeper and wait for its thread to exit.
    ///
    /// This takes at most one tick interval.
    pub fn stop(&mut self) -> Result<(), PacingError> {
        self.request_stop();
        match self.timekeeper.take() {
            Some(timekeeper) => timekeeper.join(),
            None => Ok(()),
        }
    }

    /// The current target rate in updates per second.
    pub fn target_hz(&self) -> u32 {
        self.state.target_hz()
    }

    /// The last frequency published by the timekeeper.
    pub fn observed_fps(&self) -> u32 {
        self.state.observed_fps()
    }

    /// How many times the observed frequency has been recomputed.
    pub fn estimate_count(&self) -> u64 {
        self.state.estimates()
    }

    pub fn tick_count(&self) -> u64 {
        self.state.ticks()
    }

    pub fn cycle_count(&self) -> u64 {
        self.state.cycles()
    }

    /// How many ticks the caller is currently behind.
    pub fn drift(&self) -> u64 {
        self.state.drift()
    }

    /// True while a timekeeper thread is ticking for this pacer.
    pub fn is_running(&self) -> bool {
        self.state.is_running()
            && self
                .timekeeper
                .as_ref()
                .map_or(false, |timekeeper| !timekeeper.is_finished())
    }

    pub fn config(&self) -> &PacerConfig {
        &self.config
    }

    /// Start a timekeeper unless one is already ticking.
    ///
    /// A timekeeper left over from a stop is joined before its replacement
    /// starts so two threads never tick the same counters.
    fn ensure_timekeeper(&mut self) -> Result<(), PacingError> {
        if self.is_running() {
            return Ok(());
        }

        if let Some(previous) = self.timekeeper.take() {
            log::debug!("restarting the timekeeper");
            self.state.set_running(false);
            previous.join()?;
        }

        self.state.set_running(true);
        let timekeeper = Timekeeper::spawn(
            self.state.clone(),
            self.config.estimate_window,
            &self.config.thread_name,
        );
        match timekeeper {
            Ok(timekeeper) => {
                self.timekeeper = Some(timekeeper);
                Ok(())
            }
            Err(error) => {
                self.state.set_running(false);
                Err(error)
            }
        }
    }

    /// Wait while the caller is ahead of the ticks.
    fn throttle(&self) {
        while self.state.is_ahead() && self.is_running() {
            self.config.wait_policy.wait();
        }
    }
}

impl Drop for Pacer {
    fn drop(&mut self) {
        if let Err(error) = self.stop() {
            log::warn!("unable to stop the timekeeper cleanly: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{num::NonZeroU32, time::Duration};

    use super::*;

    fn pacer(hz: u32) -> Pacer {
        Pacer::new(
            PacerConfig::default()
                .with_target_hz(NonZeroU32::new(hz).unwrap()),
        )
    }

    #[test]
    fn new_pacers_are_idle() {
        let pacer = pacer(60);
        assert!(!pacer.is_running());
        assert_eq!(pacer.tick_count(), 0);
        assert_eq!(pacer.cycle_count(), 0);
        assert_eq!(pacer.target_hz(), 60);
    }

    #[test]
    fn stop_before_start_runs_nothing() {
        let mut pacer = pacer(60);
        let mut updates = 0;
        let fps = pacer
            .pace(-1, || updates += 1, || panic!("render ran"))
            .unwrap();

        assert_eq!(fps, 1);
        assert_eq!(updates, 0);
        assert!(!pacer.is_running());
        assert_eq!(pacer.cycle_count(), 0);
    }

    #[test]
    fn first_call_starts_the_timekeeper_and_renders() {
        let mut pacer = pacer(60);
        let mut updates = 0;
        let mut renders = 0;
        pacer.pace(0, || updates += 1, || renders += 1).unwrap();

        assert!(pacer.is_running());
        assert_eq!(updates, 1);
        assert_eq!(renders, 1);
        assert_eq!(pacer.cycle_count(), 1);
        pacer.stop().unwrap();
    }

    #[test]
    fn positive_rates_replace_the_target_and_zero_keeps_it() {
        let mut pacer = pacer(60);
        pacer.pace(200, || {}, || {}).unwrap();
        assert_eq!(pacer.target_hz(), 200);

        pacer.pace(0, || {}, || {}).unwrap();
        assert_eq!(pacer.target_hz(), 200);

        pacer.pace(Rate::Keep, || {}, || {}).unwrap();
        assert_eq!(pacer.target_hz(), 200);
        pacer.stop().unwrap();
    }

    #[test]
    fn update_runs_before_render() {
        let mut pacer = pacer(60);
        let mut order = Vec::new();
        {
            let order = std::cell::RefCell::new(&mut order);
            pacer
                .pace(
                    0,
                    || order.borrow_mut().push("update"),
                    || order.borrow_mut().push("render"),
                )
                .unwrap();
        }
        assert_eq!(order, vec!["update", "render"]);
        pacer.stop().unwrap();
    }

    #[test]
    fn stop_is_synchronous_and_repeatable() {
        let mut pacer = pacer(100);
        pacer.pace(0, || {}, || {}).unwrap();
        assert!(pacer.is_running());

        pacer.stop().unwrap();
        assert!(!pacer.is_running());
        let ticks = pacer.tick_count();
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(pacer.tick_count(), ticks);

        pacer.stop().unwrap();
        pacer.request_stop();
        assert!(!pacer.is_running());
    }

    #[test]
    fn pacing_after_a_stop_request_restarts_the_timekeeper() {
        let mut pacer = pacer(100);
        pacer.pace(0, || {}, || {}).unwrap();

        pacer.request_stop();
        pacer.request_stop();
        assert!(!pacer.is_running());

        let mut updates = 0;
        pacer.pace(0, || updates += 1, || {}).unwrap();
        assert_eq!(updates, 1);
        assert!(pacer.is_running());
        assert_eq!(pacer.cycle_count(), 2);
        pacer.stop().unwrap();
    }

    #[test]
    fn a_zero_estimate_window_reports_sane_rates() {
        let mut config = PacerConfig::default()
            .with_target_hz(NonZeroU32::new(100).unwrap());
        config.estimate_window = Duration::ZERO;
        let mut pacer = Pacer::new(config);

        let mut reports = Vec::new();
        let start = std::time::Instant::now();
        while start.elapsed() < Duration::from_millis(200) {
            reports.push(pacer.pace(0, || {}, || {}).unwrap());
        }
        pacer.stop().unwrap();

        assert!(pacer.estimate_count() > 0);
        assert!(
            reports.iter().all(|&fps| fps <= 200),
            "reports: {:?}",
            reports
        );
    }

    #[test]
    fn a_stalled_caller_is_resynchronized() {
        let mut pacer = Pacer::new(
            PacerConfig::default()
                .with_target_hz(NonZeroU32::new(100).unwrap())
                .with_max_frame_skip(3),
        );
        pacer.pace(0, || {}, || {}).unwrap();

        std::thread::sleep(Duration::from_millis(100));
        assert!(pacer.drift() > 3);

        let mut renders = 0;
        pacer.pace(0, || {}, || renders += 1).unwrap();
        assert_eq!(renders, 1);
        assert!(pacer.drift() <= 3);
        pacer.stop().unwrap();
    }
}
