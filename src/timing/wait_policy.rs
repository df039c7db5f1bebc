use super::WaitPolicy;

impl WaitPolicy {
    /// Block the calling thread for one iteration of a wait loop.
    pub(crate) fn wait(&self) {
        match self {
            WaitPolicy::Spin => std::hint::spin_loop(),
            WaitPolicy::Yield => std::thread::yield_now(),
            WaitPolicy::Sleep(duration) => spin_sleep::sleep(*duration),
        }
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        WaitPolicy::Yield
    }
}
