use thiserror::Error;

/// Things which can go wrong while starting or stopping the timekeeper.
///
/// Rate requests themselves never fail, every signed rate has a meaning.
#[derive(Debug, Error)]
pub enum PacingError {
    #[error("Unable to spawn the timekeeper thread")]
    TimekeeperSpawnFailed(#[source] std::io::Error),

    #[error("The timekeeper thread panicked")]
    TimekeeperPanicked,
}
