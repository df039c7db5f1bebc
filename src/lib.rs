//! Frame pacing for update/render loops.
//!
//! A [`timing::Pacer`] locks a caller's loop to a target frequency. Updates
//! run once per tick of a background timekeeper thread, while renders are
//! skipped whenever the caller falls behind schedule.
//!
//! # Example
//!
//! ```no_run
//! use hertz::timing::{Pacer, PacerConfig};
//!
//! let mut pacer = Pacer::new(PacerConfig::default());
//! let mut updates = 0;
//! let mut frames = 0;
//! for _ in 0..120 {
//!     let fps = pacer.pace(60, || updates += 1, || frames += 1)?;
//!     log::info!("{} fps", fps);
//! }
//! pacer.stop()?;
//! # Ok::<(), hertz::timing::PacingError>(())
//! ```

pub mod logging;
pub mod timing;

pub use timing::{lock, shutdown, unlock};
