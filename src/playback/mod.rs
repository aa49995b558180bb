//! Audio playback: single-use playback units and the manager that
//! coordinates one foreground stream with any number of ancillary ones.

pub mod error;
pub mod manager;
pub mod output;
pub mod unit;

pub use error::PlaybackError;
pub use manager::PlaybackManager;
pub use output::{AudioOutput, OpenedStream, PlaybackClock, StreamControl};
pub use unit::{PlaybackUnit, UnitState};

#[cfg(feature = "player")]
pub use output::RodioOutput;
