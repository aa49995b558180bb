//! Playback progress reporting for a UI.

pub mod format;
pub mod tracker;

pub use format::{format_duration, slider_value};
pub use tracker::{
    PositionSource, ProgressState, ProgressTracker, ProgressView, RemainingMode, TrackerOptions,
};
