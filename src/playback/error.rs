//! Error types for playback

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaybackError {
    /// `play` was called on a unit that is already playing
    #[error("Already playing: {}", .0.display())]
    AlreadyPlaying(PathBuf),

    /// Units cannot be restarted once they reach a terminal state
    #[error("Playback unit already finished: {}", .0.display())]
    Finished(PathBuf),

    /// A foreground stream is active and must be stopped first
    #[error("Foreground stream is busy playing {}", .0.display())]
    ForegroundBusy(PathBuf),

    #[error("Nothing is playing")]
    NotPlaying,

    #[error("Failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Audio device error: {0}")]
    Device(String),

    #[error("Seek failed: {0}")]
    Seek(String),

    /// The playback worker thread could not be spawned
    #[error("Failed to start playback worker: {0}")]
    Worker(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PlaybackError>;
