pub mod config;
pub mod constants;
pub mod engine;
pub mod logging;
pub mod playback;
pub mod progress;
pub mod utils;
pub mod waveform;
