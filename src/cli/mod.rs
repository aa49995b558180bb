pub mod config;
pub mod extract;
pub mod play;
pub mod waveform;
