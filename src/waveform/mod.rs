pub mod analysis;
pub mod generator;
pub mod render;

pub use generator::{WaveformError, WaveformGenerator, WaveformSpec};
pub use render::WaveformColors;
