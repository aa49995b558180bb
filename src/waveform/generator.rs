//! Waveform image generation for audio and video files.
//!
//! The source is first converted by the media engine into a mono 16-bit WAV
//! in a scratch directory, so any format the engine understands can be
//! drawn. Frames are then read with hound and reduced to column heights.
//! Conversion runs synchronously; call [`WaveformGenerator::generate`] from a
//! background thread, never from a UI thread.

use super::analysis::{column_heights, effective_width};
use super::render::{WaveformColors, render};
use crate::config::Config;
use crate::engine::command::{CommandError, CommandSpec, engine_command};
use crate::engine::runner::{ProcessError, ProcessRunner};
use hound::{SampleFormat, WavReader};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WaveformError {
    #[error("Invalid waveform dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Failed to convert {}: {}", .source_path.display(), .stderr.join("; "))]
    Conversion {
        source_path: PathBuf,
        stderr: Vec<String>,
    },

    #[error("No audio frames in {}", .0.display())]
    NoFrames(PathBuf),

    #[error("invalid engine command: {0}")]
    Command(#[from] CommandError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("WAV decode error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WaveformError>;

/// What to draw and how big.
#[derive(Debug, Clone)]
pub struct WaveformSpec {
    pub source: PathBuf,
    pub width: u32,
    pub height: u32,
    pub colors: WaveformColors,
}

impl WaveformSpec {
    pub fn new(source: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            source: source.into(),
            width,
            height,
            colors: WaveformColors::default(),
        }
    }

    pub fn with_colors(mut self, colors: WaveformColors) -> Self {
        self.colors = colors;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(WaveformError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct WaveformGenerator {
    engine: String,
    log_level: String,
    runner: ProcessRunner,
}

impl WaveformGenerator {
    pub fn new(engine: impl Into<String>, log_level: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
            log_level: log_level.into(),
            runner: ProcessRunner::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.engine_program(), config.engine_log_level.clone())
    }

    /// `<engine> -v <level> -i <source> -ac 1 -c:a pcm_s16le -map a <wav>`
    pub fn conversion_command(&self, source: &Path, wav: &Path) -> Result<CommandSpec> {
        let mut builder = engine_command(&self.engine, &self.log_level, source)?;
        builder
            .add_pair("-ac", "1")?
            .add_pair("-c:a", "pcm_s16le")?
            .add_pair("-map", "a")?
            .arg(wav.to_string_lossy())?;
        Ok(builder.finish())
    }

    pub fn generate(&self, spec: &WaveformSpec) -> Result<RgbaImage> {
        spec.validate()?;

        let scratch = tempfile::Builder::new().prefix("wavedeck-").tempdir()?;
        let wav = scratch.path().join("waveform.wav");
        let command = self.conversion_command(&spec.source, &wav)?;

        let outcome = self.runner.run_blocking(&command)?;
        if outcome.has_error() || !wav.exists() {
            return Err(WaveformError::Conversion {
                source_path: spec.source.clone(),
                stderr: outcome.stderr,
            });
        }

        let amplitudes = read_amplitudes(&wav)?;
        log::debug!(
            "Read {} frames from converted {}",
            amplitudes.len(),
            spec.source.display()
        );
        render_amplitudes(&amplitudes, spec)
    }

    pub fn generate_to_file(&self, spec: &WaveformSpec, output: &Path) -> Result<()> {
        let image = self.generate(spec)?;
        image.save(output)?;
        log::info!(
            "Wrote {}x{} waveform to {}",
            image.width(),
            image.height(),
            output.display()
        );
        Ok(())
    }
}

/// Peak magnitude of every frame in a WAV file, across channels.
pub fn read_amplitudes(path: &Path) -> Result<Vec<f32>> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Int => reader
            .samples::<i32>()
            .map(|s| s.map(|s| s as f32))
            .collect::<std::result::Result<_, _>>()?,
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()?,
    };

    Ok(samples
        .chunks(channels)
        .map(|frame| frame.iter().fold(0.0f32, |peak, s| peak.max(s.abs())))
        .collect())
}

/// Reduce and draw already-decoded frame amplitudes.
pub fn render_amplitudes(amplitudes: &[f32], spec: &WaveformSpec) -> Result<RgbaImage> {
    spec.validate()?;
    if amplitudes.is_empty() {
        return Err(WaveformError::NoFrames(spec.source.clone()));
    }

    let width = effective_width(spec.width, amplitudes.len());
    if width < spec.width {
        log::debug!(
            "Only {} frames, narrowing waveform from {} to {width} columns",
            amplitudes.len(),
            spec.width
        );
    }

    let heights = column_heights(amplitudes, width, spec.height);
    Ok(render(&heights, width, spec.height, &spec.colors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_wav(path: &Path, samples: &[i16], channels: u16) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn has_ffmpeg() -> bool {
        std::process::Command::new("ffmpeg")
            .arg("-version")
            .output()
            .is_ok()
    }

    #[test]
    fn test_invalid_dimensions_rejected() {
        let spec = WaveformSpec::new("a.wav", 0, 100);
        assert!(matches!(
            render_amplitudes(&[1.0], &spec),
            Err(WaveformError::InvalidDimensions { .. })
        ));
        let generator = WaveformGenerator::new("ffmpeg", "error");
        assert!(matches!(
            generator.generate(&WaveformSpec::new("a.wav", 10, 0)),
            Err(WaveformError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_zero_frames_fail_fast() {
        let spec = WaveformSpec::new("empty.wav", 100, 50);
        assert!(matches!(
            render_amplitudes(&[], &spec),
            Err(WaveformError::NoFrames(_))
        ));
    }

    #[test]
    fn test_silence_renders_center_line_only() {
        let spec = WaveformSpec::new("silence.wav", 64, 20);
        let image = render_amplitudes(&[0.0; 4096], &spec).unwrap();

        assert_eq!(image.width(), 64);
        for (_, y, pixel) in image.enumerate_pixels() {
            let expected = if y == 10 {
                spec.colors.center_line
            } else {
                spec.colors.background
            };
            assert_eq!(*pixel, expected);
        }
    }

    #[test]
    fn test_width_shrinks_to_frame_count() {
        let spec = WaveformSpec::new("short.wav", 500, 40);
        let image = render_amplitudes(&[0.1, 0.2, 0.3], &spec).unwrap();
        assert_eq!(image.width(), 3);
        assert_eq!(image.height(), 40);
    }

    #[test]
    fn test_read_amplitudes_takes_frame_peak() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("stereo.wav");
        write_wav(&path, &[100, -300, 0, 0, -50, 20], 2);

        let amplitudes = read_amplitudes(&path).unwrap();
        assert_eq!(amplitudes, vec![300.0, 0.0, 50.0]);
    }

    #[test]
    fn test_conversion_command_shape() {
        let generator = WaveformGenerator::new("ffmpeg", "error");
        let command = generator
            .conversion_command(Path::new("/music/a.mp3"), Path::new("/tmp/w.wav"))
            .unwrap();
        assert_eq!(
            command.build(),
            "ffmpeg -v error -i /music/a.mp3 -ac 1 -c:a pcm_s16le -map a /tmp/w.wav"
        );
    }

    #[test]
    fn test_missing_engine_is_process_error() {
        let generator = WaveformGenerator::new("/nonexistent/wavedeck-engine", "error");
        let result = generator.generate(&WaveformSpec::new("a.wav", 10, 10));
        assert!(matches!(
            result,
            Err(WaveformError::Process(ProcessError::Launch { .. }))
        ));
    }

    #[test]
    fn test_generate_end_to_end_with_ffmpeg() {
        if !has_ffmpeg() {
            eprintln!("Skipping waveform test: ffmpeg not available");
            return;
        }

        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("tone.wav");
        let samples: Vec<i16> = (0..8000)
            .map(|i| ((i as f32 * 0.05).sin() * 12_000.0) as i16)
            .collect();
        write_wav(&source, &samples, 1);

        let output = temp_dir.path().join("tone.png");
        let generator = WaveformGenerator::new("ffmpeg", "error");
        generator
            .generate_to_file(&WaveformSpec::new(&source, 200, 60), &output)
            .unwrap();

        let image = image::open(&output).unwrap();
        assert_eq!(image.width(), 200);
        assert_eq!(image.height(), 60);
    }

    #[test]
    fn test_unreadable_source_reports_conversion_failure() {
        if !has_ffmpeg() {
            eprintln!("Skipping waveform test: ffmpeg not available");
            return;
        }

        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("garbage.mp3");
        std::fs::write(&source, b"not audio at all").unwrap();

        let generator = WaveformGenerator::new("ffmpeg", "error");
        let result = generator.generate(&WaveformSpec::new(&source, 100, 40));
        assert!(matches!(result, Err(WaveformError::Conversion { .. })));
    }
}
