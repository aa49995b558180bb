//! Audio extraction: pull the audio track out of a media file with the engine.
//!
//! Output files are written next to the source as
//! `<base name><suffix>.<extension>`. The extractor never overwrites an
//! existing file; picking a free name is up to the caller.

use super::command::{CommandError, CommandSpec, engine_command};
use super::runner::{ProcessError, ProcessOutcome, ProcessRunner};
use crate::constants::DEFAULT_EXTRACT_SUFFIX;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("output file already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("source has no file name: {}", .0.display())]
    NoFileName(PathBuf),

    #[error("invalid engine command: {0}")]
    Command(#[from] CommandError),

    #[error(transparent)]
    Process(#[from] ProcessError),
}

pub type Result<T> = std::result::Result<T, ExtractError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wave,
    Ogg,
    M4a,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wave => "wav",
            AudioFormat::Ogg => "ogg",
            AudioFormat::M4a => "m4a",
        }
    }

    /// Engine arguments placed between the input and the output path.
    pub fn conversion_args(&self) -> &'static [&'static str] {
        match self {
            AudioFormat::Mp3 => &["-q:a", "0", "-map", "a"],
            AudioFormat::Wave => &["-map", "a"],
            AudioFormat::Ogg => &["-c:a", "libvorbis", "-q:a", "4", "-map", "a"],
            AudioFormat::M4a => &["-c:a", "aac", "-q:a", "2", "-map", "a"],
        }
    }
}

impl FromStr for AudioFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mp3" => Ok(AudioFormat::Mp3),
            "wav" | "wave" => Ok(AudioFormat::Wave),
            "ogg" => Ok(AudioFormat::Ogg),
            "m4a" | "aac" => Ok(AudioFormat::M4a),
            other => Err(format!("Unsupported audio format: {other}")),
        }
    }
}

/// Path the extracted audio for `input` will be written to.
pub fn output_path_for(input: &Path, suffix: &str, format: AudioFormat) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ExtractError::NoFileName(input.to_path_buf()))?;

    let name = format!("{stem}{suffix}.{}", format.extension());
    Ok(match input.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    })
}

#[derive(Debug, Clone)]
pub struct AudioExtractor {
    engine: String,
    log_level: String,
    suffix: String,
    runner: ProcessRunner,
}

impl AudioExtractor {
    pub fn new(engine: impl Into<String>, log_level: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
            log_level: log_level.into(),
            suffix: DEFAULT_EXTRACT_SUFFIX.to_string(),
            runner: ProcessRunner::new(),
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// The command that would extract `input` and where its output lands.
    pub fn command(&self, input: &Path, format: AudioFormat) -> Result<(CommandSpec, PathBuf)> {
        let output = output_path_for(input, &self.suffix, format)?;
        let mut builder = engine_command(&self.engine, &self.log_level, input)?;
        builder
            .add_all(format.conversion_args())?
            .arg(output.to_string_lossy())?;
        Ok((builder.finish(), output))
    }

    pub async fn extract(&self, input: &Path, format: AudioFormat) -> Result<PathBuf> {
        let (command, output) = self.prepare(input, format)?;
        let outcome = self.runner.run(&command).await?;
        finish(outcome, output)
    }

    /// Blocking variant for background threads and the CLI.
    pub fn extract_blocking(&self, input: &Path, format: AudioFormat) -> Result<PathBuf> {
        let (command, output) = self.prepare(input, format)?;
        let outcome = self.runner.run_blocking(&command)?;
        finish(outcome, output)
    }

    fn prepare(&self, input: &Path, format: AudioFormat) -> Result<(CommandSpec, PathBuf)> {
        let (command, output) = self.command(input, format)?;
        if output.exists() {
            return Err(ExtractError::OutputExists(output));
        }
        Ok((command, output))
    }
}

// Extraction is best-effort: engine warnings are logged, and only a missing
// output file turns them into a failure.
fn finish(outcome: ProcessOutcome, output: PathBuf) -> Result<PathBuf> {
    if outcome.has_error() {
        for line in &outcome.stderr {
            log::warn!("{}: {line}", outcome.program);
        }
        if !output.exists() {
            return Err(ProcessError::ToolReported {
                program: outcome.program,
                stderr: outcome.stderr,
            }
            .into());
        }
    }
    log::info!("Extracted audio to {}", output.display());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_path_default_suffix() {
        let path = output_path_for(Path::new("/media/clip.mp4"), "_audio", AudioFormat::Mp3).unwrap();
        assert_eq!(path, PathBuf::from("/media/clip_audio.mp3"));
    }

    #[test]
    fn test_output_path_custom_suffix_and_relative() {
        let path = output_path_for(Path::new("talk.mkv"), "-track", AudioFormat::Ogg).unwrap();
        assert_eq!(path, PathBuf::from("talk-track.ogg"));
    }

    #[test]
    fn test_output_path_requires_name() {
        assert!(matches!(
            output_path_for(Path::new("/"), "_audio", AudioFormat::Wave),
            Err(ExtractError::NoFileName(_))
        ));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("MP3".parse::<AudioFormat>().unwrap(), AudioFormat::Mp3);
        assert_eq!("wave".parse::<AudioFormat>().unwrap(), AudioFormat::Wave);
        assert_eq!("m4a".parse::<AudioFormat>().unwrap(), AudioFormat::M4a);
        assert!("flac".parse::<AudioFormat>().is_err());
    }

    #[test]
    fn test_command_shape() {
        let extractor = AudioExtractor::new("ffmpeg", "error");
        let (spec, output) = extractor
            .command(Path::new("/media/clip.mp4"), AudioFormat::Wave)
            .unwrap();

        assert_eq!(output, PathBuf::from("/media/clip_audio.wav"));
        assert_eq!(
            spec.build(),
            "ffmpeg -v error -i /media/clip.mp4 -map a /media/clip_audio.wav"
        );
    }

    #[test]
    fn test_ogg_and_m4a_carry_codec_flags() {
        let extractor = AudioExtractor::new("ffmpeg", "quiet");
        let (ogg, _) = extractor
            .command(Path::new("a.mp4"), AudioFormat::Ogg)
            .unwrap();
        assert!(ogg.args().contains(&"libvorbis".to_string()));

        let (m4a, _) = extractor
            .command(Path::new("a.mp4"), AudioFormat::M4a)
            .unwrap();
        assert!(m4a.args().contains(&"aac".to_string()));
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("clip.mp4");
        std::fs::write(&input, b"").unwrap();
        std::fs::write(temp_dir.path().join("clip_audio.mp3"), b"taken").unwrap();

        let extractor = AudioExtractor::new("ffmpeg", "error");
        let result = extractor.extract_blocking(&input, AudioFormat::Mp3);
        assert!(matches!(result, Err(ExtractError::OutputExists(_))));
    }
}
