//! Application configuration management.
//!
//! Holds where the media engine lives, how chatty it should be, how progress
//! is reported, and the default waveform geometry and colors. Configuration
//! is stored in the user's config directory (typically
//! ~/.config/wavedeck/config.toml) and every key falls back to a default when
//! missing.

use crate::constants::{DEFAULT_EXTRACT_SUFFIX, DEFAULT_PROGRESS_INTERVAL_MS};
use crate::progress::{RemainingMode, TrackerOptions};
use crate::waveform::render::{WaveformColors, parse_hex_color};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub const CONFIG_KEYS: &[&str] = &[
    "engine_path",
    "engine_log_level",
    "extract_suffix",
    "progress_interval_ms",
    "show_total_length",
    "waveform_width",
    "waveform_height",
    "background_color",
    "top_wave_color",
    "bottom_wave_color",
    "center_line_color",
];

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_engine_path")]
    pub engine_path: String,
    #[serde(default = "default_engine_log_level")]
    pub engine_log_level: String,
    #[serde(default = "default_extract_suffix")]
    pub extract_suffix: String,
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,
    #[serde(default)]
    pub show_total_length: bool,
    #[serde(default = "default_waveform_width")]
    pub waveform_width: u32,
    #[serde(default = "default_waveform_height")]
    pub waveform_height: u32,
    #[serde(default = "default_background_color")]
    pub background_color: String,
    #[serde(default = "default_top_wave_color")]
    pub top_wave_color: String,
    #[serde(default = "default_bottom_wave_color")]
    pub bottom_wave_color: String,
    #[serde(default = "default_center_line_color")]
    pub center_line_color: String,
}

fn default_engine_path() -> String {
    "ffmpeg".to_string()
}

fn default_engine_log_level() -> String {
    "error".to_string()
}

fn default_extract_suffix() -> String {
    DEFAULT_EXTRACT_SUFFIX.to_string()
}

fn default_progress_interval_ms() -> u64 {
    DEFAULT_PROGRESS_INTERVAL_MS
}

fn default_waveform_width() -> u32 {
    800
}

fn default_waveform_height() -> u32 {
    120
}

fn default_background_color() -> String {
    "#121212".to_string()
}

fn default_top_wave_color() -> String {
    "#00ff64".to_string()
}

fn default_bottom_wave_color() -> String {
    "#00aa46".to_string()
}

fn default_center_line_color() -> String {
    "#808080".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            engine_path: default_engine_path(),
            engine_log_level: default_engine_log_level(),
            extract_suffix: default_extract_suffix(),
            progress_interval_ms: default_progress_interval_ms(),
            show_total_length: false,
            waveform_width: default_waveform_width(),
            waveform_height: default_waveform_height(),
            background_color: default_background_color(),
            top_wave_color: default_top_wave_color(),
            bottom_wave_color: default_bottom_wave_color(),
            center_line_color: default_center_line_color(),
        }
    }

    pub fn config_dir() -> Result<PathBuf, Box<dyn Error>> {
        // Check for XDG_CONFIG_HOME first (useful for testing)
        let config_dir = if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(xdg_config).join("wavedeck")
        } else {
            dirs::config_dir()
                .ok_or("Unable to find config directory")?
                .join("wavedeck")
        };
        Ok(config_dir)
    }

    pub fn config_path() -> Result<PathBuf, Box<dyn Error>> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn load() -> Result<Self, Box<dyn Error>> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Default::default());
        }

        let contents = fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), Box<dyn Error>> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        let config_path = Self::config_path()?;
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(&config_path, toml_string)?;

        Ok(())
    }

    pub fn exists() -> Result<bool, Box<dyn Error>> {
        Ok(Self::config_path()?.exists())
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        match key {
            "engine_path" => self.engine_path = non_blank(key, value)?,
            "engine_log_level" => self.engine_log_level = non_blank(key, value)?,
            "extract_suffix" => self.extract_suffix = value.to_string(),
            "progress_interval_ms" => {
                self.progress_interval_ms = parse_positive(key, value)?;
            }
            "show_total_length" => {
                self.show_total_length = value
                    .parse::<bool>()
                    .map_err(|_| "Value must be 'true' or 'false'")?;
            }
            "waveform_width" => self.waveform_width = parse_positive(key, value)? as u32,
            "waveform_height" => self.waveform_height = parse_positive(key, value)? as u32,
            "background_color" => self.background_color = checked_color(value)?,
            "top_wave_color" => self.top_wave_color = checked_color(value)?,
            "bottom_wave_color" => self.bottom_wave_color = checked_color(value)?,
            "center_line_color" => self.center_line_color = checked_color(value)?,
            _ => return Err(format!("Unknown configuration key: {key}").into()),
        }
        Ok(())
    }

    /// Engine path with `~` and environment variables expanded.
    pub fn engine_program(&self) -> String {
        shellexpand::full(&self.engine_path)
            .map(|expanded| expanded.into_owned())
            .unwrap_or_else(|_| self.engine_path.clone())
    }

    pub fn waveform_colors(&self) -> Result<WaveformColors, Box<dyn Error>> {
        Ok(WaveformColors {
            background: parse_hex_color(&self.background_color)?,
            top_wave: parse_hex_color(&self.top_wave_color)?,
            bottom_wave: parse_hex_color(&self.bottom_wave_color)?,
            center_line: parse_hex_color(&self.center_line_color)?,
        })
    }

    pub fn tracker_options(&self) -> TrackerOptions {
        TrackerOptions {
            interval: Duration::from_millis(self.progress_interval_ms.max(1)),
            remaining: if self.show_total_length {
                RemainingMode::TotalLength
            } else {
                RemainingMode::Countdown
            },
        }
    }
}

fn non_blank(key: &str, value: &str) -> Result<String, Box<dyn Error>> {
    if value.trim().is_empty() {
        return Err(format!("{key} must not be empty").into());
    }
    Ok(value.to_string())
}

fn parse_positive(key: &str, value: &str) -> Result<u64, Box<dyn Error>> {
    match value.parse::<u64>() {
        Ok(n) if n > 0 && n <= u32::MAX as u64 => Ok(n),
        _ => Err(format!("{key} must be a positive integer").into()),
    }
}

fn checked_color(value: &str) -> Result<String, Box<dyn Error>> {
    parse_hex_color(value)?;
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Use a mutex to ensure tests that modify environment variables don't run concurrently
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_config_new() {
        let config = Config::new();
        assert_eq!(config.engine_path, "ffmpeg");
        assert_eq!(config.engine_log_level, "error");
        assert_eq!(config.extract_suffix, "_audio");
        assert_eq!(config.progress_interval_ms, 100);
        assert!(!config.show_total_length);
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let config: Config = toml::from_str("engine_path = \"/opt/ffmpeg/bin/ffmpeg\"\n").unwrap();
        assert_eq!(config.engine_path, "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(config.waveform_width, 800);
        assert_eq!(config.center_line_color, "#808080");
    }

    #[test]
    fn test_set_value() {
        let mut config = Config::new();

        config.set_value("engine_log_level", "quiet").unwrap();
        assert_eq!(config.engine_log_level, "quiet");

        config.set_value("show_total_length", "true").unwrap();
        assert!(config.show_total_length);
        assert!(config.set_value("show_total_length", "yes").is_err());

        config.set_value("waveform_width", "1024").unwrap();
        assert_eq!(config.waveform_width, 1024);
        assert!(config.set_value("waveform_height", "0").is_err());
        assert!(config.set_value("progress_interval_ms", "-5").is_err());

        config.set_value("top_wave_color", "#ff0000").unwrap();
        assert!(config.set_value("top_wave_color", "red").is_err());
        assert!(config.set_value("engine_path", " ").is_err());

        assert!(config.set_value("unknown_key", "value").is_err());
    }

    #[test]
    fn test_every_listed_key_is_settable() {
        let mut config = Config::new();
        for key in CONFIG_KEYS {
            let value = match *key {
                "show_total_length" => "true",
                k if k.ends_with("_color") => "#010203",
                "progress_interval_ms" | "waveform_width" | "waveform_height" => "10",
                _ => "value",
            };
            config.set_value(key, value).unwrap();
        }
    }

    #[test]
    fn test_waveform_colors_and_tracker_options() {
        let mut config = Config::new();
        config.background_color = "#000000".to_string();
        let colors = config.waveform_colors().unwrap();
        assert_eq!(colors.background, Rgba([0, 0, 0, 255]));
        assert_eq!(colors.top_wave, Rgba([0, 255, 100, 255]));

        assert_eq!(config.tracker_options().remaining, RemainingMode::Countdown);
        config.show_total_length = true;
        assert_eq!(
            config.tracker_options().remaining,
            RemainingMode::TotalLength
        );
        assert_eq!(
            config.tracker_options().interval,
            Duration::from_millis(100)
        );
    }

    #[test]
    fn test_engine_program_expands_home() {
        let mut config = Config::new();
        config.engine_path = "~/bin/ffmpeg".to_string();
        let expanded = config.engine_program();
        if dirs::home_dir().is_some() {
            assert!(!expanded.starts_with('~'));
            assert!(expanded.ends_with("bin/ffmpeg"));
        }
    }

    #[test]
    fn test_config_save_and_load() {
        let _guard = ENV_MUTEX.lock().unwrap();

        let temp_dir = TempDir::new().unwrap();
        let original_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        }

        assert!(!Config::exists().unwrap());

        let mut config = Config::new();
        config.engine_path = "/usr/local/bin/ffmpeg".to_string();
        config.show_total_length = true;
        config.save().unwrap();

        let config_path = Config::config_path().unwrap();
        assert!(config_path.starts_with(temp_dir.path().join("wavedeck")));
        assert!(Config::exists().unwrap());

        let loaded = Config::load().unwrap();
        assert_eq!(loaded.engine_path, "/usr/local/bin/ffmpeg");
        assert!(loaded.show_total_length);
        assert_eq!(loaded.waveform_height, 120);

        // Clean up - restore original value if it existed
        unsafe {
            if let Some(original) = original_xdg {
                std::env::set_var("XDG_CONFIG_HOME", original);
            } else {
                std::env::remove_var("XDG_CONFIG_HOME");
            }
        }
    }
}
