//! Project-wide constants used across multiple modules.
//!
//! This module centralizes constant definitions to avoid duplication and ensure
//! consistency across the codebase.

/// Spinner animation characters for progress indicators
pub const SPINNER_CHARS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Suffix appended to the base name of extracted audio files
pub const DEFAULT_EXTRACT_SUFFIX: &str = "_audio";

/// Progress polling interval
pub const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 100;

/// Resolution of the terminal progress bar used as the seek control
pub const PROGRESS_SLIDER_MAX: u32 = 1000;

/// Log file written under the system temp directory
pub const LOG_FILE_NAME: &str = "wavedeck.log";
