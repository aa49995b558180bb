//! Progress bar helpers shared by the CLI commands.

use crate::constants::SPINNER_CHARS;
use indicatif::{ProgressBar, ProgressStyle};

/// Spinner shown while the media engine is working.
pub fn create_progress_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(SPINNER_CHARS),
    );
    spinner
}

/// Bar used as the seek control during playback. Its length is the slider
/// range; elapsed and remaining time go in the prefix and message.
pub fn create_playback_bar(slider_max: u32) -> ProgressBar {
    let pb = ProgressBar::new(slider_max as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{prefix:>8.cyan} [{bar:40.cyan/blue}] -{msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb
}
