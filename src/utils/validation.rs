//! Input validation for command line arguments.

use owo_colors::OwoColorize;
use std::error::Error;
use std::path::Path;

/// Fail unless `path` names an existing regular file.
pub fn validate_input_file(path: &Path) -> Result<(), Box<dyn Error>> {
    if !path.exists() {
        return Err(format!(
            "{} File does not exist: {}",
            "Error:".red().bold(),
            path.display()
        )
        .into());
    }
    if !path.is_file() {
        return Err(format!(
            "{} Not a regular file: {}",
            "Error:".red().bold(),
            path.display()
        )
        .into());
    }
    Ok(())
}

/// Fail if `path` already exists, so generated output never clobbers a file.
pub fn validate_output_free(path: &Path) -> Result<(), Box<dyn Error>> {
    if path.exists() {
        return Err(format!(
            "{} Output already exists: {}",
            "Error:".red().bold(),
            path.display()
        )
        .into());
    }
    Ok(())
}
