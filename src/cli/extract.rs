use owo_colors::OwoColorize;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use wavedeck::config::Config;
use wavedeck::engine::{AudioExtractor, AudioFormat};
use wavedeck::utils::progress::create_progress_spinner;
use wavedeck::utils::validation::validate_input_file;

pub fn handle_extract(
    file: &Path,
    format: AudioFormat,
    suffix: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    validate_input_file(file)?;
    let config = Config::load()?;

    let extractor = AudioExtractor::new(config.engine_program(), config.engine_log_level.clone())
        .with_suffix(suffix.unwrap_or(&config.extract_suffix));

    let spinner = create_progress_spinner();
    spinner.set_message(format!("Extracting audio from {}", file.display()));
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = extractor.extract_blocking(file, format);
    spinner.finish_and_clear();

    let output = result?;
    println!("{} {}", "✓".green(), output.display());
    Ok(())
}
