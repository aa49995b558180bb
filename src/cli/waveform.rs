use owo_colors::OwoColorize;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;
use wavedeck::config::Config;
use wavedeck::utils::progress::create_progress_spinner;
use wavedeck::utils::validation::{validate_input_file, validate_output_free};
use wavedeck::waveform::{WaveformGenerator, WaveformSpec};

pub fn handle_waveform(
    file: &Path,
    output: Option<&Path>,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<(), Box<dyn Error>> {
    validate_input_file(file)?;
    let config = Config::load()?;

    let output = match output {
        Some(path) => path.to_path_buf(),
        None => default_output(file),
    };
    validate_output_free(&output)?;

    let spec = WaveformSpec::new(
        file,
        width.unwrap_or(config.waveform_width),
        height.unwrap_or(config.waveform_height),
    )
    .with_colors(config.waveform_colors()?);

    let spinner = create_progress_spinner();
    spinner.set_message(format!("Rendering waveform for {}", file.display()));
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = WaveformGenerator::from_config(&config).generate_to_file(&spec, &output);
    spinner.finish_and_clear();

    if let Err(e) = result {
        log::error!("Waveform generation failed for {}: {e}", file.display());
        return Err(e.into());
    }

    println!("{} {}", "✓".green(), output.display());
    Ok(())
}

fn default_output(file: &Path) -> PathBuf {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "waveform".to_string());
    file.with_file_name(format!("{stem}_waveform.png"))
}
