use owo_colors::OwoColorize;
use std::error::Error;
use std::process::Command;
use wavedeck::config::Config;

pub fn handle_config_view() -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;

    println!("Current wavedeck configuration:");
    println!("  engine_path: {}", config.engine_path);
    println!("  engine_log_level: {}", config.engine_log_level);
    println!("  extract_suffix: {}", config.extract_suffix);
    println!("  progress_interval_ms: {}", config.progress_interval_ms);
    println!("  show_total_length: {}", config.show_total_length);
    println!(
        "  waveform: {}x{}",
        config.waveform_width, config.waveform_height
    );
    println!(
        "  colors: background {} / top {} / bottom {} / center {}",
        config.background_color,
        config.top_wave_color,
        config.bottom_wave_color,
        config.center_line_color
    );
    if !Config::exists()? {
        println!();
        println!("{}", "(defaults, no config file saved yet)".dimmed());
    }

    Ok(())
}

pub fn handle_config_set(key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load()?;

    config.set_value(key, value)?;
    config.save()?;

    println!("Configuration updated: {key} = {value}");

    Ok(())
}

pub fn handle_config_edit() -> Result<(), Box<dyn Error>> {
    // Materialize defaults so there is something to edit
    if !Config::exists()? {
        Config::new().save()?;
    }

    let config_path = Config::config_path()?;
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());

    println!("Opening {} in {}", config_path.display(), editor);

    let status = Command::new(&editor)
        .arg(&config_path)
        .status()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                format!("Editor '{editor}' not found. Set $EDITOR to a valid editor path.")
            } else {
                format!("Failed to launch editor '{editor}': {e}")
            }
        })?;

    if !status.success() {
        return Err(format!("Editor '{editor}' exited with error").into());
    }

    // Validate the config after editing
    match Config::load().and_then(|config| config.waveform_colors().map(|_| ())) {
        Ok(()) => println!("Configuration saved successfully"),
        Err(e) => {
            return Err(format!("Configuration validation failed: {e}").into());
        }
    }

    Ok(())
}
