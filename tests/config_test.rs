use tempfile::TempDir;

#[test]
fn test_config_lifecycle() {
    // Create a temporary directory for test config
    let temp_dir = TempDir::new().unwrap();

    // Override the config path for testing
    unsafe {
        std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
    }

    // Test that config doesn't exist initially
    assert!(!wavedeck::config::Config::exists().unwrap());

    // Defaults are served without a file
    let defaults = wavedeck::config::Config::load().unwrap();
    assert_eq!(defaults.engine_path, "ffmpeg");

    // Create and save a config
    let config = wavedeck::config::Config::new();
    config.save().unwrap();

    // Verify it exists now
    assert!(wavedeck::config::Config::exists().unwrap());

    // Test config mutation
    let mut config = wavedeck::config::Config::load().unwrap();
    config.set_value("extract_suffix", "_track").unwrap();
    config.set_value("waveform_width", "1200").unwrap();
    config.save().unwrap();

    // Verify mutations persisted
    let reloaded = wavedeck::config::Config::load().unwrap();
    assert_eq!(reloaded.extract_suffix, "_track");
    assert_eq!(reloaded.waveform_width, 1200);
    assert_eq!(reloaded.waveform_height, 120);

    // Test invalid key and value
    let mut config = wavedeck::config::Config::load().unwrap();
    assert!(config.set_value("invalid_key", "value").is_err());
    assert!(config.set_value("center_line_color", "grey").is_err());
}
