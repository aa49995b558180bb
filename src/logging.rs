//! Logger setup for the command line tool.
//!
//! Everything at Debug and above goes to a log file in the temp directory.
//! With `verbose`, Info and above is mirrored to stderr.

use crate::constants::LOG_FILE_NAME;
use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

pub fn log_file_path() -> PathBuf {
    std::env::temp_dir().join(LOG_FILE_NAME)
}

pub fn init_logging(verbose: bool) -> Result<PathBuf, Box<dyn Error>> {
    let log_file = log_file_path();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![WriteLogger::new(
        LevelFilter::Debug,
        Config::default(),
        File::create(&log_file)?,
    )];
    if verbose {
        loggers.push(TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }

    CombinedLogger::init(loggers)?;
    Ok(log_file)
}
