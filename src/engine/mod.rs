//! Everything that talks to the external media engine: argument building,
//! process execution, and audio extraction.

pub mod command;
pub mod extract;
pub mod runner;

pub use command::{CommandBuilder, CommandError, CommandSpec};
pub use extract::{AudioExtractor, AudioFormat, ExtractError};
pub use runner::{ProcessError, ProcessOutcome, ProcessRunner};
