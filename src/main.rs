//! wavedeck - command-line front end for audio playback, waveform images and
//! audio extraction.
//!
//! Media decoding and conversion is delegated to an external engine (ffmpeg
//! by default, see `wavedeck config`). Playback uses the system audio device
//! and needs the `player` feature.

use clap::{CommandFactory, Parser, Subcommand, builder::PossibleValuesParser};
use clap_complete::{Generator, Shell, generate};
use std::error::Error;
use std::io;
use std::path::PathBuf;
use wavedeck::config::CONFIG_KEYS;
use wavedeck::engine::AudioFormat;
use wavedeck::logging;

mod cli;

#[derive(Parser)]
#[command(name = "wavedeck")]
#[command(about = "Audio playback, waveform rendering and extraction")]
#[command(version)]
struct Cli {
    /// Echo log output to the terminal
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play an audio file with a progress display
    Play {
        /// File to play
        file: PathBuf,
    },
    /// Render a waveform image for an audio or video file
    Waveform {
        /// Source media file
        file: PathBuf,
        /// Output PNG (defaults to <name>_waveform.png next to the source)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Image width in pixels
        #[arg(long)]
        width: Option<u32>,
        /// Image height in pixels
        #[arg(long)]
        height: Option<u32>,
    },
    /// Extract the audio track of a media file
    Extract {
        /// Source media file
        file: PathBuf,
        /// Output format: mp3, wav, ogg or m4a
        #[arg(short, long, default_value = "mp3")]
        format: AudioFormat,
        /// Suffix appended to the output file name
        #[arg(short, long)]
        suffix: Option<String>,
    },
    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// View current configuration
    View,
    /// Set a configuration value
    Set {
        /// Configuration key
        #[arg(value_parser = PossibleValuesParser::new(CONFIG_KEYS.iter().copied()))]
        key: String,
        /// Configuration value
        value: String,
    },
    /// Edit configuration file in your editor
    Edit,
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.verbose) {
        eprintln!("Warning: logging disabled: {e}");
    }

    match cli.command {
        Commands::Play { file } => {
            cli::play::handle_play(&file)?;
        }
        Commands::Waveform {
            file,
            output,
            width,
            height,
        } => {
            cli::waveform::handle_waveform(&file, output.as_deref(), width, height)?;
        }
        Commands::Extract {
            file,
            format,
            suffix,
        } => {
            cli::extract::handle_extract(&file, format, suffix.as_deref())?;
        }
        Commands::Config { action } => match action {
            ConfigAction::View => {
                cli::config::handle_config_view()?;
            }
            ConfigAction::Set { key, value } => {
                cli::config::handle_config_set(&key, &value)?;
            }
            ConfigAction::Edit => {
                cli::config::handle_config_edit()?;
            }
        },
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            print_completions(shell, &mut cmd);
        }
    }

    Ok(())
}
