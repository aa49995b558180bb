use std::error::Error;
use std::path::Path;

pub fn handle_play(file: &Path) -> Result<(), Box<dyn Error>> {
    #[cfg(feature = "player")]
    {
        player::run(file)
    }

    #[cfg(not(feature = "player"))]
    {
        let _ = file;
        use owo_colors::OwoColorize;
        println!("{} {}", "🎵".cyan(), "Audio Player".bold());
        println!();
        println!(
            "{} Playback requires the 'player' feature to be enabled.",
            "Note:".yellow()
        );
        println!();
        println!("To enable it, install with:");
        println!("  {}", "cargo install wavedeck --features player".cyan());

        Ok(())
    }
}

#[cfg(feature = "player")]
mod player {
    use indicatif::ProgressBar;
    use owo_colors::OwoColorize;
    use std::error::Error;
    use std::path::Path;
    use std::sync::Arc;
    use std::sync::mpsc::{self, RecvTimeoutError};
    use std::time::Duration;
    use wavedeck::config::Config;
    use wavedeck::constants::PROGRESS_SLIDER_MAX;
    use wavedeck::playback::PlaybackManager;
    use wavedeck::progress::{PositionSource, ProgressTracker, ProgressView};
    use wavedeck::utils::progress::create_playback_bar;
    use wavedeck::utils::validation::validate_input_file;

    const POLL: Duration = Duration::from_millis(200);

    /// Terminal progress bar driven by the tracker.
    struct BarView {
        bar: ProgressBar,
    }

    impl ProgressView for BarView {
        fn is_visible(&self) -> bool {
            !self.bar.is_hidden()
        }

        fn slider_max(&self) -> u32 {
            PROGRESS_SLIDER_MAX
        }

        fn show_elapsed(&self, text: &str) {
            self.bar.set_prefix(text.to_string());
        }

        fn show_remaining(&self, text: &str) {
            self.bar.set_message(text.to_string());
        }

        fn set_slider(&self, value: u32) {
            self.bar.set_position(value as u64);
        }
    }

    pub fn run(file: &Path) -> Result<(), Box<dyn Error>> {
        validate_input_file(file)?;
        let config = Config::load()?;

        let manager = PlaybackManager::with_default_output();
        let (done_tx, done_rx) = mpsc::channel::<()>();

        let failure_tx = done_tx.clone();
        manager.set_error_hook(move |path, error| {
            eprintln!(
                "{} {}: {error}",
                "Playback failed".red().bold(),
                path.display()
            );
            let _ = failure_tx.send(());
        });

        let unit = manager.play_foreground(file)?;
        unit.add_completion_callback(move || {
            let _ = done_tx.send(());
        });

        println!("{} {}", "▶".green(), file.display());

        let bar = create_playback_bar(PROGRESS_SLIDER_MAX);
        let view = Arc::new(BarView { bar: bar.clone() });
        let source: Arc<dyn PositionSource> = Arc::new(manager.clone());
        let tracker = ProgressTracker::start(
            source,
            view,
            unit.duration().unwrap_or_default(),
            config.tracker_options(),
        )?;

        let mut total_known = false;
        loop {
            match done_rx.recv_timeout(POLL) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    // Completion callbacks added after the unit ended never fire
                    if unit.state().is_terminal() {
                        break;
                    }
                    if !total_known {
                        if let Some(total) = unit.duration() {
                            tracker.set_total(total);
                            total_known = true;
                        }
                    }
                }
            }
        }

        tracker.kill();
        bar.finish_and_clear();

        log::info!("Playback of {} ended: {:?}", file.display(), unit.state());
        println!("{} {:?}", "■".cyan(), unit.state());
        Ok(())
    }
}
