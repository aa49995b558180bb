//! Routing of play/stop/query calls across playback units.
//!
//! The manager owns at most one foreground unit (the interruptible, user
//! facing stream) and any number of ancillary units (short sound effects that
//! may overlap). It is an ordinary value: construct one per application or
//! per test and pass clones to whatever needs audio.

use super::error::{PlaybackError, Result};
use super::output::AudioOutput;
use super::unit::{ErrorHook, PlaybackUnit};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use std::time::Duration;

struct ManagerInner {
    output: Arc<dyn AudioOutput>,
    foreground: Mutex<Option<PlaybackUnit>>,
    ancillary: Mutex<Vec<PlaybackUnit>>,
    error_hook: RwLock<Option<ErrorHook>>,
}

impl ManagerInner {
    fn foreground(&self) -> MutexGuard<'_, Option<PlaybackUnit>> {
        self.foreground.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ancillary(&self) -> MutexGuard<'_, Vec<PlaybackUnit>> {
        self.ancillary.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove_ancillary(&self, id: u64) {
        self.ancillary().retain(|unit| unit.id() != id);
        log::debug!("Ancillary unit {id} removed");
    }

    fn new_unit(&self, path: PathBuf) -> PlaybackUnit {
        let hook = self
            .error_hook
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match hook {
            Some(hook) => PlaybackUnit::with_error_hook(path, Arc::clone(&self.output), hook),
            None => PlaybackUnit::new(path, Arc::clone(&self.output)),
        }
    }
}

#[derive(Clone)]
pub struct PlaybackManager {
    inner: Arc<ManagerInner>,
}

impl PlaybackManager {
    pub fn new(output: Arc<dyn AudioOutput>) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                output,
                foreground: Mutex::new(None),
                ancillary: Mutex::new(Vec::new()),
                error_hook: RwLock::new(None),
            }),
        }
    }

    /// Manager backed by the default sound device.
    #[cfg(feature = "player")]
    pub fn with_default_output() -> Self {
        Self::new(Arc::new(super::output::RodioOutput::new()))
    }

    /// Install the reporter that hears about failures on playback workers.
    /// Applies to units started after the call.
    pub fn set_error_hook(&self, hook: impl Fn(&Path, &PlaybackError) + Send + Sync + 'static) {
        let mut slot = self
            .inner
            .error_hook
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::new(hook));
    }

    /// Start `path` as the foreground stream. Fails without touching the
    /// current foreground unit if it is still playing.
    pub fn play_foreground(&self, path: impl Into<PathBuf>) -> Result<PlaybackUnit> {
        let mut slot = self.inner.foreground();
        if let Some(current) = slot.as_ref().filter(|unit| unit.is_playing()) {
            return Err(PlaybackError::ForegroundBusy(current.path().to_path_buf()));
        }

        let unit = self.inner.new_unit(path.into());
        unit.play()?;
        *slot = Some(unit.clone());
        Ok(unit)
    }

    /// Start `path` as an ancillary stream. The unit removes itself from the
    /// active set when it finishes.
    pub fn play_ancillary(&self, path: impl Into<PathBuf>) -> Result<PlaybackUnit> {
        let unit = self.inner.new_unit(path.into());
        let id = unit.id();

        let manager: Weak<ManagerInner> = Arc::downgrade(&self.inner);
        unit.add_completion_callback(move || {
            if let Some(manager) = manager.upgrade() {
                manager.remove_ancillary(id);
            }
        });

        // Registered before play so a very short sound cannot finish first.
        self.inner.ancillary().push(unit.clone());
        if let Err(err) = unit.play() {
            self.inner.remove_ancillary(id);
            return Err(err);
        }
        Ok(unit)
    }

    pub fn is_foreground_playing(&self) -> bool {
        self.inner
            .foreground()
            .as_ref()
            .is_some_and(|unit| unit.is_playing())
    }

    /// Whether `path` is the file currently playing in the foreground.
    pub fn is_foreground_playing_file(&self, path: &Path) -> bool {
        self.inner
            .foreground()
            .as_ref()
            .is_some_and(|unit| unit.is_playing() && unit.path() == path)
    }

    pub fn is_ancillary_playing(&self) -> bool {
        let mut ancillary = self.inner.ancillary();
        // Cancelled and failed units never run their removal callback.
        ancillary.retain(|unit| !unit.state().is_terminal());
        !ancillary.is_empty()
    }

    pub fn is_any_audio_playing(&self) -> bool {
        self.is_foreground_playing() || self.is_ancillary_playing()
    }

    pub fn ancillary_count(&self) -> usize {
        self.inner.ancillary().len()
    }

    pub fn stop_foreground(&self) -> Result<()> {
        self.playing_foreground()?.stop();
        Ok(())
    }

    pub fn cancel_foreground(&self) -> Result<()> {
        self.playing_foreground()?.cancel();
        Ok(())
    }

    pub fn pause_foreground(&self) -> Result<()> {
        self.playing_foreground()?.pause()
    }

    pub fn resume_foreground(&self) -> Result<()> {
        self.playing_foreground()?.resume()
    }

    pub fn seek_foreground(&self, position: Duration) -> Result<()> {
        self.playing_foreground()?.seek(position)
    }

    pub fn foreground(&self) -> Option<PlaybackUnit> {
        self.inner.foreground().clone()
    }

    pub fn foreground_position(&self) -> Option<Duration> {
        self.inner.foreground().as_ref().map(|unit| unit.position())
    }

    pub fn foreground_duration(&self) -> Option<Duration> {
        self.inner
            .foreground()
            .as_ref()
            .and_then(|unit| unit.duration())
    }

    /// Stop the foreground stream and every ancillary stream.
    pub fn stop_all(&self) {
        if let Some(unit) = self.inner.foreground().as_ref() {
            unit.stop();
        }
        // Snapshot first: stopping fires removal callbacks that take the lock.
        let ancillary: Vec<PlaybackUnit> = self.inner.ancillary().clone();
        for unit in ancillary {
            unit.stop();
        }
    }

    fn playing_foreground(&self) -> Result<PlaybackUnit> {
        self.inner
            .foreground()
            .as_ref()
            .filter(|unit| unit.is_playing())
            .cloned()
            .ok_or(PlaybackError::NotPlaying)
    }
}
