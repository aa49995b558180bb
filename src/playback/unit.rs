//! A single playing file.
//!
//! A [`PlaybackUnit`] owns one file and the decode handle for it. `play`
//! spawns a worker thread that opens the file through an [`AudioOutput`],
//! blocks until the stream is exhausted or closed, and then runs the
//! registered completion callbacks in order. Units are single-use: once a
//! unit leaves `Playing` it cannot be started again.
//!
//! `cancel` and `stop` both close the decode handle. Only `cancel` suppresses
//! the callbacks. The worker decides once, at the moment the stream ends,
//! whether the callbacks fire: the cancelled flag is written and read under
//! the lock it holds for that decision. A `cancel` that returns before the
//! decision suppresses every callback. A `cancel` that lands after it does
//! not stop the callbacks already handed to the worker.
//!
//! A panic on the worker, whether in the output backend or in a callback,
//! is caught. A panicking backend leaves the unit `Failed` and is reported
//! to the error hook. A panicking callback is logged and the remaining
//! callbacks still run.

use super::error::{PlaybackError, Result};
use super::output::{AudioOutput, PlaybackClock, StreamControl};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

static NEXT_UNIT_ID: AtomicU64 = AtomicU64::new(1);

pub type CompletionCallback = Box<dyn FnOnce() + Send + 'static>;

/// Receives failures from playback workers.
pub type ErrorHook = Arc<dyn Fn(&Path, &PlaybackError) + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Idle,
    Playing,
    Completed,
    Stopped,
    Cancelled,
    Failed,
}

impl UnitState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, UnitState::Idle | UnitState::Playing)
    }
}

struct UnitInner {
    state: UnitState,
    control: Option<Arc<dyn StreamControl>>,
    callbacks: Vec<CompletionCallback>,
}

struct UnitShared {
    id: u64,
    path: PathBuf,
    output: Arc<dyn AudioOutput>,
    error_hook: Option<ErrorHook>,
    clock: Arc<PlaybackClock>,
    cancelled: AtomicBool,
    inner: Mutex<UnitInner>,
}

impl UnitShared {
    fn lock(&self) -> MutexGuard<'_, UnitInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run_guarded(&self) {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| self.run())) {
            let message = panic_message(payload.as_ref());
            self.fail(PlaybackError::Decode(format!(
                "playback worker panicked: {message}"
            )));
        }
    }

    fn run(&self) {
        let opened = match self.output.open(&self.path, Arc::clone(&self.clock)) {
            Ok(opened) => opened,
            Err(err) => {
                self.fail(err);
                return;
            }
        };

        let control = Arc::clone(&opened.control);
        let still_playing = {
            let mut inner = self.lock();
            if inner.state == UnitState::Playing {
                inner.control = Some(Arc::clone(&control));
                true
            } else {
                false
            }
        };

        if still_playing {
            log::debug!("Unit {} streaming {}", self.id, self.path.display());
            control.wait_until_end();
        } else {
            // Stopped or cancelled while the stream was being opened.
            control.close();
        }

        self.finish();
        drop(opened);
    }

    fn finish(&self) {
        let callbacks = {
            let mut inner = self.lock();
            inner.control = None;

            if self.cancelled.load(Ordering::SeqCst) {
                inner.state = UnitState::Cancelled;
                inner.callbacks.clear();
                log::debug!("Unit {} cancelled, skipping callbacks", self.id);
                return;
            }

            if inner.state == UnitState::Playing {
                inner.state = UnitState::Completed;
            }
            std::mem::take(&mut inner.callbacks)
        };

        log::debug!(
            "Unit {} finished, running {} callbacks",
            self.id,
            callbacks.len()
        );
        for callback in callbacks {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(callback)) {
                log::error!(
                    "Completion callback of unit {} panicked: {}",
                    self.id,
                    panic_message(payload.as_ref())
                );
            }
        }
    }

    fn fail(&self, err: PlaybackError) {
        log::error!("Playback of {} failed: {err}", self.path.display());
        {
            let mut inner = self.lock();
            inner.control = None;
            inner.callbacks.clear();
            if !self.cancelled.load(Ordering::SeqCst) {
                inner.state = UnitState::Failed;
            }
        }
        if let Some(hook) = &self.error_hook {
            hook(&self.path, &err);
        }
    }
}

/// Handle to one playback. Clones share the same underlying unit.
#[derive(Clone)]
pub struct PlaybackUnit {
    shared: Arc<UnitShared>,
}

impl PlaybackUnit {
    pub fn new(path: impl Into<PathBuf>, output: Arc<dyn AudioOutput>) -> Self {
        Self::build(path.into(), output, None)
    }

    pub fn with_error_hook(
        path: impl Into<PathBuf>,
        output: Arc<dyn AudioOutput>,
        hook: ErrorHook,
    ) -> Self {
        Self::build(path.into(), output, Some(hook))
    }

    fn build(path: PathBuf, output: Arc<dyn AudioOutput>, error_hook: Option<ErrorHook>) -> Self {
        Self {
            shared: Arc::new(UnitShared {
                id: NEXT_UNIT_ID.fetch_add(1, Ordering::Relaxed),
                path,
                output,
                error_hook,
                clock: Arc::new(PlaybackClock::new()),
                cancelled: AtomicBool::new(false),
                inner: Mutex::new(UnitInner {
                    state: UnitState::Idle,
                    control: None,
                    callbacks: Vec::new(),
                }),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.shared.id
    }

    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    pub fn state(&self) -> UnitState {
        self.shared.lock().state
    }

    pub fn is_playing(&self) -> bool {
        self.state() == UnitState::Playing
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::SeqCst)
    }

    /// Start playback on a background worker. Returns immediately.
    pub fn play(&self) -> Result<()> {
        {
            let mut inner = self.shared.lock();
            match inner.state {
                UnitState::Idle => inner.state = UnitState::Playing,
                UnitState::Playing => return Err(PlaybackError::AlreadyPlaying(self.path().into())),
                _ => return Err(PlaybackError::Finished(self.path().into())),
            }
        }

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name(format!("wavedeck-play-{}", self.id()))
            .spawn(move || shared.run_guarded());

        if let Err(err) = spawned {
            self.shared.lock().state = UnitState::Failed;
            return Err(PlaybackError::Worker(err));
        }

        log::info!("Playing {}", self.path().display());
        Ok(())
    }

    /// Abort silently: close the decode handle and drop all callbacks.
    pub fn cancel(&self) {
        let control = {
            let mut inner = self.shared.lock();
            self.shared.cancelled.store(true, Ordering::SeqCst);
            if !inner.state.is_terminal() {
                inner.state = UnitState::Cancelled;
            }
            inner.control.take()
        };

        if let Some(control) = control {
            control.close();
        }
        log::debug!("Cancelled {}", self.path().display());
    }

    /// Close the decode handle. Completion callbacks still run.
    pub fn stop(&self) {
        let control = {
            let mut inner = self.shared.lock();
            if inner.state == UnitState::Playing {
                inner.state = UnitState::Stopped;
            }
            inner.control.take()
        };

        if let Some(control) = control {
            control.close();
        }
        log::debug!("Stopped {}", self.path().display());
    }

    /// Register an action to run once playback ends without cancellation.
    /// Callbacks run in registration order on the worker thread.
    pub fn add_completion_callback(&self, callback: impl FnOnce() + Send + 'static) {
        let mut inner = self.shared.lock();
        if inner.state.is_terminal() {
            log::debug!(
                "Unit {} already finished, ignoring late callback",
                self.id()
            );
            return;
        }
        inner.callbacks.push(Box::new(callback));
    }

    pub fn pause(&self) -> Result<()> {
        self.control()?.pause();
        Ok(())
    }

    pub fn resume(&self) -> Result<()> {
        self.control()?.resume();
        Ok(())
    }

    pub fn is_paused(&self) -> bool {
        self.control().map(|c| c.is_paused()).unwrap_or(false)
    }

    pub fn seek(&self, position: Duration) -> Result<()> {
        let control = self.control()?;
        control.seek(position)?;
        self.shared.clock.set_position(position);
        Ok(())
    }

    pub fn position(&self) -> Duration {
        self.shared.clock.position()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.shared.clock.duration()
    }

    fn control(&self) -> Result<Arc<dyn StreamControl>> {
        self.shared
            .lock()
            .control
            .clone()
            .ok_or(PlaybackError::NotPlaying)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl std::fmt::Debug for PlaybackUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackUnit")
            .field("id", &self.id())
            .field("path", &self.path())
            .field("state", &self.state())
            .finish()
    }
}
