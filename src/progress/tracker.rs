//! Background polling of playback position for a progress display.
//!
//! The tracker runs one thread that wakes every interval, reads the elapsed
//! position from a [`PositionSource`], and pushes elapsed/remaining text and a
//! slider value into a [`ProgressView`]. Automatic updates are skipped while
//! the timer is paused, the view is hidden, or the user is dragging the seek
//! control. They are also dropped when they would move the display backwards,
//! which guards against stale readings. Updates triggered by the user always
//! apply.

use super::format::{format_duration, slider_to_millis, slider_value};
use crate::constants::DEFAULT_PROGRESS_INTERVAL_MS;
use crate::playback::PlaybackManager;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Where the tracker reads the current position from.
pub trait PositionSource: Send + Sync {
    fn elapsed_millis(&self) -> u64;
}

impl<F> PositionSource for F
where
    F: Fn() -> u64 + Send + Sync,
{
    fn elapsed_millis(&self) -> u64 {
        self()
    }
}

impl PositionSource for PlaybackManager {
    fn elapsed_millis(&self) -> u64 {
        self.foreground_position()
            .map_or(0, |position| position.as_millis() as u64)
    }
}

/// The UI side of the tracker: two labels and a slider. Its methods run with
/// the tracker's state locked and must not call back into the tracker.
pub trait ProgressView: Send + Sync {
    /// Hidden or minimized views are not updated automatically.
    fn is_visible(&self) -> bool {
        true
    }

    fn slider_max(&self) -> u32;

    fn show_elapsed(&self, text: &str);

    fn show_remaining(&self, text: &str);

    fn set_slider(&self, value: u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemainingMode {
    /// Count down to the end of the track.
    #[default]
    Countdown,
    /// Always show the total length.
    TotalLength,
}

#[derive(Debug, Clone, Copy)]
pub struct TrackerOptions {
    pub interval: Duration,
    pub remaining: RemainingMode,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_PROGRESS_INTERVAL_MS),
            remaining: RemainingMode::Countdown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressState {
    pub total_ms: u64,
    pub elapsed_ms: u64,
    pub paused: bool,
    pub seeking: bool,
    /// Elapsed seconds of the last applied update.
    pub last_reported_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdateKind {
    /// From the polling loop.
    Automatic,
    /// Pushed by the caller, still subject to the stale guard.
    Manual,
    /// The user moved the position.
    User,
}

struct TrackerShared {
    state: Mutex<ProgressState>,
    view: Arc<dyn ProgressView>,
    remaining: RemainingMode,
    killed: AtomicBool,
}

impl TrackerShared {
    fn lock(&self) -> MutexGuard<'_, ProgressState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tick(&self, elapsed_ms: u64) {
        if !self.view.is_visible() {
            return;
        }
        self.apply(elapsed_ms, UpdateKind::Automatic);
    }

    /// The view is written while the state lock is held, so once
    /// `pause_timer` or `begin_seek` returns no automatic update can land.
    fn apply(&self, elapsed_ms: u64, kind: UpdateKind) -> bool {
        if self.killed.load(Ordering::SeqCst) {
            return false;
        }

        let elapsed_secs = elapsed_ms / 1000;
        let mut state = self.lock();
        if kind == UpdateKind::Automatic && (state.paused || state.seeking) {
            return false;
        }
        if kind != UpdateKind::User
            && state
                .last_reported_secs
                .is_some_and(|last| elapsed_secs < last)
        {
            log::debug!("Dropping stale progress update: {elapsed_secs}s");
            return false;
        }
        state.last_reported_secs = Some(elapsed_secs);
        state.elapsed_ms = elapsed_ms;
        let total_ms = state.total_ms;

        let total_secs = total_ms / 1000;
        let remaining_ms = match self.remaining {
            RemainingMode::Countdown => total_secs.saturating_sub(elapsed_secs) * 1000,
            RemainingMode::TotalLength => total_ms,
        };

        self.view.show_elapsed(&format_duration(elapsed_secs * 1000));
        self.view.show_remaining(&format_duration(remaining_ms));
        self.view
            .set_slider(slider_value(elapsed_ms, total_ms, self.view.slider_max()));
        drop(state);
        true
    }
}

pub struct ProgressTracker {
    shared: Arc<TrackerShared>,
    stop_tx: Mutex<Option<mpsc::Sender<()>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ProgressTracker {
    /// Start polling `source` for a track of length `total`.
    pub fn start(
        source: Arc<dyn PositionSource>,
        view: Arc<dyn ProgressView>,
        total: Duration,
        options: TrackerOptions,
    ) -> io::Result<Self> {
        let shared = Arc::new(TrackerShared {
            state: Mutex::new(ProgressState {
                total_ms: total.as_millis() as u64,
                ..ProgressState::default()
            }),
            view,
            remaining: options.remaining,
            killed: AtomicBool::new(false),
        });

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let worker_shared = Arc::clone(&shared);
        let interval = options.interval;
        let worker = thread::Builder::new()
            .name("wavedeck-progress".to_string())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            worker_shared.tick(source.elapsed_millis());
                        }
                        // Killed, or the tracker was dropped
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                log::debug!("Progress loop exited");
            })?;

        Ok(Self {
            shared,
            stop_tx: Mutex::new(Some(stop_tx)),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Push a position to the view. Manual updates apply even while paused;
    /// user-triggered ones also bypass the stale-update guard.
    pub fn update(&self, elapsed_ms: u64, user_triggered: bool) -> bool {
        let kind = if user_triggered {
            UpdateKind::User
        } else {
            UpdateKind::Manual
        };
        self.shared.apply(elapsed_ms, kind)
    }

    pub fn pause_timer(&self) {
        self.shared.lock().paused = true;
    }

    pub fn resume_timer(&self) {
        self.shared.lock().paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.shared.lock().paused
    }

    pub fn set_total(&self, total: Duration) {
        self.shared.lock().total_ms = total.as_millis() as u64;
    }

    /// The user grabbed the seek control; automatic updates hold off.
    pub fn begin_seek(&self) {
        self.shared.lock().seeking = true;
    }

    /// The user released the seek control at `slider_value`. Applies the new
    /// position and returns it in milliseconds so the caller can seek.
    pub fn end_seek(&self, slider_value: u32) -> u64 {
        let target = {
            let mut state = self.shared.lock();
            state.seeking = false;
            slider_to_millis(slider_value, state.total_ms, self.shared.view.slider_max())
        };
        self.shared.apply(target, UpdateKind::User);
        target
    }

    pub fn state(&self) -> ProgressState {
        *self.shared.lock()
    }

    pub fn is_alive(&self) -> bool {
        !self.shared.killed.load(Ordering::SeqCst)
    }

    /// Stop the loop for good. Later calls are no-ops.
    pub fn kill(&self) {
        if self.shared.killed.swap(true, Ordering::SeqCst) {
            return;
        }

        if let Some(tx) = self
            .stop_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            let _ = tx.send(());
        }

        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker {
            if worker.thread().id() != thread::current().id() && worker.join().is_err() {
                log::error!("Progress loop panicked");
            }
        }
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.kill();
    }
}
