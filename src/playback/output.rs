//! Output device seam for playback units.
//!
//! A playback worker asks an [`AudioOutput`] to open a file. The output
//! decodes it, starts streaming to the device, and hands back a
//! [`StreamControl`] the unit uses to block until exhaustion, close, pause and
//! seek. Position is published through a shared [`PlaybackClock`] that the
//! decoding source advances one sample at a time.

use super::error::Result;
use std::any::Any;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

const UNKNOWN_DURATION: u64 = u64::MAX;

/// Sample-accurate position of one stream.
#[derive(Debug)]
pub struct PlaybackClock {
    samples_played: AtomicU64,
    sample_rate: AtomicU32,
    channels: AtomicU16,
    total_ms: AtomicU64,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self {
            samples_played: AtomicU64::new(0),
            sample_rate: AtomicU32::new(0),
            channels: AtomicU16::new(0),
            total_ms: AtomicU64::new(UNKNOWN_DURATION),
        }
    }
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_format(&self, sample_rate: u32, channels: u16, total: Option<Duration>) {
        self.sample_rate.store(sample_rate, Ordering::Relaxed);
        self.channels.store(channels, Ordering::Relaxed);
        let total_ms = total.map_or(UNKNOWN_DURATION, |d| d.as_millis() as u64);
        self.total_ms.store(total_ms, Ordering::Relaxed);
    }

    /// Count `samples` interleaved samples as played.
    pub fn advance(&self, samples: u64) {
        self.samples_played.fetch_add(samples, Ordering::Relaxed);
    }

    pub fn set_position(&self, position: Duration) {
        let per_second = self.samples_per_second();
        let samples = (position.as_secs_f64() * per_second as f64) as u64;
        self.samples_played.store(samples, Ordering::Relaxed);
    }

    pub fn position(&self) -> Duration {
        let per_second = self.samples_per_second();
        if per_second == 0 {
            return Duration::ZERO;
        }
        let played = self.samples_played.load(Ordering::Relaxed);
        Duration::from_millis(played.saturating_mul(1000) / per_second)
    }

    pub fn duration(&self) -> Option<Duration> {
        match self.total_ms.load(Ordering::Relaxed) {
            UNKNOWN_DURATION => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    fn samples_per_second(&self) -> u64 {
        self.sample_rate.load(Ordering::Relaxed) as u64
            * self.channels.load(Ordering::Relaxed) as u64
    }
}

/// Control surface over one open stream. Implementations must be safe to
/// call from any thread while another thread blocks in `wait_until_end`.
pub trait StreamControl: Send + Sync {
    /// Block until the stream is exhausted or closed.
    fn wait_until_end(&self);

    /// Stop streaming and release the decode handle. Closing twice is a no-op.
    fn close(&self);

    fn pause(&self);

    fn resume(&self);

    fn is_paused(&self) -> bool;

    fn seek(&self, position: Duration) -> Result<()>;
}

/// An open stream plus whatever must stay alive on the worker thread while
/// it plays (device handles are often not `Send`).
pub struct OpenedStream {
    pub control: Arc<dyn StreamControl>,
    keep_alive: Option<Box<dyn Any>>,
}

impl OpenedStream {
    pub fn new(control: Arc<dyn StreamControl>) -> Self {
        Self {
            control,
            keep_alive: None,
        }
    }

    pub fn keep_alive(mut self, guard: impl Any) -> Self {
        self.keep_alive = Some(Box::new(guard));
        self
    }
}

impl Drop for OpenedStream {
    fn drop(&mut self) {
        // Release the device only after the control is done with it.
        self.control.close();
        self.keep_alive.take();
    }
}

pub trait AudioOutput: Send + Sync {
    /// Open and start streaming `path`. Called on the unit's worker thread.
    fn open(&self, path: &Path, clock: Arc<PlaybackClock>) -> Result<OpenedStream>;
}

#[cfg(feature = "player")]
pub use rodio_backend::RodioOutput;

#[cfg(feature = "player")]
mod rodio_backend {
    use super::{AudioOutput, OpenedStream, PlaybackClock, StreamControl};
    use crate::playback::error::{PlaybackError, Result};
    use rodio::source::SeekError;
    use rodio::{Decoder, OutputStream, Sample, Sink, Source};
    use std::fs::File;
    use std::io::BufReader;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    /// Plays through the default output device with rodio.
    #[derive(Debug, Default, Clone)]
    pub struct RodioOutput;

    impl RodioOutput {
        pub fn new() -> Self {
            Self
        }
    }

    impl AudioOutput for RodioOutput {
        fn open(&self, path: &Path, clock: Arc<PlaybackClock>) -> Result<OpenedStream> {
            let file = File::open(path).map_err(|source| PlaybackError::Open {
                path: path.to_path_buf(),
                source,
            })?;
            let decoder = Decoder::new(BufReader::new(file))
                .map_err(|e| PlaybackError::Decode(e.to_string()))?;

            clock.set_format(
                decoder.sample_rate(),
                decoder.channels(),
                decoder.total_duration(),
            );

            log::info!(
                "Decoding {}: {} Hz, {} channels, duration: {:?}",
                path.display(),
                decoder.sample_rate(),
                decoder.channels(),
                decoder.total_duration()
            );

            let (stream, stream_handle) =
                OutputStream::try_default().map_err(|e| PlaybackError::Device(e.to_string()))?;
            let sink =
                Sink::try_new(&stream_handle).map_err(|e| PlaybackError::Device(e.to_string()))?;
            sink.append(ClockedSource::new(decoder, clock));

            let control = Arc::new(SinkControl { sink });
            Ok(OpenedStream::new(control).keep_alive(stream))
        }
    }

    struct SinkControl {
        sink: Sink,
    }

    impl StreamControl for SinkControl {
        fn wait_until_end(&self) {
            self.sink.sleep_until_end();
        }

        fn close(&self) {
            self.sink.stop();
        }

        fn pause(&self) {
            self.sink.pause();
        }

        fn resume(&self) {
            self.sink.play();
        }

        fn is_paused(&self) -> bool {
            self.sink.is_paused()
        }

        fn seek(&self, position: Duration) -> Result<()> {
            self.sink
                .try_seek(position)
                .map_err(|e| PlaybackError::Seek(e.to_string()))
        }
    }

    /// Pass-through source that advances the playback clock per sample.
    struct ClockedSource<S> {
        inner: S,
        clock: Arc<PlaybackClock>,
    }

    impl<S> ClockedSource<S> {
        fn new(inner: S, clock: Arc<PlaybackClock>) -> Self {
            Self { inner, clock }
        }
    }

    impl<S> Iterator for ClockedSource<S>
    where
        S: Source,
        S::Item: Sample,
    {
        type Item = S::Item;

        fn next(&mut self) -> Option<Self::Item> {
            let sample = self.inner.next()?;
            self.clock.advance(1);
            Some(sample)
        }
    }

    impl<S> Source for ClockedSource<S>
    where
        S: Source,
        S::Item: Sample,
    {
        fn current_frame_len(&self) -> Option<usize> {
            self.inner.current_frame_len()
        }

        fn channels(&self) -> u16 {
            self.inner.channels()
        }

        fn sample_rate(&self) -> u32 {
            self.inner.sample_rate()
        }

        fn total_duration(&self) -> Option<Duration> {
            self.inner.total_duration()
        }

        fn try_seek(&mut self, pos: Duration) -> std::result::Result<(), SeekError> {
            self.inner.try_seek(pos)?;
            self.clock.set_position(pos);
            Ok(())
        }
    }
}
