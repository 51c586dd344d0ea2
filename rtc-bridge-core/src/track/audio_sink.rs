use std::sync::Arc;

use parking_lot::Mutex;

use crate::boundary::native_handle::NativeHandle;
use crate::boundary::token_registry::{self, WrapperToken};
use crate::models::config::BridgeConfiguration;
use crate::models::diagnostics::AudioSinkDiagnostics;
use crate::models::error::BridgeError;
use crate::processing::audio_read_buffer::{AudioReadBuffer, AudioReadStatus};
use crate::processing::moving_average::MovingAverage;
use crate::processing::resampler;
use crate::traits::media_engine::{ForeignHandle, MediaEngine};

/// Per-callback RMS samples smoothed for level metering.
const LEVEL_WINDOW: usize = 20;

/// Host-side consumer of a native audio track.
///
/// Buffers arriving samples in an `AudioReadBuffer` and serves the
/// application's fixed-cadence pulls, converting to the requested rate and
/// channel layout on the way out.
pub struct AudioTrackSink {
    engine: Arc<dyn MediaEngine>,
    handle: NativeHandle,
    token: Mutex<Option<WrapperToken>>,
    buffer: AudioReadBuffer,
    level_average: Mutex<MovingAverage>,
    diagnostics: Mutex<AudioSinkDiagnostics>,
}

impl AudioTrackSink {
    /// Register a sample sink for `track` with the engine.
    pub fn attach(
        engine: Arc<dyn MediaEngine>,
        track: ForeignHandle,
        config: &BridgeConfiguration,
    ) -> Result<Arc<Self>, BridgeError> {
        config.validate().map_err(BridgeError::ConfigurationFailed)?;

        let sink = Arc::new(Self {
            engine: Arc::clone(&engine),
            handle: NativeHandle::new(Arc::clone(&engine), track),
            token: Mutex::new(None),
            buffer: AudioReadBuffer::new(config.audio_buffer_secs, config.pad_behavior),
            level_average: Mutex::new(MovingAverage::new(LEVEL_WINDOW)),
            diagnostics: Mutex::new(AudioSinkDiagnostics::default()),
        });

        let token = token_registry::global().register(Arc::clone(&sink));
        *sink.token.lock() = Some(token);
        engine.set_audio_sink(track, token, Self::on_native_samples);
        Ok(sink)
    }

    fn on_native_samples(token: WrapperToken, samples: &[f32], sample_rate: u32, channels: u16) {
        match token_registry::global().resolve::<AudioTrackSink>(token) {
            Ok(sink) => sink.ingest(samples, sample_rate, channels),
            Err(_) => log::trace!("audio samples for stale token {}", token.raw()),
        }
    }

    fn ingest(&self, samples: &[f32], sample_rate: u32, channels: u16) {
        self.buffer.push(samples, sample_rate, channels);
        self.level_average.lock().push(resampler::rms_level(samples) as f64);

        let mut diag = self.diagnostics.lock();
        diag.callback_count += 1;
        diag.samples_total += samples.len() as u64;
    }

    /// Fill `out` at the requested format from the oldest buffered audio.
    pub fn read(&self, sample_rate: u32, channels: u16, out: &mut [f32]) -> Result<AudioReadStatus, BridgeError> {
        if self.handle.is_closed() {
            return Err(BridgeError::ResourceClosed);
        }

        let status = self.buffer.read(sample_rate, channels, out);
        let mut diag = self.diagnostics.lock();
        if status.overrun {
            diag.overruns += 1;
        }
        if status.underrun {
            diag.underruns += 1;
        }
        Ok(status)
    }

    /// Smoothed RMS level over recent callbacks.
    pub fn average_level(&self) -> f64 {
        self.level_average.lock().average()
    }

    pub fn diagnostics(&self) -> AudioSinkDiagnostics {
        *self.diagnostics.lock()
    }

    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    /// Detach from the engine and free the native track reference.
    /// Same teardown order as the video sink; idempotent.
    pub fn close(&self) {
        let Some(token) = self.token.lock().take() else {
            return;
        };
        if let Ok(track) = self.handle.get() {
            self.engine.clear_audio_sink(track);
        }
        token_registry::global().unregister(token);
        self.handle.release();
    }
}
