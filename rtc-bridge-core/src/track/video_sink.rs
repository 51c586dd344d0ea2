use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::boundary::native_handle::NativeHandle;
use crate::boundary::token_registry::{self, WrapperToken};
use crate::models::config::BridgeConfiguration;
use crate::models::diagnostics::VideoSinkDiagnostics;
use crate::models::error::BridgeError;
use crate::models::frame::{FrameStorage, VideoFrame};
use crate::processing::frame_queue::FrameQueue;
use crate::processing::moving_average::MovingAverage;
use crate::traits::media_engine::{ForeignHandle, MediaEngine};

/// Queue-depth samples smoothed for diagnostics.
const DEPTH_WINDOW: usize = 30;

/// Host-side consumer of a native video track.
///
/// Wires the engine's frame callback through the token registry into a
/// bounded `FrameQueue`. The application pulls frames at its own cadence
/// with `try_dequeue` and hands storages back via `recycle`.
///
/// Data flow:
/// ```text
/// [engine thread] frame callback → registry resolve → FrameQueue
/// [app thread]    try_dequeue → render → recycle
/// ```
///
/// `close` must be called to detach; the registry holds a strong reference
/// until then.
pub struct VideoTrackSink {
    engine: Arc<dyn MediaEngine>,
    handle: NativeHandle,
    token: Mutex<Option<WrapperToken>>,
    queue: FrameQueue,
    depth_average: Mutex<MovingAverage>,
    callback_count: AtomicU64,
}

impl VideoTrackSink {
    /// Register a frame sink for `track` with the engine.
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
            queue: FrameQueue::new(config.frame_queue_length),
            depth_average: Mutex::new(MovingAverage::new(DEPTH_WINDOW)),
            callback_count: AtomicU64::new(0),
        });

        let token = token_registry::global().register(Arc::clone(&sink));
        *sink.token.lock() = Some(token);
        engine.set_video_sink(track, token, Self::on_native_frame);
        Ok(sink)
    }

    /// Engine-facing trampoline. A stale token degrades to a logged no-op.
    fn on_native_frame(token: WrapperToken, frame: &VideoFrame<'_>) {
        match token_registry::global().resolve::<VideoTrackSink>(token) {
            Ok(sink) => sink.ingest(frame),
            Err(_) => log::trace!("video frame for stale token {}", token.raw()),
        }
    }

    fn ingest(&self, frame: &VideoFrame<'_>) {
        self.callback_count.fetch_add(1, Ordering::Relaxed);
        self.queue.enqueue(frame);
        self.depth_average.lock().push(self.queue.len() as f64);
    }

    /// Pop the oldest pending frame, if any.
    pub fn try_dequeue(&self) -> Option<FrameStorage> {
        self.queue.dequeue()
    }

    /// Return a consumed storage for reuse.
    pub fn recycle(&self, storage: FrameStorage) {
        self.queue.recycle(storage);
    }

    pub fn pending_frames(&self) -> usize {
        self.queue.len()
    }

    /// Smoothed queue depth over the last `DEPTH_WINDOW` callbacks.
    pub fn average_queue_depth(&self) -> f64 {
        self.depth_average.lock().average()
    }

    pub fn diagnostics(&self) -> VideoSinkDiagnostics {
        VideoSinkDiagnostics {
            callback_count: self.callback_count.load(Ordering::Relaxed),
            frames_accepted: self.queue.frames_accepted(),
            frames_dropped: self.queue.frames_dropped(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    /// Detach from the engine and free the native track reference.
    ///
    /// Teardown order matters: the callback is cleared and the token
    /// revoked before the native resource is released, so no in-flight
    /// callback can resolve into a released track. Idempotent.
    pub fn close(&self) {
        let Some(token) = self.token.lock().take() else {
            return;
        };
        if let Ok(track) = self.handle.get() {
            self.engine.clear_video_sink(track);
        }
        token_registry::global().unregister(token);
        self.handle.release();
    }
}
