//! In-process loopback engine.
//!
//! Implements the `MediaEngine` boundary entirely in memory: tracks and
//! channels are plain table entries, and test code drives the native side
//! by pushing frames, samples, messages, and state transitions directly.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use rtc_bridge_core::models::channel::DataChannelState;
use rtc_bridge_core::models::error::BridgeError;
use rtc_bridge_core::models::frame::VideoFrame;
use rtc_bridge_core::traits::media_engine::{
    AudioFrameCallback, ChannelBufferingCallback, ChannelMessageCallback, ChannelStateCallback,
    EngineLogCallback, EngineLogLevel, ForeignHandle, MediaEngine, VideoFrameCallback,
};
use rtc_bridge_core::WrapperToken;

#[derive(Default)]
struct Sinks {
    video: Option<(WrapperToken, VideoFrameCallback)>,
    audio: Option<(WrapperToken, AudioFrameCallback)>,
    state: Option<(WrapperToken, ChannelStateCallback)>,
    buffering: Option<(WrapperToken, ChannelBufferingCallback)>,
    message: Option<(WrapperToken, ChannelMessageCallback)>,
}

#[derive(Default)]
struct Resource {
    sinks: Sinks,
    /// Channels only: whether sends are currently accepted.
    open: bool,
    /// Channels only: unsent-byte backlog.
    buffered: u64,
    sent: Vec<Vec<u8>>,
}

/// Loopback backend: every handle this engine mints refers to an in-memory
/// table entry rather than a real decoder or transport.
///
/// Callbacks are always invoked with the resource table unlocked, matching
/// a real engine firing from its own worker threads.
pub struct LoopbackEngine {
    resources: Mutex<HashMap<u64, Resource>>,
    next_handle: AtomicU64,
    log_sink: Mutex<Option<EngineLogCallback>>,
    released: Mutex<Vec<u64>>,
}

impl LoopbackEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            resources: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
            log_sink: Mutex::new(None),
            released: Mutex::new(Vec::new()),
        })
    }

    fn mint(&self) -> ForeignHandle {
        let raw = self.next_handle.fetch_add(1, Ordering::Relaxed);
        self.resources.lock().insert(raw, Resource::default());
        ForeignHandle::new(raw)
    }

    /// Allocate a media track handle.
    pub fn create_track(&self) -> ForeignHandle {
        self.mint()
    }

    /// Allocate a data channel handle, initially in `Connecting`.
    pub fn create_channel(&self) -> ForeignHandle {
        self.mint()
    }

    /// Deliver a decoded frame to the track's registered sink, if any.
    pub fn push_video_frame(&self, track: ForeignHandle, frame: &VideoFrame<'_>) {
        let sink = self
            .resources
            .lock()
            .get(&track.raw())
            .and_then(|r| r.sinks.video);
        if let Some((token, callback)) = sink {
            callback(token, frame);
        }
    }

    /// Deliver interleaved samples to the track's registered sink, if any.
    pub fn push_audio(&self, track: ForeignHandle, samples: &[f32], sample_rate: u32, channels: u16) {
        let sink = self
            .resources
            .lock()
            .get(&track.raw())
            .and_then(|r| r.sinks.audio);
        if let Some((token, callback)) = sink {
            callback(token, samples, sample_rate, channels);
        }
    }

    /// Move a channel to `Open` and notify its state sink.
    pub fn open_channel(&self, channel: ForeignHandle) {
        self.advance_channel(channel, DataChannelState::Open);
    }

    /// Drive a channel state transition from the native side.
    pub fn advance_channel(&self, channel: ForeignHandle, state: DataChannelState) {
        let sink = {
            let mut resources = self.resources.lock();
            let Some(resource) = resources.get_mut(&channel.raw()) else {
                return;
            };
            resource.open = state.is_open();
            resource.sinks.state
        };
        if let Some((token, callback)) = sink {
            callback(token, state);
        }
    }

    /// Deliver an incoming message to the channel's message sink, if any.
    pub fn receive_message(&self, channel: ForeignHandle, payload: &[u8]) {
        let sink = self
            .resources
            .lock()
            .get(&channel.raw())
            .and_then(|r| r.sinks.message);
        if let Some((token, callback)) = sink {
            callback(token, payload);
        }
    }

    /// Simulate the transport draining `bytes` from the send buffer and
    /// notify the buffering sink with the new backlog.
    pub fn drain_channel(&self, channel: ForeignHandle, bytes: u64) {
        let notify = {
            let mut resources = self.resources.lock();
            let Some(resource) = resources.get_mut(&channel.raw()) else {
                return;
            };
            resource.buffered = resource.buffered.saturating_sub(bytes);
            resource.sinks.buffering.map(|sink| (sink, resource.buffered))
        };
        if let Some(((token, callback), buffered)) = notify {
            callback(token, buffered);
        }
    }

    /// Payloads accepted by `channel_send` for a channel, in order.
    pub fn sent_payloads(&self, channel: ForeignHandle) -> Vec<Vec<u8>> {
        self.resources
            .lock()
            .get(&channel.raw())
            .map(|r| r.sent.clone())
            .unwrap_or_default()
    }

    /// Raw handle values freed via `release`, in order.
    pub fn released_handles(&self) -> Vec<u64> {
        self.released.lock().clone()
    }

    /// Emit a log line through the registered log sink.
    pub fn emit_log(&self, level: EngineLogLevel, message: &str) {
        if let Some(callback) = *self.log_sink.lock() {
            callback(level, message);
        }
    }

    fn with_resource(&self, handle: ForeignHandle, apply: impl FnOnce(&mut Resource)) {
        let mut resources = self.resources.lock();
        match resources.get_mut(&handle.raw()) {
            Some(resource) => apply(resource),
            None => log::warn!("loopback: call against unknown handle {}", handle.raw()),
        }
    }
}

impl MediaEngine for LoopbackEngine {
    fn set_video_sink(&self, track: ForeignHandle, token: WrapperToken, callback: VideoFrameCallback) {
        self.with_resource(track, |r| r.sinks.video = Some((token, callback)));
    }

    fn clear_video_sink(&self, track: ForeignHandle) {
        self.with_resource(track, |r| r.sinks.video = None);
    }

    fn set_audio_sink(&self, track: ForeignHandle, token: WrapperToken, callback: AudioFrameCallback) {
        self.with_resource(track, |r| r.sinks.audio = Some((token, callback)));
    }

    fn clear_audio_sink(&self, track: ForeignHandle) {
        self.with_resource(track, |r| r.sinks.audio = None);
    }

    fn set_channel_state_sink(
        &self,
        channel: ForeignHandle,
        token: WrapperToken,
        callback: ChannelStateCallback,
    ) {
        self.with_resource(channel, |r| r.sinks.state = Some((token, callback)));
    }

    fn set_channel_buffering_sink(
        &self,
        channel: ForeignHandle,
        token: WrapperToken,
        callback: ChannelBufferingCallback,
    ) {
        self.with_resource(channel, |r| r.sinks.buffering = Some((token, callback)));
    }

    fn set_channel_message_sink(
        &self,
        channel: ForeignHandle,
        token: WrapperToken,
        callback: ChannelMessageCallback,
    ) {
        self.with_resource(channel, |r| r.sinks.message = Some((token, callback)));
    }

    fn clear_channel_message_sink(&self, channel: ForeignHandle) {
        self.with_resource(channel, |r| r.sinks.message = None);
    }

    fn clear_channel_sinks(&self, channel: ForeignHandle) {
        self.with_resource(channel, |r| {
            r.sinks.state = None;
            r.sinks.buffering = None;
            r.sinks.message = None;
        });
    }

    fn channel_send(&self, channel: ForeignHandle, payload: &[u8]) -> Result<(), BridgeError> {
        let notify = {
            let mut resources = self.resources.lock();
            let resource = resources
                .get_mut(&channel.raw())
                .ok_or(BridgeError::ResourceClosed)?;
            if !resource.open {
                return Err(BridgeError::ChannelNotOpen);
            }
            resource.sent.push(payload.to_vec());
            resource.buffered += payload.len() as u64;
            resource.sinks.buffering.map(|sink| (sink, resource.buffered))
        };
        if let Some(((token, callback), buffered)) = notify {
            callback(token, buffered);
        }
        Ok(())
    }

    fn channel_buffered_amount(&self, channel: ForeignHandle) -> u64 {
        self.resources
            .lock()
            .get(&channel.raw())
            .map(|r| r.buffered)
            .unwrap_or(0)
    }

    fn channel_close(&self, channel: ForeignHandle) {
        self.advance_channel(channel, DataChannelState::Closing);
        self.advance_channel(channel, DataChannelState::Closed);
    }

    fn release(&self, handle: ForeignHandle) {
        self.resources.lock().remove(&handle.raw());
        self.released.lock().push(handle.raw());
    }

    fn set_log_sink(&self, callback: EngineLogCallback) {
        *self.log_sink.lock() = Some(callback);
    }
}
