use crate::boundary::token_registry::WrapperToken;
use crate::models::channel::DataChannelState;
use crate::models::error::BridgeError;
use crate::models::frame::VideoFrame;

/// Opaque identifier for a resource owned by the native engine.
///
/// Exactly one `NativeHandle` claims a given value; it is invalid after
/// `release` and must not be used again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForeignHandle(u64);

impl ForeignHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Severity of a log line emitted by the native engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineLogLevel {
    Error,
    Warning,
    Info,
    Verbose,
}

// Callback ABI: the engine invokes plain fixed-signature functions, passing
// back the wrapper token verbatim. Callbacks carry no closure state; the
// target host object is recovered by resolving the token in the registry.
// All of them may fire on engine worker threads, concurrently with
// application threads.

/// Fires once per decoded video frame. The frame borrow is valid only for
/// the duration of the call.
pub type VideoFrameCallback = fn(WrapperToken, &VideoFrame<'_>);

/// Fires with interleaved f32 samples, their sample rate and channel count.
pub type AudioFrameCallback = fn(WrapperToken, &[f32], u32, u16);

/// Fires for every channel state transition, in native-issue order.
pub type ChannelStateCallback = fn(WrapperToken, DataChannelState);

/// Fires when a complete message arrives on a channel.
pub type ChannelMessageCallback = fn(WrapperToken, &[u8]);

/// Fires when the channel's unsent-byte backlog changes.
pub type ChannelBufferingCallback = fn(WrapperToken, u64);

/// Fires for each log line the engine emits.
pub type EngineLogCallback = fn(EngineLogLevel, &str);

/// The narrow interface this crate consumes from a native real-time media
/// engine. Session negotiation, transport security, and congestion control
/// live entirely behind this boundary.
///
/// Backends implement this the way a native library exposes its C ABI:
/// registration calls are fire-and-forget, queries are
/// non-blocking, and `channel_send` only enqueues into the engine's own
/// send buffer for asynchronous drain.
pub trait MediaEngine: Send + Sync {
    /// Register the frame callback for a video track. Replaces any
    /// previous registration.
    fn set_video_sink(&self, track: ForeignHandle, token: WrapperToken, callback: VideoFrameCallback);

    fn clear_video_sink(&self, track: ForeignHandle);

    /// Register the sample callback for an audio track.
    fn set_audio_sink(&self, track: ForeignHandle, token: WrapperToken, callback: AudioFrameCallback);

    fn clear_audio_sink(&self, track: ForeignHandle);

    fn set_channel_state_sink(
        &self,
        channel: ForeignHandle,
        token: WrapperToken,
        callback: ChannelStateCallback,
    );

    fn set_channel_buffering_sink(
        &self,
        channel: ForeignHandle,
        token: WrapperToken,
        callback: ChannelBufferingCallback,
    );

    /// Register the message callback for a channel. Registered lazily on
    /// the first message listener and cleared when the last one leaves.
    fn set_channel_message_sink(
        &self,
        channel: ForeignHandle,
        token: WrapperToken,
        callback: ChannelMessageCallback,
    );

    fn clear_channel_message_sink(&self, channel: ForeignHandle);

    /// Remove all callbacks registered for a channel.
    fn clear_channel_sinks(&self, channel: ForeignHandle);

    /// Enqueue a payload into the engine's send buffer.
    fn channel_send(&self, channel: ForeignHandle, payload: &[u8]) -> Result<(), BridgeError>;

    /// Current unsent-byte backlog of a channel.
    fn channel_buffered_amount(&self, channel: ForeignHandle) -> u64;

    /// Ask the engine to start closing a channel.
    fn channel_close(&self, channel: ForeignHandle);

    /// Free a native resource. The handle is invalid afterwards.
    fn release(&self, handle: ForeignHandle);

    /// Register the process-wide log forwarder.
    fn set_log_sink(&self, callback: EngineLogCallback);
}
