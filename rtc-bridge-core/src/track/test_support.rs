//! Scripted in-memory engine for track-tier tests: records every call made
//! against the engine boundary and lets tests fire native callbacks.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::boundary::token_registry::WrapperToken;
use crate::models::channel::DataChannelState;
use crate::models::error::BridgeError;
use crate::models::frame::VideoFrame;
use crate::traits::media_engine::{
    AudioFrameCallback, ChannelBufferingCallback, ChannelMessageCallback, ChannelStateCallback,
    EngineLogCallback, ForeignHandle, MediaEngine, VideoFrameCallback,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Op {
    SetVideoSink,
    ClearVideoSink,
    SetAudioSink,
    ClearAudioSink,
    SetChannelStateSink,
    SetChannelBufferingSink,
    SetChannelMessageSink,
    ClearChannelMessageSink,
    ClearChannelSinks,
    Send(Vec<u8>),
    ChannelClose,
    Release(u64),
}

#[derive(Default)]
pub(crate) struct ScriptedEngine {
    pub ops: Mutex<Vec<Op>>,
    video: Mutex<Option<(WrapperToken, VideoFrameCallback)>>,
    audio: Mutex<Option<(WrapperToken, AudioFrameCallback)>>,
    state_cb: Mutex<Option<(WrapperToken, ChannelStateCallback)>>,
    buffering_cb: Mutex<Option<(WrapperToken, ChannelBufferingCallback)>>,
    message_cb: Mutex<Option<(WrapperToken, ChannelMessageCallback)>>,
    buffered: Mutex<u64>,
}

impl ScriptedEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record(&self, op: Op) {
        self.ops.lock().push(op);
    }

    pub fn fire_video(&self, frame: &VideoFrame<'_>) {
        if let Some((token, callback)) = *self.video.lock() {
            callback(token, frame);
        }
    }

    pub fn fire_audio(&self, samples: &[f32], sample_rate: u32, channels: u16) {
        if let Some((token, callback)) = *self.audio.lock() {
            callback(token, samples, sample_rate, channels);
        }
    }

    pub fn fire_channel_state(&self, state: DataChannelState) {
        if let Some((token, callback)) = *self.state_cb.lock() {
            callback(token, state);
        }
    }

    pub fn fire_buffering(&self, current: u64) {
        *self.buffered.lock() = current;
        if let Some((token, callback)) = *self.buffering_cb.lock() {
            callback(token, current);
        }
    }

    pub fn fire_message(&self, payload: &[u8]) {
        if let Some((token, callback)) = *self.message_cb.lock() {
            callback(token, payload);
        }
    }

    pub fn set_buffered(&self, value: u64) {
        *self.buffered.lock() = value;
    }

    pub fn sends(&self) -> Vec<Vec<u8>> {
        self.ops
            .lock()
            .iter()
            .filter_map(|op| match op {
                Op::Send(payload) => Some(payload.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn has_message_sink(&self) -> bool {
        self.message_cb.lock().is_some()
    }
}

impl MediaEngine for ScriptedEngine {
    fn set_video_sink(&self, _: ForeignHandle, token: WrapperToken, callback: VideoFrameCallback) {
        self.record(Op::SetVideoSink);
        *self.video.lock() = Some((token, callback));
    }

    fn clear_video_sink(&self, _: ForeignHandle) {
        self.record(Op::ClearVideoSink);
        *self.video.lock() = None;
    }

    fn set_audio_sink(&self, _: ForeignHandle, token: WrapperToken, callback: AudioFrameCallback) {
        self.record(Op::SetAudioSink);
        *self.audio.lock() = Some((token, callback));
    }

    fn clear_audio_sink(&self, _: ForeignHandle) {
        self.record(Op::ClearAudioSink);
        *self.audio.lock() = None;
    }

    fn set_channel_state_sink(&self, _: ForeignHandle, token: WrapperToken, callback: ChannelStateCallback) {
        self.record(Op::SetChannelStateSink);
        *self.state_cb.lock() = Some((token, callback));
    }

    fn set_channel_buffering_sink(
        &self,
        _: ForeignHandle,
        token: WrapperToken,
        callback: ChannelBufferingCallback,
    ) {
        self.record(Op::SetChannelBufferingSink);
        *self.buffering_cb.lock() = Some((token, callback));
    }

    fn set_channel_message_sink(
        &self,
        _: ForeignHandle,
        token: WrapperToken,
        callback: ChannelMessageCallback,
    ) {
        self.record(Op::SetChannelMessageSink);
        *self.message_cb.lock() = Some((token, callback));
    }

    fn clear_channel_message_sink(&self, _: ForeignHandle) {
        self.record(Op::ClearChannelMessageSink);
        *self.message_cb.lock() = None;
    }

    fn clear_channel_sinks(&self, _: ForeignHandle) {
        self.record(Op::ClearChannelSinks);
        *self.state_cb.lock() = None;
        *self.buffering_cb.lock() = None;
        *self.message_cb.lock() = None;
    }

    fn channel_send(&self, _: ForeignHandle, payload: &[u8]) -> Result<(), BridgeError> {
        self.record(Op::Send(payload.to_vec()));
        *self.buffered.lock() += payload.len() as u64;
        Ok(())
    }

    fn channel_buffered_amount(&self, _: ForeignHandle) -> u64 {
        *self.buffered.lock()
    }

    fn channel_close(&self, _: ForeignHandle) {
        self.record(Op::ChannelClose);
    }

    fn release(&self, handle: ForeignHandle) {
        self.record(Op::Release(handle.raw()));
    }

    fn set_log_sink(&self, _: EngineLogCallback) {}
}
