//! # rtc-bridge-core
//!
//! Host-side bridge over a native real-time media engine.
//!
//! Provides the handle registry and callback plumbing for safe native→host
//! dispatch, bounded frame queueing with storage reuse, pull-based audio
//! buffering with format conversion, and the data channel state machine.
//! Engine backends implement the `MediaEngine` trait; everything about
//! session negotiation and transport stays on their side of the boundary.
//!
//! ## Architecture
//!
//! ```text
//! rtc-bridge-core (this crate)
//! ├── traits/       ← MediaEngine, DataChannelEvents, callback signatures
//! ├── models/       ← BridgeError, BridgeConfiguration, frame types, diagnostics
//! ├── boundary/     ← HandleRegistry, NativeHandle, SubscriberGate
//! ├── processing/   ← FrameQueue, AudioReadBuffer, resampling, MovingAverage
//! ├── track/        ← VideoTrackSink, AudioTrackSink, DataChannel
//! └── logging      ← engine log forwarding into the `log` facade
//! ```

pub mod boundary;
pub mod logging;
pub mod models;
pub mod processing;
pub mod track;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use boundary::native_handle::NativeHandle;
pub use boundary::token_registry::{HandleRegistry, WrapperToken};
pub use models::channel::{BufferingLevel, DataChannelState};
pub use models::config::BridgeConfiguration;
pub use models::diagnostics::{AudioSinkDiagnostics, VideoSinkDiagnostics};
pub use models::error::BridgeError;
pub use models::frame::{FramePlane, FrameStorage, VideoFrame};
pub use processing::audio_read_buffer::{AudioReadBuffer, AudioReadStatus, PadBehavior};
pub use processing::frame_queue::FrameQueue;
pub use processing::moving_average::MovingAverage;
pub use track::audio_sink::AudioTrackSink;
pub use track::data_channel::DataChannel;
pub use track::video_sink::VideoTrackSink;
pub use traits::channel_events::{DataChannelEvents, MessageListener};
pub use traits::media_engine::{EngineLogLevel, ForeignHandle, MediaEngine};
