//! # rtc-bridge-loopback
//!
//! In-process loopback backend for rtc-bridge.
//!
//! Provides:
//! - `LoopbackEngine` — an in-memory `MediaEngine` where tracks and channels
//!   are table entries and tests drive the native side directly
//! - `VideoPump` / `AudioPump` — threads that feed a loopback track with
//!   synthetic frames and samples at a decoder-like cadence
//!
//! ## Usage
//! ```ignore
//! use rtc_bridge_core::{BridgeConfiguration, VideoTrackSink, MediaEngine};
//! use rtc_bridge_loopback::LoopbackEngine;
//!
//! let engine = LoopbackEngine::new();
//! let track = engine.create_track();
//! let sink = VideoTrackSink::attach(engine.clone(), track, &BridgeConfiguration::default())?;
//! ```

pub mod engine;
pub mod pump;

pub use engine::LoopbackEngine;
pub use pump::{AudioPump, PumpError, VideoPump};
