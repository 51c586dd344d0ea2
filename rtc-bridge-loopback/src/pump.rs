//! Synthetic media pumps.
//!
//! Each pump drives a loopback track from a dedicated thread, standing in
//! for a decoder delivering frames at its own cadence. Rows in the video
//! frames carry stride padding beyond the visible bytes, like real decoder
//! output.

use std::f32::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;

use rtc_bridge_core::models::frame::{FramePlane, VideoFrame};
use rtc_bridge_core::traits::media_engine::ForeignHandle;

use crate::engine::LoopbackEngine;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PumpError {
    #[error("pump already running")]
    AlreadyRunning,

    #[error("failed to spawn pump thread: {0}")]
    Spawn(String),
}

/// Extra bytes per row beyond the visible width.
const STRIDE_PADDING: usize = 16;

/// Pushes synthetic two-plane frames into a loopback video track.
///
/// Frame N has every luma byte set to `N as u8`, so consumers can assert
/// arrival order from the payload alone.
pub struct VideoPump {
    engine: Arc<LoopbackEngine>,
    track: ForeignHandle,
    width: usize,
    height: usize,
    interval: Duration,
    running: Arc<AtomicBool>,
    pump_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl VideoPump {
    pub fn new(
        engine: Arc<LoopbackEngine>,
        track: ForeignHandle,
        width: usize,
        height: usize,
        interval: Duration,
    ) -> Self {
        Self {
            engine,
            track,
            width,
            height,
            interval,
            running: Arc::new(AtomicBool::new(false)),
            pump_handle: Mutex::new(None),
        }
    }

    pub fn start(&self) -> Result<(), PumpError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(PumpError::AlreadyRunning);
        }

        let running = Arc::clone(&self.running);
        let engine = Arc::clone(&self.engine);
        let track = self.track;
        let (width, height, interval) = (self.width, self.height, self.interval);

        let handle = thread::Builder::new()
            .name("loopback-video-pump".into())
            .spawn(move || {
                let mut seq: u64 = 0;
                while running.load(Ordering::SeqCst) {
                    push_frame(&engine, track, width, height, seq as u8);
                    seq += 1;
                    thread::sleep(interval);
                }
            })
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                PumpError::Spawn(e.to_string())
            })?;

        *self.pump_handle.lock() = Some(handle);
        Ok(())
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.pump_handle.lock().take() {
            let _ = handle.join();
        }
    }
}

fn push_frame(engine: &LoopbackEngine, track: ForeignHandle, width: usize, height: usize, fill: u8) {
    let luma_stride = width + STRIDE_PADDING;
    let chroma_rows = height / 2;

    let mut luma = vec![0u8; luma_stride * height];
    for row in luma.chunks_mut(luma_stride) {
        row[..width].fill(fill);
        // Padding bytes stay zero; consumers must never see them.
    }
    let chroma = vec![128u8; luma_stride * chroma_rows];

    let frame = VideoFrame {
        width: width as u32,
        height: height as u32,
        planes: vec![
            FramePlane {
                data: &luma,
                stride: luma_stride,
                row_bytes: width,
                rows: height,
            },
            FramePlane {
                data: &chroma,
                stride: luma_stride,
                row_bytes: width,
                rows: chroma_rows,
            },
        ],
    };
    engine.push_video_frame(track, &frame);
}

/// Pushes a continuous sine tone into a loopback audio track in 10 ms
/// blocks, phase-continuous across blocks.
pub struct AudioPump {
    engine: Arc<LoopbackEngine>,
    track: ForeignHandle,
    sample_rate: u32,
    channels: u16,
    frequency: f32,
    running: Arc<AtomicBool>,
    pump_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl AudioPump {
    pub fn new(
        engine: Arc<LoopbackEngine>,
        track: ForeignHandle,
        sample_rate: u32,
        channels: u16,
        frequency: f32,
    ) -> Self {
        Self {
            engine,
            track,
            sample_rate,
            channels,
            frequency,
            running: Arc::new(AtomicBool::new(false)),
            pump_handle: Mutex::new(None),
        }
    }

    pub fn start(&self) -> Result<(), PumpError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(PumpError::AlreadyRunning);
        }

        let running = Arc::clone(&self.running);
        let engine = Arc::clone(&self.engine);
        let track = self.track;
        let (sample_rate, channels, frequency) = (self.sample_rate, self.channels, self.frequency);

        let handle = thread::Builder::new()
            .name("loopback-audio-pump".into())
            .spawn(move || {
                let block_frames = sample_rate as usize / 100;
                let step = TAU * frequency / sample_rate as f32;
                let mut phase = 0.0f32;
                let mut block = vec![0.0f32; block_frames * channels as usize];

                while running.load(Ordering::SeqCst) {
                    for frame in block.chunks_mut(channels as usize) {
                        let sample = phase.sin();
                        frame.fill(sample);
                        phase = (phase + step) % TAU;
                    }
                    engine.push_audio(track, &block, sample_rate, channels);
                    thread::sleep(Duration::from_millis(10));
                }
            })
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                PumpError::Spawn(e.to_string())
            })?;

        *self.pump_handle.lock() = Some(handle);
        Ok(())
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.pump_handle.lock().take() {
            let _ = handle.join();
        }
    }
}
