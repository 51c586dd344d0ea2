use std::f32::consts::PI;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::processing::resampler;
use crate::processing::sample_ring::SampleRing;

/// How `read` fills the unfilled tail when the buffer underruns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PadBehavior {
    /// Short read: the tail is left untouched and `filled` reports the
    /// actual sample count.
    DoNotPad,
    /// Pad with silence.
    PadWithZero,
    /// Pad with an audible 440 Hz marker. Debug aid only, never a
    /// production default.
    PadWithSine,
}

/// Result of one `read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AudioReadStatus {
    /// Samples actually produced from buffered data (before padding).
    pub filled: usize,
    /// The buffered data ran out before the output was full.
    pub underrun: bool,
    /// Arrival outran capacity at some point since the previous read.
    pub overrun: bool,
}

struct RingState {
    ring: SampleRing,
    sample_rate: u32,
    channels: u16,
    overrun_since_read: bool,
    sine_phase: f32,
}

/// Adapter between network-driven sample arrival and a fixed-cadence pull.
///
/// Arriving sample frames accumulate in a ring sized for `capacity_secs` of
/// audio in the native format; the oldest samples are overwritten when
/// arrival outruns consumption. `read` converts from the native format to
/// the requested rate and channel layout, oldest data first.
///
/// `push` runs on the engine callback thread, `read` on the application's
/// render tick; both are non-blocking.
pub struct AudioReadBuffer {
    capacity_secs: f64,
    pad: PadBehavior,
    inner: Mutex<RingState>,
}

impl AudioReadBuffer {
    pub fn new(capacity_secs: f64, pad: PadBehavior) -> Self {
        Self {
            capacity_secs,
            pad,
            inner: Mutex::new(RingState {
                ring: SampleRing::new(0),
                sample_rate: 0,
                channels: 0,
                overrun_since_read: false,
                sine_phase: 0.0,
            }),
        }
    }

    /// Append interleaved samples in the engine's native format.
    ///
    /// A change of rate or channel count discards buffered data and
    /// re-sizes the ring for the new format.
    pub fn push(&self, samples: &[f32], sample_rate: u32, channels: u16) {
        if sample_rate == 0 || channels == 0 {
            log::warn!("ignoring audio push with degenerate format {}Hz x{}", sample_rate, channels);
            return;
        }

        let mut state = self.inner.lock();
        if state.sample_rate != sample_rate || state.channels != channels {
            let capacity = (self.capacity_secs * sample_rate as f64) as usize * channels as usize;
            state.ring.reset_with_capacity(capacity.max(channels as usize));
            state.sample_rate = sample_rate;
            state.channels = channels;
            log::debug!("audio ring reformatted: {} Hz, {} channels", sample_rate, channels);
        }
        if state.ring.write(samples) > 0 {
            state.overrun_since_read = true;
        }
    }

    /// Fill `out` with samples at the requested rate and channel layout,
    /// oldest buffered data first.
    ///
    /// On underrun the tail is padded per the configured `PadBehavior`.
    /// The returned status also reports whether an overrun occurred since
    /// the previous read.
    pub fn read(&self, sample_rate: u32, channels: u16, out: &mut [f32]) -> AudioReadStatus {
        let mut state = self.inner.lock();
        let overrun = std::mem::take(&mut state.overrun_since_read);

        if out.is_empty() || channels == 0 || sample_rate == 0 {
            return AudioReadStatus {
                filled: 0,
                underrun: false,
                overrun,
            };
        }

        let out_samples = out.len() - out.len() % channels as usize;
        let out_frames = out_samples / channels as usize;

        let converted: Vec<f32> = if state.sample_rate == 0 {
            Vec::new()
        } else if state.sample_rate == sample_rate && state.channels == channels {
            state.ring.read(out_samples)
        } else {
            // Rounding up covers interpolation exactly; consuming more would
            // discard native samples between reads.
            let native_frames = (out_frames as f64 * state.sample_rate as f64 / sample_rate as f64)
                .ceil() as usize;
            let native_rate = state.sample_rate;
            let native_channels = state.channels;
            let native = state.ring.read(native_frames * native_channels as usize);
            let remixed = resampler::remix(&native, native_channels, channels);
            resampler::resample_interleaved(&remixed, channels as usize, native_rate, sample_rate)
        };

        let mut filled = converted.len().min(out_samples);
        filled -= filled % channels as usize;
        out[..filled].copy_from_slice(&converted[..filled]);

        let underrun = filled < out.len();
        if underrun {
            let pad = self.pad;
            Self::pad_tail(&mut state, pad, sample_rate, channels, &mut out[filled..]);
        }

        AudioReadStatus {
            filled,
            underrun,
            overrun,
        }
    }

    /// Interleaved samples currently buffered, in the native format.
    pub fn buffered_samples(&self) -> usize {
        self.inner.lock().ring.count()
    }

    /// Native format as (sample_rate, channels); zeros before the first push.
    pub fn native_format(&self) -> (u32, u16) {
        let state = self.inner.lock();
        (state.sample_rate, state.channels)
    }

    pub fn pad_behavior(&self) -> PadBehavior {
        self.pad
    }

    fn pad_tail(state: &mut RingState, pad: PadBehavior, sample_rate: u32, channels: u16, tail: &mut [f32]) {
        match pad {
            PadBehavior::DoNotPad => {}
            PadBehavior::PadWithZero => tail.fill(0.0),
            PadBehavior::PadWithSine => {
                let step = 2.0 * PI * 440.0 / sample_rate as f32;
                for frame in tail.chunks_mut(channels as usize) {
                    let value = state.sine_phase.sin() * 0.3;
                    frame.fill(value);
                    state.sine_phase = (state.sine_phase + step) % (2.0 * PI);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn underrun_pads_with_zero_and_reports_actual_count() {
        let buffer = AudioReadBuffer::new(1.0, PadBehavior::PadWithZero);
        let samples: Vec<f32> = (0..40).map(|i| (i + 1) as f32 / 100.0).collect();
        buffer.push(&samples, 48_000, 1);

        let mut out = [7.0f32; 100];
        let status = buffer.read(48_000, 1, &mut out);

        assert_eq!(status.filled, 40);
        assert!(status.underrun);
        assert!(!status.overrun);
        assert_eq!(&out[..40], &samples[..]);
        assert!(out[40..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn do_not_pad_leaves_tail_untouched() {
        let buffer = AudioReadBuffer::new(1.0, PadBehavior::DoNotPad);
        buffer.push(&[0.5; 10], 48_000, 1);

        let mut out = [7.0f32; 20];
        let status = buffer.read(48_000, 1, &mut out);

        assert_eq!(status.filled, 10);
        assert!(status.underrun);
        assert!(out[10..].iter().all(|&s| s == 7.0));
    }

    #[test]
    fn sine_padding_is_audible() {
        let buffer = AudioReadBuffer::new(1.0, PadBehavior::PadWithSine);
        buffer.push(&[0.5; 4], 48_000, 1);

        let mut out = [0.0f32; 200];
        let status = buffer.read(48_000, 1, &mut out);

        assert!(status.underrun);
        let pad_rms = resampler::rms_level(&out[status.filled..]);
        assert!(pad_rms > 0.05, "sine marker should carry energy, rms = {pad_rms}");
    }

    #[test]
    fn full_read_reports_no_underrun() {
        let buffer = AudioReadBuffer::new(1.0, PadBehavior::PadWithZero);
        buffer.push(&[0.25; 200], 48_000, 2);

        let mut out = [0.0f32; 100];
        let status = buffer.read(48_000, 2, &mut out);

        assert_eq!(status.filled, 100);
        assert!(!status.underrun);
        assert!(out.iter().all(|&s| s == 0.25));
        assert_eq!(buffer.buffered_samples(), 100);
    }

    #[test]
    fn overrun_flag_set_once_then_cleared() {
        // 1 ms at 1 kHz mono = 1-sample capacity is degenerate; use a ring
        // holding 10 samples instead.
        let buffer = AudioReadBuffer::new(0.01, PadBehavior::PadWithZero);
        buffer.push(&[0.1; 8], 1_000, 1); // capacity 10
        buffer.push(&[0.2; 8], 1_000, 1); // overwrites oldest

        let mut out = [0.0f32; 4];
        let status = buffer.read(1_000, 1, &mut out);
        assert!(status.overrun);

        let status = buffer.read(1_000, 1, &mut out);
        assert!(!status.overrun);
    }

    #[test]
    fn oldest_samples_survive_overrun() {
        let buffer = AudioReadBuffer::new(0.01, PadBehavior::DoNotPad);
        buffer.push(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0], 1_000, 1);
        buffer.push(&[11.0, 12.0], 1_000, 1); // 1.0, 2.0 overwritten

        let mut out = [0.0f32; 3];
        buffer.read(1_000, 1, &mut out);
        assert_eq!(out, [3.0, 4.0, 5.0]);
    }

    #[test]
    fn resamples_to_requested_rate() {
        let buffer = AudioReadBuffer::new(1.0, PadBehavior::PadWithZero);
        let samples = [0.5f32; 24];
        buffer.push(&samples, 24_000, 1);

        let mut out = [0.0f32; 40];
        let status = buffer.read(48_000, 1, &mut out);

        assert_eq!(status.filled, 40);
        assert!(!status.underrun);
        for &s in &out {
            assert_relative_eq!(s, 0.5, epsilon = 1e-4);
        }
    }

    #[test]
    fn sequential_downsampled_reads_are_gapless() {
        let buffer = AudioReadBuffer::new(1.0, PadBehavior::DoNotPad);
        // Ramp 0..400 at 48 kHz; at 24 kHz each output sample lands on an
        // even-indexed native sample.
        let ramp: Vec<f32> = (0..400).map(|i| i as f32).collect();
        buffer.push(&ramp, 48_000, 1);

        let mut first = [0.0f32; 10];
        let mut second = [0.0f32; 10];
        assert_eq!(buffer.read(24_000, 1, &mut first).filled, 10);
        assert_eq!(buffer.read(24_000, 1, &mut second).filled, 10);

        // The second read picks up exactly where the first stopped; no
        // native samples are skipped between reads.
        for (i, &s) in first.iter().enumerate() {
            assert_relative_eq!(s, (2 * i) as f32, epsilon = 1e-4);
        }
        for (i, &s) in second.iter().enumerate() {
            assert_relative_eq!(s, (20 + 2 * i) as f32, epsilon = 1e-4);
        }
    }

    #[test]
    fn remixes_stereo_to_mono() {
        let buffer = AudioReadBuffer::new(1.0, PadBehavior::PadWithZero);
        // Interleaved stereo: L=0.0, R=1.0 for each frame.
        let mut samples = Vec::new();
        for _ in 0..50 {
            samples.push(0.0);
            samples.push(1.0);
        }
        buffer.push(&samples, 48_000, 2);

        let mut out = [0.0f32; 20];
        let status = buffer.read(48_000, 1, &mut out);

        assert_eq!(status.filled, 20);
        for &s in &out {
            assert_relative_eq!(s, 0.5, epsilon = 1e-6);
        }
    }

    #[test]
    fn format_change_discards_old_data() {
        let buffer = AudioReadBuffer::new(1.0, PadBehavior::DoNotPad);
        buffer.push(&[0.9; 100], 48_000, 1);
        buffer.push(&[0.1; 10], 16_000, 1);

        assert_eq!(buffer.native_format(), (16_000, 1));
        assert_eq!(buffer.buffered_samples(), 10);

        let mut out = [0.0f32; 10];
        let status = buffer.read(16_000, 1, &mut out);
        assert_eq!(status.filled, 10);
        assert!(out.iter().all(|&s| (s - 0.1).abs() < 1e-6));
    }

    #[test]
    fn read_before_any_push_underruns() {
        let buffer = AudioReadBuffer::new(1.0, PadBehavior::PadWithZero);
        let mut out = [5.0f32; 8];
        let status = buffer.read(48_000, 2, &mut out);

        assert_eq!(status.filled, 0);
        assert!(status.underrun);
        assert!(out.iter().all(|&s| s == 0.0));
    }
}
