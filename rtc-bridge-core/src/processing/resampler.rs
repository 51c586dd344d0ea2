//! Pure-math sample-rate and channel-layout conversion.
//!
//! All operations work on interleaved `&[f32]` buffers with no platform
//! dependencies. Resampling is linear interpolation, adequate for bridging
//! rate mismatches between the engine's delivery format and a render tick.

/// Downmix interleaved multi-channel audio to mono by averaging channels
/// per frame.
pub fn downmix_to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let frame_count = samples.len() / channels;
    let scale = 1.0 / channels as f32;
    let mut mono = Vec::with_capacity(frame_count);
    for frame in 0..frame_count {
        let mut sum = 0.0f32;
        for ch in 0..channels {
            sum += samples[frame * channels + ch];
        }
        mono.push(sum * scale);
    }
    mono
}

/// Convert interleaved audio between channel layouts.
///
/// Matching layouts pass through. Otherwise the signal goes through mono:
/// multi-channel input is averaged down, then replicated across the
/// requested channel count.
pub fn remix(samples: &[f32], from_channels: u16, to_channels: u16) -> Vec<f32> {
    if from_channels == to_channels || from_channels == 0 || to_channels == 0 {
        return samples.to_vec();
    }
    let mono = downmix_to_mono(samples, from_channels as usize);
    if to_channels == 1 {
        return mono;
    }
    let mut out = Vec::with_capacity(mono.len() * to_channels as usize);
    for sample in mono {
        for _ in 0..to_channels {
            out.push(sample);
        }
    }
    out
}

/// Linear-interpolation resampling of interleaved audio with any channel
/// count. Returns the input unchanged when the rates match.
pub fn resample_interleaved(samples: &[f32], channels: usize, from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() || channels == 0 || from_rate == 0 || to_rate == 0 {
        return samples.to_vec();
    }

    let frame_count = samples.len() / channels;
    let ratio = to_rate as f64 / from_rate as f64;
    let output_frames = (frame_count as f64 * ratio) as usize;
    if output_frames == 0 {
        return Vec::new();
    }

    let mut output = vec![0.0f32; output_frames * channels];
    for i in 0..output_frames {
        let source_index = i as f64 / ratio;
        let index = source_index as usize;
        let fraction = (source_index - index as f64) as f32;

        for ch in 0..channels {
            if index + 1 < frame_count {
                output[i * channels + ch] = samples[index * channels + ch] * (1.0 - fraction)
                    + samples[(index + 1) * channels + ch] * fraction;
            } else if index < frame_count {
                output[i * channels + ch] = samples[index * channels + ch];
            }
        }
    }
    output
}

/// RMS level of samples (0.0–1.0 for normalized audio).
pub fn rms_level(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Peak absolute level of samples.
pub fn peak_level(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn downmix_stereo_averages() {
        let stereo = [0.2, 0.8, 0.4, 0.6];
        let mono = downmix_to_mono(&stereo, 2);
        assert_eq!(mono.len(), 2);
        assert_relative_eq!(mono[0], 0.5, epsilon = 1e-6);
        assert_relative_eq!(mono[1], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn downmix_mono_passthrough() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(downmix_to_mono(&samples, 1), samples);
    }

    #[test]
    fn remix_same_layout_passthrough() {
        let samples = vec![0.1, 0.2, 0.3, 0.4];
        assert_eq!(remix(&samples, 2, 2), samples);
    }

    #[test]
    fn remix_mono_to_stereo_replicates() {
        let out = remix(&[0.5, -0.5], 1, 2);
        assert_eq!(out, vec![0.5, 0.5, -0.5, -0.5]);
    }

    #[test]
    fn remix_stereo_to_mono_averages() {
        let out = remix(&[0.0, 1.0], 2, 1);
        assert_eq!(out.len(), 1);
        assert_relative_eq!(out[0], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn resample_same_rate_is_passthrough() {
        let samples = vec![1.0, 2.0, 3.0];
        assert_eq!(resample_interleaved(&samples, 1, 48000, 48000), samples);
    }

    #[test]
    fn resample_upsample_2x_interpolates() {
        let out = resample_interleaved(&[0.0, 1.0], 1, 24000, 48000);
        assert_eq!(out.len(), 4);
        assert_relative_eq!(out[0], 0.0, epsilon = 1e-2);
        assert_relative_eq!(out[1], 0.5, epsilon = 1e-1);
    }

    #[test]
    fn resample_downsample_halves_frames() {
        let samples: Vec<f32> = (0..100).map(|i| i as f32 / 100.0).collect();
        let out = resample_interleaved(&samples, 1, 48000, 24000);
        assert_eq!(out.len(), 50);
    }

    #[test]
    fn resample_stereo_keeps_interleaving() {
        // Left channel constant 1.0, right constant -1.0.
        let samples = vec![1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0];
        let out = resample_interleaved(&samples, 2, 48000, 24000);
        assert_eq!(out.len(), 4);
        for frame in out.chunks(2) {
            assert_relative_eq!(frame[0], 1.0, epsilon = 1e-6);
            assert_relative_eq!(frame[1], -1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn rms_and_peak() {
        assert_eq!(rms_level(&[0.0, 0.0]), 0.0);
        assert_relative_eq!(rms_level(&[1.0, 1.0, 1.0]), 1.0, epsilon = 1e-6);
        assert_relative_eq!(peak_level(&[0.1, -0.5, 0.3]), 0.5, epsilon = 1e-6);
    }
}
