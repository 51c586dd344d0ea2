use serde::{Deserialize, Serialize};

use crate::processing::audio_read_buffer::PadBehavior;

/// Configuration for bridge track sinks and data channels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfiguration {
    /// Maximum number of video frames held pending delivery (default: 10).
    pub frame_queue_length: usize,

    /// Duration of audio retained between pulls, in seconds (default: 1.0).
    /// Older samples are overwritten when arrival outruns consumption.
    pub audio_buffer_secs: f64,

    /// How audio reads pad the output when the buffer underruns
    /// (default: silence).
    pub pad_behavior: PadBehavior,

    /// Maximum unsent-byte backlog per data channel before `send` fails
    /// with `SendBufferFull` (default: 16 MiB).
    pub send_buffer_limit: u64,
}

impl BridgeConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.frame_queue_length == 0 {
            return Err("frame queue length must be at least 1".into());
        }
        if self.audio_buffer_secs <= 0.0 {
            return Err("audio buffer duration must be positive".into());
        }
        if self.send_buffer_limit == 0 {
            return Err("send buffer limit must be positive".into());
        }
        Ok(())
    }
}

impl Default for BridgeConfiguration {
    fn default() -> Self {
        Self {
            frame_queue_length: 10,
            audio_buffer_secs: 1.0,
            pad_behavior: PadBehavior::PadWithZero,
            send_buffer_limit: 16 * 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(BridgeConfiguration::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_queue_length() {
        let config = BridgeConfiguration {
            frame_queue_length: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_nonpositive_audio_duration() {
        let config = BridgeConfiguration {
            audio_buffer_secs: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_send_limit() {
        let config = BridgeConfiguration {
            send_buffer_limit: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
