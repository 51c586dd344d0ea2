use serde::{Deserialize, Serialize};

/// Counters for debugging a video track sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSinkDiagnostics {
    /// Native frame callbacks observed.
    pub callback_count: u64,
    /// Frames copied into storage and queued.
    pub frames_accepted: u64,
    /// Frames dropped because queue and pool were exhausted.
    pub frames_dropped: u64,
}

/// Counters for debugging an audio track sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioSinkDiagnostics {
    /// Native sample-frame callbacks observed.
    pub callback_count: u64,
    /// Interleaved samples pushed in total.
    pub samples_total: u64,
    /// Reads that reported an overrun since the previous read.
    pub overruns: u64,
    /// Reads that could not be filled entirely from buffered data.
    pub underruns: u64,
}
