use serde::{Deserialize, Serialize};

/// Data channel connection lifecycle.
///
/// Transitions are monotonic:
/// ```text
/// connecting → open → closing → closed
/// connecting → closing → closed   (closed before negotiation completed)
/// ```
/// The state never regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataChannelState {
    Connecting,
    Open,
    Closing,
    Closed,
}

impl DataChannelState {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }

    fn ordinal(&self) -> u8 {
        match self {
            Self::Connecting => 0,
            Self::Open => 1,
            Self::Closing => 2,
            Self::Closed => 3,
        }
    }

    /// Whether moving to `next` is a legal forward transition.
    pub fn can_transition_to(&self, next: DataChannelState) -> bool {
        next.ordinal() > self.ordinal()
    }
}

/// Snapshot of a channel's unsent-payload backlog, in bytes.
///
/// Delivered with every buffering notification so the application can
/// throttle sends before hitting `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferingLevel {
    pub previous: u64,
    pub current: u64,
    pub limit: u64,
}
