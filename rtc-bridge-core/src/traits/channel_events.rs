use std::sync::Arc;

use crate::models::channel::{BufferingLevel, DataChannelState};

/// Event delegate for data channel notifications.
///
/// Methods are called from engine worker threads, in native-issue order.
/// Handlers must not call back into the channel's API synchronously; there
/// is no reentrancy guarantee.
pub trait DataChannelEvents: Send + Sync {
    /// Called after the channel state has been updated; `state()` already
    /// reflects `state` when this fires.
    fn on_state_changed(&self, state: DataChannelState);

    /// Called when the unsent-byte backlog changes.
    fn on_buffering_changed(&self, level: BufferingLevel);
}

/// Listener for complete incoming messages.
pub type MessageListener = Arc<dyn Fn(&[u8]) + Send + Sync>;
