use thiserror::Error;

/// Errors surfaced by the bridge.
///
/// Capacity-driven events (dropped frames, audio underrun/overrun) are
/// steady-state behavior and are reported as flags or counters, never as
/// variants of this enum.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// A wrapper token did not resolve to a live host object. Reaching this
    /// from a native callback indicates a teardown-ordering defect; callers
    /// at the boundary degrade it to a logged no-op.
    #[error("invalid token")]
    InvalidToken,

    /// Operation attempted on a handle whose native resource was released.
    #[error("resource closed")]
    ResourceClosed,

    /// `send` called while the data channel is not in the `Open` state.
    #[error("channel not open")]
    ChannelNotOpen,

    /// The channel's unsent-byte backlog is at its configured limit.
    #[error("send buffer full")]
    SendBufferFull,

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    /// Failure reported by the native engine itself.
    #[error("engine failure: {0}")]
    EngineFailure(String),
}
