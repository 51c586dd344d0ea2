//! Forwards the native engine's log stream into the `log` facade.

use std::sync::Arc;

use crate::traits::media_engine::{EngineLogLevel, MediaEngine};

/// Engine log lines are reported under this target so applications can
/// filter them separately from the wrapper's own logging.
const ENGINE_TARGET: &str = "rtc_bridge::engine";

fn emit(level: EngineLogLevel, message: &str) {
    match level {
        EngineLogLevel::Error => log::error!(target: ENGINE_TARGET, "{message}"),
        EngineLogLevel::Warning => log::warn!(target: ENGINE_TARGET, "{message}"),
        EngineLogLevel::Info => log::info!(target: ENGINE_TARGET, "{message}"),
        EngineLogLevel::Verbose => log::trace!(target: ENGINE_TARGET, "{message}"),
    }
}

/// Install the process-wide log forwarder on `engine`.
///
/// Call once after constructing the engine; later calls replace the sink,
/// which is harmless since the forwarder is stateless.
pub fn forward_engine_logs(engine: &Arc<dyn MediaEngine>) {
    engine.set_log_sink(emit);
}
