use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::models::error::BridgeError;
use crate::traits::media_engine::{ForeignHandle, MediaEngine};

/// Owning wrapper around one native resource.
///
/// `release` is idempotent; the first call frees the resource on the engine
/// side, later calls are no-ops. Owners that also hold a wrapper token must
/// revoke the token before releasing, so no callback can reach the resource
/// mid-teardown through a token that still resolves.
pub struct NativeHandle {
    engine: Arc<dyn MediaEngine>,
    raw: ForeignHandle,
    closed: AtomicBool,
}

impl NativeHandle {
    pub fn new(engine: Arc<dyn MediaEngine>, raw: ForeignHandle) -> Self {
        Self {
            engine,
            raw,
            closed: AtomicBool::new(false),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// The underlying handle, or `ResourceClosed` after release.
    pub fn get(&self) -> Result<ForeignHandle, BridgeError> {
        if self.is_closed() {
            return Err(BridgeError::ResourceClosed);
        }
        Ok(self.raw)
    }

    /// Free the native resource. Safe to call more than once.
    pub fn release(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.engine.release(self.raw);
    }
}

impl Drop for NativeHandle {
    fn drop(&mut self) {
        self.release();
    }
}
