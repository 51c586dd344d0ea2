use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::models::frame::{FrameStorage, VideoFrame};

/// Bounded push/pull adapter between the engine's frame-arrival cadence and
/// the application's consumption cadence.
///
/// Frames are queued FIFO up to `max_length`; consumed storages return via
/// `recycle` and are reused before anything new is allocated. When both the
/// pool and the queue budget are exhausted, the incoming frame is dropped —
/// never a previously accepted one — so the FIFO order of accepted frames
/// is preserved.
///
/// `enqueue` runs on the engine callback thread, `dequeue`/`recycle` on the
/// application thread; no external locking is required.
pub struct FrameQueue {
    max_length: usize,
    queue: Mutex<VecDeque<FrameStorage>>,
    pool: Mutex<Vec<FrameStorage>>,
    accepted: AtomicU64,
    dropped: AtomicU64,
}

impl FrameQueue {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            queue: Mutex::new(VecDeque::with_capacity(max_length)),
            pool: Mutex::new(Vec::new()),
            accepted: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Copy a frame into storage and queue it.
    ///
    /// Returns whether the frame was accepted. A rejected frame is counted
    /// in `frames_dropped` and is otherwise a no-op.
    pub fn enqueue(&self, frame: &VideoFrame<'_>) -> bool {
        let size = frame.packed_size();
        let Some(mut storage) = self.get_storage(size) else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            log::trace!("frame queue full and pool empty, dropping incoming frame");
            return false;
        };

        storage.copy_from(frame);
        self.queue.lock().push_back(storage);
        self.accepted.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Obtain a storage able to hold `size` bytes.
    ///
    /// Pops from the recycle pool first, growing the popped storage if it
    /// is too small (capacity never shrinks). Allocates fresh storage only
    /// while the queue is under `max_length`; otherwise returns `None`.
    pub fn get_storage(&self, size: usize) -> Option<FrameStorage> {
        if let Some(mut storage) = self.pool.lock().pop() {
            storage.ensure_capacity(size);
            return Some(storage);
        }
        if self.queue.lock().len() >= self.max_length {
            return None;
        }
        Some(FrameStorage::with_capacity(size))
    }

    /// Pop the oldest pending frame, if any.
    pub fn dequeue(&self) -> Option<FrameStorage> {
        self.queue.lock().pop_front()
    }

    /// Return a consumed storage to the pool for reuse.
    pub fn recycle(&self, storage: FrameStorage) {
        self.pool.lock().push(storage);
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn frames_accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub fn frames_dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
