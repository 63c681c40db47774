use lazy_static::lazy_static;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

lazy_static! {
    static ref GLOBAL_COUNTER: Arc<CreationCounter> = Arc::new(CreationCounter::new());
}

/// Monotonic source of property creation order.
///
/// Every successfully constructed property draws one value; models sort
/// their properties by it to keep declaration order. Values start at 1.
#[derive(Debug, Default)]
pub struct CreationCounter {
    last: AtomicU64,
}

impl CreationCounter {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Counter whose next drawn value is `last + 1`.
    pub fn starting_at(last: u64) -> Self {
        Self {
            last: AtomicU64::new(last),
        }
    }

    /// Get the process-wide counter used when none is injected.
    pub fn global() -> &'static Arc<CreationCounter> {
        &GLOBAL_COUNTER
    }

    /// Last value handed out (0 if none yet).
    pub fn current(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }

    pub fn next(&self) -> u64 {
        self.last.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Rewind to zero. Only meant for test isolation.
    pub fn reset(&self) {
        self.last.store(0, Ordering::SeqCst);
    }
}
