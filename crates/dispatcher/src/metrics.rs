//! Per-handler counters for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Counters for a single handler
#[derive(Debug, Default)]
pub struct HandlerMetrics {
    /// Current inbound queue length
    queue_len: AtomicUsize,
    /// Measurements accepted into the buffer
    received_count: AtomicU64,
    /// Measurements successfully emitted
    emitted_count: AtomicU64,
    /// Completed flushes that delivered a batch
    flush_count: AtomicU64,
    /// Failed emit attempts (batch dropped)
    emit_failure_count: AtomicU64,
    /// Measurements dropped because the inbound queue was full
    dropped_count: AtomicU64,
}

impl HandlerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Ordering::Relaxed)
    }

    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    pub fn received_count(&self) -> u64 {
        self.received_count.load(Ordering::Relaxed)
    }

    pub fn inc_received_count(&self) {
        self.received_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn emitted_count(&self) -> u64 {
        self.emitted_count.load(Ordering::Relaxed)
    }

    pub fn add_emitted_count(&self, n: u64) {
        self.emitted_count.fetch_add(n, Ordering::Relaxed);
    }

    pub fn flush_count(&self) -> u64 {
        self.flush_count.load(Ordering::Relaxed)
    }

    pub fn inc_flush_count(&self) {
        self.flush_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn emit_failure_count(&self) -> u64 {
        self.emit_failure_count.load(Ordering::Relaxed)
    }

    pub fn inc_emit_failure_count(&self) {
        self.emit_failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    pub fn inc_dropped_count(&self) {
        self.dropped_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queue_len: self.queue_len(),
            received_count: self.received_count(),
            emitted_count: self.emitted_count(),
            flush_count: self.flush_count(),
            emit_failure_count: self.emit_failure_count(),
            dropped_count: self.dropped_count(),
        }
    }
}

/// Snapshot of handler counters (for reporting)
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub queue_len: usize,
    pub received_count: u64,
    pub emitted_count: u64,
    pub flush_count: u64,
    pub emit_failure_count: u64,
    pub dropped_count: u64,
}
