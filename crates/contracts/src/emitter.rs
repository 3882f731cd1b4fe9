//! Emitter trait - handler output interface
//!
//! Defines the abstract interface for sink-specific batch emission.

use crate::Measurement;

/// Batch emission trait
///
/// All sink implementations must implement this trait. The buffering/flush
/// engine hands over an atomic snapshot of the buffer; the emitter reports
/// success. On failure the engine logs and drops the batch - any retry or
/// re-buffering policy belongs to the emitter itself.
#[trait_variant::make(Emitter: Send)]
pub trait LocalEmitter {
    /// Emitter name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Emit one flushed batch to the external destination.
    ///
    /// Returns `true` when the batch was delivered.
    async fn emit(&mut self, batch: &[Measurement]) -> bool;
}
