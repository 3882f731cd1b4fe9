//! Collector trait - scheduled measurement producer
//!
//! A collector owns its outbound channel and is driven by a dedicated tick
//! schedule; ticks for different collectors never block each other.

use std::time::Duration;

use crate::{AgentError, Options};

/// Default polling interval in seconds.
pub const DEFAULT_COLLECTION_INTERVAL_SECS: u64 = 10;

/// Measurement producer trait
///
/// All collector implementations must implement this trait. Constructors take
/// the outbound channel sender and any injected collaborators; the runtime
/// only sees this capability surface.
#[trait_variant::make(Collector: Send)]
pub trait LocalCollector {
    /// Collector instance name (used for logging and config lookup)
    fn name(&self) -> &str;

    /// Current tick interval
    fn interval(&self) -> Duration;

    /// Apply declared options, coercing loosely-typed values.
    ///
    /// Unrecognized keys are ignored; bad values fall back to the previous
    /// setting with a warning. Never fails.
    fn configure(&mut self, options: &Options);

    /// Perform one collection tick.
    ///
    /// A gated-out tick (for example: this node is not the cluster leader)
    /// returns `Ok(())` with nothing emitted - that is a valid outcome, not
    /// an error. Transport, parse, and gating-resolution failures return
    /// `Err`; the runtime logs them and proceeds with the next tick.
    async fn collect(&mut self) -> Result<(), AgentError>;
}
