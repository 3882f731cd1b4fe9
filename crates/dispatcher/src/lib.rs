//! # Dispatcher
//!
//! Measurement routing and delivery.
//!
//! Responsibilities:
//! - Fan-in from every collector's outbound channel
//! - Fan-out to every handler's bounded queue
//! - Per-handler buffering with size/time flush triggers
//! - Isolate a slow handler so it never blocks the others

pub mod dispatcher;
pub mod handle;
pub mod metrics;
pub mod sinks;

pub use contracts::{Emitter, Measurement};
pub use dispatcher::{create_handler_handle, Dispatcher};
pub use handle::{HandlerConfig, HandlerHandle};
pub use metrics::{HandlerMetrics, MetricsSnapshot};
pub use sinks::{DebugEmitter, FileEmitter};
