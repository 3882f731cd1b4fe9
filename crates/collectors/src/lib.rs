//! # Collectors
//!
//! Measurement producers and their runtime.
//!
//! Responsibilities:
//! - Drive each collector on its own tick schedule (`CollectorHandle`)
//! - Concrete collectors: leader-gated Mesos master poller, diagnostic
//!   heartbeat
//! - Map configured collector names to implementations (`create_collector`)

pub mod diagnostic;
pub mod mesos;
pub mod registry;
pub mod runner;

pub use contracts::{Collector, Measurement};
pub use diagnostic::DiagnosticCollector;
pub use mesos::{HostAddressResolver, MesosCollector, UdpHostAddressResolver};
pub use registry::create_collector;
pub use runner::CollectorHandle;
