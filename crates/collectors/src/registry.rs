//! Maps configured collector names to implementations

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{error, warn};

use contracts::{Collector, Measurement, Options};

use crate::diagnostic::DiagnosticCollector;
use crate::mesos::{MesosCollector, UdpHostAddressResolver};
use crate::runner::CollectorHandle;

/// Construct, configure, and spawn the collector named by a config entry.
///
/// Instance names may carry a suffix after a space (`"Mesos instance2"`);
/// the first token selects the implementation. Unknown types and failed
/// constructions log and return `None` - the agent runs with what it has.
pub fn create_collector(
    instance_name: &str,
    outbound: mpsc::Sender<Measurement>,
    default_interval: Duration,
    options: &Options,
) -> Option<CollectorHandle> {
    let collector_type = instance_name
        .split_whitespace()
        .next()
        .unwrap_or(instance_name);

    match collector_type {
        "Mesos" => {
            match MesosCollector::new(
                instance_name,
                outbound,
                default_interval,
                &UdpHostAddressResolver,
            ) {
                Ok(mut collector) => {
                    collector.configure(options);
                    Some(CollectorHandle::spawn(collector))
                }
                Err(e) => {
                    error!(collector = %instance_name, error = %e, "failed to construct collector");
                    None
                }
            }
        }
        "Diagnostic" => {
            let mut collector = DiagnosticCollector::new(instance_name, outbound, default_interval);
            collector.configure(options);
            Some(CollectorHandle::spawn(collector))
        }
        other => {
            warn!(collector = %other, "unknown collector type, skipping");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_unknown_collector_is_skipped() {
        let (tx, _rx) = mpsc::channel(4);
        assert!(create_collector("NoSuch", tx, Duration::from_secs(10), &Options::new()).is_none());
    }

    #[tokio::test]
    async fn test_diagnostic_collector_spawns_and_emits() {
        let (tx, mut rx) = mpsc::channel(4);
        let options: Options = serde_json::from_value(json!({"interval": 1})).unwrap();
        let handle = create_collector("Diagnostic", tx, Duration::from_secs(10), &options)
            .expect("diagnostic collector should spawn");
        assert_eq!(handle.name(), "Diagnostic");

        let m = rx.recv().await.unwrap();
        assert_eq!(m.name, "DiagnosticMetric");

        handle.abort();
    }

    #[tokio::test]
    async fn test_instance_names_select_by_first_token() {
        let (tx, mut rx) = mpsc::channel(4);
        let handle =
            create_collector("Diagnostic instance2", tx, Duration::from_secs(1), &Options::new())
                .expect("suffixed instance should spawn");
        assert_eq!(handle.name(), "Diagnostic instance2");

        assert!(rx.recv().await.is_some());
        handle.abort();
    }
}
