//! CollectorHandle - drives a collector on a dedicated tick schedule

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error};

use contracts::Collector;

/// Handle to a running collector task
pub struct CollectorHandle {
    name: String,
    join_handle: JoinHandle<()>,
}

impl CollectorHandle {
    /// Spawn the tick loop for a configured collector.
    ///
    /// The task runs for the lifetime of the process; `abort` exists for
    /// shutdown and tests.
    pub fn spawn<C: Collector + Send + 'static>(collector: C) -> Self {
        let name = collector.name().to_string();
        let join_handle = tokio::spawn(run_loop(collector));
        Self { name, join_handle }
    }

    /// Collector instance name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stop the tick loop.
    pub fn abort(&self) {
        self.join_handle.abort();
    }
}

/// Tick loop for one collector.
///
/// Ticks are strictly sequential: the next tick is not processed until the
/// previous `collect` call returns, so a collector blocked on a saturated
/// downstream simply delays its own schedule. Errors are absorbed here -
/// a failed tick is logged and the next one proceeds normally.
async fn run_loop<C: Collector>(mut collector: C) {
    let mut ticker = tokio::time::interval(collector.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    debug!(
        collector = %collector.name(),
        interval = ?collector.interval(),
        "collector started"
    );

    loop {
        ticker.tick().await;
        if let Err(e) = collector.collect().await {
            error!(collector = %collector.name(), error = %e, "collection tick failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use contracts::{AgentError, Measurement, Options};
    use tokio::sync::mpsc;

    struct CountingCollector {
        name: String,
        outbound: mpsc::Sender<Measurement>,
        fail_every_other: bool,
        ticks: u64,
    }

    impl Collector for CountingCollector {
        fn name(&self) -> &str {
            &self.name
        }

        fn interval(&self) -> Duration {
            Duration::from_millis(10)
        }

        fn configure(&mut self, _options: &Options) {}

        async fn collect(&mut self) -> Result<(), AgentError> {
            self.ticks += 1;
            if self.fail_every_other && self.ticks % 2 == 0 {
                return Err(AgentError::fetch(&self.name, "transient failure"));
            }
            self.outbound
                .send(Measurement::gauge("tick", self.ticks as f64))
                .await
                .map_err(|_| AgentError::ChannelClosed {
                    collector: self.name.clone(),
                })
        }
    }

    #[tokio::test]
    async fn test_ticks_emit_measurements() {
        let (tx, mut rx) = mpsc::channel(16);
        let handle = CollectorHandle::spawn(CountingCollector {
            name: "counting".to_string(),
            outbound: tx,
            fail_every_other: false,
            ticks: 0,
        });

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.value, 1.0);
        assert_eq!(second.value, 2.0);

        handle.abort();
    }

    #[tokio::test]
    async fn test_failed_tick_does_not_stop_the_loop() {
        let (tx, mut rx) = mpsc::channel(16);
        let handle = CollectorHandle::spawn(CountingCollector {
            name: "flaky".to_string(),
            outbound: tx,
            fail_every_other: true,
            ticks: 0,
        });

        // Ticks 2 and 4 fail; 1, 3 and 5 still arrive.
        assert_eq!(rx.recv().await.unwrap().value, 1.0);
        assert_eq!(rx.recv().await.unwrap().value, 3.0);
        assert_eq!(rx.recv().await.unwrap().value, 5.0);

        handle.abort();
    }
}
