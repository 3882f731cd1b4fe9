//! # Integration Tests
//!
//! End-to-end pipeline tests without any network dependency.
//!
//! Covers:
//! - collector -> dispatcher -> handler data flow
//! - size- and time-triggered flushing under fan-out
//! - config-file-driven wiring

#[cfg(test)]
mod e2e_tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::mpsc;

    use collectors::{CollectorHandle, DiagnosticCollector};
    use contracts::{Emitter, Measurement};
    use dispatcher::{Dispatcher, HandlerConfig, HandlerHandle};

    struct CountingEmitter {
        name: String,
        emitted: Arc<AtomicU64>,
        flushes: Arc<AtomicU64>,
    }

    impl CountingEmitter {
        fn spawn(name: &str, config: HandlerConfig) -> (HandlerHandle, Arc<AtomicU64>, Arc<AtomicU64>) {
            let emitted = Arc::new(AtomicU64::new(0));
            let flushes = Arc::new(AtomicU64::new(0));
            let handle = HandlerHandle::spawn(
                Self {
                    name: name.to_string(),
                    emitted: Arc::clone(&emitted),
                    flushes: Arc::clone(&flushes),
                },
                config,
            );
            (handle, emitted, flushes)
        }
    }

    impl Emitter for CountingEmitter {
        fn name(&self) -> &str {
            &self.name
        }

        async fn emit(&mut self, batch: &[Measurement]) -> bool {
            self.emitted.fetch_add(batch.len() as u64, Ordering::SeqCst);
            self.flushes.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    /// End-to-end: two collectors -> dispatcher -> two handlers.
    ///
    /// Every measurement produced by either collector must reach both
    /// handlers exactly once, with the remainder delivered by the final
    /// flush at shutdown.
    #[tokio::test]
    async fn test_e2e_pipeline_fanout() {
        let config = HandlerConfig {
            interval: Duration::from_millis(50),
            max_buffer_size: 10,
            ..Default::default()
        };
        let (h1, emitted1, _) = CountingEmitter::spawn("first", config.clone());
        let (h2, emitted2, _) = CountingEmitter::spawn("second", config);

        let mut pipeline = Dispatcher::new(vec![h1, h2]);

        let mut collector_handles = Vec::new();
        for name in ["Diagnostic a", "Diagnostic b"] {
            let (tx, rx) = mpsc::channel(1);
            let collector = DiagnosticCollector::new(name, tx, Duration::from_millis(10));
            pipeline.add_source(name, rx);
            collector_handles.push(CollectorHandle::spawn(collector));
        }

        let join = pipeline.spawn();

        // Let both collectors tick a few times, then drain.
        tokio::time::sleep(Duration::from_millis(100)).await;
        for handle in &collector_handles {
            handle.abort();
        }
        join.await.unwrap();

        let first = emitted1.load(Ordering::SeqCst);
        let second = emitted2.load(Ordering::SeqCst);
        assert!(first >= 2, "expected several measurements, got {first}");
        assert_eq!(first, second, "both handlers must see the same stream");
    }

    /// The size trigger flushes long before the timer when the buffer
    /// fills, and the timer flushes a partial buffer on its own.
    #[tokio::test]
    async fn test_e2e_flush_triggers() {
        let (h, emitted, flushes) = CountingEmitter::spawn(
            "triggers",
            HandlerConfig {
                interval: Duration::from_millis(200),
                max_buffer_size: 5,
                ..Default::default()
            },
        );

        let (tx, rx) = mpsc::channel(1);
        let mut pipeline = Dispatcher::new(vec![h]);
        pipeline.add_source("src", rx);
        let join = pipeline.spawn();

        // Fill one full buffer: size-triggered flush, no timer involved yet.
        for i in 0..5 {
            tx.send(Measurement::gauge("m", i as f64)).await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(emitted.load(Ordering::SeqCst), 5);
        assert_eq!(flushes.load(Ordering::SeqCst), 1);

        // Partial buffer: the timer picks it up.
        tx.send(Measurement::gauge("late", 9.0)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(emitted.load(Ordering::SeqCst), 6);

        drop(tx);
        join.await.unwrap();
    }

    /// Config-file-driven wiring: global config + per-collector conf file,
    /// File handler output checked on disk after shutdown.
    #[tokio::test]
    async fn test_e2e_config_driven_wiring() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("measurements.jsonl");

        let mut collector_conf = std::fs::File::create(dir.path().join("Diagnostic.conf")).unwrap();
        write!(collector_conf, r#"{{"metricName": "pipeline.heartbeat"}}"#).unwrap();

        let global = format!(
            r#"{{
                "prefix": "test.",
                "interval": 10,
                "defaultDimensions": {{"application": "olivine"}},
                "collectorsConfigPath": {:?},
                "collectors": ["Diagnostic"],
                "handlers": {{"File": {{"path": {:?}}}}}
            }}"#,
            dir.path().to_str().unwrap(),
            out_path.to_str().unwrap(),
        );
        let global_path = dir.path().join("olivine.conf");
        std::fs::write(&global_path, global).unwrap();

        let config = config_loader::read_config(&global_path).unwrap();
        assert!(config_loader::validate(&config).is_empty());

        let mut pipeline = Dispatcher::new(
            config
                .handlers
                .iter()
                .map(|(name, options)| {
                    dispatcher::create_handler_handle(
                        name,
                        options,
                        &config.prefix,
                        &config.default_dimensions,
                    )
                    .unwrap()
                })
                .collect(),
        );

        let name = &config.collectors[0];
        let options = config.collector_config(name).unwrap();
        let (tx, rx) = mpsc::channel(1);
        let mut collector = DiagnosticCollector::new(name.as_str(), tx, Duration::from_millis(10));
        contracts::Collector::configure(&mut collector, &options);
        pipeline.add_source(name.clone(), rx);
        let collector_handle = CollectorHandle::spawn(collector);

        let join = pipeline.spawn();
        tokio::time::sleep(Duration::from_millis(100)).await;
        collector_handle.abort();
        join.await.unwrap();

        let contents = std::fs::read_to_string(&out_path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert!(!lines.is_empty());

        let first: Measurement = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.name, "test.pipeline.heartbeat");
        assert_eq!(first.dimensions["application"], "olivine");
    }
}
