//! Leader-gated Mesos master poller
//!
//! Polls the master metrics snapshot endpoint on one node at a time: a tick
//! only fetches when this host is the elected leader, so a cluster of agents
//! produces a single measurement stream.

use std::collections::BTreeMap;
use std::net::UdpSocket;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use contracts::{as_string_list, get_as_int, AgentError, Measurement, Options};

/// Metric name prefix stamped on every snapshot entry.
const METRIC_PREFIX: &str = "mesos.";

/// Snapshot key whose value gates emission.
const ELECTED_KEY: &str = "master/elected";

/// Upper bound on any single request. The effective timeout is clamped
/// strictly below the polling interval so a stalled call never accumulates
/// across ticks.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(9);

/// Resolves this host's externally-visible address.
///
/// Injected at construction so tests substitute behavior without touching
/// shared state.
pub trait HostAddressResolver {
    fn external_address(&self) -> std::io::Result<String>;
}

/// Default resolver: the local address a UDP socket would use to reach an
/// outside host. No packet is sent.
pub struct UdpHostAddressResolver;

impl HostAddressResolver for UdpHostAddressResolver {
    fn external_address(&self) -> std::io::Result<String> {
        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        socket.connect(("8.8.8.8", 80))?;
        Ok(socket.local_addr()?.ip().to_string())
    }
}

/// Leader-gated poller for the Mesos master metrics snapshot.
pub struct MesosCollector {
    name: String,
    interval: Duration,
    request_timeout: Duration,
    nodes: Vec<String>,
    host_address: String,
    outbound: mpsc::Sender<Measurement>,
    client: reqwest::Client,
}

impl MesosCollector {
    /// Create a collector, resolving this host's address through the given
    /// resolver.
    pub fn new(
        name: impl Into<String>,
        outbound: mpsc::Sender<Measurement>,
        interval: Duration,
        resolver: &dyn HostAddressResolver,
    ) -> Result<Self, AgentError> {
        let name = name.into();
        let host_address = resolver
            .external_address()
            .map_err(|e| AgentError::fetch(&name, format!("cannot resolve external address: {e}")))?;
        Self::with_host_address(name, outbound, interval, host_address)
    }

    /// Create a collector with an already-resolved host address.
    pub fn with_host_address(
        name: impl Into<String>,
        outbound: mpsc::Sender<Measurement>,
        interval: Duration,
        host_address: impl Into<String>,
    ) -> Result<Self, AgentError> {
        let name = name.into();
        // The leader redirect must be observed, not followed.
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AgentError::fetch(&name, format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            name,
            request_timeout: request_timeout_for(interval),
            interval,
            nodes: Vec::new(),
            host_address: host_address.into(),
            outbound,
            client,
        })
    }

    /// Candidate master nodes (`host:port`), as configured.
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// The externally-visible address resolved at construction.
    pub fn host_address(&self) -> &str {
        &self.host_address
    }

    /// Effective per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Resolve the current leader by asking each candidate node for its
    /// master redirect; the Location header names the leader.
    async fn resolve_leader(&self) -> Option<String> {
        for node in &self.nodes {
            let url = format!("http://{node}/master/redirect");
            match self
                .client
                .get(&url)
                .timeout(self.request_timeout)
                .send()
                .await
            {
                Ok(response) if response.status().is_redirection() => {
                    let location = response
                        .headers()
                        .get(reqwest::header::LOCATION)
                        .and_then(|v| v.to_str().ok());
                    if let Some(address) = location.and_then(parse_redirect_location) {
                        return Some(address);
                    }
                    warn!(collector = %self.name, node = %node, "redirect without usable Location header");
                }
                Ok(response) => {
                    debug!(
                        collector = %self.name,
                        node = %node,
                        status = %response.status(),
                        "node did not answer with a master redirect"
                    );
                }
                Err(e) => {
                    debug!(collector = %self.name, node = %node, error = %e, "node unreachable");
                }
            }
        }
        None
    }

    /// Fetch and parse the leader's metrics snapshot.
    ///
    /// Transport failures, non-2xx statuses, and unparseable payloads are the
    /// distinguished no-data outcome (`Err`). A parseable payload that is not
    /// from the elected master yields an empty map - valid, not an error.
    async fn fetch_snapshot(&self, leader: &str) -> Result<BTreeMap<String, f64>, AgentError> {
        let url = format!("http://{leader}/metrics/snapshot");
        let response = self
            .client
            .get(&url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| AgentError::fetch(&self.name, e.to_string()))?;

        if !response.status().is_success() {
            return Err(AgentError::fetch(
                &self.name,
                format!("unexpected status {} from {url}", response.status()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AgentError::fetch(&self.name, e.to_string()))?;

        parse_snapshot(&self.name, &body)
    }

    fn build_measurement(&self, name: &str, value: f64) -> Measurement {
        Measurement::observed(format!("{METRIC_PREFIX}{name}"), value)
    }
}

impl contracts::Collector for MesosCollector {
    fn name(&self) -> &str {
        &self.name
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn configure(&mut self, options: &Options) {
        if let Some(value) = options.get("interval") {
            let secs = get_as_int(value, self.interval.as_secs() as i64).max(1);
            self.interval = Duration::from_secs(secs as u64);
            self.request_timeout = request_timeout_for(self.interval);
        }
        if let Some(value) = options.get("mesosNodes") {
            match value {
                serde_json::Value::String(list) => {
                    self.nodes = list
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                other => match as_string_list(other) {
                    Some(nodes) => self.nodes = nodes,
                    None => {
                        warn!(collector = %self.name, value = %other, "mesosNodes is not a node list, keeping previous value");
                    }
                },
            }
        }
    }

    async fn collect(&mut self) -> Result<(), AgentError> {
        let Some(leader) = self.resolve_leader().await else {
            return Err(AgentError::fetch(&self.name, "unable to resolve cluster leader"));
        };

        let leader_host = leader.split(':').next().unwrap_or(&leader);
        if leader_host != self.host_address {
            debug!(
                collector = %self.name,
                leader = %leader,
                host = %self.host_address,
                "not the leader, skipping collection"
            );
            return Ok(());
        }

        let snapshot = self.fetch_snapshot(&leader).await?;
        if snapshot.is_empty() {
            debug!(collector = %self.name, "snapshot not authoritative, nothing to emit");
            return Ok(());
        }

        for (name, value) in snapshot {
            let measurement = self.build_measurement(&name, value);
            if self.outbound.send(measurement).await.is_err() {
                return Err(AgentError::ChannelClosed {
                    collector: self.name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Clamp the request timeout strictly below the polling interval.
fn request_timeout_for(interval: Duration) -> Duration {
    DEFAULT_REQUEST_TIMEOUT
        .min(interval.saturating_sub(Duration::from_secs(1)))
        .max(Duration::from_secs(1))
}

/// Extract `host:port` from a master redirect Location header.
///
/// Accepts the scheme-relative form Mesos emits (`//host:port`) as well as
/// absolute URLs.
fn parse_redirect_location(location: &str) -> Option<String> {
    let rest = location
        .strip_prefix("http://")
        .or_else(|| location.strip_prefix("https://"))
        .or_else(|| location.strip_prefix("//"))
        .unwrap_or(location);
    let address = rest.split('/').next()?.trim();
    if address.is_empty() {
        None
    } else {
        Some(address.to_string())
    }
}

/// Parse a metrics snapshot body into dot-delimited metric names.
fn parse_snapshot(collector: &str, body: &str) -> Result<BTreeMap<String, f64>, AgentError> {
    let raw: std::collections::HashMap<String, f64> = serde_json::from_str(body)
        .map_err(|e| AgentError::payload_parse(collector, e.to_string()))?;

    if raw.get(ELECTED_KEY).copied().unwrap_or(0.0) != 1.0 {
        return Ok(BTreeMap::new());
    }

    Ok(raw
        .into_iter()
        .map(|(k, v)| (k.replace('/', "."), v))
        .collect())
}
