//! Measurement - the value type carried through the whole pipeline
//!
//! Immutable once constructed: collectors build measurements, the dispatcher
//! and handlers only read them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Name suffixes that force `MetricKind::CumulativeCounter`.
///
/// Everything else defaults to a gauge.
const CUMULATIVE_SUFFIXES: &[&str] = &[
    "_total",
    "_processed",
    "_reregistrations",
    "_removals",
    "_shutdowns",
    "_errors",
];

/// Measurement kind, tagged on the wire as a short string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MetricKind {
    /// Point-in-time value
    #[default]
    #[serde(rename = "gauge")]
    Gauge,
    /// Monotonically increasing counter
    #[serde(rename = "cumcounter")]
    CumulativeCounter,
}

impl MetricKind {
    /// Classify a measurement name.
    ///
    /// Names ending in one of the recognized cumulative suffixes are counters,
    /// everything else is a gauge.
    pub fn for_name(name: &str) -> Self {
        if CUMULATIVE_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            Self::CumulativeCounter
        } else {
            Self::Gauge
        }
    }
}

/// One named, typed, dimensioned numeric observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Metric name
    pub name: String,
    /// Metric kind
    #[serde(rename = "type")]
    pub kind: MetricKind,
    /// Observed value
    pub value: f64,
    /// Key/value dimensions (keys unique, order irrelevant)
    #[serde(default)]
    pub dimensions: HashMap<String, String>,
}

impl Measurement {
    /// Create a measurement with an explicit kind.
    pub fn new(name: impl Into<String>, kind: MetricKind, value: f64) -> Self {
        Self {
            name: name.into(),
            kind,
            value,
            dimensions: HashMap::new(),
        }
    }

    /// Create a gauge.
    pub fn gauge(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, MetricKind::Gauge, value)
    }

    /// Create a measurement whose kind is classified from its name.
    pub fn observed(name: impl Into<String>, value: f64) -> Self {
        let name = name.into();
        let kind = MetricKind::for_name(&name);
        Self::new(name, kind, value)
    }

    /// Add a dimension (construction-time builder).
    pub fn with_dimension(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.dimensions.insert(key.into(), value.into());
        self
    }

    /// Prepend a prefix to the metric name. Empty prefix is a no-op.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        if !prefix.is_empty() {
            self.name = format!("{prefix}{}", self.name);
        }
        self
    }

    /// Merge in default dimensions; the measurement's own keys win.
    pub fn with_default_dimensions(mut self, defaults: &HashMap<String, String>) -> Self {
        for (k, v) in defaults {
            self.dimensions
                .entry(k.clone())
                .or_insert_with(|| v.clone());
        }
        self
    }
}
