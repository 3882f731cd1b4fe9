//! Layered error definitions
//!
//! Categorized by source: config / collection / sink. Collection and sink
//! errors are soft - absorbed and logged by the component that detected them.
//! Config errors are fatal at startup load time.

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum AgentError {
    // ===== Configuration Errors =====
    /// Configuration file read error
    #[error("config read error for '{path}': {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ===== Collection Errors =====
    /// Data fetch error (transport failure, timeout, non-2xx response)
    #[error("collector '{collector}' fetch error: {message}")]
    Fetch { collector: String, message: String },

    /// Source payload could not be parsed
    #[error("collector '{collector}' payload parse error: {message}")]
    PayloadParse { collector: String, message: String },

    /// Outbound channel closed - the pipeline is shutting down
    #[error("collector '{collector}' outbound channel closed")]
    ChannelClosed { collector: String },

    // ===== Sink Errors =====
    /// Emitter creation error
    #[error("failed to create emitter '{name}': {message}")]
    EmitterCreation { name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgentError {
    /// Create a configuration read error
    pub fn config_read(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::ConfigRead {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create a fetch error
    pub fn fetch(collector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            collector: collector.into(),
            message: message.into(),
        }
    }

    /// Create a payload parse error
    pub fn payload_parse(collector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PayloadParse {
            collector: collector.into(),
            message: message.into(),
        }
    }

    /// Create an emitter creation error
    pub fn emitter_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EmitterCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
