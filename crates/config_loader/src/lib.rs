//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse the global agent configuration (JSON)
//! - Locate and parse per-collector configuration files
//! - Interpolate environment variables before parsing
//!
//! Unreadable files and malformed JSON are fatal at load time; everything
//! downstream of a successful parse is coerced softly.

mod interpolate;
mod validation;

pub use interpolate::interpolate_env;
pub use validation::validate;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use contracts::{AgentError, Options, DEFAULT_COLLECTION_INTERVAL_SECS};

/// Global agent configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentConfig {
    /// Prefix prepended to every metric name at the handlers
    pub prefix: String,
    /// Default polling interval in seconds (number or numeric string)
    pub interval: Value,
    /// Directory holding one `<name>.conf` file per collector instance
    pub collectors_config_path: PathBuf,
    /// Enabled collector instance names
    pub collectors: Vec<String>,
    /// Dimensions attached to every measurement unless it sets its own
    pub default_dimensions: HashMap<String, String>,
    /// Handler name -> handler-specific option object
    pub handlers: HashMap<String, Options>,
}

impl AgentConfig {
    /// Default polling interval, coerced from the loosely-typed field.
    pub fn polling_interval_secs(&self) -> u64 {
        if self.interval.is_null() {
            return DEFAULT_COLLECTION_INTERVAL_SECS;
        }
        contracts::get_as_int(&self.interval, DEFAULT_COLLECTION_INTERVAL_SECS as i64).max(1) as u64
    }

    /// Path of the configuration file for a named collector instance.
    ///
    /// Instance names may carry spaces to run several instances of one
    /// collector type; their files replace the spaces with underscores.
    pub fn collector_config_path(&self, name: &str) -> PathBuf {
        self.collectors_config_path
            .join(format!("{}.conf", name.replace(' ', "_")))
    }

    /// Read and parse the configuration file for a named collector instance.
    pub fn collector_config(&self, name: &str) -> Result<Options, AgentError> {
        read_collector_config(&self.collector_config_path(name))
    }
}

/// Read the global agent configuration file.
pub fn read_config(path: &Path) -> Result<AgentConfig, AgentError> {
    info!(path = %path.display(), "reading configuration file");
    let contents = read_interpolated(path)?;
    serde_json::from_str(&contents).map_err(|e| AgentError::ConfigParse {
        message: format!("invalid JSON in {}: {e}", path.display()),
        source: Some(Box::new(e)),
    })
}

/// Read a per-collector configuration file.
pub fn read_collector_config(path: &Path) -> Result<Options, AgentError> {
    info!(path = %path.display(), "reading collector configuration file");
    let contents = read_interpolated(path)?;
    serde_json::from_str(&contents).map_err(|e| AgentError::ConfigParse {
        message: format!("invalid JSON in {}: {e}", path.display()),
        source: Some(Box::new(e)),
    })
}

fn read_interpolated(path: &Path) -> Result<String, AgentError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| AgentError::config_read(path.display().to_string(), e))?;
    Ok(interpolate_env(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const GOOD_CONFIGURATION: &str = r#"{
        "prefix": "test.",
        "interval": 10,
        "defaultDimensions": {
            "application": "olivine",
            "host": "dev33-devc"
        },
        "collectorsConfigPath": "/tmp",
        "collectors": ["Mesos", "Diagnostic"],
        "handlers": {
            "Debug": {},
            "File": {
                "path": "/tmp/measurements.jsonl",
                "interval": 10,
                "max_buffer_size": "100"
            }
        }
    }"#;

    const BAD_CONFIGURATION: &str = r#"{
        "prefix": "test.",
        malformed JSON File {123!!!!
    }"#;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_parse_good_config() {
        let f = write_temp(GOOD_CONFIGURATION);
        let config = read_config(f.path()).unwrap();

        assert_eq!(config.prefix, "test.");
        assert_eq!(config.polling_interval_secs(), 10);
        assert_eq!(config.collectors, vec!["Mesos", "Diagnostic"]);
        assert_eq!(config.default_dimensions["host"], "dev33-devc");
        assert!(config.handlers.contains_key("Debug"));
        assert_eq!(config.handlers["File"]["max_buffer_size"], "100");
    }

    #[test]
    fn test_parse_bad_config() {
        let f = write_temp(BAD_CONFIGURATION);
        assert!(read_config(f.path()).is_err());
    }

    #[test]
    fn test_missing_config_is_fatal() {
        let err = read_config(Path::new("/nonexistent/olivine.conf")).unwrap_err();
        assert!(matches!(err, AgentError::ConfigRead { .. }));
    }

    #[test]
    fn test_interval_defaults_when_absent() {
        let f = write_temp(r#"{"prefix": "p."}"#);
        let config = read_config(f.path()).unwrap();
        assert_eq!(config.polling_interval_secs(), 10);
    }

    #[test]
    fn test_interval_coerced_from_string() {
        let f = write_temp(r#"{"interval": "15"}"#);
        let config = read_config(f.path()).unwrap();
        assert_eq!(config.polling_interval_secs(), 15);
    }

    #[test]
    fn test_collector_config_path_replaces_spaces() {
        let config = AgentConfig {
            collectors_config_path: PathBuf::from("/etc/olivine"),
            ..Default::default()
        };
        assert_eq!(
            config.collector_config_path("Mesos instance2"),
            PathBuf::from("/etc/olivine/Mesos_instance2.conf")
        );
    }

    #[test]
    fn test_parse_collector_config_with_interpolation() {
        std::env::set_var("OLIVINE_TEST_COLLECTOR_INTERVAL", "10");
        let f = write_temp(
            r#"{
                "metricName": "TestMetric",
                "interval": %%OLIVINE_TEST_COLLECTOR_INTERVAL%%
            }"#,
        );

        let options = read_collector_config(f.path()).unwrap();
        assert_eq!(options["interval"], 10);
        assert_eq!(options["metricName"], "TestMetric");
    }
}
