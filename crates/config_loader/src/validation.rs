//! Advisory configuration checks for the `validate` command.
//!
//! A configuration that parses is runnable; these checks surface likely
//! operator mistakes as warnings without blocking startup.

use std::collections::HashSet;

use crate::AgentConfig;

/// Check a parsed configuration, returning human-readable warnings.
pub fn validate(config: &AgentConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.collectors.is_empty() {
        warnings.push("no collectors enabled - the agent will produce nothing".to_string());
    }

    if config.handlers.is_empty() {
        warnings.push("no handlers configured - measurements will be discarded".to_string());
    }

    let mut seen = HashSet::new();
    for name in &config.collectors {
        if !seen.insert(name) {
            warnings.push(format!("duplicate collector name '{name}'"));
        }
    }

    if !config.interval.is_null() && contracts::as_int(&config.interval).is_some_and(|i| i <= 0) {
        warnings.push(format!(
            "interval {} is not positive, the default will be used",
            config.interval
        ));
    }

    for name in &config.collectors {
        let path = config.collector_config_path(name);
        if !path.exists() {
            warnings.push(format!(
                "collector '{name}' has no config file at {}",
                path.display()
            ));
        }
    }

    warnings
}
