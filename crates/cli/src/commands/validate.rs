//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    prefix: String,
    interval_secs: u64,
    collector_count: usize,
    handler_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    let config = match config_loader::read_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            return ValidationResult {
                valid: false,
                config_path,
                error: Some(e.to_string()),
                warnings: None,
                summary: None,
            };
        }
    };

    let warnings = config_loader::validate(&config);

    ValidationResult {
        valid: true,
        config_path,
        error: None,
        warnings: (!warnings.is_empty()).then_some(warnings),
        summary: Some(ConfigSummary {
            prefix: config.prefix.clone(),
            interval_secs: config.polling_interval_secs(),
            collector_count: config.collectors.len(),
            handler_count: config.handlers.len(),
        }),
    }
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("Configuration OK: {}", result.config_path);
        if let Some(summary) = &result.summary {
            println!("  prefix:     {:?}", summary.prefix);
            println!("  interval:   {}s", summary.interval_secs);
            println!("  collectors: {}", summary.collector_count);
            println!("  handlers:   {}", summary.handler_count);
        }
        if let Some(warnings) = &result.warnings {
            println!("Warnings:");
            for warning in warnings {
                println!("  - {warning}");
            }
        }
    } else {
        println!("Configuration INVALID: {}", result.config_path);
        if let Some(error) = &result.error {
            println!("  {error}");
        }
    }
}
