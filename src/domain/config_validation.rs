//! Run configuration validation.
//!
//! Checks every key a backtest run reads before any file is opened.

use crate::domain::error::PhraseTraderError;
use crate::ports::config_port::ConfigPort;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

pub fn validate_run_config(config: &dyn ConfigPort) -> Result<(), PhraseTraderError> {
    validate_strategy_source(config)?;
    validate_data_source(config)?;
    validate_report_output(config)?;
    validate_log_level(config)?;
    Ok(())
}

fn non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .filter(|value| !value.trim().is_empty())
}

fn validate_strategy_source(config: &dyn ConfigPort) -> Result<(), PhraseTraderError> {
    let text = non_empty(config, "strategy", "text");
    let dsl = non_empty(config, "strategy", "dsl");
    match (text, dsl) {
        (Some(_), None) | (None, Some(_)) => Ok(()),
        (None, None) => Err(PhraseTraderError::ConfigMissing {
            section: "strategy".to_string(),
            key: "text".to_string(),
        }),
        (Some(_), Some(_)) => Err(PhraseTraderError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "dsl".to_string(),
            reason: "set either text or dsl, not both".to_string(),
        }),
    }
}

fn validate_data_source(config: &dyn ConfigPort) -> Result<(), PhraseTraderError> {
    let sample = config.get_bool("data", "sample", false);
    let path = non_empty(config, "data", "path");
    match (sample, path) {
        (true, None) | (false, Some(_)) => Ok(()),
        (false, None) => Err(PhraseTraderError::ConfigMissing {
            section: "data".to_string(),
            key: "path".to_string(),
        }),
        (true, Some(_)) => Err(PhraseTraderError::ConfigInvalid {
            section: "data".to_string(),
            key: "sample".to_string(),
            reason: "sample = true cannot be combined with a path".to_string(),
        }),
    }
}

fn validate_report_output(config: &dyn ConfigPort) -> Result<(), PhraseTraderError> {
    match config.get_string("report", "output") {
        Some(path) if path.trim().is_empty() => Err(PhraseTraderError::ConfigInvalid {
            section: "report".to_string(),
            key: "output".to_string(),
            reason: "output path must not be empty".to_string(),
        }),
        _ => Ok(()),
    }
}

fn validate_log_level(config: &dyn ConfigPort) -> Result<(), PhraseTraderError> {
    match config.get_string("logging", "level") {
        Some(level) if !LOG_LEVELS.contains(&level.trim().to_lowercase().as_str()) => {
            Err(PhraseTraderError::ConfigInvalid {
                section: "logging".to_string(),
                key: "level".to_string(),
                reason: format!("expected one of {}", LOG_LEVELS.join(", ")),
            })
        }
        _ => Ok(()),
    }
}
