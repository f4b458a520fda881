//! Configuration validation.
//!
//! Validates the `[simulation]` section and each `[strategy.<OPERATOR>]`
//! section before a run; the simulation core never sees raw config values.

use crate::domain::error::TitansimError;
use crate::domain::simulation::MissingStrategyPolicy;
use crate::domain::strategy::{parse_levels, StrategyConfig};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_simulation_config(config: &dyn ConfigPort) -> Result<(), TitansimError> {
    validate_initial_balance(config)?;
    validate_dates(config)?;
    validate_symbol(config)?;
    validate_operators(config)?;
    validate_missing_strategy(config)?;
    Ok(())
}

/// Build and validate the `[strategy.<operator>]` section.
pub fn validate_strategy_section(
    config: &dyn ConfigPort,
    operator: &str,
) -> Result<StrategyConfig, TitansimError> {
    let section = format!("strategy.{}", operator);

    let risk_percent = config.get_double(&section, "risk_percent", 0.0);

    let targets_str =
        config
            .get_string(&section, "targets")
            .ok_or_else(|| TitansimError::ConfigMissing {
                section: section.clone(),
                key: "targets".to_string(),
            })?;
    let partials_str =
        config
            .get_string(&section, "partials")
            .ok_or_else(|| TitansimError::ConfigMissing {
                section: section.clone(),
                key: "partials".to_string(),
            })?;

    let targets = parse_levels(&targets_str).map_err(|e| TitansimError::ConfigInvalid {
        section: section.clone(),
        key: "targets".to_string(),
        reason: e.to_string(),
    })?;
    let partials = parse_levels(&partials_str).map_err(|e| TitansimError::ConfigInvalid {
        section: section.clone(),
        key: "partials".to_string(),
        reason: e.to_string(),
    })?;

    let strategy = StrategyConfig {
        risk_percent,
        targets,
        partials,
    };

    strategy
        .validate()
        .map_err(|e| TitansimError::ConfigInvalid {
            section,
            key: "risk_percent/targets/partials".to_string(),
            reason: e.to_string(),
        })?;

    Ok(strategy)
}

fn validate_initial_balance(config: &dyn ConfigPort) -> Result<(), TitansimError> {
    let value = config.get_double("simulation", "initial_balance", 10_000.0);
    if value <= 0.0 {
        return Err(TitansimError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "initial_balance".to_string(),
            reason: "initial_balance must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), TitansimError> {
    let start_str = config.get_string("simulation", "start_date");
    let end_str = config.get_string("simulation", "end_date");

    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;

    if start_date > end_date {
        return Err(TitansimError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "start_date".to_string(),
            reason: "start_date must not be after end_date".to_string(),
        });
    }
    Ok(())
}

fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, TitansimError> {
    match value {
        None => Err(TitansimError::ConfigMissing {
            section: "simulation".to_string(),
            key: field.to_string(),
        }),
        Some(s) => {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| TitansimError::ConfigInvalid {
                section: "simulation".to_string(),
                key: field.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", field),
            })
        }
    }
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), TitansimError> {
    match config.get_string("simulation", "symbol") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(TitansimError::ConfigMissing {
            section: "simulation".to_string(),
            key: "symbol".to_string(),
        }),
    }
}

fn validate_operators(config: &dyn ConfigPort) -> Result<(), TitansimError> {
    match config.get_string("simulation", "operators") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(TitansimError::ConfigMissing {
            section: "simulation".to_string(),
            key: "operators".to_string(),
        }),
    }
}

fn validate_missing_strategy(config: &dyn ConfigPort) -> Result<(), TitansimError> {
    match config.get_string("simulation", "missing_strategy") {
        None => Ok(()),
        Some(s) => match MissingStrategyPolicy::parse(&s) {
            Some(_) => Ok(()),
            None => Err(TitansimError::ConfigInvalid {
                section: "simulation".to_string(),
                key: "missing_strategy".to_string(),
                reason: format!("expected skip or fail, got {}", s),
            }),
        },
    }
}
