//! Per-operator strategy configuration: risk sizing, RR targets and the
//! partial-close fractions taken at each target.

use std::collections::HashMap;

/// Allowed deviation of the partial-close fractions from summing to 1.0.
pub const PARTIAL_SUM_TOLERANCE: f64 = 0.01;

/// Risk model for one operator.
///
/// `targets` and `partials` are aligned 1:1: reaching `targets[j]` closes
/// `partials[j]` of the position at that reward multiple. An empty pair of
/// lists is a valid degenerate configuration under which every trade leaves
/// the balance unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub risk_percent: f64,
    pub targets: Vec<f64>,
    pub partials: Vec<f64>,
}

/// Operator name -> strategy.
pub type StrategyBook = HashMap<String, StrategyConfig>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum StrategyError {
    #[error("risk_percent must be positive, got {0}")]
    NonPositiveRisk(f64),

    #[error("targets ({targets}) and partials ({partials}) must have the same length")]
    LengthMismatch { targets: usize, partials: usize },

    #[error("target at index {index} must be positive, got {value}")]
    NonPositiveTarget { index: usize, value: f64 },

    #[error("targets must be strictly ascending (index {index}: {value})")]
    TargetsNotAscending { index: usize, value: f64 },

    #[error("partial at index {index} must be in (0, 1], got {value}")]
    PartialOutOfRange { index: usize, value: f64 },

    #[error("partials must sum to 1.0 (within {tolerance}), got {sum}")]
    PartialSum { sum: f64, tolerance: f64 },

    #[error("empty token in level list")]
    EmptyToken,

    #[error("invalid level value: {0}")]
    InvalidLevel(String),
}

impl StrategyConfig {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.risk_percent <= 0.0 {
            return Err(StrategyError::NonPositiveRisk(self.risk_percent));
        }

        if self.targets.len() != self.partials.len() {
            return Err(StrategyError::LengthMismatch {
                targets: self.targets.len(),
                partials: self.partials.len(),
            });
        }

        let mut prev = 0.0;
        for (index, &value) in self.targets.iter().enumerate() {
            if value <= 0.0 {
                return Err(StrategyError::NonPositiveTarget { index, value });
            }
            if index > 0 && value <= prev {
                return Err(StrategyError::TargetsNotAscending { index, value });
            }
            prev = value;
        }

        for (index, &value) in self.partials.iter().enumerate() {
            if value <= 0.0 || value > 1.0 {
                return Err(StrategyError::PartialOutOfRange { index, value });
            }
        }

        if !self.partials.is_empty() {
            let sum: f64 = self.partials.iter().sum();
            if (sum - 1.0).abs() > PARTIAL_SUM_TOLERANCE {
                return Err(StrategyError::PartialSum {
                    sum,
                    tolerance: PARTIAL_SUM_TOLERANCE,
                });
            }
        }

        Ok(())
    }
}

/// Parse a comma-separated level list such as `1,2,3` or `0.3, 0.3, 0.4`.
///
/// An empty or whitespace-only input is a valid empty list (no targets
/// configured); an empty token between commas is an error.
pub fn parse_levels(input: &str) -> Result<Vec<f64>, StrategyError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut levels = Vec::new();
    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(StrategyError::EmptyToken);
        }
        let value: f64 = trimmed
            .parse()
            .map_err(|_| StrategyError::InvalidLevel(trimmed.to_string()))?;
        levels.push(value);
    }

    Ok(levels)
}
