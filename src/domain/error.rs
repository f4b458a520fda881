//! Domain error types.

use crate::domain::strategy::StrategyError;

/// Top-level error type for titansim.
#[derive(Debug, thiserror::Error)]
pub enum TitansimError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Strategy(#[from] StrategyError),

    #[error("no strategy configured for operator {operator}")]
    MissingStrategy { operator: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TitansimError> for std::process::ExitCode {
    fn from(err: &TitansimError) -> Self {
        let code: u8 = match err {
            TitansimError::Io(_) => 1,
            TitansimError::ConfigParse { .. }
            | TitansimError::ConfigMissing { .. }
            | TitansimError::ConfigInvalid { .. } => 2,
            TitansimError::Data { .. } => 3,
            TitansimError::Strategy(_) | TitansimError::MissingStrategy { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
