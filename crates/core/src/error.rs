use crate::RewardMode;
use thiserror::Error;

/// Coarse classification used by callers that only need to know whether a
/// character was misconfigured or its formula failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Evaluation,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RewardError {
    #[error("{mode} reward is missing {field}")]
    MissingParameter {
        mode: RewardMode,
        field: &'static str,
    },
    #[error("invalid bounds: min {min} > max {max}")]
    InvalidBounds { min: i64, max: i64 },
    #[error("unknown reward mode '{0}'")]
    UnknownMode(String),
    #[error("formula '{formula}' failed: {source}")]
    Formula {
        formula: String,
        #[source]
        source: FormulaError,
    },
}

impl RewardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingParameter { .. } | Self::InvalidBounds { .. } | Self::UnknownMode(_) => {
                ErrorKind::Configuration
            }
            Self::Formula { .. } => ErrorKind::Evaluation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("formula is empty")]
    Empty,
    #[error("invalid character '{ch}' at offset {offset}")]
    InvalidChar { ch: char, offset: usize },
    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),
    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),
    #[error("malformed rand call: {0}")]
    InvalidRand(String),
    #[error("rand bounds reversed: min {min} > max {max}")]
    RandBounds { min: i64, max: i64 },
    #[error("unexpected token {0}")]
    UnexpectedToken(String),
    #[error("unexpected end of formula")]
    UnexpectedEnd,
    #[error("division by zero")]
    DivisionByZero,
    #[error("formula has {tokens} tokens, limit is {limit}")]
    TooLong { tokens: usize, limit: usize },
    #[error("result {0} is not a finite reward")]
    NonFinite(f64),
}
