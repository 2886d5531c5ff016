//! Error types for till-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TillError {
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Unknown anchor: {0}")]
    InvalidAnchor(String),
}

pub type Result<T> = std::result::Result<T, TillError>;
