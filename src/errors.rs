//! Shared error types used across submodules.

use thiserror::Error;

use crate::bridge::EngineError;
use crate::units::UnitTag;

/// Top-level error type for the crate.
#[derive(Debug, Error)]
pub enum PssfssError {
    /// A unit tag was combined with a non-numeric operand.
    #[error("cannot multiply unit `{unit}` with a non-numeric {operand} operand")]
    TypeMismatch {
        /// Unit involved in the multiplication.
        unit: UnitTag,
        /// Kind of the rejected operand.
        operand: &'static str,
    },
    /// The foreign engine signalled a failure; the message is forwarded verbatim.
    #[error("foreign call `{operation}` failed: {message}")]
    ForeignCall {
        /// Boundary operation that failed.
        operation: String,
        /// Error text reported by the engine.
        message: String,
    },
    /// The foreign runtime could not be started or resolved.
    #[error("foreign runtime initialisation failed: {0}")]
    Initialization(String),
    /// Pipe, framing or child-process failure while talking to the engine.
    #[error(transparent)]
    Transport(EngineError),
    /// A foreign value did not have the shape required by the host projection.
    #[error("unexpected foreign value: expected {expected}, found {found}")]
    UnexpectedValue {
        /// Description of the expected shape.
        expected: &'static str,
        /// Description of what arrived.
        found: String,
    },
    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PssfssError {
    /// Maps an engine error raised during `operation` into the crate taxonomy.
    pub(crate) fn from_engine(operation: impl Into<String>, err: EngineError) -> Self {
        match err {
            EngineError::Foreign(message) => Self::ForeignCall {
                operation: operation.into(),
                message,
            },
            other => Self::Transport(other),
        }
    }

    pub(crate) fn unexpected(expected: &'static str, found: impl Into<String>) -> Self {
        Self::UnexpectedValue {
            expected,
            found: found.into(),
        }
    }
}

/// Convenience alias for results produced by this crate.
pub type Result<T, E = PssfssError> = std::result::Result<T, E>;
