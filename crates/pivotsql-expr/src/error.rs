//! Generation and rectification errors.

use pivotsql_types::{Constant, DataType};
use thiserror::Error;

/// The generator could not produce an expression with a known value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Every attempt hit a node whose value could not be predicted.
    #[error("could not synthesize a {data_type} expression with a known value after {attempts} attempts")]
    RetriesExhausted { data_type: DataType, attempts: usize },
}

/// The rectifier was handed an expression it cannot wrap.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RectifyError {
    /// Truth tests only apply to boolean expressions.
    #[error("cannot rectify a {0} expression")]
    NotBoolean(DataType),

    /// The expected value of the expression is unknown.
    #[error("expected value of the predicate is unknown")]
    UnknownValue,

    /// The expected value is not a truth value.
    #[error("expected value {0} is not a truth value")]
    NotTruthValue(Constant),
}
