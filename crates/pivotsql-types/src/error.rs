//! Error types for the constant and schema model.

use thiserror::Error;

use crate::schema::DataType;

/// Result type for model operations.
pub type Result<T, E = TypeError> = std::result::Result<T, E>;

/// Errors raised while building rows or resolving type names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// The catalog reported a type this engine does not model.
    #[error("unsupported SQL type: {0}")]
    UnsupportedType(String),

    /// A fetched row has a different width than its column list.
    #[error("row has {actual} values but {expected} columns")]
    ArityMismatch { expected: usize, actual: usize },

    /// A fetched value does not fit the declared column type.
    #[error("value {value} is not a valid {data_type} for column {column}")]
    IncompatibleValue {
        column: String,
        data_type: DataType,
        value: String,
    },

    /// The same column was bound twice in one row.
    #[error("column {0} appears more than once in the row")]
    DuplicateColumn(String),
}
