//! # pivotsql-expr: expressions with known values for pivoted query synthesis
//!
//! This crate builds the predicates of a PQS query:
//!
//! - [`Expression`]: a closed expression tree. Column references carry the
//!   pivot row's value, so every tree can be evaluated without a database.
//! - [`ExpressionGenerator`]: random trees of a requested type, abandoning a
//!   tree as soon as one node's value can no longer be predicted.
//! - [`Rectifier`]: wraps a predicate in `IS TRUE` / `IS FALSE` / `IS NULL`
//!   so that it selects ([`RectifyPolicy::Include`]) or rejects
//!   ([`RectifyPolicy::Exclude`]) the pivot row.
//! - [`Dialect`]: renders expressions and [`Select`] shapes as SQL text.
//!
//! ## Usage
//!
//! ```
//! use pivotsql_expr::{Dialect, ExpressionGenerator, Rectifier, RectifyPolicy, SeededRng};
//! use pivotsql_types::{Column, Constant, DataType, RowValue};
//!
//! let columns = vec![
//!     Column::new("t0", "c0", DataType::Integer),
//!     Column::new("t0", "c1", DataType::Integer),
//! ];
//! let row = RowValue::from_columns(&columns, vec![Constant::Integer(1), Constant::Null])?;
//!
//! let mut rng = SeededRng::new(42);
//! let predicate = ExpressionGenerator::new(&mut rng)
//!     .with_columns(&columns)
//!     .with_row(&row)
//!     .generate_expression_with_expected_result(DataType::Boolean)?;
//!
//! let mut rectifier = Rectifier::new(RectifyPolicy::Include);
//! let rectified = rectifier.rectify(predicate)?;
//! assert_eq!(rectified.evaluate(&row), Some(Constant::Boolean(true)));
//!
//! let sql = Dialect::DuckDb.print_expression(&rectified);
//! assert!(sql.ends_with(")"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod ast;
mod error;
mod eval;
mod generator;
mod printer;
mod rectify;
mod rng;
mod select;


pub use ast::{
    BinaryOperator, ColumnValue, Expression, Function, PostfixOperator, UnaryOperator,
};
pub use error::{GenerationError, RectifyError};
pub use generator::{
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_RETRIES, ExpressionGenerator, generate_constant,
};
pub use printer::Dialect;
pub use rectify::{Rectifier, RectifyPolicy, truth_test};
pub use rng::{Randomness, ScriptedRng, SeededRng};
pub use select::{Direction, OrderingTerm, Select};
