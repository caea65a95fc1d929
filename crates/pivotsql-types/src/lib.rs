//! # pivotsql-types: constants and schema model for pivoted query synthesis
//!
//! This crate holds the leaf data model shared by the expression engine and
//! the oracle:
//!
//! - [`Constant`]: a typed SQL value with three-valued boolean semantics
//!   (`TRUE`, `FALSE`, `NULL`) and NULL propagation for comparison, cast and
//!   the boolean combinators.
//! - [`Column`], [`Table`], [`TableSet`], [`Schema`]: an immutable snapshot of
//!   the catalog of the database under test.
//! - [`RowValue`]: one concrete row, keyed by column identity. The pivot row
//!   of an oracle invocation is a `RowValue`.
//!
//! ## Three-valued logic
//!
//! ```
//! use pivotsql_types::Constant;
//!
//! let unknown = Constant::Null;
//! assert_eq!(unknown.and(&Constant::Boolean(false)), Some(Constant::Boolean(false)));
//! assert_eq!(unknown.and(&Constant::Boolean(true)), Some(Constant::Null));
//! assert_eq!(unknown.or(&Constant::Boolean(true)), Some(Constant::Boolean(true)));
//! assert_eq!(Constant::Integer(1).equals(&Constant::Null), Some(Constant::Null));
//! ```

mod constant;
mod error;
mod schema;

pub use constant::Constant;
pub use error::{Result, TypeError};
pub use schema::{Column, DataType, RowValue, Schema, Table, TableSet};
