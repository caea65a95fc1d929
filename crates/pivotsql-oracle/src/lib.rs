//! # Pivoted Query Synthesis oracles
//!
//! This crate runs PQS against a live SQL engine: pick one row of the
//! database (the pivot), generate a predicate whose value for that row is
//! known, rectify it so the row must be selected (positive oracle) or must
//! be rejected (negative oracle), and ask the engine whether it agrees.
//!
//! ## Architecture
//!
//! The [`Connection`] trait is the only way the oracle talks to an engine.
//! Implementations include:
//!
//! - **[`DuckDbConnection`]**: an embedded DuckDB database (in memory or on
//!   disk).
//!
//! Around it:
//!
//! - [`introspect`] and [`SchemaProvider`]: catalog snapshot, table choice
//!   and pivot-row fetch.
//! - [`DatabaseGenerator`]: random `CREATE TABLE` / `INSERT` population.
//! - [`ExpectedErrors`]: engine errors that are benign for a random query.
//! - [`PivotedQuerySynthesis`]: one oracle invocation per
//!   [`check`](PivotedQuerySynthesis::check), returning an [`OracleOutcome`].
//! - [`Finding`]: everything needed to reproduce a detected logic bug.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pivotsql_expr::SeededRng;
//! use pivotsql_oracle::{
//!     DatabaseGenerator, DuckDbConnection, ExpectedErrors, OracleOutcome, PivotPolicy,
//!     PivotedQuerySynthesis, PqsOptions, PopulateOptions, introspect,
//! };
//!
//! let mut conn = DuckDbConnection::open_in_memory()?;
//! let mut rng = SeededRng::new(42);
//! DatabaseGenerator::new(&mut rng, PopulateOptions::default()).populate(&mut conn)?;
//!
//! let schema = introspect(&mut conn)?;
//! let errors = ExpectedErrors::duckdb();
//! let oracle = PivotedQuerySynthesis::new(&schema, &errors, PivotPolicy::Positive, PqsOptions::default());
//!
//! if let OracleOutcome::Finding(finding) = oracle.check(&mut conn, &mut rng) {
//!     eprintln!("{finding}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## References
//!
//! - "Testing Database Engines via Pivoted Query Synthesis" (Rigger & Su, OSDI 2020)

use pivotsql_types::{Constant, TypeError};

pub mod duckdb;
mod errors;
mod populate;
mod pqs;
mod report;
mod schema;


pub use self::duckdb::DuckDbConnection;
pub use errors::ExpectedErrors;
pub use populate::{DatabaseGenerator, PopulateOptions};
pub use pqs::{
    OracleOutcome, PivotContext, PivotPolicy, PivotedQuerySynthesis, PqsOptions, SkipReason,
    containment_query,
};
pub use report::Finding;
pub use schema::{SchemaProvider, introspect, pivot_row_query};

// ============================================================================
// Connection Trait
// ============================================================================

/// A live connection to the engine under test.
///
/// The oracle only ever runs one statement at a time on a connection and
/// never manages its lifecycle.
pub trait Connection {
    /// Runs a statement that returns rows.
    fn query(&mut self, sql: &str) -> Result<QueryResult, OracleError>;

    /// Runs a statement that returns nothing (DDL, DML).
    fn execute(&mut self, sql: &str) -> Result<(), OracleError>;

    /// Returns the name of the engine (for logging).
    fn name(&self) -> &'static str;
}

/// Rows returned by [`Connection::query`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    /// Column names; empty when the result has no rows.
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Constant>>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

// ============================================================================
// Oracle Error Types
// ============================================================================

/// Errors that can occur while talking to the engine.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// The engine rejected the statement before running it (parse or bind).
    #[error("SQL syntax error: {0}")]
    SyntaxError(String),

    /// Statement execution failed.
    #[error("Runtime error: {0}")]
    RuntimeError(String),

    /// The engine returned a value the oracle does not model.
    #[error("Unsupported value: {0}")]
    Unsupported(String),

    /// A query that must return a row returned none.
    #[error("query returned no rows: {0}")]
    EmptyResult(String),

    /// Fetched data does not fit the schema snapshot.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// Internal error (bug in the connection or catalog handling).
    #[error("Internal error: {0}")]
    Internal(String),
}
