//! Pivoted Query Synthesis orchestrator.
//!
//! One invocation of [`PivotedQuerySynthesis::check`]:
//!
//! 1. picks a random set of non-empty tables and fetches one row of their
//!    cross product (the pivot row),
//! 2. projects every column under its `<table><column>` alias,
//! 3. generates a boolean predicate whose value on the pivot row is known and
//!    rectifies it, so the row must be selected (positive) or rejected
//!    (negative),
//! 4. adds clauses that cannot change containment (`DISTINCT`, `GROUP BY` on
//!    every column, an unbounded `LIMIT`, `OFFSET 0`, `ORDER BY`),
//! 5. runs the query, then a containment check derived from it.
//!
//! A containment check that returns no rows contradicts the rectifier's
//! guarantee and is reported as a [`Finding`]. Engine errors are classified
//! through [`ExpectedErrors`].

use std::fmt::{self, Display};

use pivotsql_expr::{
    Dialect, Expression, ExpressionGenerator, Randomness, Rectifier, RectifyPolicy, Select,
};
use pivotsql_types::{Column, Constant, DataType, RowValue, Schema, TableSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace, warn};

use crate::errors::ExpectedErrors;
use crate::report::Finding;
use crate::schema::SchemaProvider;
use crate::{Connection, OracleError};

/// A `LIMIT` that never drops a row of a generated query.
const UNBOUNDED_LIMIT: i64 = 2_147_483_647;

// ============================================================================
// Policy and options
// ============================================================================

/// Which containment the oracle asserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PivotPolicy {
    /// The pivot row must be in the result.
    Positive,
    /// The pivot row must not be in the result.
    Negative,
}

impl PivotPolicy {
    pub const ALL: [PivotPolicy; 2] = [PivotPolicy::Positive, PivotPolicy::Negative];

    /// Rectification that establishes this policy's guarantee.
    pub fn rectify_policy(self) -> RectifyPolicy {
        match self {
            PivotPolicy::Positive => RectifyPolicy::Include,
            PivotPolicy::Negative => RectifyPolicy::Exclude,
        }
    }
}

impl Display for PivotPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PivotPolicy::Positive => f.write_str("positive"),
            PivotPolicy::Negative => f.write_str("negative"),
        }
    }
}

/// Tuning for one oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PqsOptions {
    pub dialect: Dialect,
    pub max_depth: usize,
    pub max_retries: usize,
    /// Seed recorded on findings so a run can be replayed.
    pub seed: Option<u64>,
}

impl Default for PqsOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::DuckDb,
            max_depth: pivotsql_expr::DEFAULT_MAX_DEPTH,
            max_retries: pivotsql_expr::DEFAULT_MAX_RETRIES,
            seed: None,
        }
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// Why an invocation did not reach verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Every table is empty.
    NoTables,
    /// The pivot row could not be fetched (the snapshot is stale).
    PivotUnavailable,
    /// No predicate with a known value was found within the retry budget.
    NoPredicate,
    /// The engine raised an error from the expected list.
    ExpectedError(String),
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoTables => f.write_str("no non-empty tables"),
            SkipReason::PivotUnavailable => f.write_str("pivot row unavailable"),
            SkipReason::NoPredicate => f.write_str("no predicate with a known value"),
            SkipReason::ExpectedError(message) => write!(f, "expected error: {message}"),
        }
    }
}

/// Result of one oracle invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleOutcome {
    /// The engine honoured the containment guarantee.
    Passed { query: String },
    Skipped(SkipReason),
    /// The engine raised an error outside the expected list.
    UnexpectedError { query: String, error: String },
    /// The engine contradicted the containment guarantee.
    Finding(Box<Finding>),
}

impl OracleOutcome {
    pub fn is_finding(&self) -> bool {
        matches!(self, OracleOutcome::Finding(_))
    }
}

// ============================================================================
// Per-invocation context
// ============================================================================

/// Everything one invocation decided before touching the engine again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotContext {
    pub tables: TableSet,
    pub pivot_row: RowValue,
    /// Projected columns, each carrying its fetch alias.
    pub fetch_columns: Vec<Column>,
    pub rectified_predicates: Vec<Expression>,
    pub select: Select,
}

// ============================================================================
// Oracle
// ============================================================================

/// Positive or negative PQS over one schema snapshot.
#[derive(Debug, Clone)]
pub struct PivotedQuerySynthesis<'a> {
    schema: &'a Schema,
    errors: &'a ExpectedErrors,
    policy: PivotPolicy,
    options: PqsOptions,
}

impl<'a> PivotedQuerySynthesis<'a> {
    pub fn new(
        schema: &'a Schema,
        errors: &'a ExpectedErrors,
        policy: PivotPolicy,
        options: PqsOptions,
    ) -> Self {
        Self {
            schema,
            errors,
            policy,
            options,
        }
    }

    pub fn policy(&self) -> PivotPolicy {
        self.policy
    }

    /// Runs one invocation. Never panics on engine behaviour and never fails:
    /// every path ends in an [`OracleOutcome`].
    pub fn check<C: Connection, R: Randomness>(&self, conn: &mut C, rng: &mut R) -> OracleOutcome {
        let context = match self.prepare(conn, rng) {
            Ok(context) => context,
            Err(outcome) => return outcome,
        };

        let query = self.options.dialect.print_select(&context.select);
        debug!(policy = %self.policy, %query, "running pivot query");
        if let Err(e) = conn.query(&query) {
            return self.classify(query, &e);
        }

        let check = containment_query(
            self.policy,
            &query,
            &context.fetch_columns,
            &context.pivot_row,
        );
        trace!(%check, "running containment check");
        match conn.query(&check) {
            Err(e) => self.classify(check, &e),
            Ok(result) if result.is_empty() => {
                let finding = Finding::new(
                    self.policy,
                    conn.name(),
                    self.options.seed,
                    query,
                    check,
                    &context,
                    self.options.dialect,
                );
                error!(
                    policy = %self.policy,
                    query = %finding.query,
                    "containment check returned no rows"
                );
                OracleOutcome::Finding(Box::new(finding))
            }
            Ok(_) => OracleOutcome::Passed { query },
        }
    }

    /// Steps up to the query shape. Only the pivot-row fetch touches `conn`.
    pub fn prepare<C: Connection, R: Randomness>(
        &self,
        conn: &mut C,
        rng: &mut R,
    ) -> Result<PivotContext, OracleOutcome> {
        let Some(tables) = self.schema.pick_tables(rng) else {
            debug!("no non-empty tables");
            return Err(OracleOutcome::Skipped(SkipReason::NoTables));
        };

        let pivot_row = match self.schema.fetch_random_row(&tables, conn, rng) {
            Ok(row) => row,
            Err(OracleError::EmptyResult(query)) => {
                debug!(%query, "pivot row unavailable");
                return Err(OracleOutcome::Skipped(SkipReason::PivotUnavailable));
            }
            Err(e) => {
                let what = format!("pivot row fetch from {}", tables.table_names().join(", "));
                return Err(self.classify(what, &e));
            }
        };

        let columns = tables.columns();
        let fetch_columns: Vec<Column> = columns.iter().map(Column::aliased).collect();

        let predicate = match ExpressionGenerator::new(rng)
            .with_columns(&columns)
            .with_row(&pivot_row)
            .with_max_depth(self.options.max_depth)
            .with_max_retries(self.options.max_retries)
            .generate_expression_with_expected_result(DataType::Boolean)
        {
            Ok(predicate) => predicate,
            Err(e) => {
                debug!(error = %e, "skipping invocation");
                return Err(OracleOutcome::Skipped(SkipReason::NoPredicate));
            }
        };

        let mut rectifier = Rectifier::new(self.policy.rectify_policy());
        let rectified = match rectifier.rectify(predicate) {
            Ok(rectified) => rectified,
            Err(e) => {
                debug!(error = %e, "skipping invocation");
                return Err(OracleOutcome::Skipped(SkipReason::NoPredicate));
            }
        };

        let mut select = Select::new(
            fetch_columns.clone(),
            tables.table_names().into_iter().map(String::from).collect(),
        );
        select.where_clause = Some(rectified);
        select.distinct = rng.next_bool();
        if rng.next_bool() {
            select.group_by = columns
                .iter()
                .map(|c| Expression::column(c.clone(), None))
                .collect();
        }
        if rng.next_bool() {
            select.limit = Some(UNBOUNDED_LIMIT);
            if rng.next_bool() {
                select.offset = Some(0);
            }
        }
        if rng.next_bool() {
            let mut generator = ExpressionGenerator::new(rng)
                .with_columns(&columns)
                .with_max_depth(self.options.max_depth);
            select.order_by = if select.distinct {
                generator.generate_column_order_bys()
            } else {
                generator.generate_order_bys()
            };
        }

        Ok(PivotContext {
            tables,
            pivot_row,
            fetch_columns,
            rectified_predicates: rectifier.into_predicates(),
            select,
        })
    }

    fn classify(&self, query: String, error: &OracleError) -> OracleOutcome {
        let message = error.to_string();
        if self.errors.is_expected(&message) {
            debug!(%query, error = %message, "expected error");
            OracleOutcome::Skipped(SkipReason::ExpectedError(message))
        } else {
            warn!(%query, error = %message, "unexpected error");
            OracleOutcome::UnexpectedError {
                query,
                error: message,
            }
        }
    }
}

/// Containment check for `query` and the pivot row.
///
/// The positive form returns rows iff a result row matches the pivot row on
/// every projected column; the negative form returns a row iff none does.
pub fn containment_query(
    policy: PivotPolicy,
    query: &str,
    columns: &[Column],
    pivot_row: &RowValue,
) -> String {
    let conditions: Vec<String> = columns
        .iter()
        .map(|column| {
            let alias = column.fetch_alias();
            match pivot_row.get(column) {
                None | Some(Constant::Null) => format!("result.{alias} IS NULL"),
                Some(value) => format!("result.{alias} = {}", value.text_representation()),
            }
        })
        .collect();
    let positive = format!(
        "SELECT * FROM ({query}) AS result WHERE {}",
        conditions.join(" AND ")
    );
    match policy {
        PivotPolicy::Positive => positive,
        PivotPolicy::Negative => format!("SELECT 1 WHERE NOT EXISTS ({positive})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pivotsql_types::Table;

    fn row() -> (Vec<Column>, RowValue) {
        let columns = vec![
            Column::new("t0", "c0", DataType::Integer),
            Column::new("t0", "c1", DataType::Text),
        ];
        let row = RowValue::from_columns(&columns, vec![Constant::Integer(-3), Constant::Null])
            .unwrap();
        (columns, row)
    }

    #[test]
    fn positive_containment_query() {
        let (columns, row) = row();
        assert_eq!(
            containment_query(PivotPolicy::Positive, "SELECT 1", &columns, &row),
            "SELECT * FROM (SELECT 1) AS result WHERE result.t0c0 = (-3) AND result.t0c1 IS NULL"
        );
    }

    #[test]
    fn negative_containment_query_wraps_positive() {
        let (columns, row) = row();
        let positive = containment_query(PivotPolicy::Positive, "Q", &columns, &row);
        assert_eq!(
            containment_query(PivotPolicy::Negative, "Q", &columns, &row),
            format!("SELECT 1 WHERE NOT EXISTS ({positive})")
        );
    }

    #[test]
    fn policies_map_to_rectification() {
        assert_eq!(PivotPolicy::Positive.rectify_policy(), RectifyPolicy::Include);
        assert_eq!(PivotPolicy::Negative.rectify_policy(), RectifyPolicy::Exclude);
        assert_eq!(PivotPolicy::Negative.to_string(), "negative");
    }

    #[test]
    fn empty_schema_is_skipped() {
        struct Unreachable;
        impl Connection for Unreachable {
            fn query(&mut self, sql: &str) -> Result<crate::QueryResult, OracleError> {
                panic!("unexpected query {sql}");
            }
            fn execute(&mut self, sql: &str) -> Result<(), OracleError> {
                panic!("unexpected statement {sql}");
            }
            fn name(&self) -> &'static str {
                "unreachable"
            }
        }

        let schema = Schema::new(vec![Table::new(
            "t0",
            vec![Column::new("t0", "c0", DataType::Integer)],
            0,
        )]);
        let errors = ExpectedErrors::new();
        let oracle =
            PivotedQuerySynthesis::new(&schema, &errors, PivotPolicy::Positive, PqsOptions::default());
        let outcome = oracle.check(&mut Unreachable, &mut pivotsql_expr::SeededRng::new(0));
        assert_eq!(outcome, OracleOutcome::Skipped(SkipReason::NoTables));
    }
}
