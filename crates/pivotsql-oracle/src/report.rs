//! Findings: reproducible evidence of a logic bug.

use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use pivotsql_expr::Dialect;
use serde::{Deserialize, Serialize};

use crate::pqs::{PivotContext, PivotPolicy};

/// A containment check that contradicted the rectifier's guarantee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub policy: PivotPolicy,
    pub engine: String,
    /// Worker seed that reproduces the finding.
    pub seed: Option<u64>,
    pub query: String,
    pub containment_query: String,
    pub rectified_predicates: Vec<String>,
    /// Expected value of every subtree of the rectified predicates.
    pub expected_values: String,
    /// `(qualified column, SQL literal)` for each pivot column.
    pub pivot_row: Vec<(String, String)>,
    pub discovered_at: DateTime<Utc>,
}

impl Finding {
    pub fn new(
        policy: PivotPolicy,
        engine: &str,
        seed: Option<u64>,
        query: String,
        containment_query: String,
        context: &PivotContext,
        dialect: Dialect,
    ) -> Self {
        let rectified_predicates = context
            .rectified_predicates
            .iter()
            .map(|p| dialect.print_expression(p))
            .collect();
        let expected_values = context
            .rectified_predicates
            .iter()
            .map(|p| dialect.print_expected_values(p))
            .collect();
        let pivot_row = context
            .pivot_row
            .iter()
            .map(|(column, value)| (column.qualified_name(), value.text_representation()))
            .collect();

        Self {
            policy,
            engine: engine.to_string(),
            seed,
            query,
            containment_query,
            rectified_predicates,
            expected_values,
            pivot_row,
            discovered_at: Utc::now(),
        }
    }

    /// Pretty JSON for the findings file.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} PQS finding on {}", self.policy, self.engine)?;
        if let Some(seed) = self.seed {
            write!(f, " (seed {seed})")?;
        }
        writeln!(f, " at {}", self.discovered_at.to_rfc3339())?;
        writeln!(f, "-- query")?;
        writeln!(f, "{};", self.query)?;
        writeln!(f, "-- containment check (returned no rows)")?;
        writeln!(f, "{};", self.containment_query)?;
        writeln!(f, "-- pivot row")?;
        for (column, value) in &self.pivot_row {
            writeln!(f, "--   {column} = {value}")?;
        }
        writeln!(f, "-- rectified predicates")?;
        for predicate in &self.rectified_predicates {
            writeln!(f, "--   {predicate}")?;
        }
        writeln!(f, "-- expected values")?;
        for line in self.expected_values.lines() {
            writeln!(f, "--   {line}")?;
        }
        Ok(())
    }
}
