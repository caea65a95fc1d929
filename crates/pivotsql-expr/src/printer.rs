//! SQL text for expressions and queries.
//!
//! Output is fully parenthesized so printing never depends on operator
//! precedence in the target engine.

use std::fmt::Write as _;

use pivotsql_types::Constant;
use serde::{Deserialize, Serialize};

use crate::ast::{Expression, PostfixOperator};
use crate::select::Select;

/// Target SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    #[serde(alias = "duck_db")]
    DuckDb,
    Postgres,
}

impl Dialect {
    pub fn name(self) -> &'static str {
        match self {
            Dialect::DuckDb => "duckdb",
            Dialect::Postgres => "postgres",
        }
    }

    /// Renders an expression.
    pub fn print_expression(self, expr: &Expression) -> String {
        let mut out = String::new();
        self.write_expression(&mut out, expr);
        out
    }

    /// Renders a query, without a trailing semicolon.
    pub fn print_select(self, select: &Select) -> String {
        let mut out = String::from("SELECT ");
        if select.distinct {
            out.push_str("DISTINCT ");
        }
        let columns: Vec<String> = select
            .fetch_columns
            .iter()
            .map(|c| match c.alias() {
                Some(alias) => format!("{} AS {alias}", c.qualified_name()),
                None => c.qualified_name(),
            })
            .collect();
        out.push_str(&columns.join(", "));
        let _ = write!(out, " FROM {}", select.from.join(", "));

        if let Some(predicate) = &select.where_clause {
            out.push_str(" WHERE ");
            self.write_expression(&mut out, predicate);
        }
        if !select.group_by.is_empty() {
            out.push_str(" GROUP BY ");
            self.write_list(&mut out, &select.group_by);
        }
        if !select.order_by.is_empty() {
            out.push_str(" ORDER BY ");
            for (i, term) in select.order_by.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                self.write_expression(&mut out, &term.expr);
                let _ = write!(out, " {}", term.direction.sql());
            }
        }
        if let Some(limit) = select.limit {
            let _ = write!(out, " LIMIT {limit}");
        }
        if let Some(offset) = select.offset {
            let _ = write!(out, " OFFSET {offset}");
        }
        out
    }

    /// One line per subtree, `<text> -- <expected value>`, outermost first.
    pub fn print_expected_values(self, expr: &Expression) -> String {
        let mut out = String::new();
        self.write_expected_values(&mut out, expr, 0);
        out
    }

    fn write_expected_values(self, out: &mut String, expr: &Expression, depth: usize) {
        let value = expr
            .expected_value()
            .map_or_else(|| "unknown".to_string(), |v| v.text_representation());
        let _ = writeln!(
            out,
            "{:indent$}{} -- {value}",
            "",
            self.print_expression(expr),
            indent = depth * 2
        );
        for child in expr.children() {
            self.write_expected_values(out, child, depth + 1);
        }
    }

    fn write_expression(self, out: &mut String, expr: &Expression) {
        match expr {
            Expression::ColumnValue(c) => out.push_str(&c.column.qualified_name()),
            Expression::Literal { value, data_type } => match value {
                Constant::Null => {
                    let _ = write!(out, "CAST(NULL AS {})", data_type.sql_name());
                }
                other => out.push_str(&other.text_representation()),
            },
            Expression::Unary { op, operand } => {
                let _ = write!(out, "({} ", op.sql());
                self.write_expression(out, operand);
                out.push(')');
            }
            Expression::Binary { op, left, right } => {
                out.push('(');
                self.write_expression(out, left);
                let _ = write!(out, " {} ", op.sql());
                self.write_expression(out, right);
                out.push(')');
            }
            Expression::Postfix { op, operand } => self.write_postfix(out, *op, operand),
            Expression::InList {
                operand,
                list,
                negated,
            } => {
                out.push('(');
                self.write_expression(out, operand);
                out.push_str(if *negated { " NOT IN (" } else { " IN (" });
                self.write_list(out, list);
                out.push_str("))");
            }
            Expression::Between {
                operand,
                low,
                high,
                negated,
            } => {
                out.push('(');
                self.write_expression(out, operand);
                out.push_str(if *negated { " NOT BETWEEN " } else { " BETWEEN " });
                self.write_expression(out, low);
                out.push_str(" AND ");
                self.write_expression(out, high);
                out.push(')');
            }
            Expression::Cast { operand, target } => {
                out.push_str("CAST(");
                self.write_expression(out, operand);
                let _ = write!(out, " AS {})", target.sql_name());
            }
            Expression::Function { func, args } => {
                let _ = write!(out, "{}(", func.sql());
                self.write_list(out, args);
                out.push(')');
            }
        }
    }

    fn write_postfix(self, out: &mut String, op: PostfixOperator, operand: &Expression) {
        let distinct_from = match (self, op) {
            (Dialect::DuckDb, PostfixOperator::IsTrue) => Some("IS NOT DISTINCT FROM TRUE"),
            (Dialect::DuckDb, PostfixOperator::IsFalse) => Some("IS NOT DISTINCT FROM FALSE"),
            (Dialect::DuckDb, PostfixOperator::IsNotTrue) => Some("IS DISTINCT FROM TRUE"),
            (Dialect::DuckDb, PostfixOperator::IsNotFalse) => Some("IS DISTINCT FROM FALSE"),
            _ => None,
        };
        out.push_str("((");
        self.write_expression(out, operand);
        let _ = write!(out, ") {})", distinct_from.unwrap_or(op.sql()));
    }

    fn write_list(self, out: &mut String, items: &[Expression]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_expression(out, item);
        }
    }
}
