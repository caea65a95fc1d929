//! Shape of a generated `SELECT`.

use pivotsql_types::Column;

use crate::ast::Expression;

/// Sort direction of an ordering term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    pub fn sql(self) -> &'static str {
        match self {
            Direction::Ascending => "ASC",
            Direction::Descending => "DESC",
        }
    }
}

/// One `ORDER BY` term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderingTerm {
    pub expr: Expression,
    pub direction: Direction,
}

/// A single-block `SELECT` over a cross product of tables.
///
/// Projected columns that carry an alias are printed as
/// `table.column AS alias`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Select {
    pub distinct: bool,
    pub fetch_columns: Vec<Column>,
    pub from: Vec<String>,
    pub where_clause: Option<Expression>,
    pub group_by: Vec<Expression>,
    pub order_by: Vec<OrderingTerm>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Select {
    /// `SELECT columns FROM tables` with no other clause.
    pub fn new(fetch_columns: Vec<Column>, from: Vec<String>) -> Self {
        Self {
            fetch_columns,
            from,
            ..Self::default()
        }
    }
}
