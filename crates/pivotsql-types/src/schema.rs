//! Schema snapshot: data types, columns, tables and rows.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::constant::Constant;
use crate::error::{Result, TypeError};

/// Column data types modelled by the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// `BOOLEAN`.
    Boolean,
    /// 64-bit signed integer (`BIGINT`).
    Integer,
    /// Variable-length text (`VARCHAR`).
    Text,
}

impl DataType {
    /// Every modelled type, in declaration order.
    pub const ALL: [DataType; 3] = [DataType::Boolean, DataType::Integer, DataType::Text];

    /// Type name used in DDL and casts.
    pub fn sql_name(self) -> &'static str {
        match self {
            DataType::Boolean => "BOOLEAN",
            DataType::Integer => "BIGINT",
            DataType::Text => "VARCHAR",
        }
    }

    /// Resolves a catalog type name (DuckDB or PostgreSQL spelling).
    pub fn from_sql_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "BOOLEAN" | "BOOL" => Ok(DataType::Boolean),
            "BIGINT" | "INTEGER" | "INT" | "INT4" | "INT8" | "SMALLINT" | "TINYINT" => {
                Ok(DataType::Integer)
            }
            "VARCHAR" | "TEXT" | "CHARACTER VARYING" | "STRING" => Ok(DataType::Text),
            _ => Err(TypeError::UnsupportedType(name.to_string())),
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// A column of a table in the schema snapshot.
///
/// Identity is `(table, name)`. The display alias only changes how the
/// column is projected; it never takes part in equality, ordering or hashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    table: String,
    name: String,
    data_type: DataType,
    alias: Option<String>,
}

impl Column {
    /// Creates a column owned by `table`.
    pub fn new(table: impl Into<String>, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
            data_type,
            alias: None,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// `table.column`.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.table, self.name)
    }

    /// The per-table projection alias, `<table><column>`.
    pub fn fetch_alias(&self) -> String {
        format!("{}{}", self.table, self.name)
    }

    /// Returns a copy projected under its fetch alias.
    #[must_use]
    pub fn aliased(&self) -> Self {
        Self {
            alias: Some(self.fetch_alias()),
            ..self.clone()
        }
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table && self.name == other.name
    }
}

impl Eq for Column {}

impl Hash for Column {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.table.hash(state);
        self.name.hash(state);
    }
}

impl PartialOrd for Column {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Column {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.table, &self.name).cmp(&(&other.table, &other.name))
    }
}

/// A table in the schema snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    row_count: u64,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>, row_count: u64) -> Self {
        Self {
            name: name.into(),
            columns,
            row_count,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Row count observed when the snapshot was captured.
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }
}

/// One or more tables joined by cross product in a `FROM` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSet {
    tables: Vec<Table>,
}

impl TableSet {
    pub fn new(tables: Vec<Table>) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(Table::name).collect()
    }

    /// Columns of every table, in `FROM` order.
    pub fn columns(&self) -> Vec<Column> {
        self.tables
            .iter()
            .flat_map(|t| t.columns().iter().cloned())
            .collect()
    }

    /// Number of rows in the cross product.
    pub fn cardinality(&self) -> u64 {
        self.tables
            .iter()
            .fold(1u64, |acc, t| acc.saturating_mul(t.row_count()))
    }
}

/// Immutable snapshot of the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    tables: Vec<Table>,
}

impl Schema {
    pub fn new(tables: Vec<Table>) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name() == name)
    }

    /// Tables that held at least one row (and one column) at capture time.
    pub fn non_empty_tables(&self) -> Vec<&Table> {
        self.tables
            .iter()
            .filter(|t| !t.is_empty() && !t.columns().is_empty())
            .collect()
    }
}

/// One concrete row, mapping each column to its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowValue {
    values: BTreeMap<Column, Constant>,
}

impl RowValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a row from a fetched tuple, positionally matched to `columns`.
    ///
    /// Every column receives exactly one value of a compatible type.
    pub fn from_columns(columns: &[Column], values: Vec<Constant>) -> Result<Self> {
        if columns.len() != values.len() {
            return Err(TypeError::ArityMismatch {
                expected: columns.len(),
                actual: values.len(),
            });
        }

        let mut row = Self::new();
        for (column, value) in columns.iter().zip(values) {
            if !value.is_compatible_with(column.data_type()) {
                return Err(TypeError::IncompatibleValue {
                    column: column.qualified_name(),
                    data_type: column.data_type(),
                    value: value.to_string(),
                });
            }
            if row.values.insert(column.clone(), value).is_some() {
                return Err(TypeError::DuplicateColumn(column.qualified_name()));
            }
        }
        Ok(row)
    }

    pub fn get(&self, column: &Column) -> Option<&Constant> {
        self.values.get(column)
    }

    /// Binds `column` to `value`, returning the previous binding.
    pub fn insert(&mut self, column: Column, value: Constant) -> Option<Constant> {
        self.values.insert(column, value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Column, &Constant)> {
        self.values.iter()
    }

    /// Whether every one of `columns` is bound.
    pub fn covers(&self, columns: &[Column]) -> bool {
        columns.iter().all(|c| self.values.contains_key(c))
    }
}
