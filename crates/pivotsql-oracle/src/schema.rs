//! Catalog snapshot and pivot-row selection.

use std::collections::BTreeMap;

use pivotsql_expr::Randomness;
use pivotsql_types::{Column, Constant, DataType, RowValue, Schema, Table, TableSet};
use tracing::debug;

use crate::{Connection, OracleError};

const COLUMNS_QUERY: &str = "SELECT table_name, column_name, data_type \
     FROM information_schema.columns \
     WHERE table_schema = 'main' \
     ORDER BY table_name, ordinal_position";

/// Draws attempts at a uniform subset before settling for a single table.
const SUBSET_ATTEMPTS: usize = 8;

/// Reads the catalog of `conn` into a schema snapshot, with row counts.
pub fn introspect<C: Connection>(conn: &mut C) -> Result<Schema, OracleError> {
    let result = conn.query(COLUMNS_QUERY)?;

    let mut columns: BTreeMap<String, Vec<Column>> = BTreeMap::new();
    for row in &result.rows {
        let [table, column, data_type] = row.as_slice() else {
            return Err(OracleError::Internal(format!(
                "catalog row has {} values, expected 3",
                row.len()
            )));
        };
        let (Some(table), Some(column), Some(data_type)) =
            (table.as_text(), column.as_text(), data_type.as_text())
        else {
            return Err(OracleError::Internal(format!(
                "catalog row is not text: {row:?}"
            )));
        };
        let data_type = DataType::from_sql_name(data_type)?;
        columns
            .entry(table.to_string())
            .or_default()
            .push(Column::new(table, column, data_type));
    }

    let mut tables = Vec::with_capacity(columns.len());
    for (name, columns) in columns {
        let count = conn.query(&format!("SELECT COUNT(*) FROM {name}"))?;
        let row_count = count
            .rows
            .first()
            .and_then(|row| row.first())
            .and_then(Constant::as_integer)
            .and_then(|n| u64::try_from(n).ok())
            .ok_or_else(|| OracleError::Internal(format!("no row count for {name}")))?;
        tables.push(Table::new(name, columns, row_count));
    }

    debug!(tables = tables.len(), engine = conn.name(), "schema captured");
    Ok(Schema::new(tables))
}

/// `SELECT <columns> FROM <tables> LIMIT 1 OFFSET <offset>`.
pub fn pivot_row_query(tables: &TableSet, offset: u64) -> String {
    let columns: Vec<String> = tables.columns().iter().map(Column::qualified_name).collect();
    format!(
        "SELECT {} FROM {} LIMIT 1 OFFSET {offset}",
        columns.join(", "),
        tables.table_names().join(", ")
    )
}

/// Table choice and pivot-row fetch over a schema snapshot.
pub trait SchemaProvider {
    /// A random non-empty subset of the non-empty tables, `None` when every
    /// table is empty.
    fn pick_tables<R: Randomness>(&self, rng: &mut R) -> Option<TableSet>;

    /// One random row of the cross product of `tables`.
    fn fetch_random_row<C: Connection, R: Randomness>(
        &self,
        tables: &TableSet,
        conn: &mut C,
        rng: &mut R,
    ) -> Result<RowValue, OracleError>;
}

impl SchemaProvider for Schema {
    fn pick_tables<R: Randomness>(&self, rng: &mut R) -> Option<TableSet> {
        let candidates = self.non_empty_tables();
        if candidates.is_empty() {
            return None;
        }
        for _ in 0..SUBSET_ATTEMPTS {
            let subset: Vec<Table> = candidates
                .iter()
                .filter(|_| rng.next_bool())
                .map(|t| (*t).clone())
                .collect();
            if !subset.is_empty() {
                return Some(TableSet::new(subset));
            }
        }
        let table = candidates[rng.next_usize(candidates.len())].clone();
        Some(TableSet::new(vec![table]))
    }

    fn fetch_random_row<C: Connection, R: Randomness>(
        &self,
        tables: &TableSet,
        conn: &mut C,
        rng: &mut R,
    ) -> Result<RowValue, OracleError> {
        let cardinality = tables.cardinality();
        if cardinality == 0 {
            return Err(OracleError::EmptyResult(tables.table_names().join(", ")));
        }
        let offset = rng.next_u64() % cardinality;
        let sql = pivot_row_query(tables, offset);
        let result = conn.query(&sql)?;
        let Some(values) = result.rows.into_iter().next() else {
            return Err(OracleError::EmptyResult(sql));
        };
        Ok(RowValue::from_columns(&tables.columns(), values)?)
    }
}
