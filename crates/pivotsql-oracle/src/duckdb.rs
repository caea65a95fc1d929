//! DuckDB connection.
//!
//! Wraps an embedded DuckDB database as the engine under test.

use std::path::Path;

use duckdb::types::ValueRef;
use pivotsql_types::Constant;

use crate::{Connection, OracleError, QueryResult};

/// Embedded DuckDB engine.
pub struct DuckDbConnection {
    conn: duckdb::Connection,
}

impl DuckDbConnection {
    /// Opens a fresh in-memory database.
    pub fn open_in_memory() -> Result<Self, OracleError> {
        let conn = duckdb::Connection::open_in_memory()
            .map_err(|e| OracleError::Internal(format!("Failed to open DuckDB: {e}")))?;
        Ok(Self { conn })
    }

    /// Opens (or creates) a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, OracleError> {
        let path = path.as_ref();
        let conn = duckdb::Connection::open(path).map_err(|e| {
            OracleError::Internal(format!("Failed to open DuckDB at {}: {e}", path.display()))
        })?;
        Ok(Self { conn })
    }

    /// Converts a DuckDB value to a constant.
    ///
    /// Every integer width becomes `Integer`; values outside `i64` and
    /// non-modelled types are rejected.
    fn convert_value(value: ValueRef<'_>) -> Result<Constant, OracleError> {
        let out_of_range = |v: &dyn std::fmt::Display| {
            OracleError::Unsupported(format!("integer {v} does not fit in BIGINT"))
        };
        Ok(match value {
            ValueRef::Null => Constant::Null,
            ValueRef::Boolean(b) => Constant::Boolean(b),
            ValueRef::TinyInt(i) => Constant::Integer(i64::from(i)),
            ValueRef::SmallInt(i) => Constant::Integer(i64::from(i)),
            ValueRef::Int(i) => Constant::Integer(i64::from(i)),
            ValueRef::BigInt(i) => Constant::Integer(i),
            ValueRef::HugeInt(i) => {
                Constant::Integer(i64::try_from(i).map_err(|_| out_of_range(&i))?)
            }
            ValueRef::UTinyInt(i) => Constant::Integer(i64::from(i)),
            ValueRef::USmallInt(i) => Constant::Integer(i64::from(i)),
            ValueRef::UInt(i) => Constant::Integer(i64::from(i)),
            ValueRef::UBigInt(i) => {
                Constant::Integer(i64::try_from(i).map_err(|_| out_of_range(&i))?)
            }
            ValueRef::Text(s) => Constant::Text(String::from_utf8_lossy(s).into_owned()),
            other => {
                return Err(OracleError::Unsupported(format!(
                    "DuckDB value of type {:?}",
                    other.data_type()
                )));
            }
        })
    }
}

impl Connection for DuckDbConnection {
    fn query(&mut self, sql: &str) -> Result<QueryResult, OracleError> {
        // Parse and bind errors surface from prepare
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| OracleError::SyntaxError(format!("DuckDB: {e}")))?;

        let mut rows_result = stmt
            .query([])
            .map_err(|e| OracleError::RuntimeError(format!("DuckDB: {e}")))?;

        let mut columns = Vec::new();
        let mut rows = Vec::new();

        while let Some(row) = rows_result
            .next()
            .map_err(|e| OracleError::RuntimeError(format!("DuckDB: {e}")))?
        {
            let column_count = row.as_ref().column_count();
            if columns.is_empty() {
                for i in 0..column_count {
                    let name = row.as_ref().column_name(i).map_err(|e| {
                        OracleError::Internal(format!("Failed to get column name: {e}"))
                    })?;
                    columns.push(name.to_string());
                }
            }

            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                let value_ref = row.get_ref(i).map_err(|e| {
                    OracleError::RuntimeError(format!("Failed to get column {i}: {e}"))
                })?;
                values.push(Self::convert_value(value_ref)?);
            }
            rows.push(values);
        }

        Ok(QueryResult { columns, rows })
    }

    fn execute(&mut self, sql: &str) -> Result<(), OracleError> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| OracleError::RuntimeError(format!("DuckDB: {e}")))
    }

    fn name(&self) -> &'static str {
        "DuckDB"
    }
}
