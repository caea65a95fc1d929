//! Random database population.
//!
//! Creates tables `t0..tN` with columns `c0..cM` of random types and fills
//! them with random rows, using the same literal rules as the expression
//! generator.

use pivotsql_expr::{Randomness, generate_constant};
use pivotsql_types::{Constant, DataType};
use tracing::debug;

use crate::{Connection, OracleError};

/// Shape of the generated database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulateOptions {
    pub tables: usize,
    pub max_columns: usize,
    pub rows_per_table: usize,
}

impl Default for PopulateOptions {
    fn default() -> Self {
        Self {
            tables: 2,
            max_columns: 4,
            rows_per_table: 8,
        }
    }
}

/// Generates `CREATE TABLE` and `INSERT` statements.
#[derive(Debug)]
pub struct DatabaseGenerator<'a, R: Randomness> {
    rng: &'a mut R,
    options: PopulateOptions,
}

impl<'a, R: Randomness> DatabaseGenerator<'a, R> {
    pub fn new(rng: &'a mut R, options: PopulateOptions) -> Self {
        Self { rng, options }
    }

    /// Statements that (re)create and fill every table, in execution order.
    pub fn statements(&mut self) -> Vec<String> {
        let mut statements = Vec::new();
        for t in 0..self.options.tables.max(1) {
            let name = format!("t{t}");
            let column_count = 1 + self.rng.next_usize(self.options.max_columns.max(1));
            let types: Vec<DataType> = (0..column_count)
                .map(|_| DataType::ALL[self.rng.next_usize(DataType::ALL.len())])
                .collect();

            statements.push(format!("DROP TABLE IF EXISTS {name}"));
            statements.push(generate_create_table(&name, &types));
            for _ in 0..self.options.rows_per_table {
                statements.push(self.generate_insert(&name, &types));
            }
        }
        statements
    }

    /// Runs [`statements`](Self::statements) on `conn`.
    pub fn populate<C: Connection>(&mut self, conn: &mut C) -> Result<Vec<String>, OracleError> {
        let statements = self.statements();
        for sql in &statements {
            conn.execute(sql)?;
        }
        debug!(
            statements = statements.len(),
            engine = conn.name(),
            "database populated"
        );
        Ok(statements)
    }

    fn generate_insert(&mut self, table: &str, types: &[DataType]) -> String {
        let values: Vec<String> = types
            .iter()
            .map(|&data_type| {
                // roughly one value in five is NULL
                if self.rng.next_usize(10) == 0 {
                    Constant::Null.text_representation()
                } else {
                    generate_constant(self.rng, data_type).text_representation()
                }
            })
            .collect();
        format!("INSERT INTO {table} VALUES ({})", values.join(", "))
    }
}

fn generate_create_table(name: &str, types: &[DataType]) -> String {
    let columns: Vec<String> = types
        .iter()
        .enumerate()
        .map(|(i, data_type)| format!("c{i} {}", data_type.sql_name()))
        .collect();
    format!("CREATE TABLE {name} ({})", columns.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DuckDbConnection, introspect};
    use pivotsql_expr::{ScriptedRng, SeededRng};

    #[test]
    fn scripted_statements() {
        // 1 column of type INTEGER, then a non-null small integer 5
        let mut rng = ScriptedRng::new(vec![0, 1, 1, 1, 1, 105]);
        let statements = DatabaseGenerator::new(
            &mut rng,
            PopulateOptions {
                tables: 1,
                max_columns: 1,
                rows_per_table: 1,
            },
        )
        .statements();

        assert_eq!(
            statements,
            vec![
                "DROP TABLE IF EXISTS t0".to_string(),
                "CREATE TABLE t0 (c0 BIGINT)".to_string(),
                "INSERT INTO t0 VALUES (5)".to_string(),
            ]
        );
    }

    #[test]
    fn populate_creates_requested_shape() {
        let mut conn = DuckDbConnection::open_in_memory().unwrap();
        let mut rng = SeededRng::new(21);
        let options = PopulateOptions {
            tables: 3,
            max_columns: 5,
            rows_per_table: 10,
        };
        DatabaseGenerator::new(&mut rng, options)
            .populate(&mut conn)
            .unwrap();

        let schema = introspect(&mut conn).unwrap();
        assert_eq!(schema.tables().len(), 3);
        for table in schema.tables() {
            assert_eq!(table.row_count(), 10);
            assert!((1..=5).contains(&table.columns().len()));
        }
    }

    #[test]
    fn repopulating_replaces_tables() {
        let mut conn = DuckDbConnection::open_in_memory().unwrap();
        let mut rng = SeededRng::new(2);
        let options = PopulateOptions::default();
        DatabaseGenerator::new(&mut rng, options)
            .populate(&mut conn)
            .unwrap();
        DatabaseGenerator::new(&mut rng, options)
            .populate(&mut conn)
            .unwrap();

        let schema = introspect(&mut conn).unwrap();
        assert_eq!(schema.tables().len(), 2);
        assert!(schema.tables().iter().all(|t| t.row_count() == 8));
    }
}
