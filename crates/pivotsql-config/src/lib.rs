//! Configuration management for pivotsql
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. CLI arguments (highest precedence, applied by the binary)
//! 2. Environment variables (`PIVOTSQL_<SECTION>__<KEY>`)
//! 3. pivotsql.local.toml (gitignored, local overrides)
//! 4. pivotsql.toml (git-tracked, project config)
//! 5. ~/.config/pivotsql/config.toml (user defaults)
//! 6. Built-in defaults (lowest precedence)

use anyhow::Result;
use pivotsql_expr::Dialect;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main pivotsql configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PivotConfig {
    pub run: RunConfig,
    pub generator: GeneratorConfig,
    pub database: DatabaseConfig,
    pub errors: ErrorsConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Master seed; every worker forks its stream from it.
    pub seed: u64,
    /// Oracle invocations per worker.
    pub iterations: u64,
    pub workers: usize,
    pub oracle: OracleSelection,
    /// Invocations between schema snapshots.
    pub schema_refresh_interval: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            iterations: 1000,
            workers: 4,
            oracle: OracleSelection::Both,
            schema_refresh_interval: 100,
        }
    }
}

/// Which PQS variants a run exercises.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OracleSelection {
    Positive,
    Negative,
    Both,
}

impl fmt::Display for OracleSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleSelection::Positive => f.write_str("positive"),
            OracleSelection::Negative => f.write_str("negative"),
            OracleSelection::Both => f.write_str("both"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub max_depth: usize,
    pub max_retries: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_depth: pivotsql_expr::DEFAULT_MAX_DEPTH,
            max_retries: pivotsql_expr::DEFAULT_MAX_RETRIES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub tables: usize,
    pub max_columns: usize,
    pub rows_per_table: usize,
    /// Printer dialect; the embedded engine is always DuckDB.
    pub dialect: Dialect,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            tables: 2,
            max_columns: 4,
            rows_per_table: 8,
            dialect: Dialect::DuckDb,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorsConfig {
    /// Message fragments added to the engine's expected-error list.
    pub extra_expected: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Findings JSON file; no file is written when unset.
    pub output: Option<PathBuf>,
}

impl PivotConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Rejects settings that would make a run meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("run.workers", self.run.workers),
            ("run.schema_refresh_interval", self.run.schema_refresh_interval as usize),
            ("generator.max_retries", self.generator.max_retries),
            ("database.tables", self.database.tables),
            ("database.max_columns", self.database.max_columns),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "{key} must be at least 1"
                )));
            }
        }
        if self.run.seed > i64::MAX as u64 {
            return Err(ConfigError::ValidationError(format!(
                "run.seed must not exceed {}",
                i64::MAX
            )));
        }
        Ok(())
    }

    /// Resolve relative paths to absolute
    pub fn resolve_paths(&mut self, base_dir: impl AsRef<Path>) {
        let base = base_dir.as_ref();

        if let Some(output) = &self.report.output
            && output.is_relative()
        {
            self.report.output = Some(base.join(output));
        }
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PivotConfig::default();
        assert_eq!(config.run.iterations, 1000);
        assert_eq!(config.run.workers, 4);
        assert_eq!(config.run.oracle, OracleSelection::Both);
        assert_eq!(config.generator.max_depth, 3);
        assert_eq!(config.database.dialect, Dialect::DuckDb);
        assert!(config.report.output.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut config = PivotConfig::default();
        config.run.workers = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("run.workers"));

        let mut config = PivotConfig::default();
        config.run.seed = u64::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_path_resolution() {
        let mut config = PivotConfig::default();
        config.resolve_paths("/home/user/project");
        assert!(config.report.output.is_none());

        config.report.output = Some(PathBuf::from("findings.json"));
        config.resolve_paths("/home/user/project");
        assert_eq!(
            config.report.output,
            Some(PathBuf::from("/home/user/project/findings.json"))
        );
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = PivotConfig::default();
        config.run.oracle = OracleSelection::Negative;
        config.errors.extra_expected = vec!["Not implemented".to_string()];

        let text = config.to_toml().unwrap();
        assert!(text.contains("oracle = \"negative\""));
        assert!(text.contains("dialect = \"duckdb\""));
        let back: PivotConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
