//! Configuration loader with multi-source merging

use crate::{Paths, PivotConfig};
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader with builder pattern
pub struct ConfigLoader {
    project_dir: PathBuf,
    env_prefix: String,
    user_config: bool,
}

impl ConfigLoader {
    /// Create a new config loader with default project directory (current dir)
    pub fn new() -> Self {
        Self {
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            env_prefix: "PIVOTSQL".to_string(),
            user_config: true,
        }
    }

    /// Set the project directory
    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the environment variable prefix (default: "PIVOTSQL")
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Skip ~/.config/pivotsql/config.toml
    pub fn without_user_config(mut self) -> Self {
        self.user_config = false;
        self
    }

    /// Load configuration from all sources with proper precedence
    pub fn load(self) -> Result<PivotConfig> {
        let mut builder = config::Config::builder();

        // 1. Start with built-in defaults
        let defaults = PivotConfig::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        // 2. User config (~/.config/pivotsql/config.toml)
        if self.user_config
            && let Ok(user_config_file) = Paths::new().user_config_file()
            && user_config_file.exists()
        {
            builder = builder.add_source(
                config::File::from(user_config_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // 3. Project config, then 4. local overrides
        for file in [
            Paths::project_config_file(&self.project_dir),
            Paths::local_config_file(&self.project_dir),
        ] {
            if file.exists() {
                builder = builder.add_source(
                    config::File::from(file)
                        .required(false)
                        .format(config::FileFormat::Toml),
                );
            }
        }

        // 5. Environment variables (PIVOTSQL_RUN__WORKERS=8)
        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("errors.extra_expected")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let mut pivot_config: PivotConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        pivot_config.resolve_paths(&self.project_dir);
        pivot_config
            .validate()
            .context("Configuration failed validation")?;

        Ok(pivot_config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OracleSelection;
    use pivotsql_expr::Dialect;
    use std::fs;
    use tempfile::tempdir;

    fn loader(dir: &Path) -> ConfigLoader {
        // A prefix no environment sets, so ambient variables cannot leak in
        ConfigLoader::new()
            .with_project_dir(dir)
            .with_env_prefix("PIVOTSQL_LOADER_TEST")
            .without_user_config()
    }

    #[test]
    fn test_load_defaults() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config = loader(temp_dir.path()).load().expect("Failed to load config");
        assert_eq!(config, PivotConfig::default());
    }

    #[test]
    fn test_load_project_config() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        let config_content = r#"
[run]
seed = 42
workers = 2
oracle = "negative"

[database]
tables = 3
dialect = "postgres"

[errors]
extra_expected = ["Not implemented"]

[report]
output = "out/findings.json"
"#;
        fs::write(project_dir.join("pivotsql.toml"), config_content)
            .expect("Failed to write config");

        let config = loader(project_dir).load().expect("Failed to load config");

        assert_eq!(config.run.seed, 42);
        assert_eq!(config.run.workers, 2);
        assert_eq!(config.run.oracle, OracleSelection::Negative);
        assert_eq!(config.run.iterations, 1000);
        assert_eq!(config.database.tables, 3);
        assert_eq!(config.database.dialect, Dialect::Postgres);
        assert_eq!(config.errors.extra_expected, vec!["Not implemented"]);
        assert_eq!(
            config.report.output,
            Some(project_dir.join("out/findings.json"))
        );
    }

    #[test]
    fn test_local_overrides() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        fs::write(project_dir.join("pivotsql.toml"), "[run]\nworkers = 2\nseed = 5\n")
            .expect("Failed to write project config");
        fs::write(project_dir.join("pivotsql.local.toml"), "[run]\nworkers = 16\n")
            .expect("Failed to write local config");

        let config = loader(project_dir).load().expect("Failed to load config");

        // Local config overrides the project config key by key
        assert_eq!(config.run.workers, 16);
        assert_eq!(config.run.seed, 5);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();
        fs::write(project_dir.join("pivotsql.toml"), "[run]\nworkers = 0\n")
            .expect("Failed to write config");

        let err = loader(project_dir).load().unwrap_err();
        assert!(format!("{err:#}").contains("run.workers"));
    }

    // Environment variables are process-global, so they are exercised by the
    // CLI integration tests rather than here:
    //
    // PIVOTSQL_RUN__WORKERS=8
    // PIVOTSQL_RUN__SCHEMA_REFRESH_INTERVAL=50
    // PIVOTSQL_ERRORS__EXTRA_EXPECTED="Not implemented,Catalog Error"
}
