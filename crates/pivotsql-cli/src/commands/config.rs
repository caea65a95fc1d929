//! Configuration management commands.

use std::path::Path;

use anyhow::{Context, Result};
use pivotsql_config::{Paths, PivotConfig};

use crate::ConfigFormat;
use crate::style::{self, colors::SemanticStyle};

/// Show the configuration merged from every layer.
pub fn show(project: &Path, format: ConfigFormat) -> Result<()> {
    let config = PivotConfig::load_from_dir(project).context("Failed to load configuration")?;

    match format {
        ConfigFormat::Json => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        ConfigFormat::Toml => {
            print!("{}", config.to_toml()?);
        }
        ConfigFormat::Text => print_text(project, &config),
    }

    Ok(())
}

fn print_text(project: &Path, config: &PivotConfig) {
    style::print_section("pivotsql configuration");
    style::print_spacer();

    style::print_section("Sources:");
    let user = Paths::new()
        .user_config_file()
        .map_or_else(|e| e.to_string(), |p| p.display().to_string());
    style::print_labeled("User", &user);
    style::print_labeled(
        "Project",
        &Paths::project_config_file(project).display().to_string(),
    );
    style::print_labeled(
        "Local",
        &Paths::local_config_file(project).display().to_string(),
    );
    style::print_spacer();

    let run = &config.run;
    let generator = &config.generator;
    let database = &config.database;
    let output = config
        .report
        .output
        .as_ref()
        .map_or_else(|| "None".muted(), |p| p.display().to_string().code());
    let extra = if config.errors.extra_expected.is_empty() {
        "None".muted()
    } else {
        config.errors.extra_expected.join(", ")
    };

    let entries = [
        ("run.seed", run.seed.to_string()),
        ("run.iterations", run.iterations.to_string()),
        ("run.workers", run.workers.to_string()),
        ("run.oracle", run.oracle.to_string()),
        (
            "run.schema_refresh_interval",
            run.schema_refresh_interval.to_string(),
        ),
        ("generator.max_depth", generator.max_depth.to_string()),
        ("generator.max_retries", generator.max_retries.to_string()),
        ("database.tables", database.tables.to_string()),
        ("database.max_columns", database.max_columns.to_string()),
        ("database.rows_per_table", database.rows_per_table.to_string()),
        ("database.dialect", database.dialect.name().to_string()),
        ("errors.extra_expected", extra),
        ("report.output", output),
    ];
    println!("{}", style::info_table(&entries));
}
