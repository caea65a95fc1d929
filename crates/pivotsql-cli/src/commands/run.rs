//! `pivotsql run`: a parallel PQS campaign against embedded DuckDB.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pivotsql_config::{OracleSelection, PivotConfig};
use pivotsql_oracle::Finding;

use crate::campaign::{CampaignReport, CampaignSettings, run_campaign};
use crate::style::{self, colors::SemanticStyle};

/// Unexpected errors printed in full; the rest are only counted.
const SHOWN_UNEXPECTED: usize = 5;

/// Command-line flags, the highest configuration layer.
#[derive(Debug, Default)]
pub struct Overrides {
    pub seed: Option<u64>,
    pub iterations: Option<u64>,
    pub workers: Option<usize>,
    pub oracle: Option<OracleSelection>,
    pub output: Option<PathBuf>,
}

impl Overrides {
    fn apply(self, config: &mut PivotConfig) {
        if let Some(seed) = self.seed {
            config.run.seed = seed;
        }
        if let Some(iterations) = self.iterations {
            config.run.iterations = iterations;
        }
        if let Some(workers) = self.workers {
            config.run.workers = workers;
        }
        if let Some(oracle) = self.oracle {
            config.run.oracle = oracle;
        }
        if let Some(output) = self.output {
            config.report.output = Some(output);
        }
    }
}

/// Loads the project configuration, applies `overrides` and runs.
pub fn run(project: &Path, overrides: Overrides) -> Result<()> {
    let mut config =
        PivotConfig::load_from_dir(project).context("Failed to load configuration")?;
    overrides.apply(&mut config);
    config.validate().context("Invalid command-line arguments")?;

    let settings = CampaignSettings::from_config(&config);
    println!(
        "Running {} worker(s) x {} invocations ({} oracle, seed: {})...",
        settings.workers.to_string().header(),
        settings.iterations.to_string().header(),
        settings.oracle,
        settings.seed.to_string().code()
    );

    let bar = style::invocation_bar(settings.iterations * settings.workers as u64);
    let report = run_campaign(&settings, || bar.inc(1))?;
    style::finish_and_clear(&bar);

    print_summary(&report);

    if let Some(path) = &config.report.output {
        write_findings(path, &report.findings().collect::<Vec<_>>())?;
        style::print_labeled("Findings written to", &path.display().to_string().code());
    }

    print_findings(&report, settings.iterations);

    if !report.failures.is_empty() {
        anyhow::bail!("{} worker(s) failed", report.failures.len())
    }
    if report.tally.findings > 0 {
        anyhow::bail!("{} logic bug finding(s)", report.tally.findings)
    }
    Ok(())
}

fn print_summary(report: &CampaignReport) {
    style::print_spacer();
    println!("{}", style::summary_table(report));

    let tally = report.tally;
    if report.is_clean() {
        style::print_success(&format!(
            "All {} invocations upheld the containment guarantee",
            tally.total().to_string().success()
        ));
    } else {
        style::print_error(&format!(
            "{} finding(s), {} failed worker(s)",
            tally.findings.to_string().error(),
            report.failures.len().to_string().error()
        ));
    }
    println!(
        "  Time: {:.2}s ({:.0} invocations/sec)",
        report.elapsed_secs,
        report.rate()
    );

    for failure in &report.failures {
        style::print_warn(&format!(
            "worker {} (seed {}) failed: {}",
            failure.index, failure.seed, failure.error
        ));
    }

    let unexpected: Vec<_> = report
        .workers
        .iter()
        .flat_map(|w| w.unexpected.iter())
        .collect();
    if !unexpected.is_empty() {
        style::print_spacer();
        style::print_warn(&format!(
            "{} unexpected engine error(s); add benign ones to [errors] extra_expected",
            unexpected.len()
        ));
        for item in unexpected.iter().take(SHOWN_UNEXPECTED) {
            println!("  {}", item.error.warning());
            println!("    {}", item.query.muted());
        }
        if unexpected.len() > SHOWN_UNEXPECTED {
            style::print_hint(&format!(
                "{} more; run with RUST_LOG=pivotsql_oracle=warn to see them all",
                unexpected.len() - SHOWN_UNEXPECTED
            ));
        }
    }
}

fn print_findings(report: &CampaignReport, iterations: u64) {
    let seeds = report.finding_seeds();
    if seeds.is_empty() {
        return;
    }

    for finding in report.findings() {
        style::print_spacer();
        println!("{}", finding.to_string().error());
    }

    style::print_spacer();
    println!("{}", "Finding seeds (reproduce with):".warning());
    for seed in seeds {
        println!(
            "  {} run --seed {} --workers 1 --iterations {}",
            "pivotsql".code(),
            seed,
            iterations
        );
    }
}

fn write_findings(path: &Path, findings: &[&Finding]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(findings).context("Failed to encode findings")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn overrides_replace_only_given_keys() {
        let mut config = PivotConfig::default();
        Overrides {
            seed: Some(9),
            workers: Some(1),
            oracle: Some(OracleSelection::Negative),
            ..Overrides::default()
        }
        .apply(&mut config);

        assert_eq!(config.run.seed, 9);
        assert_eq!(config.run.workers, 1);
        assert_eq!(config.run.oracle, OracleSelection::Negative);
        assert_eq!(config.run.iterations, PivotConfig::default().run.iterations);
        assert!(config.report.output.is_none());
    }

    #[test]
    fn findings_file_is_a_json_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/findings.json");
        write_findings(&path, &[]).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, serde_json::json!([]));
    }
}
