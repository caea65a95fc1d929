//! Parallel PQS campaign.
//!
//! Each worker owns an in-memory DuckDB database, populates it from its own
//! seed and runs oracle invocations against periodically refreshed schema
//! snapshots. Workers share nothing but the atomic [`Counters`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use pivotsql_config::{OracleSelection, PivotConfig};
use pivotsql_expr::SeededRng;
use pivotsql_oracle::{
    DatabaseGenerator, DuckDbConnection, ExpectedErrors, Finding, OracleOutcome, PivotPolicy,
    PivotedQuerySynthesis, PopulateOptions, PqsOptions, introspect,
};
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Everything a campaign needs, resolved from the merged configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignSettings {
    pub seed: u64,
    pub iterations: u64,
    pub workers: usize,
    pub oracle: OracleSelection,
    pub schema_refresh_interval: u64,
    pub populate: PopulateOptions,
    pub pqs: PqsOptions,
    pub extra_expected: Vec<String>,
}

impl CampaignSettings {
    pub fn from_config(config: &PivotConfig) -> Self {
        Self {
            seed: config.run.seed,
            iterations: config.run.iterations,
            workers: config.run.workers,
            oracle: config.run.oracle,
            schema_refresh_interval: config.run.schema_refresh_interval.max(1),
            populate: PopulateOptions {
                tables: config.database.tables,
                max_columns: config.database.max_columns,
                rows_per_table: config.database.rows_per_table,
            },
            pqs: PqsOptions {
                dialect: config.database.dialect,
                max_depth: config.generator.max_depth,
                max_retries: config.generator.max_retries,
                seed: None,
            },
            extra_expected: config.errors.extra_expected.clone(),
        }
    }

    /// Seed of worker `index`. Running with this seed and one worker
    /// replays that worker exactly.
    pub fn worker_seed(&self, index: usize) -> u64 {
        // Kept within the range the config accepts for `run.seed`
        self.seed.wrapping_add(index as u64) & i64::MAX as u64
    }
}

/// The policy used for invocation `iteration`.
pub fn policy_for(selection: OracleSelection, iteration: u64) -> PivotPolicy {
    match selection {
        OracleSelection::Positive => PivotPolicy::Positive,
        OracleSelection::Negative => PivotPolicy::Negative,
        OracleSelection::Both => PivotPolicy::ALL[(iteration % 2) as usize],
    }
}

/// Progress shared by all workers.
#[derive(Debug, Default)]
pub struct Counters {
    passed: AtomicU64,
    skipped: AtomicU64,
    unexpected: AtomicU64,
    findings: AtomicU64,
}

impl Counters {
    fn record(&self, outcome: &OracleOutcome) {
        let counter = match outcome {
            OracleOutcome::Passed { .. } => &self.passed,
            OracleOutcome::Skipped(_) => &self.skipped,
            OracleOutcome::UnexpectedError { .. } => &self.unexpected,
            OracleOutcome::Finding(_) => &self.findings,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> Tally {
        Tally {
            passed: self.passed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            unexpected: self.unexpected.load(Ordering::Relaxed),
            findings: self.findings.load(Ordering::Relaxed),
        }
    }
}

/// Outcome counts at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub passed: u64,
    pub skipped: u64,
    pub unexpected: u64,
    pub findings: u64,
}

impl Tally {
    pub fn total(&self) -> u64 {
        self.passed + self.skipped + self.unexpected + self.findings
    }
}

/// An engine error outside the expected list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnexpectedError {
    pub query: String,
    pub error: String,
}

#[derive(Debug)]
pub struct WorkerReport {
    pub index: usize,
    pub seed: u64,
    pub tally: Tally,
    pub findings: Vec<Finding>,
    pub unexpected: Vec<UnexpectedError>,
}

/// A worker that could not set up its database.
#[derive(Debug)]
pub struct WorkerFailure {
    pub index: usize,
    pub seed: u64,
    pub error: String,
}

#[derive(Debug)]
pub struct CampaignReport {
    pub workers: Vec<WorkerReport>,
    pub failures: Vec<WorkerFailure>,
    pub tally: Tally,
    pub elapsed_secs: f64,
}

impl CampaignReport {
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.workers.iter().flat_map(|w| w.findings.iter())
    }

    /// Seeds of the workers that reported at least one finding.
    pub fn finding_seeds(&self) -> Vec<u64> {
        self.workers
            .iter()
            .filter(|w| !w.findings.is_empty())
            .map(|w| w.seed)
            .collect()
    }

    pub fn is_clean(&self) -> bool {
        self.tally.findings == 0 && self.failures.is_empty()
    }

    pub fn rate(&self) -> f64 {
        if self.elapsed_secs > 0.0 {
            self.tally.total() as f64 / self.elapsed_secs
        } else {
            0.0
        }
    }
}

/// Runs every worker to completion on its own thread.
///
/// `on_invocation` is called after each oracle invocation from the worker
/// threads.
pub fn run_campaign<F>(settings: &CampaignSettings, on_invocation: F) -> Result<CampaignReport>
where
    F: Fn() + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(settings.workers)
        .thread_name(|index| format!("pivotsql-worker-{index}"))
        .build()
        .context("Failed to start worker pool")?;

    let counters = Counters::default();
    let started = Instant::now();

    let results: Vec<(usize, Result<WorkerReport>)> = pool.install(|| {
        (0..settings.workers)
            .into_par_iter()
            .map(|index| (index, run_worker(settings, index, &counters, &on_invocation)))
            .collect()
    });

    let mut workers = Vec::new();
    let mut failures = Vec::new();
    for (index, result) in results {
        match result {
            Ok(report) => workers.push(report),
            Err(e) => {
                warn!(worker = index, error = %format!("{e:#}"), "worker failed");
                failures.push(WorkerFailure {
                    index,
                    seed: settings.worker_seed(index),
                    error: format!("{e:#}"),
                });
            }
        }
    }

    Ok(CampaignReport {
        workers,
        failures,
        tally: counters.snapshot(),
        elapsed_secs: started.elapsed().as_secs_f64(),
    })
}

/// One worker: populate, then `iterations` oracle invocations.
pub fn run_worker<F>(
    settings: &CampaignSettings,
    index: usize,
    counters: &Counters,
    on_invocation: &F,
) -> Result<WorkerReport>
where
    F: Fn() + Sync,
{
    let seed = settings.worker_seed(index);
    let mut rng = SeededRng::new(seed);
    let mut conn = DuckDbConnection::open_in_memory().context("Failed to open DuckDB")?;

    // Population runs on a forked stream; invocations continue on `rng`
    let mut populate_rng = rng.fork();
    DatabaseGenerator::new(&mut populate_rng, settings.populate)
        .populate(&mut conn)
        .context("Failed to populate database")?;

    let errors = ExpectedErrors::duckdb().with_patterns(settings.extra_expected.iter().cloned());
    let options = PqsOptions {
        seed: Some(seed),
        ..settings.pqs
    };

    let mut schema = introspect(&mut conn).context("Failed to read schema")?;
    info!(
        worker = index,
        seed,
        tables = schema.tables().len(),
        iterations = settings.iterations,
        "worker started"
    );

    let mut tally = Tally::default();
    let mut findings = Vec::new();
    let mut unexpected = Vec::new();

    for iteration in 0..settings.iterations {
        if iteration > 0 && iteration % settings.schema_refresh_interval == 0 {
            schema = introspect(&mut conn).context("Failed to refresh schema")?;
            debug!(worker = index, iteration, "schema refreshed");
        }

        let policy = policy_for(settings.oracle, iteration);
        let oracle = PivotedQuerySynthesis::new(&schema, &errors, policy, options);
        let outcome = oracle.check(&mut conn, &mut rng);
        counters.record(&outcome);

        match outcome {
            OracleOutcome::Passed { .. } => tally.passed += 1,
            OracleOutcome::Skipped(reason) => {
                debug!(worker = index, %reason, "invocation skipped");
                tally.skipped += 1;
            }
            OracleOutcome::UnexpectedError { query, error } => {
                tally.unexpected += 1;
                unexpected.push(UnexpectedError { query, error });
            }
            OracleOutcome::Finding(finding) => {
                tally.findings += 1;
                findings.push(*finding);
            }
        }
        on_invocation();
    }

    info!(
        worker = index,
        seed,
        passed = tally.passed,
        skipped = tally.skipped,
        unexpected = tally.unexpected,
        findings = tally.findings,
        "worker finished"
    );

    Ok(WorkerReport {
        index,
        seed,
        tally,
        findings,
        unexpected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn settings(workers: usize, iterations: u64) -> CampaignSettings {
        let mut config = PivotConfig::default();
        config.run.seed = 17;
        config.run.workers = workers;
        config.run.iterations = iterations;
        config.run.schema_refresh_interval = 10;
        CampaignSettings::from_config(&config)
    }

    #[test]
    fn settings_follow_config() {
        let s = settings(3, 25);
        assert_eq!(s.workers, 3);
        assert_eq!(s.iterations, 25);
        assert_eq!(s.populate, PopulateOptions::default());
        assert_eq!(s.pqs.seed, None);
        assert_eq!(s.pqs.max_depth, pivotsql_expr::DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn worker_seeds_are_offsets_of_the_master_seed() {
        let s = settings(3, 1);
        assert_eq!(s.worker_seed(0), 17);
        assert_eq!(s.worker_seed(2), 19);

        let mut edge = s.clone();
        edge.seed = i64::MAX as u64;
        assert_eq!(edge.worker_seed(0), i64::MAX as u64);
        assert_eq!(edge.worker_seed(1), 0);
    }

    #[test]
    fn both_alternates_policies() {
        assert_eq!(policy_for(OracleSelection::Both, 0), PivotPolicy::Positive);
        assert_eq!(policy_for(OracleSelection::Both, 1), PivotPolicy::Negative);
        assert_eq!(policy_for(OracleSelection::Negative, 0), PivotPolicy::Negative);
        assert_eq!(policy_for(OracleSelection::Positive, 7), PivotPolicy::Positive);
    }

    #[test]
    fn campaign_counts_every_invocation() {
        let s = settings(2, 30);
        let ticks = AtomicUsize::new(0);
        let report = run_campaign(&s, || {
            ticks.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();

        assert!(report.failures.is_empty());
        assert_eq!(report.workers.len(), 2);
        assert_eq!(report.tally.total(), 60);
        assert_eq!(ticks.load(Ordering::Relaxed), 60);
        for worker in &report.workers {
            assert_eq!(worker.tally.total(), 30);
            assert_eq!(worker.seed, s.worker_seed(worker.index));
        }
        assert!(report.tally.passed > 0, "{:?}", report.tally);
    }

    #[test]
    fn worker_is_deterministic_per_seed() {
        let s = settings(1, 20);
        let first = run_worker(&s, 0, &Counters::default(), &|| {}).unwrap();
        let second = run_worker(&s, 0, &Counters::default(), &|| {}).unwrap();
        assert_eq!(first.tally, second.tally);
        assert_eq!(first.unexpected, second.unexpected);
    }

    #[test]
    fn single_worker_replays_a_campaign_worker() {
        let s = settings(3, 15);
        let from_campaign = run_worker(&s, 2, &Counters::default(), &|| {}).unwrap();

        let mut replay = s.clone();
        replay.seed = s.worker_seed(2);
        replay.workers = 1;
        let replayed = run_worker(&replay, 0, &Counters::default(), &|| {}).unwrap();

        assert_eq!(replayed.seed, from_campaign.seed);
        assert_eq!(replayed.tally, from_campaign.tally);
    }
}
