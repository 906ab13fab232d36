//! Benchmark orchestration.
//!
//! The orchestrator walks a catalog in order and runs every benchmark the
//! policy selects a fixed number of times through an [`ExecutionGateway`].
//! Runs are strictly sequential, both within a benchmark and across
//! benchmarks: concurrent runs would compete for the same backend memory
//! quota and distort each other's measurements.
//!
//! Failed runs are data. A failure never aborts the remaining runs of a
//! benchmark or any other benchmark; only configuration errors, detected
//! before the first run, make [`BenchmarkOrchestrator::run`] return `Err`.

use crate::catalog::BenchmarkCatalog;
use crate::policy::RunPolicy;
use crate::result::{BenchmarkAggregate, Report};
use querybench_core::{
    BenchmarkDefinition, ConfigError, ExecutionGateway, QueryOutcome, Result,
};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Drives repeated benchmark execution against one gateway.
pub struct BenchmarkOrchestrator<G> {
    gateway: G,
}

impl<G: ExecutionGateway> BenchmarkOrchestrator<G> {
    /// Create an orchestrator over `gateway`.
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    /// The underlying gateway.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Run every benchmark in `catalog` `runs_per_benchmark` times, without
    /// skips, memory overrides or retry filtering.
    pub async fn run_all(
        &self,
        catalog: &BenchmarkCatalog,
        runs_per_benchmark: u32,
    ) -> Result<Report> {
        self.run(catalog, runs_per_benchmark, &RunPolicy::default())
            .await
    }

    /// Run the benchmarks of `catalog` selected by `policy`.
    ///
    /// Every catalog entry appears in the report, in catalog order:
    ///
    /// - entries in `policy.skip_names` are recorded as skipped and never executed,
    /// - in retry-only mode, entries that fully succeeded in the prior report are
    ///   carried forward unchanged,
    /// - all others are executed `runs_per_benchmark` times.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] before any run starts if `runs_per_benchmark`
    /// is zero or a memory limit cannot be parsed.
    pub async fn run(
        &self,
        catalog: &BenchmarkCatalog,
        runs_per_benchmark: u32,
        policy: &RunPolicy,
    ) -> Result<Report> {
        if runs_per_benchmark < 1 {
            return Err(ConfigError::InvalidRunCount(runs_per_benchmark));
        }
        let memory_limits = policy.resolve_memory_limits()?;
        warn_unknown_names(catalog, policy);

        let backend = self.gateway.backend_name().to_string();
        info!(
            backend = %backend,
            catalog = catalog.name(),
            benchmarks = catalog.len(),
            runs_per_benchmark,
            retry_only = policy.retry_only.is_some(),
            "Starting benchmark session"
        );

        let mut report = Report::new(backend, runs_per_benchmark);
        for definition in catalog {
            let aggregate = if policy.skip_names.contains(&definition.name) {
                info!(benchmark = %definition.name, "Skipping benchmark");
                BenchmarkAggregate::skipped(definition)
            } else if let Some(previous) = carried_forward(policy, &definition.name) {
                info!(
                    benchmark = %definition.name,
                    "Benchmark succeeded previously, keeping prior results"
                );
                previous.clone()
            } else {
                let limit = effective_memory_limit(definition, &memory_limits);
                self.run_benchmark(definition, runs_per_benchmark, limit)
                    .await
            };
            report.benchmarks.push(aggregate);
        }

        info!(
            benchmarks = report.benchmarks.len(),
            failed_runs = report.total_failures(),
            "All benchmarks completed"
        );
        Ok(report)
    }

    async fn run_benchmark(
        &self,
        definition: &BenchmarkDefinition,
        runs: u32,
        memory_limit: Option<u64>,
    ) -> BenchmarkAggregate {
        info!(
            benchmark = %definition.name,
            description = %definition.description,
            memory_limit = ?memory_limit,
            "Running benchmark"
        );

        let mut outcomes = Vec::new();
        for run in 1..=runs {
            debug!(benchmark = %definition.name, run, runs, "Starting run");
            let outcome = self.gateway.execute(&definition.query, memory_limit).await;
            match &outcome {
                QueryOutcome::Success(sample) => info!(
                    benchmark = %definition.name,
                    run,
                    runs,
                    elapsed_seconds = sample.elapsed_seconds,
                    memory_bytes = sample.memory_bytes,
                    rows_read = sample.rows_read,
                    "Run completed"
                ),
                QueryOutcome::Failure(failure) => warn!(
                    benchmark = %definition.name,
                    run,
                    runs,
                    error_kind = %failure.error_kind,
                    error = %failure.message,
                    "Run failed"
                ),
            }
            outcomes.push(outcome);
        }

        let aggregate = BenchmarkAggregate::from_runs(definition, outcomes);
        info!(
            benchmark = %definition.name,
            succeeded = aggregate.success_count(),
            failed = aggregate.failure_count(),
            "Benchmark finished"
        );
        aggregate
    }
}

/// The prior aggregate to reuse for `name`, if retry-only mode says it fully succeeded.
fn carried_forward<'a>(policy: &'a RunPolicy, name: &str) -> Option<&'a BenchmarkAggregate> {
    policy
        .retry_only
        .as_ref()
        .and_then(|prior| prior.get(name))
        .filter(|previous| !previous.needs_retry())
}

/// Policy override first, then the catalog default.
fn effective_memory_limit(
    definition: &BenchmarkDefinition,
    overrides: &BTreeMap<String, u64>,
) -> Option<u64> {
    overrides
        .get(&definition.name)
        .copied()
        .or(definition.memory_limit_bytes)
}

fn warn_unknown_names(catalog: &BenchmarkCatalog, policy: &RunPolicy) {
    for name in policy.skip_names.iter().filter(|n| !catalog.contains(n)) {
        warn!(benchmark = %name, "Skip list names a benchmark that is not in the catalog");
    }
    for name in policy.memory_limits.keys().filter(|n| !catalog.contains(n)) {
        warn!(benchmark = %name, "Memory limit set for a benchmark that is not in the catalog");
    }
}
