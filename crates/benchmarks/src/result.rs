//! Benchmark aggregate and report types.
//!
//! A [`Report`] is the only persisted artifact of a benchmark session. Each
//! benchmark contributes one [`BenchmarkAggregate`] holding its per-run
//! outcomes in run order; counts and statistics are derived from those
//! outcomes. The serialized form includes the derived values for readers,
//! and they are recomputed from the outcomes when a report is loaded.

use chrono::{DateTime, Utc};
use querybench_core::{
    aggregate, BenchmarkDefinition, FailureRecord, MetricSample, QueryOutcome, SampleStatistics,
};
use serde::{Deserialize, Serialize};

/// Outcomes and derived statistics of one benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AggregateRecord", into = "AggregateRecord")]
pub struct BenchmarkAggregate {
    name: String,
    description: String,
    skipped: bool,
    outcomes: Vec<QueryOutcome>,
}

impl BenchmarkAggregate {
    /// Finalize the outcomes of executed runs, in run order.
    pub fn from_runs(definition: &BenchmarkDefinition, outcomes: Vec<QueryOutcome>) -> Self {
        Self {
            name: definition.name.clone(),
            description: definition.description.clone(),
            skipped: false,
            outcomes,
        }
    }

    /// Record a benchmark that was skipped without executing.
    pub fn skipped(definition: &BenchmarkDefinition) -> Self {
        Self {
            name: definition.name.clone(),
            description: definition.description.clone(),
            skipped: true,
            outcomes: Vec::new(),
        }
    }

    /// Benchmark name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Benchmark description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the benchmark was skipped.
    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    /// All outcomes, one per attempted run, in run order.
    pub fn outcomes(&self) -> &[QueryOutcome] {
        &self.outcomes
    }

    /// Samples of the successful runs.
    pub fn samples(&self) -> impl Iterator<Item = &MetricSample> + '_ {
        self.outcomes.iter().filter_map(QueryOutcome::sample)
    }

    /// Failure records of the failed runs.
    pub fn failures(&self) -> impl Iterator<Item = &FailureRecord> + '_ {
        self.outcomes.iter().filter_map(QueryOutcome::failure)
    }

    /// Number of successful runs.
    pub fn success_count(&self) -> usize {
        self.samples().count()
    }

    /// Number of failed runs.
    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Statistics over the successful runs; `None` if no run succeeded.
    pub fn statistics(&self) -> Option<SampleStatistics> {
        aggregate(self.samples())
    }

    /// Whether this benchmark has to be executed again in retry-only mode.
    pub fn needs_retry(&self) -> bool {
        self.failure_count() > 0 || self.success_count() == 0
    }
}

/// Serialized shape of a [`BenchmarkAggregate`].
#[derive(Serialize, Deserialize)]
struct AggregateRecord {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    skipped: bool,
    #[serde(default)]
    success_count: usize,
    #[serde(default)]
    failure_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    statistics: Option<SampleStatistics>,
    #[serde(default)]
    outcomes: Vec<QueryOutcome>,
}

impl From<BenchmarkAggregate> for AggregateRecord {
    fn from(aggregate: BenchmarkAggregate) -> Self {
        Self {
            success_count: aggregate.success_count(),
            failure_count: aggregate.failure_count(),
            statistics: aggregate.statistics(),
            name: aggregate.name,
            description: aggregate.description,
            skipped: aggregate.skipped,
            outcomes: aggregate.outcomes,
        }
    }
}

impl From<AggregateRecord> for BenchmarkAggregate {
    fn from(record: AggregateRecord) -> Self {
        Self {
            name: record.name,
            description: record.description,
            skipped: record.skipped,
            outcomes: record.outcomes,
        }
    }
}

/// Result of one benchmark session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Backend the benchmarks ran against.
    pub database: String,
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
    /// Runs requested per benchmark.
    pub runs_per_benchmark: u32,
    /// One aggregate per catalog entry, in catalog order.
    pub benchmarks: Vec<BenchmarkAggregate>,
}

impl Report {
    /// Create an empty report.
    pub fn new(database: impl Into<String>, runs_per_benchmark: u32) -> Self {
        Self {
            database: database.into(),
            generated_at: Utc::now(),
            runs_per_benchmark,
            benchmarks: Vec::new(),
        }
    }

    /// Look up a benchmark by name.
    pub fn get(&self, name: &str) -> Option<&BenchmarkAggregate> {
        self.benchmarks.iter().find(|b| b.name() == name)
    }

    /// Benchmarks with at least one failed run or no successful run.
    pub fn needing_retry(&self) -> impl Iterator<Item = &BenchmarkAggregate> + '_ {
        self.benchmarks.iter().filter(|b| b.needs_retry())
    }

    /// Total number of failed runs across all benchmarks.
    pub fn total_failures(&self) -> usize {
        self.benchmarks.iter().map(|b| b.failure_count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use querybench_core::ErrorKind;

    fn definition() -> BenchmarkDefinition {
        BenchmarkDefinition::new("q1", "first query", "SELECT 1")
    }

    fn success(elapsed: f64) -> QueryOutcome {
        QueryOutcome::Success(MetricSample {
            elapsed_seconds: elapsed,
            memory_bytes: 1024,
            ..Default::default()
        })
    }

    fn failure() -> QueryOutcome {
        QueryOutcome::Failure(FailureRecord::new(ErrorKind::QueryError, "Syntax error"))
    }

    #[test]
    fn test_counts_and_statistics() {
        let aggregate =
            BenchmarkAggregate::from_runs(&definition(), vec![success(1.0), failure(), success(3.0)]);

        assert_eq!(aggregate.success_count(), 2);
        assert_eq!(aggregate.failure_count(), 1);
        assert!(aggregate.needs_retry());

        let stats = aggregate.statistics().unwrap();
        assert_eq!(stats.sample_count, 2);
        assert_eq!(stats.elapsed_seconds.mean, 2.0);
    }

    #[test]
    fn test_all_failed_has_no_statistics() {
        let aggregate = BenchmarkAggregate::from_runs(&definition(), vec![failure(), failure()]);
        assert!(aggregate.statistics().is_none());

        let json = serde_json::to_value(&aggregate).unwrap();
        assert!(json.get("statistics").is_none());
        assert_eq!(json["failure_count"], 2);
        assert_eq!(json["success_count"], 0);
    }

    #[test]
    fn test_skipped_aggregate() {
        let aggregate = BenchmarkAggregate::skipped(&definition());
        assert!(aggregate.is_skipped());
        assert!(aggregate.outcomes().is_empty());
        assert!(aggregate.needs_retry());
    }

    #[test]
    fn test_derived_fields_are_recomputed_on_load() {
        let json = serde_json::json!({
            "name": "q1",
            "success_count": 99,
            "failure_count": 99,
            "outcomes": [{"status": "success", "elapsed_seconds": 0.25, "memory_bytes": 0,
                          "rows_read": 0, "bytes_read": 0, "rows_written": 0,
                          "bytes_written": 0, "result_rows": 1, "result_bytes": 8}]
        });
        let aggregate: BenchmarkAggregate = serde_json::from_value(json).unwrap();
        assert_eq!(aggregate.success_count(), 1);
        assert_eq!(aggregate.failure_count(), 0);
        assert!(!aggregate.is_skipped());
        assert!(!aggregate.needs_retry());
    }

    #[test]
    fn test_report_lookup() {
        let mut report = Report::new("ClickHouse", 2);
        report
            .benchmarks
            .push(BenchmarkAggregate::from_runs(&definition(), vec![success(1.0), failure()]));

        assert!(report.get("q1").is_some());
        assert!(report.get("missing").is_none());
        assert_eq!(report.needing_retry().count(), 1);
        assert_eq!(report.total_failures(), 1);
        assert!(report.generated_at <= Utc::now());
    }

    #[test]
    fn test_report_round_trip_preserves_float_bits() {
        // 64-bit LCG so the sweep is deterministic.
        let mut state: u64 = 0x5eed_1234_abcd_0001;
        let mut next_nanos = || {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (state >> 11) % 100_000_000_000
        };

        let mut report = Report::new("ClickHouse", 4);
        report.benchmarks.push(BenchmarkAggregate::from_runs(
            &BenchmarkDefinition::new("known", "", "SELECT 1"),
            vec![success(31.945811761999998), success(0.1), success(0.2)],
        ));
        for i in 0..5000 {
            let outcomes = (0..4)
                .map(|_| {
                    QueryOutcome::Success(MetricSample::from_elapsed(
                        std::time::Duration::from_nanos(next_nanos()),
                    ))
                })
                .collect();
            report.benchmarks.push(BenchmarkAggregate::from_runs(
                &BenchmarkDefinition::new(format!("q{}", i), "", "SELECT 1"),
                outcomes,
            ));
        }

        let json = serde_json::to_string(&report).unwrap();
        let loaded: Report = serde_json::from_str(&json).unwrap();

        for (before, after) in report.benchmarks.iter().zip(&loaded.benchmarks) {
            for (a, b) in before.samples().zip(after.samples()) {
                assert_eq!(a.elapsed_seconds.to_bits(), b.elapsed_seconds.to_bits());
            }
            assert_eq!(before.statistics(), after.statistics());
        }
        assert_eq!(loaded, report);
        assert_eq!(serde_json::to_string(&loaded).unwrap(), json);
    }
}
