//! End-to-end orchestration scenarios against in-process gateways.

use async_trait::async_trait;
use querybench_benchmarks::{io, BenchmarkCatalog, BenchmarkOrchestrator, Report, RunPolicy};
use querybench_core::{classify, ErrorKind, ExecutionGateway, MetricSample, QueryOutcome, RawError};
use std::sync::atomic::{AtomicUsize, Ordering};

const MEMORY_ERROR: &str = "Code: 241. DB::Exception: Memory limit (for query) exceeded: \
    would use 4.88 GiB (attempt to allocate chunk of 1048576 bytes), maximum: 4.66 GiB. \
    (MEMORY_LIMIT_EXCEEDED)";

/// Returns the same sample for every call.
struct Identical {
    calls: AtomicUsize,
}

#[async_trait]
impl ExecutionGateway for Identical {
    fn backend_name(&self) -> &str {
        "identical"
    }

    async fn execute(&self, _query: &str, _memory_limit_bytes: Option<u64>) -> QueryOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        QueryOutcome::Success(MetricSample {
            elapsed_seconds: 0.1,
            memory_bytes: 123_456,
            rows_read: 1,
            bytes_read: 1,
            rows_written: 0,
            bytes_written: 0,
            result_rows: 1,
            result_bytes: 9,
        })
    }
}

/// Fails every call with a memory limit error.
struct OutOfMemory;

#[async_trait]
impl ExecutionGateway for OutOfMemory {
    fn backend_name(&self) -> &str {
        "oom"
    }

    async fn execute(&self, _query: &str, _memory_limit_bytes: Option<u64>) -> QueryOutcome {
        QueryOutcome::Failure(classify(&RawError::backend(Some(241), MEMORY_ERROR)))
    }
}

/// Alternates success and timeout, starting with success.
struct Alternating {
    calls: AtomicUsize,
}

#[async_trait]
impl ExecutionGateway for Alternating {
    fn backend_name(&self) -> &str {
        "alternating"
    }

    async fn execute(&self, _query: &str, _memory_limit_bytes: Option<u64>) -> QueryOutcome {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call % 2 == 0 {
            QueryOutcome::Success(MetricSample {
                elapsed_seconds: 1.0 + call as f64,
                memory_bytes: 1000 * (call as u64 + 1),
                ..Default::default()
            })
        } else {
            QueryOutcome::Failure(classify(&RawError::transport("operation timed out", true)))
        }
    }
}

fn single_query_catalog() -> BenchmarkCatalog {
    let mut catalog = BenchmarkCatalog::new("e2e", "");
    catalog.add_query("q1", "SELECT 1", "").unwrap();
    catalog
}

fn temp_file(name: &str) -> std::path::PathBuf {
    std::env::temp_dir()
        .join(format!("querybench-e2e-{}", std::process::id()))
        .join(name)
}

#[tokio::test]
async fn test_identical_successes_have_zero_spread() {
    let orchestrator = BenchmarkOrchestrator::new(Identical {
        calls: AtomicUsize::new(0),
    });
    let report = orchestrator
        .run_all(&single_query_catalog(), 3)
        .await
        .unwrap();

    let aggregate = report.get("q1").unwrap();
    assert_eq!(aggregate.outcomes().len(), 3);
    assert_eq!(aggregate.success_count(), 3);
    assert_eq!(aggregate.failure_count(), 0);

    let stats = aggregate.statistics().unwrap();
    for field in [
        stats.elapsed_seconds,
        stats.memory_bytes,
        stats.rows_read,
        stats.bytes_read,
        stats.rows_written,
        stats.bytes_written,
        stats.result_rows,
        stats.result_bytes,
    ] {
        assert_eq!(field.stddev, 0.0);
        assert_eq!(field.min, field.max);
    }
    assert_eq!(stats.elapsed_seconds.mean, 0.1);
    assert_eq!(orchestrator.gateway().calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_single_run_has_zero_stddev() {
    let orchestrator = BenchmarkOrchestrator::new(Alternating {
        calls: AtomicUsize::new(0),
    });
    let report = orchestrator
        .run_all(&single_query_catalog(), 1)
        .await
        .unwrap();

    let stats = report.get("q1").unwrap().statistics().unwrap();
    assert_eq!(stats.sample_count, 1);
    assert_eq!(stats.elapsed_seconds.stddev, 0.0);
}

#[tokio::test]
async fn test_all_memory_failures_have_no_statistics() {
    let orchestrator = BenchmarkOrchestrator::new(OutOfMemory);
    let report = orchestrator
        .run_all(&single_query_catalog(), 3)
        .await
        .unwrap();

    let aggregate = report.get("q1").unwrap();
    assert_eq!(aggregate.success_count(), 0);
    assert_eq!(aggregate.failure_count(), 3);
    assert!(aggregate.statistics().is_none());
    for failure in aggregate.failures() {
        assert_eq!(failure.error_kind, ErrorKind::MemoryLimitExceeded);
        assert!(!failure.suggestions.is_empty());
        assert_eq!(failure.message, MEMORY_ERROR);
        assert_eq!(failure.details["requested_memory_bytes"], "1048576");
        assert_eq!(failure.details["maximum_memory"], "4.66 GiB");
    }
}

#[tokio::test]
async fn test_report_round_trips_through_disk() {
    let mut catalog = single_query_catalog();
    catalog.add_query("q2", "SELECT 2", "second").unwrap();

    let orchestrator = BenchmarkOrchestrator::new(Alternating {
        calls: AtomicUsize::new(0),
    });
    let policy = RunPolicy::new().skip("q2");
    let report = orchestrator.run(&catalog, 5, &policy).await.unwrap();

    let path = temp_file("round_trip.json");
    io::write_report_json(&report, &path).unwrap();
    let loaded = io::read_report_json(&path).unwrap();

    assert_eq!(loaded, report);
    for (before, after) in report.benchmarks.iter().zip(&loaded.benchmarks) {
        assert_eq!(before.success_count(), after.success_count());
        assert_eq!(before.failure_count(), after.failure_count());
        assert_eq!(before.statistics(), after.statistics());
    }

    let first = serde_json::to_value(&report).unwrap();
    let second = serde_json::to_value(&loaded).unwrap();
    assert_eq!(first, second);
    assert_eq!(first["benchmarks"][0]["success_count"], 3);
    assert_eq!(first["benchmarks"][0]["failure_count"], 2);
    assert_eq!(first["benchmarks"][1]["skipped"], true);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_retry_only_from_persisted_report() {
    let mut catalog = single_query_catalog();
    catalog.add_query("q2", "SELECT 2", "").unwrap();

    let first = BenchmarkOrchestrator::new(OutOfMemory)
        .run(&catalog, 2, &RunPolicy::new().skip("q1"))
        .await
        .unwrap();
    let path = temp_file("prior.json");
    io::write_report_json(&first, &path).unwrap();

    let identical = BenchmarkOrchestrator::new(Identical {
        calls: AtomicUsize::new(0),
    });
    let prior: Report = io::read_report_json(&path).unwrap();
    let second = identical
        .run(&catalog, 2, &RunPolicy::new().retry_only(prior))
        .await
        .unwrap();

    // q1 was skipped and q2 failed, so both run again.
    assert_eq!(identical.gateway().calls.load(Ordering::SeqCst), 4);
    assert_eq!(second.total_failures(), 0);

    let third_gateway = BenchmarkOrchestrator::new(Identical {
        calls: AtomicUsize::new(0),
    });
    let third = third_gateway
        .run(&catalog, 2, &RunPolicy::new().retry_only(second.clone()))
        .await
        .unwrap();
    assert_eq!(third_gateway.gateway().calls.load(Ordering::SeqCst), 0);
    assert_eq!(third.benchmarks, second.benchmarks);

    let _ = std::fs::remove_file(&path);
}
