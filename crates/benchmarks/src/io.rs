//! I/O operations for benchmark reports.
//!
//! This module reads and writes reports and memory limit documents on the
//! filesystem. The JSON report is the canonical interchange format; the
//! Markdown summary is for humans only.

use crate::markdown;
use crate::policy::RunPolicy;
use crate::result::Report;
use std::fs;
use std::io;
use std::path::Path;

fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Write a report to a JSON file, creating parent directories as needed.
pub fn write_report_json(report: &Report, path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    fs::write(path, json)
}

/// Read a report from a JSON file.
pub fn read_report_json(path: impl AsRef<Path>) -> io::Result<Report> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Write the Markdown summary of a report.
pub fn write_summary(report: &Report, path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    fs::write(path, markdown::generate_summary(report))
}

/// Write the detailed Markdown report, with per-run timings and failures.
pub fn write_detailed_report(report: &Report, path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    fs::write(path, markdown::generate_detailed_report(report))
}

/// Write the JSON report and, optionally, the Markdown summary and detailed
/// report.
pub fn write_all_outputs(
    report: &Report,
    json_path: impl AsRef<Path>,
    summary_path: Option<&Path>,
    detailed_path: Option<&Path>,
) -> io::Result<()> {
    write_report_json(report, json_path)?;
    if let Some(summary_path) = summary_path {
        write_summary(report, summary_path)?;
    }
    if let Some(detailed_path) = detailed_path {
        write_detailed_report(report, detailed_path)?;
    }
    Ok(())
}

/// Read a memory limits document.
///
/// `source` is either inline JSON (starting with `{`) or a path to a JSON
/// file. The limits are merged into `policy`; sizes are parsed when the
/// session starts.
pub fn read_memory_limits(policy: RunPolicy, source: &str) -> io::Result<RunPolicy> {
    let json = if source.trim_start().starts_with('{') {
        source.to_string()
    } else {
        fs::read_to_string(source)?
    };
    policy
        .memory_limits_json(&json)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::BenchmarkAggregate;
    use querybench_core::{BenchmarkDefinition, MetricSample, QueryOutcome};

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("querybench-io-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_write_and_read_report() {
        let definition = BenchmarkDefinition::new("q1", "one", "SELECT 1");
        let mut report = Report::new("ClickHouse", 1);
        report.benchmarks.push(BenchmarkAggregate::from_runs(
            &definition,
            vec![QueryOutcome::Success(MetricSample {
                elapsed_seconds: 0.123456789,
                memory_bytes: 4096,
                ..Default::default()
            })],
        ));

        let path = temp_path("report.json");
        write_report_json(&report, &path).unwrap();
        let loaded = read_report_json(&path).unwrap();
        assert_eq!(loaded, report);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_write_all_outputs_with_detailed_report() {
        use querybench_core::{ErrorKind, FailureRecord};

        let definition = BenchmarkDefinition::new("q1", "one", "SELECT 1");
        let mut report = Report::new("ClickHouse", 2);
        report.benchmarks.push(BenchmarkAggregate::from_runs(
            &definition,
            vec![
                QueryOutcome::Success(MetricSample::from_elapsed(
                    std::time::Duration::from_millis(1500),
                )),
                QueryOutcome::Failure(FailureRecord::new(ErrorKind::Timeout, "Timeout exceeded")),
            ],
        ));

        let json = temp_path("all/report.json");
        let summary = temp_path("all/summary.md");
        let detailed = temp_path("all/detailed.md");
        write_all_outputs(&report, &json, Some(&summary), Some(&detailed)).unwrap();

        assert_eq!(read_report_json(&json).unwrap(), report);
        let summary_text = fs::read_to_string(&summary).unwrap();
        assert_eq!(summary_text, markdown::generate_summary(&report));
        let detailed_text = fs::read_to_string(&detailed).unwrap();
        assert_eq!(detailed_text, markdown::generate_detailed_report(&report));
        assert!(detailed_text.contains("Timeout exceeded"));

        let _ = fs::remove_dir_all(temp_path("all"));
    }

    #[test]
    fn test_read_report_rejects_garbage() {
        let path = temp_path("garbage.json");
        ensure_parent_dir(&path).unwrap();
        fs::write(&path, "[1, 2, 3]").unwrap();

        let err = read_report_json(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_read_memory_limits_inline_and_file() {
        let policy = read_memory_limits(RunPolicy::new(), r#"{"q1": "9GB"}"#).unwrap();
        assert_eq!(
            policy.resolve_memory_limits().unwrap()["q1"],
            9 * 1024 * 1024 * 1024
        );

        let path = temp_path("limits.json");
        ensure_parent_dir(&path).unwrap();
        fs::write(&path, r#"{"q2": "8589934592"}"#).unwrap();
        let policy = read_memory_limits(policy, path.to_str().unwrap()).unwrap();
        let limits = policy.resolve_memory_limits().unwrap();
        assert_eq!(limits.len(), 2);
        assert_eq!(limits["q2"], 8_589_934_592);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_read_memory_limits_missing_file() {
        let err = read_memory_limits(RunPolicy::new(), "/nonexistent/limits.json").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
