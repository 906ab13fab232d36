//! Markdown output generation for benchmark reports.

use crate::result::{BenchmarkAggregate, Report};
use querybench_core::size::format_bytes_f64;
use std::fmt::Write;

fn truncate(text: &str, max: usize) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() > max {
        let cut: String = single_line.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        single_line
    }
}

fn status(aggregate: &BenchmarkAggregate) -> &'static str {
    if aggregate.is_skipped() {
        "skipped"
    } else if aggregate.success_count() == 0 {
        "failed"
    } else if aggregate.failure_count() > 0 {
        "partial"
    } else {
        "ok"
    }
}

/// Generate a markdown summary table from a report.
pub fn generate_summary(report: &Report) -> String {
    let mut output = String::new();

    writeln!(output, "# Benchmark Summary").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "Database: {}", report.database).unwrap();
    writeln!(output, "Generated: {}", report.generated_at.to_rfc3339()).unwrap();
    writeln!(output, "Runs per benchmark: {}", report.runs_per_benchmark).unwrap();
    writeln!(output).unwrap();
    writeln!(output, "## Results").unwrap();
    writeln!(output).unwrap();
    writeln!(
        output,
        "| Query Name | Status | Runs (ok/failed) | Avg Time (s) | Std Dev (s) | Avg Memory | Description |"
    )
    .unwrap();
    writeln!(
        output,
        "|------------|--------|------------------|--------------|-------------|------------|-------------|"
    )
    .unwrap();

    for aggregate in &report.benchmarks {
        let (avg_time, std_dev, avg_memory) = match aggregate.statistics() {
            Some(stats) => (
                format!("{:.4}", stats.elapsed_seconds.mean),
                format!("{:.4}", stats.elapsed_seconds.stddev),
                format_bytes_f64(stats.memory_bytes.mean),
            ),
            None => ("-".to_string(), "-".to_string(), "-".to_string()),
        };
        writeln!(
            output,
            "| {} | {} | {}/{} | {} | {} | {} | {} |",
            aggregate.name(),
            status(aggregate),
            aggregate.success_count(),
            aggregate.failure_count(),
            avg_time,
            std_dev,
            avg_memory,
            truncate(aggregate.description(), 50)
        )
        .unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "---").unwrap();
    writeln!(output, "Total benchmarks: {}", report.benchmarks.len()).unwrap();
    writeln!(output, "Failed runs: {}", report.total_failures()).unwrap();

    output
}

/// Generate a detailed markdown report including every failure.
pub fn generate_detailed_report(report: &Report) -> String {
    let mut output = String::new();

    writeln!(output, "# Detailed Benchmark Report").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "Generated: {}", report.generated_at.to_rfc3339()).unwrap();
    writeln!(output).unwrap();

    for aggregate in &report.benchmarks {
        writeln!(output, "## {}", aggregate.name()).unwrap();
        writeln!(output).unwrap();
        if !aggregate.description().is_empty() {
            writeln!(output, "{}", aggregate.description()).unwrap();
            writeln!(output).unwrap();
        }
        if aggregate.is_skipped() {
            writeln!(output, "**Skipped.**").unwrap();
            writeln!(output).unwrap();
            continue;
        }

        writeln!(
            output,
            "**Runs:** {} succeeded, {} failed",
            aggregate.success_count(),
            aggregate.failure_count()
        )
        .unwrap();
        writeln!(output).unwrap();

        match aggregate.statistics() {
            Some(stats) => {
                writeln!(output, "**Statistics:**").unwrap();
                writeln!(output, "```json").unwrap();
                writeln!(
                    output,
                    "{}",
                    serde_json::to_string_pretty(&stats).unwrap_or_default()
                )
                .unwrap();
                writeln!(output, "```").unwrap();
            }
            None => writeln!(output, "**Statistics:** none (no successful runs)").unwrap(),
        }
        writeln!(output).unwrap();

        for (run, outcome) in aggregate.outcomes().iter().enumerate() {
            let Some(failure) = outcome.failure() else {
                continue;
            };
            writeln!(output, "### Run {} failed: {}", run + 1, failure.error_kind).unwrap();
            writeln!(output).unwrap();
            writeln!(output, "```").unwrap();
            writeln!(output, "{}", failure.message).unwrap();
            writeln!(output, "```").unwrap();
            for (key, value) in &failure.details {
                writeln!(output, "- {}: {}", key, value).unwrap();
            }
            if !failure.suggestions.is_empty() {
                writeln!(output).unwrap();
                writeln!(output, "Suggestions:").unwrap();
                for suggestion in &failure.suggestions {
                    writeln!(output, "- {}", suggestion).unwrap();
                }
            }
            writeln!(output).unwrap();
        }
    }

    output
}
