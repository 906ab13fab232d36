//! Human-readable terminal output.

use colored::Colorize;
use querybench_adapters::clickhouse::TableInfo;
use querybench_benchmarks::{BenchmarkAggregate, BenchmarkCatalog, Report};
use querybench_core::size::{format_bytes, format_bytes_f64};

const NAME_WIDTH: usize = 36;
const DESCRIPTION_WIDTH: usize = 48;
const COLUMN_SAMPLE: usize = 5;

fn clip(text: &str, width: usize) -> String {
    let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if line.chars().count() > width {
        let cut: String = line.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        line
    }
}

fn summary_line(aggregate: &BenchmarkAggregate) -> String {
    let name = format!("{:<width$}", clip(aggregate.name(), NAME_WIDTH), width = NAME_WIDTH);
    let runs = format!("{}/{}", aggregate.success_count(), aggregate.failure_count());
    let description = clip(aggregate.description(), DESCRIPTION_WIDTH);

    if aggregate.is_skipped() {
        return format!(
            "{} {:>7} {:>10} {:>10} {:>12}  {}",
            name,
            "-",
            "-",
            "-",
            "-",
            description
        )
        .dimmed()
        .to_string();
    }

    match aggregate.statistics() {
        Some(stats) => {
            let line = format!(
                "{} {:>7} {:>10.4} {:>10.4} {:>12}  {}",
                name,
                runs,
                stats.elapsed_seconds.mean,
                stats.elapsed_seconds.stddev,
                format_bytes_f64(stats.memory_bytes.mean),
                description
            );
            if aggregate.failure_count() > 0 {
                line.yellow().to_string()
            } else {
                line
            }
        }
        None => format!(
            "{} {:>7} {:>10} {:>10} {:>12}  {}",
            name, runs, "FAILED", "-", "-", description
        )
        .red()
        .to_string(),
    }
}

/// Render the console summary table for a report.
pub fn format_summary(report: &Report) -> String {
    let header = format!(
        "{:<width$} {:>7} {:>10} {:>10} {:>12}  {}",
        "Query",
        "Runs",
        "Avg (s)",
        "StdDev",
        "Avg Memory",
        "Description",
        width = NAME_WIDTH
    );
    let rule = "-".repeat(header.len() + DESCRIPTION_WIDTH - "Description".len());

    let mut lines = vec![
        String::new(),
        format!("{} ({})", "Benchmark Summary".bold(), report.database),
        rule.clone(),
        header.bold().to_string(),
        rule.clone(),
    ];
    lines.extend(report.benchmarks.iter().map(summary_line));
    lines.push(rule);

    let failed = report
        .benchmarks
        .iter()
        .filter(|b| !b.is_skipped() && b.success_count() == 0)
        .count();
    let skipped = report.benchmarks.iter().filter(|b| b.is_skipped()).count();
    lines.push(format!(
        "{} benchmarks, {} failed entirely, {} skipped, {} failed runs",
        report.benchmarks.len(),
        failed,
        skipped,
        report.total_failures()
    ));
    lines.join("\n")
}

/// Print the console summary table.
pub fn print_summary(report: &Report) {
    println!("{}", format_summary(report));
}

/// Render table sizes and a sample of their columns.
pub fn format_table_info(tables: &[TableInfo]) -> String {
    let mut lines = vec![String::new(), "===== Table Information =====".bold().to_string()];
    for table in tables {
        lines.push(String::new());
        lines.push(format!("Table: {}", table.name.bold()));
        lines.push(format!("Size: {} ({} rows)", table.size, table.total_rows));
        lines.push(format!(
            "Created: {}",
            table.creation_time.as_deref().unwrap_or("-")
        ));
        lines.push(format!(
            "Last Modified: {}",
            table.last_modified.as_deref().unwrap_or("-")
        ));
        lines.push(format!("Columns: {}", table.columns.len()));
        for column in table.columns.iter().take(COLUMN_SAMPLE) {
            lines.push(format!("  {} ({})", column.name, column.data_type));
        }
        if table.columns.len() > COLUMN_SAMPLE {
            lines.push(format!(
                "  ... and {} more columns",
                table.columns.len() - COLUMN_SAMPLE
            ));
        }
    }
    lines.push(String::new());
    lines.join("\n")
}

/// Print table information.
pub fn print_table_info(tables: &[TableInfo]) {
    println!("{}", format_table_info(tables));
}

/// Print the definitions of a catalog.
pub fn print_catalog(catalog: &BenchmarkCatalog) {
    println!("{} ({} benchmarks)", catalog.name().bold(), catalog.len());
    if !catalog.description().is_empty() {
        println!("{}", catalog.description());
    }
    println!();
    for definition in catalog {
        let limit = definition
            .memory_limit_bytes
            .map(|bytes| format!(" [memory limit {}]", format_bytes(bytes)))
            .unwrap_or_default();
        println!("  {}{}", definition.name.green(), limit);
        if !definition.description.is_empty() {
            println!("      {}", clip(&definition.description, 72));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use querybench_adapters::clickhouse::ColumnInfo;
    use querybench_core::classify::{classify, RawError};
    use querybench_core::{BenchmarkDefinition, MetricSample, QueryOutcome};

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_summary_marks_failed_benchmarks() {
        plain();
        let mut report = Report::new("ClickHouse", 2);
        report.benchmarks.push(BenchmarkAggregate::from_runs(
            &BenchmarkDefinition::new("fast", "Quick count", "SELECT 1"),
            vec![
                QueryOutcome::Success(MetricSample {
                    elapsed_seconds: 0.25,
                    memory_bytes: 1024,
                    ..Default::default()
                });
                2
            ],
        ));
        report.benchmarks.push(BenchmarkAggregate::from_runs(
            &BenchmarkDefinition::new("oom", "", "SELECT 2"),
            vec![QueryOutcome::Failure(classify(&RawError::backend(Some(241), "Memory limit exceeded")))],
        ));
        report
            .benchmarks
            .push(BenchmarkAggregate::skipped(&BenchmarkDefinition::new("later", "", "SELECT 3")));

        let summary = format_summary(&report);
        assert!(summary.contains("Benchmark Summary (ClickHouse)"));
        assert!(summary.contains("0.2500"));
        assert!(summary.contains("1.00 KiB"));
        assert!(summary.contains("FAILED"));
        assert!(summary.contains("3 benchmarks, 1 failed entirely, 1 skipped, 1 failed runs"));
    }

    #[test]
    fn test_table_info_samples_columns() {
        plain();
        let columns = (0..7)
            .map(|i| ColumnInfo {
                name: format!("c{}", i),
                data_type: "UInt64".to_string(),
                default_kind: String::new(),
                default_expression: String::new(),
            })
            .collect();
        let tables = vec![TableInfo {
            name: "visits".to_string(),
            size_bytes: 2048,
            size: "2.00 KiB".to_string(),
            total_rows: 10,
            creation_time: None,
            last_modified: Some("2024-01-01 00:00:00".to_string()),
            columns,
        }];

        let text = format_table_info(&tables);
        assert!(text.contains("Table: visits"));
        assert!(text.contains("Size: 2.00 KiB (10 rows)"));
        assert!(text.contains("Created: -"));
        assert!(text.contains("  c4 (UInt64)"));
        assert!(!text.contains("  c5 (UInt64)"));
        assert!(text.contains("... and 2 more columns"));
    }

    #[test]
    fn test_clip() {
        assert_eq!(clip("a  b\nc", 10), "a b c");
        assert_eq!(clip("abcdefghij", 6), "abc...");
    }
}
