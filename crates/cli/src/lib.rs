//! CLI for QueryBench.
//!
//! This crate provides the `querybench` command-line interface: running
//! benchmark catalogs against ClickHouse, listing catalogs and inspecting
//! tables.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod console;
pub mod settings;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use querybench_adapters::ClickHouseGateway;
use querybench_benchmarks::{catalog, io, BenchmarkCatalog, BenchmarkOrchestrator, RunPolicy};
use settings::ConnectionArgs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// QueryBench CLI.
#[derive(Parser, Debug)]
#[command(name = "querybench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Environment file to load before reading settings (default: .env if present).
    #[arg(long, global = true, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Settings file (TOML, JSON or YAML) with connection settings.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `querybench_benchmarks=debug` (overrides RUST_LOG).
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a benchmark catalog and write the results.
    ///
    /// Results are written as JSON to `--output` and optionally as
    /// Markdown to `--summary` and `--detailed`; a summary table is printed
    /// to the console.
    Run(RunArgs),

    /// List the benchmarks of a catalog.
    List {
        /// Built-in catalog name or path to a JSON catalog.
        #[arg(long, default_value = "nebula")]
        catalog: String,
    },

    /// Print size and schema information for the tables of a database.
    Tables {
        /// Connection settings.
        #[command(flatten)]
        connection: ConnectionArgs,
    },
}

/// Arguments of the `run` command.
#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Built-in catalog name or path to a JSON catalog.
    #[arg(long, default_value = "nebula")]
    pub catalog: String,

    /// Number of runs per benchmark.
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    pub runs: u32,

    /// JSON results file (default: <catalog>_benchmark_results.json).
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Also write a Markdown summary to this file.
    #[arg(long, value_name = "PATH")]
    pub summary: Option<PathBuf>,

    /// Also write a detailed Markdown report (per-run failures) to this file.
    #[arg(long, value_name = "PATH")]
    pub detailed: Option<PathBuf>,

    /// Benchmarks to skip; repeatable or comma separated.
    #[arg(long, value_name = "NAME", value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Per-benchmark memory limits as inline JSON or a JSON file path,
    /// e.g. '{"visits_table_scan_full": "9GB"}'.
    #[arg(long, value_name = "JSON|PATH")]
    pub memory_limits: Option<String>,

    /// Prior results file; benchmarks that fully succeeded there are kept as is.
    #[arg(long, value_name = "PATH")]
    pub retry_failed: Option<PathBuf>,

    /// Print table information before running.
    #[arg(long)]
    pub table_info: bool,

    /// Connection settings.
    #[command(flatten)]
    pub connection: ConnectionArgs,
}

/// Run the CLI with the process arguments.
///
/// # Returns
///
/// Returns `Ok(())` on success, or an error if the command fails.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    load_env_file(cli.env_file.as_deref())?;
    init_logging(cli.log_level.as_deref(), cli.log_json)?;

    match cli.command {
        Commands::Run(args) => run_benchmarks(args, cli.config.as_deref()).await,
        Commands::List { catalog } => {
            console::print_catalog(&load_catalog(&catalog)?);
            Ok(())
        }
        Commands::Tables { connection } => {
            let config = settings::load(cli.config.as_deref(), &connection)?;
            let gateway = ClickHouseGateway::connect(config)
                .await
                .context("failed to connect to ClickHouse")?;
            let tables = gateway
                .table_info(None)
                .await
                .context("failed to read table information")?;
            console::print_table_info(&tables);
            Ok(())
        }
    }
}

fn load_env_file(path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("failed to load environment file {}", path.display()))?;
        }
        None => {
            // A missing default .env is fine.
            dotenvy::dotenv().ok();
        }
    }
    Ok(())
}

fn init_logging(level: Option<&str>, json: bool) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).context("invalid --log-level")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow!("failed to initialise logging: {}", e))
}

fn load_catalog(source: &str) -> Result<BenchmarkCatalog> {
    if let Some(builtin) = catalog::builtin(source) {
        return Ok(builtin);
    }
    let path = Path::new(source);
    if !path.exists() {
        return Err(anyhow!(
            "unknown catalog '{}': expected one of {:?} or a JSON file path",
            source,
            catalog::BUILTIN_CATALOGS
        ));
    }
    BenchmarkCatalog::from_json_file(path)
        .with_context(|| format!("failed to load catalog {}", path.display()))
}

/// Default results path for a catalog argument: `nebula` and
/// `queries/custom.json` become `nebula_benchmark_results.json` and
/// `custom_benchmark_results.json`.
fn default_output(catalog_source: &str) -> PathBuf {
    let stem = Path::new(catalog_source)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("custom");
    PathBuf::from(format!("{}_benchmark_results.json", stem))
}

async fn run_benchmarks(args: RunArgs, config_file: Option<&Path>) -> Result<()> {
    let catalog = load_catalog(&args.catalog)?;

    let mut policy = RunPolicy::new().skip_all(
        args.skip
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty()),
    );
    if let Some(source) = &args.memory_limits {
        policy = io::read_memory_limits(policy, source).context("failed to read memory limits")?;
    }
    if let Some(path) = &args.retry_failed {
        let prior = io::read_report_json(path)
            .with_context(|| format!("failed to read prior results {}", path.display()))?;
        let pending = prior.needing_retry().count();
        info!(
            path = %path.display(),
            pending,
            "Retrying benchmarks that failed or were skipped previously"
        );
        if pending == 0 {
            warn!("No failed benchmarks in prior results; only benchmarks missing from them will run");
        }
        policy = policy.retry_only(prior);
    }
    // Surface bad limits before connecting.
    policy
        .resolve_memory_limits()
        .context("invalid memory limits")?;

    let connection = settings::load(config_file, &args.connection)?;
    let gateway = ClickHouseGateway::connect(connection)
        .await
        .context("failed to connect to ClickHouse")?;

    if args.table_info {
        match gateway.table_info(None).await {
            Ok(tables) => console::print_table_info(&tables),
            Err(e) => warn!(error = %e, "Failed to read table information"),
        }
    }

    let orchestrator = BenchmarkOrchestrator::new(gateway);
    let report = orchestrator.run(&catalog, args.runs, &policy).await?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.catalog));
    io::write_all_outputs(
        &report,
        &output,
        args.summary.as_deref(),
        args.detailed.as_deref(),
    )
        .with_context(|| format!("failed to write results to {}", output.display()))?;

    console::print_summary(&report);
    info!(output = %output.display(), "Benchmark results saved");
    if let Some(summary) = &args.summary {
        info!(summary = %summary.display(), "Markdown summary saved");
    }
    if let Some(detailed) = &args.detailed {
        info!(detailed = %detailed.display(), "Detailed report saved");
    }
    Ok(())
}
