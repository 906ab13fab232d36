//! Benchmark orchestration for QueryBench.
//!
//! This crate runs named query catalogs against a database through an
//! [`ExecutionGateway`](querybench_core::ExecutionGateway), repeating every
//! query a fixed number of times, and collects the outcomes into a
//! [`Report`].
//!
//! # Quick Start
//!
//! ```no_run
//! use querybench_benchmarks::{catalog, BenchmarkOrchestrator, RunPolicy};
//! # async fn example(gateway: impl querybench_core::ExecutionGateway) -> querybench_core::Result<()> {
//! let orchestrator = BenchmarkOrchestrator::new(gateway);
//! let catalog = catalog::nebula();
//! let policy = RunPolicy::new().skip("crawls_table_scan_full").memory_limit("visits_table_scan_full", "9GB");
//!
//! let report = orchestrator.run(&catalog, 3, &policy).await?;
//! for benchmark in &report.benchmarks {
//!     println!("{}: {} ok, {} failed", benchmark.name(), benchmark.success_count(), benchmark.failure_count());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`catalog`] - Benchmark catalogs and their loaders
//! - [`policy`] - Skip, memory limit and retry-only policy
//! - [`orchestrator`] - The run loop
//! - [`result`] - `BenchmarkAggregate` and `Report`
//! - [`io`] - Reading and writing reports
//! - [`markdown`] - Markdown report generation

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod catalog;
pub mod io;
pub mod markdown;
pub mod orchestrator;
pub mod policy;
pub mod result;

pub use catalog::BenchmarkCatalog;
pub use orchestrator::BenchmarkOrchestrator;
pub use policy::RunPolicy;
pub use result::{BenchmarkAggregate, Report};
