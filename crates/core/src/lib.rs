// Copyright 2025 QueryBench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core types for QueryBench.
//!
//! This crate holds everything the benchmark orchestrator and the database
//! gateways share:
//!
//! - [`outcome`] - per-run samples, failure records and outcomes
//! - [`definition`] - benchmark definitions
//! - [`gateway`] - the [`ExecutionGateway`] boundary trait
//! - [`classify`] - mapping raw driver errors onto [`ErrorKind`]s
//! - [`stats`] - mean/stddev/min/max over successful samples
//! - [`size`] - byte-size parsing and formatting
//! - [`error`] - configuration errors

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod classify;
pub mod definition;
pub mod error;
pub mod gateway;
pub mod outcome;
pub mod size;
pub mod stats;

pub use classify::{classify, RawError};
pub use definition::BenchmarkDefinition;
pub use error::{ConfigError, Result};
pub use gateway::ExecutionGateway;
pub use outcome::{ErrorKind, FailureRecord, MetricSample, QueryOutcome};
pub use stats::{aggregate, FieldStats, SampleStatistics};
