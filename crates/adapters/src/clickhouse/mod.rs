// Copyright 2025 QueryBench Contributors
// SPDX-License-Identifier: Apache-2.0

//! ClickHouse execution gateway.
//!
//! Talks to ClickHouse over its HTTP(S) interface and implements
//! [`ExecutionGateway`](querybench_core::ExecutionGateway) for the benchmark
//! orchestrator.
//!
//! # Features
//!
//! - Per-query memory ceiling through the `max_memory_usage` setting
//! - Optional mark and uncompressed cache drops before every run
//! - Client-side wall-clock timing
//! - Server counters from `X-ClickHouse-Summary` and `system.query_log`
//! - Failures classified into error kinds with memory diagnostics
//! - Table size and schema inspection
//!
//! # Example
//!
//! ```no_run
//! use querybench_adapters::clickhouse::{ClickHouseConfig, ClickHouseGateway};
//! use querybench_core::ExecutionGateway;
//!
//! # async fn example() -> querybench_adapters::clickhouse::Result<()> {
//! let gateway = ClickHouseGateway::connect(ClickHouseConfig::new("localhost")).await?;
//! let outcome = gateway.execute("SELECT count() FROM system.numbers LIMIT 10", Some(1 << 30)).await;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```

mod config;
mod gateway;
mod metrics;
mod tables;

pub use config::{ClickHouseConfig, DEFAULT_PORT};
pub use gateway::ClickHouseGateway;
pub use metrics::{ServerCounters, SUMMARY_HEADER};
pub use tables::{ColumnInfo, TableInfo};

use querybench_core::{ErrorKind, FailureRecord};
use thiserror::Error;

/// ClickHouse adapter errors.
#[derive(Debug, Error)]
pub enum ClickHouseError {
    /// The connection settings are unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// A statement failed on the server or in transit.
    #[error("{kind}: {message}")]
    Query {
        /// Classified error kind.
        kind: ErrorKind,
        /// Raw error message.
        message: String,
    },

    /// The server answered with something that could not be decoded.
    #[error("Unexpected response: {0}")]
    Response(String),
}

impl From<FailureRecord> for ClickHouseError {
    fn from(failure: FailureRecord) -> Self {
        ClickHouseError::Query {
            kind: failure.error_kind,
            message: failure.message,
        }
    }
}

/// Result type for ClickHouse operations.
pub type Result<T> = std::result::Result<T, ClickHouseError>;
