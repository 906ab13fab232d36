// Copyright 2025 QueryBench Contributors
// SPDX-License-Identifier: Apache-2.0

//! The execution boundary between the orchestrator and a database driver.

use crate::outcome::QueryOutcome;
use async_trait::async_trait;

/// Executes one benchmark query against a backend.
///
/// Implement this trait for every database a benchmark should run against.
/// Implementations must enforce `memory_limit_bytes` query-side when it is
/// given, and must never fail outside the returned [`QueryOutcome`]: driver
/// errors are classified (see [`crate::classify`]) and returned as
/// [`QueryOutcome::Failure`]. Timeouts are the gateway's responsibility and
/// are surfaced as [`crate::ErrorKind::Timeout`] failures.
#[async_trait]
pub trait ExecutionGateway: Send + Sync {
    /// Name of the backend, recorded in reports (e.g. `ClickHouse`).
    fn backend_name(&self) -> &str;

    /// Execute `query` once, optionally capped at `memory_limit_bytes`.
    async fn execute(&self, query: &str, memory_limit_bytes: Option<u64>) -> QueryOutcome;
}

#[async_trait]
impl<G: ExecutionGateway + ?Sized> ExecutionGateway for Box<G> {
    fn backend_name(&self) -> &str {
        (**self).backend_name()
    }

    async fn execute(&self, query: &str, memory_limit_bytes: Option<u64>) -> QueryOutcome {
        (**self).execute(query, memory_limit_bytes).await
    }
}

#[async_trait]
impl<G: ExecutionGateway + ?Sized> ExecutionGateway for std::sync::Arc<G> {
    fn backend_name(&self) -> &str {
        (**self).backend_name()
    }

    async fn execute(&self, query: &str, memory_limit_bytes: Option<u64>) -> QueryOutcome {
        (**self).execute(query, memory_limit_bytes).await
    }
}
