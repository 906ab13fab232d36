// Copyright 2025 QueryBench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration errors.
//!
//! These are structural problems detected before any benchmark runs start.
//! Failures of individual query runs are never errors; they are recorded as
//! [`crate::FailureRecord`] data.

use thiserror::Error;

/// Structural misconfiguration that aborts a benchmark session up front.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Runs per benchmark must be at least one.
    #[error("Invalid run count {0}: at least one run per benchmark is required")]
    InvalidRunCount(u32),

    /// A memory limit entry could not be parsed.
    #[error("Invalid memory limit for {name}: {value:?} ({reason})")]
    InvalidMemoryLimit {
        /// Benchmark the limit belongs to.
        name: String,
        /// The value as written.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A memory limits document is not a JSON object of sizes.
    #[error("Invalid memory limits: {0}")]
    InvalidMemoryLimits(String),

    /// Two definitions in one catalog share a name.
    #[error("Duplicate benchmark name: {0}")]
    DuplicateBenchmark(String),

    /// A benchmark definition is missing required fields.
    #[error("Invalid benchmark definition: {0}")]
    InvalidDefinition(String),

    /// A catalog document could not be read.
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),
}

impl ConfigError {
    /// Create an invalid definition error.
    pub fn invalid_definition(msg: impl Into<String>) -> Self {
        Self::InvalidDefinition(msg.into())
    }

    /// Create an invalid catalog error.
    pub fn invalid_catalog(msg: impl Into<String>) -> Self {
        Self::InvalidCatalog(msg.into())
    }
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
