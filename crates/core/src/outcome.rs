// Copyright 2025 QueryBench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-run measurement and outcome types.
//!
//! Every attempted run of a benchmark query produces exactly one
//! [`QueryOutcome`]: either a [`MetricSample`] for a run that completed
//! without error, or a classified [`FailureRecord`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Raw measurements of one successful query execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Wall-clock execution time in seconds.
    pub elapsed_seconds: f64,
    /// Peak memory used by the query, in bytes.
    pub memory_bytes: u64,
    /// Rows read from storage.
    pub rows_read: u64,
    /// Bytes read from storage.
    pub bytes_read: u64,
    /// Rows written.
    pub rows_written: u64,
    /// Bytes written.
    pub bytes_written: u64,
    /// Rows in the result set.
    pub result_rows: u64,
    /// Bytes in the result set.
    pub result_bytes: u64,
}

impl MetricSample {
    /// Create a sample with only the elapsed time set.
    ///
    /// Negative or non-finite durations cannot be represented by [`Duration`],
    /// so the elapsed time is always non-negative.
    pub fn from_elapsed(elapsed: Duration) -> Self {
        Self {
            elapsed_seconds: elapsed.as_secs_f64(),
            ..Self::default()
        }
    }

    /// Set the memory usage.
    pub fn with_memory(mut self, memory_bytes: u64) -> Self {
        self.memory_bytes = memory_bytes;
        self
    }
}

/// Classified category of a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// The query exceeded its memory ceiling.
    MemoryLimitExceeded,
    /// The query or connection timed out.
    Timeout,
    /// The backend rejected the query as malformed.
    QueryError,
    /// Transport or authentication failure.
    ConnectionError,
    /// Anything not matching a known pattern.
    Unknown,
}

impl ErrorKind {
    /// Wire name of this kind, e.g. `MEMORY_LIMIT_EXCEEDED`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MemoryLimitExceeded => "MEMORY_LIMIT_EXCEEDED",
            Self::Timeout => "TIMEOUT",
            Self::QueryError => "QUERY_ERROR",
            Self::ConnectionError => "CONNECTION_ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Failure category.
    pub error_kind: ErrorKind,
    /// Raw error text, verbatim.
    pub message: String,
    /// Kind-specific fields, e.g. requested/current/maximum memory.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,
    /// Optimization advice; only populated for memory-limit failures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl FailureRecord {
    /// Create a failure record with no details or suggestions.
    pub fn new(error_kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            error_kind,
            message: message.into(),
            details: BTreeMap::new(),
            suggestions: Vec::new(),
        }
    }

    /// Add a detail entry.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Result of one execution attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryOutcome {
    /// The run completed and produced measurements.
    Success(MetricSample),
    /// The run failed.
    Failure(FailureRecord),
}

impl QueryOutcome {
    /// Whether this outcome is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The sample, if the run succeeded.
    pub fn sample(&self) -> Option<&MetricSample> {
        match self {
            Self::Success(sample) => Some(sample),
            Self::Failure(_) => None,
        }
    }

    /// The failure record, if the run failed.
    pub fn failure(&self) -> Option<&FailureRecord> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure),
        }
    }
}

impl From<MetricSample> for QueryOutcome {
    fn from(sample: MetricSample) -> Self {
        Self::Success(sample)
    }
}

impl From<FailureRecord> for QueryOutcome {
    fn from(failure: FailureRecord) -> Self {
        Self::Failure(failure)
    }
}
