// Copyright 2025 QueryBench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Failure classification.
//!
//! Gateways convert whatever their driver reports into a [`RawError`] and
//! call [`classify`], which maps it onto exactly one [`ErrorKind`]. The
//! mapping is total: unrecognized input becomes [`ErrorKind::Unknown`] with
//! the raw text preserved.
//!
//! Error codes follow the ClickHouse server numbering, which is also what
//! the text form `Code: 241. DB::Exception: ...` carries.

use crate::outcome::{ErrorKind, FailureRecord};
use crate::size::{format_bytes, parse_byte_size};
use once_cell::sync::Lazy;
use regex::Regex;

/// Backend codes for memory limit violations.
const MEMORY_CODES: &[i32] = &[241];
/// Backend codes for execution time limits.
const TIMEOUT_CODES: &[i32] = &[159, 160];
/// Backend codes for authentication and user lookup failures.
const CONNECTION_CODES: &[i32] = &[192, 193, 194, 195, 516];
/// Backend codes for malformed or unresolvable queries.
const QUERY_CODES: &[i32] = &[36, 43, 46, 47, 60, 62, 81, 386];

/// Static advice attached to every memory limit failure.
pub const MEMORY_SUGGESTIONS: [&str; 5] = [
    "Add a LIMIT clause to reduce the number of rows processed",
    "Break the query into smaller subqueries or process the data in batches",
    "Add more selective WHERE predicates to narrow the scanned range",
    "Use approximate aggregate functions (e.g. uniq instead of uniqExact)",
    "Select only the columns you need instead of SELECT *",
];

static CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Code:\s*(\d+)").unwrap());
static MEMORY_TEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)MEMORY_LIMIT_EXCEEDED|memory limit .*exceeded").unwrap());
static TIMEOUT_TEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)TIMEOUT_EXCEEDED|TOO_SLOW|timed out|timeout (exceeded|expired)").unwrap());
static CONNECTION_TEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)AUTHENTICATION_FAILED|UNKNOWN_USER|WRONG_PASSWORD|REQUIRED_PASSWORD|connection (refused|reset|closed)|broken pipe|dns error",
    )
    .unwrap()
});
static QUERY_TEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"SYNTAX_ERROR|UNKNOWN_IDENTIFIER|UNKNOWN_TABLE|UNKNOWN_FUNCTION|UNKNOWN_DATABASE|ILLEGAL_TYPE_OF_ARGUMENT|BAD_ARGUMENTS|CANNOT_PARSE_TEXT",
    )
    .unwrap()
});

static REQUESTED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"attempt to allocate chunk of (\d+) bytes").unwrap());
static WOULD_USE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"would use ([\d.]+\s*[KMGTP]?i?B)").unwrap());
static CURRENT_RSS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"current RSS:? ([\d.]+\s*[KMGTP]?i?B)").unwrap());
static MAXIMUM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"maximum:? ([\d.]+\s*[KMGTP]?i?B)").unwrap());

/// An unclassified error as reported by a driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawError {
    /// The backend executed the request and reported an exception.
    Backend {
        /// Numeric exception code, when the driver exposes it separately.
        code: Option<i32>,
        /// Exception text.
        message: String,
    },
    /// The request did not complete at the transport level.
    Transport {
        /// Transport error text.
        message: String,
        /// Whether the failure was a client-side timeout.
        timed_out: bool,
    },
    /// Free-form error text with no further structure.
    Other(String),
}

impl RawError {
    /// Create a backend error.
    pub fn backend(code: Option<i32>, message: impl Into<String>) -> Self {
        Self::Backend {
            code,
            message: message.into(),
        }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>, timed_out: bool) -> Self {
        Self::Transport {
            message: message.into(),
            timed_out,
        }
    }

    /// The raw message text.
    pub fn message(&self) -> &str {
        match self {
            Self::Backend { message, .. } | Self::Transport { message, .. } => message,
            Self::Other(message) => message,
        }
    }

    /// The backend code, either supplied or recovered from the text.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Backend {
                code: Some(code), ..
            } => Some(*code),
            Self::Transport { .. } => None,
            _ => CODE_RE
                .captures(self.message())
                .and_then(|c| c[1].parse().ok()),
        }
    }
}

/// The kind a known backend code maps to.
fn kind_for_code(code: i32) -> Option<ErrorKind> {
    [
        (MEMORY_CODES, ErrorKind::MemoryLimitExceeded),
        (TIMEOUT_CODES, ErrorKind::Timeout),
        (CONNECTION_CODES, ErrorKind::ConnectionError),
        (QUERY_CODES, ErrorKind::QueryError),
    ]
    .into_iter()
    .find(|(codes, _)| codes.contains(&code))
    .map(|(_, kind)| kind)
}

/// Determine the error kind for a raw error.
///
/// A known backend code decides on its own. Message text is only consulted
/// when there is no code or the code is not in any table, since messages
/// may quote arbitrary query fragments.
pub fn classify_kind(error: &RawError) -> ErrorKind {
    if let Some(kind) = error.code().and_then(kind_for_code) {
        return kind;
    }

    let message = error.message();
    if MEMORY_TEXT_RE.is_match(message) {
        return ErrorKind::MemoryLimitExceeded;
    }

    if let RawError::Transport { timed_out, .. } = error {
        return if *timed_out {
            ErrorKind::Timeout
        } else {
            ErrorKind::ConnectionError
        };
    }

    if TIMEOUT_TEXT_RE.is_match(message) {
        ErrorKind::Timeout
    } else if CONNECTION_TEXT_RE.is_match(message) {
        ErrorKind::ConnectionError
    } else if QUERY_TEXT_RE.is_match(message) {
        ErrorKind::QueryError
    } else {
        ErrorKind::Unknown
    }
}

/// Classify a raw error into a complete [`FailureRecord`].
///
/// Memory limit failures additionally carry the memory figures found in the
/// message and the fixed list of [`MEMORY_SUGGESTIONS`].
pub fn classify(error: &RawError) -> FailureRecord {
    let kind = classify_kind(error);
    let mut record = FailureRecord::new(kind, error.message());

    if kind == ErrorKind::MemoryLimitExceeded {
        extract_memory_details(error.message(), &mut record);
        record.suggestions = MEMORY_SUGGESTIONS.iter().map(|s| s.to_string()).collect();
    }

    record
}

fn extract_memory_details(message: &str, record: &mut FailureRecord) {
    if let Some(bytes) = REQUESTED_RE
        .captures(message)
        .and_then(|c| c[1].parse::<u64>().ok())
    {
        insert_size(record, "requested_memory", bytes);
    }

    for (field, re) in [
        ("would_use", &WOULD_USE_RE),
        ("current_rss", &CURRENT_RSS_RE),
        ("maximum_memory", &MAXIMUM_RE),
    ] {
        if let Some(bytes) = re
            .captures(message)
            .and_then(|c| parse_byte_size(&c[1]).ok())
        {
            insert_size(record, field, bytes);
        }
    }
}

fn insert_size(record: &mut FailureRecord, field: &str, bytes: u64) {
    record
        .details
        .insert(field.to_string(), format_bytes(bytes));
    record
        .details
        .insert(format!("{}_bytes", field), bytes.to_string());
}
