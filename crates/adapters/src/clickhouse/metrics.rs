// Copyright 2025 QueryBench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Server-side query counters.
//!
//! ClickHouse reports per-query counters in two places: the
//! `X-ClickHouse-Summary` response header and `system.query_log`. Both encode
//! 64-bit integers as JSON strings, so every counter accepts either a string
//! or a number.

use querybench_core::MetricSample;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::time::Duration;

/// Name of the response header carrying the query summary.
pub const SUMMARY_HEADER: &str = "X-ClickHouse-Summary";

/// Counters reported by the server for one query. Absent counters are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServerCounters {
    /// Peak memory usage.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub memory_usage: Option<u64>,
    /// Rows read.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub read_rows: Option<u64>,
    /// Bytes read.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub read_bytes: Option<u64>,
    /// Rows written.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub written_rows: Option<u64>,
    /// Bytes written.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub written_bytes: Option<u64>,
    /// Result rows.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub result_rows: Option<u64>,
    /// Result bytes.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub result_bytes: Option<u64>,
}

/// Accept `"123"`, `123`, negative numbers (clamped to 0) and `null`.
fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|v| v.max(0) as u64))
            .or_else(|| n.as_f64().map(|v| v.max(0.0) as u64)),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .ok()
            .or_else(|| s.trim().parse::<i64>().ok().map(|v| v.max(0) as u64)),
        _ => None,
    })
}

impl ServerCounters {
    /// Parse the `X-ClickHouse-Summary` header value.
    pub fn from_summary_header(value: &str) -> Option<Self> {
        serde_json::from_str(value).ok()
    }

    /// Parse the first row of a `FORMAT JSONEachRow` response.
    pub fn from_json_each_row(body: &str) -> Option<Self> {
        body.lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .and_then(|line| serde_json::from_str(line).ok())
    }

    /// Overwrite counters with the ones present in `other`.
    pub fn merge(&mut self, other: &ServerCounters) {
        let pairs = [
            (&mut self.memory_usage, other.memory_usage),
            (&mut self.read_rows, other.read_rows),
            (&mut self.read_bytes, other.read_bytes),
            (&mut self.written_rows, other.written_rows),
            (&mut self.written_bytes, other.written_bytes),
            (&mut self.result_rows, other.result_rows),
            (&mut self.result_bytes, other.result_bytes),
        ];
        for (target, value) in pairs {
            if value.is_some() {
                *target = value;
            }
        }
    }

    /// Build a sample, falling back to client-side figures for the result
    /// size when the server did not report it.
    pub fn to_sample(&self, elapsed: Duration, body: &str) -> MetricSample {
        MetricSample {
            rows_read: self.read_rows.unwrap_or(0),
            bytes_read: self.read_bytes.unwrap_or(0),
            rows_written: self.written_rows.unwrap_or(0),
            bytes_written: self.written_bytes.unwrap_or(0),
            result_rows: self
                .result_rows
                .unwrap_or_else(|| body.lines().count() as u64),
            result_bytes: self.result_bytes.unwrap_or(body.len() as u64),
            ..MetricSample::from_elapsed(elapsed).with_memory(self.memory_usage.unwrap_or(0))
        }
    }
}
