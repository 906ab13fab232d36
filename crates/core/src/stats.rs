// Copyright 2025 QueryBench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Summary statistics over successful runs.
//!
//! Standard deviation is the population form (squared deviations divided by
//! the sample count): the executed runs are the whole population of
//! interest. Statistics exist only for non-empty input; callers get `None`
//! instead of zeros when nothing succeeded.

use crate::outcome::MetricSample;
use serde::{Deserialize, Serialize};

/// Mean, spread and range of one metric field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation.
    pub stddev: f64,
    /// Smallest observed value.
    pub min: f64,
    /// Largest observed value.
    pub max: f64,
}

impl FieldStats {
    /// Compute statistics over `values`, or `None` if empty.
    ///
    /// Uses Welford's running update, so a set of identical values yields a
    /// mean equal to that value and a standard deviation of exactly zero.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let (&first, rest) = values.split_first()?;

        let mut mean = first;
        let mut m2 = 0.0;
        let mut min = first;
        let mut max = first;
        for (i, &value) in rest.iter().enumerate() {
            let count = (i + 2) as f64;
            let delta = value - mean;
            mean += delta / count;
            m2 += delta * (value - mean);
            min = min.min(value);
            max = max.max(value);
        }

        let variance = (m2 / values.len() as f64).max(0.0);
        Some(Self {
            mean,
            stddev: variance.sqrt(),
            min,
            max,
        })
    }
}

/// Per-field statistics over a set of [`MetricSample`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleStatistics {
    /// Number of samples the statistics were computed from.
    pub sample_count: usize,
    /// Elapsed time in seconds.
    pub elapsed_seconds: FieldStats,
    /// Memory usage in bytes.
    pub memory_bytes: FieldStats,
    /// Rows read.
    pub rows_read: FieldStats,
    /// Bytes read.
    pub bytes_read: FieldStats,
    /// Rows written.
    pub rows_written: FieldStats,
    /// Bytes written.
    pub bytes_written: FieldStats,
    /// Result rows.
    pub result_rows: FieldStats,
    /// Result bytes.
    pub result_bytes: FieldStats,
}

/// Aggregate a sequence of samples into per-field statistics.
///
/// Returns `None` when `samples` is empty.
pub fn aggregate<'a, I>(samples: I) -> Option<SampleStatistics>
where
    I: IntoIterator<Item = &'a MetricSample>,
{
    let samples: Vec<&MetricSample> = samples.into_iter().collect();
    if samples.is_empty() {
        return None;
    }

    let field = |get: fn(&MetricSample) -> f64| {
        let values: Vec<f64> = samples.iter().map(|s| get(s)).collect();
        FieldStats::from_values(&values)
    };

    Some(SampleStatistics {
        sample_count: samples.len(),
        elapsed_seconds: field(|s| s.elapsed_seconds)?,
        memory_bytes: field(|s| s.memory_bytes as f64)?,
        rows_read: field(|s| s.rows_read as f64)?,
        bytes_read: field(|s| s.bytes_read as f64)?,
        rows_written: field(|s| s.rows_written as f64)?,
        bytes_written: field(|s| s.bytes_written as f64)?,
        result_rows: field(|s| s.result_rows as f64)?,
        result_bytes: field(|s| s.result_bytes as f64)?,
    })
}
