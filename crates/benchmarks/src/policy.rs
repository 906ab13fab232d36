//! Execution policy for a benchmark session.

use crate::result::Report;
use querybench_core::size::parse_memory_limit;
use querybench_core::{ConfigError, Result};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Which benchmarks run and under which memory limits.
///
/// Memory limits are kept as written by the user (`"9GB"`, `"8589934592"`)
/// and parsed when a session starts, so a malformed entry aborts the session
/// before any query is sent.
#[derive(Debug, Clone, Default)]
pub struct RunPolicy {
    /// Benchmarks recorded as skipped without being executed.
    pub skip_names: BTreeSet<String>,
    /// Per-benchmark memory limits overriding catalog defaults.
    pub memory_limits: BTreeMap<String, Value>,
    /// Prior report; only benchmarks that did not fully succeed in it are re-run.
    pub retry_only: Option<Report>,
}

impl RunPolicy {
    /// Create a policy that runs everything without limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip a benchmark by name.
    pub fn skip(mut self, name: impl Into<String>) -> Self {
        self.skip_names.insert(name.into());
        self
    }

    /// Skip several benchmarks by name.
    pub fn skip_all<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Set a memory limit as a size string such as `"9GB"`.
    pub fn memory_limit(mut self, name: impl Into<String>, size: impl Into<String>) -> Self {
        self.memory_limits
            .insert(name.into(), Value::String(size.into()));
        self
    }

    /// Set a memory limit in bytes.
    pub fn memory_limit_bytes(mut self, name: impl Into<String>, bytes: u64) -> Self {
        self.memory_limits.insert(name.into(), Value::from(bytes));
        self
    }

    /// Merge memory limits from a JSON object of `name -> size`.
    pub fn memory_limits_json(mut self, json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| ConfigError::InvalidMemoryLimits(e.to_string()))?;
        match value {
            Value::Object(map) => {
                self.memory_limits.extend(map);
                Ok(self)
            }
            other => Err(ConfigError::InvalidMemoryLimits(format!(
                "expected a JSON object, got {}",
                other
            ))),
        }
    }

    /// Only re-run benchmarks that did not fully succeed in `prior`.
    pub fn retry_only(mut self, prior: Report) -> Self {
        self.retry_only = Some(prior);
        self
    }

    /// Parse every memory limit into bytes.
    pub fn resolve_memory_limits(&self) -> Result<BTreeMap<String, u64>> {
        self.memory_limits
            .iter()
            .map(|(name, value)| Ok((name.clone(), parse_memory_limit(name, value)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_memory_limits() {
        let policy = RunPolicy::new()
            .memory_limit("q1", "9GB")
            .memory_limit_bytes("q2", 8_589_934_592)
            .memory_limit("q3", "8589934592");

        let limits = policy.resolve_memory_limits().unwrap();
        assert_eq!(limits["q1"], 9 * 1024 * 1024 * 1024);
        assert_eq!(limits["q2"], 8_589_934_592);
        assert_eq!(limits["q3"], 8_589_934_592);
    }

    #[test]
    fn test_malformed_limit_is_config_error() {
        let policy = RunPolicy::new().memory_limit("q1", "nine gigabytes");
        assert!(matches!(
            policy.resolve_memory_limits(),
            Err(ConfigError::InvalidMemoryLimit { ref name, .. }) if name == "q1"
        ));
    }

    #[test]
    fn test_memory_limits_json() {
        let policy = RunPolicy::new()
            .memory_limits_json(r#"{"q1": "512MB", "q2": 1024}"#)
            .unwrap();
        let limits = policy.resolve_memory_limits().unwrap();
        assert_eq!(limits["q1"], 512 * 1024 * 1024);
        assert_eq!(limits["q2"], 1024);

        assert!(matches!(
            RunPolicy::new().memory_limits_json(r#"["q1"]"#),
            Err(ConfigError::InvalidMemoryLimits(_))
        ));
        assert!(RunPolicy::new().memory_limits_json("{").is_err());
    }

    #[test]
    fn test_skip_all() {
        let policy = RunPolicy::new().skip_all(["a", "b"]).skip("c");
        assert_eq!(policy.skip_names.len(), 3);
        assert!(policy.skip_names.contains("b"));
    }
}
