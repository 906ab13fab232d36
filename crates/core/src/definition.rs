// Copyright 2025 QueryBench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Benchmark definitions.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// A named, repeatable benchmark query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkDefinition {
    /// Name, unique within a catalog.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Query text, passed to the gateway unmodified.
    pub query: String,
    /// Default memory ceiling for this benchmark.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_limit_bytes: Option<u64>,
}

impl BenchmarkDefinition {
    /// Create a definition without a memory limit.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            query: query.into(),
            memory_limit_bytes: None,
        }
    }

    /// Create a new builder.
    pub fn builder() -> BenchmarkDefinitionBuilder {
        BenchmarkDefinitionBuilder::default()
    }

    /// Set the default memory ceiling.
    pub fn with_memory_limit(mut self, bytes: u64) -> Self {
        self.memory_limit_bytes = Some(bytes);
        self
    }

    /// Check that name and query are present.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::invalid_definition("name is required"));
        }
        if self.query.trim().is_empty() {
            return Err(ConfigError::invalid_definition(format!(
                "query is required for benchmark {}",
                self.name
            )));
        }
        Ok(())
    }
}

/// Builder for [`BenchmarkDefinition`] instances.
#[derive(Default)]
pub struct BenchmarkDefinitionBuilder {
    name: Option<String>,
    description: String,
    query: Option<String>,
    memory_limit_bytes: Option<u64>,
}

impl BenchmarkDefinitionBuilder {
    /// Set the name (required).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description (default: empty).
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the query text (required).
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Set the default memory ceiling in bytes.
    pub fn memory_limit_bytes(mut self, bytes: u64) -> Self {
        self.memory_limit_bytes = Some(bytes);
        self
    }

    /// Build the [`BenchmarkDefinition`]. Returns `Err` if required fields are missing.
    pub fn build(self) -> Result<BenchmarkDefinition> {
        let name = self
            .name
            .ok_or_else(|| ConfigError::invalid_definition("name is required"))?;
        let query = self.query.ok_or_else(|| {
            ConfigError::invalid_definition(format!("query is required for benchmark {}", name))
        })?;

        let definition = BenchmarkDefinition {
            name,
            description: self.description,
            query,
            memory_limit_bytes: self.memory_limit_bytes,
        };
        definition.validate()?;
        Ok(definition)
    }
}
