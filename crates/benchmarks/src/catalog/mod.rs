//! Benchmark catalogs.
//!
//! A catalog is an ordered set of [`BenchmarkDefinition`]s with unique
//! names. Catalogs are plain data and can be populated from:
//!
//! - the built-in tables (see [`builtin`]),
//! - a JSON document ([`BenchmarkCatalog::from_json_str`], [`BenchmarkCatalog::from_json_file`]),
//! - code ([`BenchmarkCatalog::add`], [`BenchmarkCatalog::add_query`]).
//!
//! # JSON format
//!
//! Either a bare array of definitions or an object with a name:
//!
//! ```json
//! {
//!   "name": "my_custom_benchmarks",
//!   "description": "Queries for specific use cases",
//!   "benchmarks": [
//!     { "name": "simple_system_query", "query": "SELECT * FROM system.numbers LIMIT 1000" },
//!     { "name": "large_aggregation", "query": "SELECT ...", "memory_limit": "9GB" }
//!   ]
//! }
//! ```

mod nebula;

pub use nebula::nebula;

use querybench_core::size::parse_memory_limit;
use querybench_core::{BenchmarkDefinition, ConfigError, Result};
use serde::Deserialize;
use std::path::Path;

/// Names of the built-in catalogs.
pub const BUILTIN_CATALOGS: &[&str] = &["nebula"];

/// Look up a built-in catalog by name.
pub fn builtin(name: &str) -> Option<BenchmarkCatalog> {
    match name {
        "nebula" => Some(nebula()),
        _ => None,
    }
}

/// Ordered collection of uniquely named benchmark definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkCatalog {
    name: String,
    description: String,
    definitions: Vec<BenchmarkDefinition>,
}

impl BenchmarkCatalog {
    /// Create an empty catalog.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            definitions: Vec::new(),
        }
    }

    /// Catalog name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Catalog description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// All definitions in catalog order.
    pub fn definitions(&self) -> &[BenchmarkDefinition] {
        &self.definitions
    }

    /// Look up a definition by name.
    pub fn get(&self, name: &str) -> Option<&BenchmarkDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    /// Whether a definition with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Append a definition, rejecting invalid definitions and duplicate names.
    pub fn add(&mut self, definition: BenchmarkDefinition) -> Result<()> {
        definition.validate()?;
        if self.contains(&definition.name) {
            return Err(ConfigError::DuplicateBenchmark(definition.name));
        }
        self.definitions.push(definition);
        Ok(())
    }

    /// Append a query by name.
    pub fn add_query(
        &mut self,
        name: impl Into<String>,
        query: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<()> {
        self.add(BenchmarkDefinition::new(name, description, query))
    }

    /// Parse a catalog from a JSON document.
    ///
    /// A bare array gets the catalog name `custom`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_document(json, "custom")
    }

    /// Read a catalog from a JSON file.
    ///
    /// A bare array gets the file stem as catalog name.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::invalid_catalog(format!("cannot read {}: {}", path.display(), e))
        })?;
        let fallback = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "custom".to_string());
        Self::from_document(&content, &fallback)
    }

    fn from_document(json: &str, fallback_name: &str) -> Result<Self> {
        let document: CatalogDocument =
            serde_json::from_str(json).map_err(|e| ConfigError::invalid_catalog(e.to_string()))?;

        let (mut catalog, records) = match document {
            CatalogDocument::Named {
                name,
                description,
                benchmarks,
            } => (Self::new(name, description), benchmarks),
            CatalogDocument::Bare(benchmarks) => {
                (Self::new(fallback_name, "Custom benchmark queries"), benchmarks)
            }
        };

        for record in records {
            catalog.add(record.into_definition()?)?;
        }
        Ok(catalog)
    }
}

impl<'a> IntoIterator for &'a BenchmarkCatalog {
    type Item = &'a BenchmarkDefinition;
    type IntoIter = std::slice::Iter<'a, BenchmarkDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.definitions.iter()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Named {
        name: String,
        #[serde(default)]
        description: String,
        benchmarks: Vec<DefinitionRecord>,
    },
    Bare(Vec<DefinitionRecord>),
}

#[derive(Deserialize)]
struct DefinitionRecord {
    #[serde(default)]
    name: String,
    #[serde(default)]
    query: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    memory_limit: Option<serde_json::Value>,
}

impl DefinitionRecord {
    fn into_definition(self) -> Result<BenchmarkDefinition> {
        let memory_limit_bytes = self
            .memory_limit
            .as_ref()
            .map(|value| parse_memory_limit(&self.name, value))
            .transpose()?;

        let mut builder = BenchmarkDefinition::builder()
            .name(self.name)
            .description(self.description)
            .query(self.query);
        if let Some(bytes) = memory_limit_bytes {
            builder = builder.memory_limit_bytes(bytes);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_query_preserves_order() {
        let mut catalog = BenchmarkCatalog::new("my_custom_benchmarks", "custom");
        catalog
            .add_query("simple_system_query", "SELECT * FROM system.numbers LIMIT 1000", "")
            .unwrap();
        catalog
            .add_query("memory_test_large_result", "SELECT * FROM visits LIMIT 100000", "")
            .unwrap();

        let names: Vec<_> = catalog.definitions().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["simple_system_query", "memory_test_large_result"]);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut catalog = BenchmarkCatalog::new("c", "");
        catalog.add_query("q1", "SELECT 1", "").unwrap();
        let err = catalog.add_query("q1", "SELECT 2", "").unwrap_err();
        assert_eq!(err, ConfigError::DuplicateBenchmark("q1".to_string()));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_from_json_named_document() {
        let catalog = BenchmarkCatalog::from_json_str(
            r#"{
                "name": "mine",
                "description": "My queries",
                "benchmarks": [
                    {"name": "q1", "query": "SELECT 1", "description": "one"},
                    {"name": "q2", "query": "SELECT 2", "memory_limit": "512MB"},
                    {"name": "q3", "query": "SELECT 3", "memory_limit": 1048576}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(catalog.name(), "mine");
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get("q1").unwrap().description, "one");
        assert_eq!(catalog.get("q2").unwrap().memory_limit_bytes, Some(512 * 1024 * 1024));
        assert_eq!(catalog.get("q3").unwrap().memory_limit_bytes, Some(1_048_576));
    }

    #[test]
    fn test_from_json_bare_array() {
        let catalog =
            BenchmarkCatalog::from_json_str(r#"[{"name": "q1", "query": "SELECT 1"}]"#).unwrap();
        assert_eq!(catalog.name(), "custom");
        assert_eq!(catalog.get("q1").unwrap().description, "");
    }

    #[test]
    fn test_from_json_rejects_bad_definitions() {
        assert!(matches!(
            BenchmarkCatalog::from_json_str(r#"[{"name": "q1"}]"#),
            Err(ConfigError::InvalidDefinition(_))
        ));
        assert!(matches!(
            BenchmarkCatalog::from_json_str(r#"[{"query": "SELECT 1"}]"#),
            Err(ConfigError::InvalidDefinition(_))
        ));
        assert!(matches!(
            BenchmarkCatalog::from_json_str(
                r#"[{"name": "q1", "query": "SELECT 1"}, {"name": "q1", "query": "SELECT 2"}]"#
            ),
            Err(ConfigError::DuplicateBenchmark(_))
        ));
        assert!(matches!(
            BenchmarkCatalog::from_json_str(r#"[{"name": "q1", "query": "SELECT 1", "memory_limit": "lots"}]"#),
            Err(ConfigError::InvalidMemoryLimit { .. })
        ));
        assert!(matches!(
            BenchmarkCatalog::from_json_str("not json"),
            Err(ConfigError::InvalidCatalog(_))
        ));
    }

    #[test]
    fn test_builtin_lookup() {
        assert!(builtin("nebula").is_some());
        assert!(builtin("unknown").is_none());
        for name in BUILTIN_CATALOGS {
            assert!(builtin(name).is_some());
        }
    }
}
