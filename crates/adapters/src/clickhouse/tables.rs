// Copyright 2025 QueryBench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Table size and schema inspection.

use super::{ClickHouseGateway, Result};
use querybench_core::size::format_bytes;
use serde::{Deserialize, Serialize};

/// One column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// ClickHouse type, e.g. `LowCardinality(String)`.
    #[serde(rename = "type")]
    pub data_type: String,
    /// `DEFAULT`, `MATERIALIZED`, `ALIAS` or empty.
    #[serde(default)]
    pub default_kind: String,
    /// Default expression, empty when none.
    #[serde(default)]
    pub default_expression: String,
}

/// Size and schema of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    /// Table name.
    pub name: String,
    /// Bytes on disk over active parts.
    pub size_bytes: u64,
    /// `size_bytes` in binary units, e.g. `1.50 GiB`.
    pub size: String,
    /// Rows over active parts.
    pub total_rows: u64,
    /// Oldest active part modification time.
    pub creation_time: Option<String>,
    /// Newest active part modification time.
    pub last_modified: Option<String>,
    /// Columns in declaration order.
    pub columns: Vec<ColumnInfo>,
}

#[derive(Debug, Deserialize)]
struct TableName {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PartsSummary {
    #[serde(deserialize_with = "u64_from_any")]
    size_bytes: u64,
    #[serde(deserialize_with = "u64_from_any")]
    total_rows: u64,
    #[serde(deserialize_with = "u64_from_any")]
    parts: u64,
    creation_time: String,
    last_modified: String,
}

fn u64_from_any<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| D::Error::custom(format!("not an unsigned integer: {}", n))),
        serde_json::Value::String(s) => s.trim().parse().map_err(D::Error::custom),
        other => Err(D::Error::custom(format!("expected a number, got {}", other))),
    }
}

/// Quote a string literal for ClickHouse SQL.
pub(crate) fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for ch in value.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            _ => quoted.push(ch),
        }
    }
    quoted.push('\'');
    quoted
}

fn tables_sql(database: &str) -> String {
    format!(
        "SELECT name FROM system.tables WHERE database = {} AND NOT is_temporary ORDER BY name FORMAT JSONEachRow",
        quote(database)
    )
}

fn parts_sql(database: &str, table: &str) -> String {
    format!(
        "SELECT sum(bytes_on_disk) AS size_bytes, sum(rows) AS total_rows, count() AS parts, \
         toString(min(modification_time)) AS creation_time, \
         toString(max(modification_time)) AS last_modified \
         FROM system.parts WHERE database = {} AND table = {} AND active \
         FORMAT JSONEachRow",
        quote(database),
        quote(table)
    )
}

fn columns_sql(database: &str, table: &str) -> String {
    format!(
        "SELECT name, type, default_kind, default_expression \
         FROM system.columns WHERE database = {} AND table = {} \
         ORDER BY position FORMAT JSONEachRow",
        quote(database),
        quote(table)
    )
}

impl ClickHouseGateway {
    /// Describe every table of `database`, or of the configured database
    /// when `None`.
    pub async fn table_info(&self, database: Option<&str>) -> Result<Vec<TableInfo>> {
        let database = database.unwrap_or(&self.config().database).to_string();
        let names: Vec<TableName> = self.json_rows(&tables_sql(&database)).await?;

        let mut tables = Vec::with_capacity(names.len());
        for TableName { name } in names {
            let parts: Vec<PartsSummary> = self.json_rows(&parts_sql(&database, &name)).await?;
            let columns: Vec<ColumnInfo> = self.json_rows(&columns_sql(&database, &name)).await?;
            tables.push(build_table_info(name, parts.into_iter().next(), columns));
        }

        tracing::debug!(database = %database, tables = tables.len(), "Collected table info");
        Ok(tables)
    }
}

fn build_table_info(name: String, parts: Option<PartsSummary>, columns: Vec<ColumnInfo>) -> TableInfo {
    match parts {
        Some(parts) if parts.parts > 0 => TableInfo {
            name,
            size_bytes: parts.size_bytes,
            size: format_bytes(parts.size_bytes),
            total_rows: parts.total_rows,
            creation_time: Some(parts.creation_time),
            last_modified: Some(parts.last_modified),
            columns,
        },
        _ => TableInfo {
            name,
            size_bytes: 0,
            size: format_bytes(0),
            total_rows: 0,
            creation_time: None,
            last_modified: None,
            columns,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("default"), "'default'");
        assert_eq!(quote("it's"), "'it\\'s'");
        assert_eq!(quote("a\\b"), "'a\\\\b'");
    }

    #[test]
    fn test_sql_uses_quoted_names() {
        assert!(tables_sql("nebula").contains("database = 'nebula'"));
        let parts = parts_sql("nebula", "visits");
        assert!(parts.contains("table = 'visits'"));
        assert!(parts.contains("AND active"));
        assert!(columns_sql("nebula", "o'brien").contains("table = 'o\\'brien'"));
    }

    #[test]
    fn test_parts_row_decodes_string_counters() {
        let row = r#"{"size_bytes":"1048576","total_rows":"42","parts":"3","creation_time":"2024-01-01 00:00:00","last_modified":"2024-02-01 12:00:00"}"#;
        let parts: PartsSummary = serde_json::from_str(row).unwrap();
        let info = build_table_info("visits".to_string(), Some(parts), Vec::new());
        assert_eq!(info.size_bytes, 1_048_576);
        assert_eq!(info.size, "1.00 MiB");
        assert_eq!(info.total_rows, 42);
        assert_eq!(info.last_modified.as_deref(), Some("2024-02-01 12:00:00"));
    }

    #[test]
    fn test_table_without_parts() {
        let row = r#"{"size_bytes":0,"total_rows":0,"parts":0,"creation_time":"1970-01-01 00:00:00","last_modified":"1970-01-01 00:00:00"}"#;
        let parts: PartsSummary = serde_json::from_str(row).unwrap();
        let info = build_table_info("empty".to_string(), Some(parts), Vec::new());
        assert_eq!(info.size_bytes, 0);
        assert!(info.creation_time.is_none());
    }

    #[test]
    fn test_column_row() {
        let row = r#"{"name":"peer_id","type":"String","default_kind":"","default_expression":""}"#;
        let column: ColumnInfo = serde_json::from_str(row).unwrap();
        assert_eq!(column.data_type, "String");
        assert!(column.default_kind.is_empty());
    }
}
