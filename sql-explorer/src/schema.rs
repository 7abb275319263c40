//! Schema and result types returned by the explorer backend
//!
//! These types mirror the JSON payloads of the backend REST surface. They are
//! transient view-models: fetched, rendered and dropped on every table switch.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::Error;

/// Opaque table identifier, passed to the backend without escaping
pub type TableName = String;

/// General information about the explored database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    /// Base name of the database file
    pub filename: String,

    /// File size in bytes
    #[serde(rename = "size", default)]
    pub size_bytes: u64,

    /// Number of tables in the database
    #[serde(rename = "number_of_tables", default)]
    pub table_count: u64,

    /// Number of indexes in the database
    #[serde(rename = "number_of_indexes", default)]
    pub index_count: u64,
}

/// Response from listing tables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableList {
    /// Table names in backend order
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tables: Vec<TableName>,
}

/// Response for row count queries
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowCount {
    /// Total number of rows in the table
    #[serde(rename = "row_count")]
    pub row_count: u64,
}

/// The `CREATE TABLE` statement of a table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    #[serde(default, deserialize_with = "null_as_default")]
    pub sql: String,
}

/// Information about a single column, in declared column order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,

    /// Declared SQL type (may be empty for untyped SQLite columns)
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub data_type: String,

    /// Whether this column is part of the primary key
    #[serde(rename = "pk", default, deserialize_with = "truthy")]
    pub is_primary_key: bool,

    /// Whether the column is declared NOT NULL
    #[serde(rename = "notnull", default, deserialize_with = "truthy")]
    pub not_null: bool,

    /// Default value expression, `Value::Null` when absent
    #[serde(rename = "dflt_value", default)]
    pub default_value: Value,
}

/// Index information as stored by the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    /// Index name
    pub name: String,

    /// Owning table
    #[serde(rename = "tbl_name", default, deserialize_with = "null_as_default")]
    pub table_name: TableName,

    /// Raw `CREATE INDEX` statement; `None` for implicit indexes
    #[serde(rename = "sql", default)]
    pub definition_sql: Option<String>,
}

/// Columns and positional rows produced by any row-producing call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Column names in result order
    #[serde(default, deserialize_with = "null_as_empty")]
    pub columns: Vec<String>,

    /// Rows, each positionally aligned to `columns`
    #[serde(default, deserialize_with = "null_as_empty")]
    pub rows: Vec<Vec<Value>>,
}

/// Export encodings offered by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(Error::InvalidExportFormat(other.to_string())),
        }
    }
}

/// Decode a JSON list that the backend may send as `null` when empty
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// SQLite reports flags as integers (`pk` is the 1-based key position),
/// so any non-zero, non-empty value counts as set.
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => false,
        Value::Bool(flag) => flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}
