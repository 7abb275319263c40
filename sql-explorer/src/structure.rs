//! Table structure assembly
//!
//! Reconstructs the structure view of one table from three dependent backend
//! calls: the DDL, the column list and the index list. Nothing is displayed
//! until all three have succeeded.

use serde_json::Value;

use crate::client::traits::MetadataSource;
use crate::index::resolve_index_columns;
use crate::page::{SqlViewer, StructureSurface};
use crate::render::value_text;
use crate::schema::{ColumnDescriptor, IndexDescriptor, TableName};
use crate::Result;

/// One row of the column attribute table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRow {
    pub name: String,
    pub data_type: String,
    /// `"True"` or `"False"`
    pub primary_key: &'static str,
    /// `"True"` or `"False"`
    pub not_null: &'static str,
    /// Default expression, or `"Null"` when the column has none
    pub default_value: String,
}

impl ColumnRow {
    pub fn new(column: &ColumnDescriptor) -> Self {
        let default_value = match &column.default_value {
            Value::Null => "Null".to_string(),
            value => value_text(value),
        };

        Self {
            name: column.name.clone(),
            data_type: column.data_type.clone(),
            primary_key: flag(column.is_primary_key),
            not_null: flag(column.not_null),
            default_value,
        }
    }

    pub fn markup(&self) -> String {
        format!(
            "<tr><th>{}</th><th>{}</th><th>{}</th><th>{}</th><th>{}</th></tr>",
            self.name, self.data_type, self.primary_key, self.not_null, self.default_value
        )
    }
}

/// One row of the index table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRow {
    pub name: String,
    /// Covered columns, empty when they could not be recovered
    pub columns: Vec<String>,
    pub unique: bool,
    /// Raw definition, empty for implicit indexes
    pub sql: String,
}

impl IndexRow {
    pub fn new(index: &IndexDescriptor, table: &str) -> Self {
        let sql = index.definition_sql.clone().unwrap_or_default();
        let owner = if index.table_name.is_empty() {
            table
        } else {
            index.table_name.as_str()
        };

        Self {
            name: index.name.clone(),
            columns: resolve_index_columns(owner, &sql),
            // Plain substring test, not keyword aware
            unique: sql.contains("UNIQUE"),
            sql,
        }
    }

    pub fn joined_columns(&self) -> String {
        self.columns.join(", ")
    }

    pub fn unique_flag(&self) -> &'static str {
        flag(self.unique)
    }

    /// Content of the deferred SQL viewer attached to this row
    pub fn sql_viewer(&self) -> SqlViewer {
        SqlViewer {
            title: self.name.clone(),
            sql: self.sql.clone(),
        }
    }

    pub fn markup(&self) -> String {
        let link = format!(
            "<a class=\"view-sql\" data-toggle=\"modal\" data-target=\"#index_sql_modal\" data-name=\"{}\" href=\"#\">SQL</a>",
            self.name
        );
        let hidden_sql = format!("<pre style=\"display: none;\">{}</pre>", self.sql);

        format!(
            "<tr><th>{}</th><th>{}</th><th>{}</th><th>{}{}</th></tr>",
            self.name,
            self.joined_columns(),
            self.unique_flag(),
            link,
            hidden_sql
        )
    }
}

/// Full structure of one table, rebuilt on every selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStructure {
    pub table: TableName,
    pub ddl: String,
    pub columns: Vec<ColumnRow>,
    pub indexes: Vec<IndexRow>,
}

impl TableStructure {
    /// Replace the contents of the structure surface with this structure
    pub fn install(&self, surface: &mut StructureSurface) {
        surface.sql = self.ddl.clone();

        surface.columns.clear();
        for column in &self.columns {
            surface.columns.append(&column.markup());
        }

        surface.indexes.clear();
        for index in &self.indexes {
            surface.indexes.append(&index.markup());
        }

        surface.index_rows = self.indexes.clone();
    }

    pub fn index(&self, name: &str) -> Option<&IndexRow> {
        self.indexes.iter().find(|index| index.name == name)
    }
}

/// Fetch and assemble the structure of `table`
///
/// The DDL, columns and indexes are fetched strictly one after another. The
/// first failing call aborts the remaining steps and its error is returned.
pub async fn build_table_structure<S>(source: &S, table: &str) -> Result<TableStructure>
where
    S: MetadataSource + ?Sized,
{
    let definition = source.fetch_table_definition_sql(table).await?;

    let columns = source
        .fetch_table_columns(table)
        .await?
        .iter()
        .map(ColumnRow::new)
        .collect();

    let indexes: Vec<IndexRow> = source
        .fetch_table_indexes(table)
        .await?
        .iter()
        .map(|index| IndexRow::new(index, table))
        .collect();

    tracing::debug!(table, indexes = indexes.len(), "Assembled table structure");

    Ok(TableStructure {
        table: table.to_string(),
        ddl: definition.sql,
        columns,
        indexes,
    })
}

fn flag(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}
