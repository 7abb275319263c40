//! Metadata source trait
//!
//! This trait defines the interface the rendering pipeline uses to reach the
//! explorer backend. Every call is a single fire-and-forget request: no retry,
//! no de-duplication and no cancellation.

use async_trait::async_trait;
use reqwest::Url;

use crate::schema::{
    ColumnDescriptor, DatabaseInfo, ExportFormat, IndexDescriptor, ResultSet, RowCount,
    TableDefinition, TableList,
};
use crate::Result;

/// Backend metadata and query access
///
/// Failures of any kind (transport, missing table, malformed SQL, backend
/// fault) come back as [`crate::Error`]; callers treat them uniformly.
#[async_trait]
pub trait MetadataSource: Send + Sync + 'static {
    /// Database file name, size and object counts
    async fn fetch_database_info(&self) -> Result<DatabaseInfo>;

    /// All table names, in backend order
    async fn fetch_table_names(&self) -> Result<TableList>;

    /// Number of rows in `table`
    async fn fetch_table_row_count(&self, table: &str) -> Result<RowCount>;

    /// Column descriptors of `table`, in declared order
    async fn fetch_table_columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>>;

    /// The `CREATE TABLE` statement of `table`
    async fn fetch_table_definition_sql(&self, table: &str) -> Result<TableDefinition>;

    /// Index descriptors of `table`; empty when the table has none
    async fn fetch_table_indexes(&self, table: &str) -> Result<Vec<IndexDescriptor>>;

    /// Execute arbitrary SQL text
    ///
    /// # Security Warning
    ///
    /// The text is sent as-is. The backend decides what may run.
    async fn execute_query(&self, sql: &str) -> Result<ResultSet>;

    /// URL of the backend export endpoint for `query`
    ///
    /// Export is a navigation, not a fetch, so this only builds the URL.
    fn export_url(&self, query: &str, format: ExportFormat) -> Result<Url>;
}
