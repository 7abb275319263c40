//! # sql-explorer
//!
//! The client half of a lightweight SQL database explorer: it talks to an
//! explorer backend over REST, reconstructs table structure from metadata and
//! renders arbitrary result sets into display surfaces.
//!
//! ## Features
//!
//! - Table structure view (DDL, columns, indexes and the columns they cover)
//! - Schema-free result grid shared by table browsing and free queries
//! - CSV/JSON export delegated to the backend
//! - Stale responses are dropped instead of overwriting newer views
//!
//! ## Trust Boundary
//!
//! Table names and query text are interpolated into SQL and export URLs
//! without escaping. Cell values and column names are inserted into markup
//! verbatim. The backend owns query safety; only point this at databases you
//! are allowed to modify.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use sql_explorer::{ClientConfig, Explorer, MetadataClient};
//!
//! # async fn example() -> sql_explorer::Result<()> {
//! let client = MetadataClient::new(ClientConfig::new("http://localhost:8000/")?)?;
//! let explorer = Explorer::new(client);
//!
//! explorer.load_tables().await?;
//! explorer.show_content().await?;
//! println!("{}", explorer.page().output.markup);
//! # Ok(())
//! # }
//! ```

// Public modules
pub mod client;
pub mod explorer;
pub mod format;
pub mod index;
pub mod page;
pub mod render;
pub mod schema;
pub mod structure;


// Public exports
pub use client::{ClientConfig, MetadataClient, MetadataSource};
pub use explorer::{Explorer, Mode, Navigator, Notifier};
pub use index::resolve_index_columns;
pub use page::Page;
pub use render::render_result_set;
pub use schema::{
    ColumnDescriptor, DatabaseInfo, ExportFormat, IndexDescriptor, ResultSet, TableName,
};
pub use structure::{build_table_structure, TableStructure};

pub use reqwest::Url;

// Error type
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Backend error ({status}): {body}")]
    Backend { status: u16, body: Value },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unknown export format: {0}")]
    InvalidExportFormat(String),

    #[error("No table selected. Please, select a table.")]
    NoTableSelected,
}

impl Error {
    /// Parsed response body of a failed backend call
    pub fn body(&self) -> Option<&Value> {
        match self {
            Error::Backend { body, .. } => Some(body),
            _ => None,
        }
    }

    /// The backend's `message` field, if the failure carried one
    pub fn message(&self) -> Option<&str> {
        self.body()?.get("message")?.as_str()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
