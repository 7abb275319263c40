use clap::{Parser, Subcommand};
use sql_explorer::ExportFormat;

#[derive(Parser, Debug, Clone)]
#[command(name = "sql-explorer", version, about = "Browse an explorer backend from the terminal")]
pub struct Args {
    /// Base URL of the explorer backend
    #[arg(long, env = "SQL_EXPLORER_BACKEND", default_value = "http://localhost:8000/")]
    pub backend: String,

    /// Logging level (stderr). Also supports RUST_LOG.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Abort requests after this many milliseconds. No limit by default.
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Database file name, size and object counts
    Info,

    /// List all tables
    Tables,

    /// Number of rows in a table
    RowCount { table: String },

    /// DDL, columns and indexes of a table
    Structure { table: String },

    /// Every row of a table
    Content { table: String },

    /// Run a query and print the result grid
    Query { sql: String },

    /// Print the backend export URL for a query
    Export {
        /// csv or json
        #[arg(long, default_value = "csv")]
        format: ExportFormat,

        sql: String,
    },

    /// Show the definition of one index
    IndexSql { table: String, index: String },
}
