use std::time::Duration;

use clap::Parser;
use sql_explorer::{
    ClientConfig, Explorer, MetadataClient, MetadataSource, Navigator, Notifier, Page, Url,
};

mod cli;
mod error;
mod logging;

use cli::{Args, Command};
use error::{CliError, CliResult};

/// Alerts go to stderr so stdout only carries rendered output
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }
}

/// There is no browser to open, so the export URL is printed instead
struct StdoutNavigator;

impl Navigator for StdoutNavigator {
    fn open(&self, url: &Url) {
        println!("{}", url);
    }
}

fn main() -> CliResult<()> {
    let args = Args::parse();
    logging::init(&args.log_level);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(args))
}

async fn run(args: Args) -> CliResult<()> {
    let mut config = ClientConfig::new(&args.backend)?;
    if let Some(timeout_ms) = args.timeout_ms {
        config = config.with_timeout(Duration::from_millis(timeout_ms));
    }
    tracing::debug!(backend = %config.base_url(), "Using explorer backend");

    let explorer = Explorer::new(MetadataClient::new(config)?)
        .with_notifier(StderrNotifier)
        .with_navigator(StdoutNavigator);

    match args.command {
        Command::Info => {
            explorer.show_database_info().await?;
            print_database(&explorer.page());
        }
        Command::Tables => {
            for table in explorer.source().fetch_table_names().await?.tables {
                println!("{}", table);
            }
        }
        Command::RowCount { table } => {
            explorer.set_selected_table(table);
            explorer.show_table_info().await?;
            if let Some(row_count) = explorer.page().table_information {
                println!("{}", row_count);
            }
        }
        Command::Structure { table } => {
            explorer.set_selected_table(table);
            explorer.show_structure().await?;
            print_structure(&explorer.page());
        }
        Command::Content { table } => {
            explorer.set_selected_table(table);
            explorer.show_content().await?;
            println!("{}", explorer.page().output.markup);
        }
        Command::Query { sql } => {
            explorer.show_query();
            explorer.run_query(&sql).await?;
            println!("{}", explorer.page().output.markup);
        }
        Command::Export { format, sql } => {
            explorer.export(&sql, format)?;
        }
        Command::IndexSql { table, index } => {
            explorer.set_selected_table(table);
            explorer.show_structure().await?;
            let viewer = explorer
                .view_index_sql(&index)
                .ok_or(CliError::IndexNotFound(index))?;
            println!("-- {}", viewer.title);
            println!("{}", viewer.sql);
        }
    }

    Ok(())
}

fn print_database(page: &Page) {
    if let Some(database) = &page.database {
        println!("file:    {}", database.filename);
        println!("size:    {}", database.size);
        println!("tables:  {}", database.table_count);
        println!("indexes: {}", database.index_count);
    }
}

fn print_structure(page: &Page) {
    let structure = &page.structure;
    println!("{}", structure.sql);
    println!();
    println!("{}", structure.columns.markup);
    println!();
    println!("{}", structure.indexes.markup);
}
