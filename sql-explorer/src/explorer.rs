//! Query workflow controller
//!
//! Drives the page: table selection, the Structure / Content / Query modes,
//! running free queries and handing exports to the backend.
//!
//! Requests are never cancelled. Instead every surface group keeps a ticket
//! counter; a response is installed only if no newer request for the same
//! surfaces was issued while it was in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reqwest::Url;

use crate::client::traits::MetadataSource;
use crate::format::bytes_to_size;
use crate::page::{DatabasePanel, Page, SqlViewer};
use crate::render::render_result_set;
use crate::schema::{ExportFormat, TableName};
use crate::structure::{build_table_structure, IndexRow};
use crate::{Error, Result};

pub use crate::page::Mode;

/// Blocking user notifications (validation failures)
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// Opens URLs in a new browsing context
pub trait Navigator: Send + Sync {
    fn open(&self, url: &Url);
}

/// Default notifier: writes the alert to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn alert(&self, message: &str) {
        tracing::warn!("{}", message);
    }
}

/// Default navigator: writes the URL to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn open(&self, url: &Url) {
        tracing::info!(%url, "Open");
    }
}

/// Monotonic request counter for one group of surfaces
#[derive(Debug, Default)]
struct Ticket(AtomicU64);

impl Ticket {
    fn issue(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.0.load(Ordering::SeqCst) == ticket
    }
}

#[derive(Debug, Default)]
struct ExplorerState {
    page: Page,
    selected_table: Option<TableName>,
    mode: Option<Mode>,
    running_queries: usize,
}

/// The explorer controller
///
/// # Example
///
/// ```rust,no_run
/// use sql_explorer::{ClientConfig, Explorer, ExportFormat, MetadataClient};
///
/// # async fn example() -> sql_explorer::Result<()> {
/// let client = MetadataClient::new(ClientConfig::new("http://localhost:8000/")?)?;
/// let explorer = Explorer::new(client);
///
/// explorer.select_table("users").await?;
/// explorer.show_query();
/// explorer.run_query("SELECT id, email FROM users").await?;
/// explorer.export("SELECT id, email FROM users", ExportFormat::Csv)?;
/// # Ok(())
/// # }
/// ```
pub struct Explorer<S: MetadataSource> {
    source: S,
    state: Mutex<ExplorerState>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    // Mode transitions (structure and content views)
    view: Ticket,
    // Result grid writes
    output: Ticket,
    // Row count panel
    table_info: Ticket,
}

impl<S: MetadataSource> Explorer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: Mutex::new(ExplorerState::default()),
            notifier: Arc::new(LogNotifier),
            navigator: Arc::new(LogNavigator),
            view: Ticket::default(),
            output: Ticket::default(),
            table_info: Ticket::default(),
        }
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    pub fn with_navigator(mut self, navigator: impl Navigator + 'static) -> Self {
        self.navigator = Arc::new(navigator);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Snapshot of the current page
    pub fn page(&self) -> Page {
        self.state().page.clone()
    }

    pub fn selected_table(&self) -> Option<TableName> {
        self.state().selected_table.clone()
    }

    pub fn mode(&self) -> Option<Mode> {
        self.state().mode
    }

    fn state(&self) -> MutexGuard<'_, ExplorerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn require_selected_table(&self) -> Result<TableName> {
        match self.selected_table() {
            Some(table) if !table.is_empty() => Ok(table),
            _ => {
                let error = Error::NoTableSelected;
                self.notifier.alert(&error.to_string());
                Err(error)
            }
        }
    }

    /// Fill the database summary panel
    pub async fn show_database_info(&self) -> Result<()> {
        let info = self
            .source
            .fetch_database_info()
            .await
            .map_err(|error| failed("load database info", error))?;

        self.state().page.database = Some(DatabasePanel {
            filename: info.filename,
            size: bytes_to_size(info.size_bytes),
            table_count: info.table_count,
            index_count: info.index_count,
        });
        Ok(())
    }

    /// Fill the table list and open the first table, if there is one
    pub async fn load_tables(&self) -> Result<()> {
        let list = self
            .source
            .fetch_table_names()
            .await
            .map_err(|error| failed("load tables", error))?;

        let first = {
            let mut state = self.state();
            let first = list.tables.first().cloned();
            state.page.tables = list.tables;
            if first.is_some() {
                state.selected_table = first.clone();
            }
            first
        };

        if first.is_some() {
            let info = self.show_table_info().await;
            let structure = self.show_structure().await;
            info.and(structure)?;
        }
        Ok(())
    }

    /// Change the selected table without touching the page
    pub fn set_selected_table(&self, table: impl Into<TableName>) {
        self.state().selected_table = Some(table.into());
    }

    /// Select `table`, refresh its row count and re-render the active view
    ///
    /// Structure and Content views follow the selection; Query view is left
    /// as it is. Before any view was entered the structure is shown.
    pub async fn select_table(&self, table: impl Into<TableName>) -> Result<()> {
        let table = table.into();
        tracing::info!(table = %table, "Selecting table");

        let mode = {
            let mut state = self.state();
            state.selected_table = Some(table);
            state.mode
        };

        let info = self.show_table_info().await;
        let view = match mode {
            Some(Mode::Content) => self.show_content().await,
            Some(Mode::Query) => Ok(()),
            Some(Mode::Structure) | None => self.show_structure().await,
        };
        info.and(view)
    }

    /// Load the row count of the selected table
    pub async fn show_table_info(&self) -> Result<()> {
        let table = self.require_selected_table()?;
        let ticket = self.table_info.issue();

        let count = self
            .source
            .fetch_table_row_count(&table)
            .await
            .map_err(|error| failed("load row count", error))?;

        if !self.table_info.is_current(ticket) {
            tracing::debug!(table = %table, "Discarding stale row count");
            return Ok(());
        }

        self.state().page.table_information = Some(count.row_count);
        Ok(())
    }

    /// Enter Structure mode for the selected table
    pub async fn show_structure(&self) -> Result<()> {
        let table = self.require_selected_table()?;
        let ticket = self.view.issue();

        let structure = build_table_structure(&self.source, &table)
            .await
            .map_err(|error| failed("build table structure", error))?;

        if !self.view.is_current(ticket) {
            tracing::debug!(table = %table, "Discarding stale table structure");
            return Ok(());
        }

        let mut state = self.state();
        structure.install(&mut state.page.structure);
        state.page.show_mode(Mode::Structure);
        state.mode = Some(Mode::Structure);
        tracing::info!(table = %table, "Showing table structure");
        Ok(())
    }

    /// Enter Content mode: every row of the selected table
    ///
    /// The table name is interpolated into the query without escaping.
    pub async fn show_content(&self) -> Result<()> {
        let table = self.require_selected_table()?;
        let view_ticket = self.view.issue();
        let output_ticket = self.output.issue();

        let query = format!("SELECT * FROM {};", table);
        let result = self
            .source
            .execute_query(&query)
            .await
            .map_err(|error| failed("load table content", error))?;

        if !self.view.is_current(view_ticket) || !self.output.is_current(output_ticket) {
            tracing::debug!(table = %table, "Discarding stale table content");
            return Ok(());
        }

        let mut state = self.state();
        render_result_set(&mut state.page.output, &result);
        state.page.show_mode(Mode::Content);
        state.mode = Some(Mode::Content);
        tracing::info!(table = %table, rows = result.rows.len(), "Showing table content");
        Ok(())
    }

    /// Enter Query mode with an empty result grid
    pub fn show_query(&self) {
        // Pending structure or content responses must not land in this view
        self.view.issue();
        self.output.issue();

        let mut state = self.state();
        state.page.output.clear();
        state.page.show_mode(Mode::Query);
        state.mode = Some(Mode::Query);
        tracing::info!("Showing query editor");
    }

    /// Run `query` and render its result
    ///
    /// Blank text is ignored. Run and export controls stay disabled until
    /// every running query has answered.
    pub async fn run_query(&self, query: &str) -> Result<()> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }

        let ticket = self.output.issue();
        {
            let mut state = self.state();
            state.running_queries += 1;
            state.page.controls_enabled = false;
        }

        let outcome = self.source.execute_query(query).await;

        let mut state = self.state();
        state.running_queries = state.running_queries.saturating_sub(1);
        state.page.controls_enabled = state.running_queries == 0;

        let result = outcome.map_err(|error| failed("run query", error))?;
        if self.output.is_current(ticket) {
            render_result_set(&mut state.page.output, &result);
        } else {
            tracing::debug!("Discarding stale query result");
        }
        Ok(())
    }

    /// Open the backend export of `query` in a new browsing context
    ///
    /// Returns the opened URL, or `None` for blank text. The query text is
    /// passed to the backend as-is.
    pub fn export(&self, query: &str, format: ExportFormat) -> Result<Option<Url>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }

        let url = self.source.export_url(query, format)?;
        self.navigator.open(&url);
        Ok(Some(url))
    }

    /// Open the SQL viewer of an index in the current structure view
    pub fn view_index_sql(&self, name: &str) -> Option<SqlViewer> {
        let mut state = self.state();
        let viewer = state
            .page
            .structure
            .index_rows
            .iter()
            .find(|index| index.name == name)
            .map(IndexRow::sql_viewer)?;

        state.page.sql_viewer = Some(viewer.clone());
        Some(viewer)
    }

    pub fn close_sql_viewer(&self) {
        self.state().page.sql_viewer = None;
    }
}

fn failed(action: &str, error: Error) -> Error {
    tracing::warn!("Failed to {}: {}", action, error);
    error
}
