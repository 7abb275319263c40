//! Display surfaces
//!
//! Headless model of the explorer page. Each surface holds the markup last
//! installed into it and whether it is currently shown. The page is the only
//! place a displayed result set lives.

use crate::schema::TableName;
use crate::structure::IndexRow;

/// The three mutually exclusive display modes (page tabs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// DDL, columns and indexes of the selected table
    Structure,
    /// All rows of the selected table
    Content,
    /// Free query editor and its results
    Query,
}

/// A region of the page that markup is installed into
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Surface {
    pub markup: String,
    pub visible: bool,
}

impl Surface {
    pub fn clear(&mut self) {
        self.markup.clear();
    }

    pub fn append(&mut self, markup: &str) {
        self.markup.push_str(markup);
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}

/// Structure tab: DDL text plus column and index tables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureSurface {
    pub visible: bool,

    /// `CREATE TABLE` text, shown as plain text
    pub sql: String,

    /// `<tbody>` rows of the column table
    pub columns: Surface,

    /// `<tbody>` rows of the index table
    pub indexes: Surface,

    /// Index rows backing the SQL viewer links
    pub index_rows: Vec<IndexRow>,
}

/// Database summary panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabasePanel {
    pub filename: String,
    /// Human readable file size
    pub size: String,
    pub table_count: u64,
    pub index_count: u64,
}

/// Modal showing the raw SQL of one index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlViewer {
    pub title: String,
    pub sql: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub database: Option<DatabasePanel>,

    /// Sidebar table list
    pub tables: Vec<TableName>,

    /// Row count of the selected table, once loaded
    pub table_information: Option<u64>,

    pub structure: StructureSurface,

    /// Query editor area
    pub input: Surface,

    /// Result grid (`<thead>` + `<tbody>`)
    pub output: Surface,

    /// Result grid takes the whole content area
    pub output_full: bool,

    pub active_tab: Option<Mode>,

    /// Run and export buttons
    pub controls_enabled: bool,

    pub sql_viewer: Option<SqlViewer>,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            database: None,
            tables: Vec::new(),
            table_information: None,
            structure: StructureSurface::default(),
            input: Surface::default(),
            output: Surface::default(),
            output_full: false,
            active_tab: None,
            controls_enabled: true,
            sql_viewer: None,
        }
    }
}

impl Page {
    pub fn set_active_tab(&mut self, mode: Mode) {
        self.active_tab = Some(mode);
    }

    /// Show or hide the page regions for `mode`
    pub fn show_mode(&mut self, mode: Mode) {
        self.set_active_tab(mode);
        match mode {
            Mode::Structure => {
                self.structure.visible = true;
                self.input.hide();
                self.output.hide();
            }
            Mode::Content => {
                self.structure.visible = false;
                self.input.hide();
                self.output_full = true;
                self.output.show();
            }
            Mode::Query => {
                self.structure.visible = false;
                self.output_full = false;
                self.input.show();
                self.output.show();
            }
        }
    }
}
