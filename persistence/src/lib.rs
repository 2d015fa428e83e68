//! FILENAME: persistence/src/lib.rs
//! Report Persistence Module
//!
//! Saves rendered report grids as XLSX workbooks: values, SUBTOTAL
//! formulas, styles, merges, row heights, row outline groups and hidden
//! columns.

mod error;
mod xlsx_writer;

pub use error::PersistenceError;
pub use xlsx_writer::{date_serial, outline_runs, save_xlsx};

use sheet::Grid;

// ============================================================================
// WORKBOOK
// ============================================================================

/// A set of named grids written as one workbook, in order.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single-sheet workbook.
    pub fn from_grid(name: impl Into<String>, grid: Grid) -> Self {
        Self {
            sheets: vec![Sheet::new(name, grid)],
        }
    }

    pub fn add_sheet(&mut self, name: impl Into<String>, grid: Grid) -> &mut Sheet {
        self.sheets.push(Sheet::new(name, grid));
        let last = self.sheets.len() - 1;
        &mut self.sheets[last]
    }
}

// ============================================================================
// SHEET
// ============================================================================

/// Represents a single worksheet
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub grid: Grid,
}

impl Sheet {
    pub fn new(name: impl Into<String>, grid: Grid) -> Self {
        Self {
            name: name.into(),
            grid,
        }
    }
}
