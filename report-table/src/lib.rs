//! FILENAME: report-table/src/lib.rs
//! Banded report tables for Calcula-style grids.
//!
//! A `Table` pairs a field schema with rows that are already grouped by the
//! fields of its hierarchy. `Table::apply` draws it onto any `GridSink` in
//! one forward pass: vertically merged group blocks, stacked subtotal rows
//! with `SUBTOTAL(9, ...)` formulas, caller-drawn subheaders, per-cell fills
//! and columns hidden when every row matches a hide predicate.
//!
//! Layers:
//! - `field`: Schema and packed column layout (what each column IS)
//! - `table`: Configuration of hierarchy, hooks and options
//! - `render`: The rendering pass (HOW it is drawn)
//! - `group`: Pre-aggregation for summary tables

pub mod error;
pub mod field;
pub mod group;
pub mod options;
pub mod render;
pub mod row;
pub mod table;

pub use error::{CallbackError, Hook, Result, TableError};
pub use field::{compute_layout, FieldFormat, FieldLayout, FieldSchema, Layout};
pub use group::{group_by_data, grouped_schema};
pub use options::TableOptions;
pub use row::{Row, RowRecord, RowView};
pub use table::{
    CalculationFn, ColoringFn, GroupLevel, HidePredicate, PatternFn, SubtitleFn, Table,
};
