//! FILENAME: report-table/src/table.rs
//! PURPOSE: A report table: schema, rows, grouping hierarchy and hooks.
//! CONTEXT: Everything here is configuration. It is validated eagerly, so a
//! misspelled field name fails when the report is being set up rather than
//! halfway through drawing it. Rendering lives in `render.rs`.

use sheet::{CellValue, Color, GridSink, PatternFill};

use crate::error::{CallbackError, Result, TableError};
use crate::field::{compute_layout, FieldSchema, Layout};
use crate::group;
use crate::options::TableOptions;
use crate::row::{Row, RowRecord, RowView};

// ============================================================================
// HOOKS
// ============================================================================

/// Per-row calculation: may rewrite any field of the row before it is drawn.
pub type CalculationFn = Box<dyn FnMut(&mut RowRecord<'_>) -> std::result::Result<(), CallbackError>>;

/// Solid background for one field's cells; `None` leaves the cell unfilled.
pub type ColoringFn = Box<dyn Fn(&RowView<'_>) -> std::result::Result<Option<Color>, CallbackError>>;

/// Pattern background for one field's cells; `None` leaves the cell unfilled.
pub type PatternFn =
    Box<dyn Fn(&RowView<'_>) -> std::result::Result<Option<PatternFill>, CallbackError>>;

/// Draws a subheader when a hierarchy value changes. Receives the sink, the
/// row about to be drawn, the current row cursor and the table's first
/// column; returns the next free row.
pub type SubtitleFn = Box<
    dyn FnMut(&mut dyn GridSink, &RowView<'_>, u32, u32) -> std::result::Result<u32, CallbackError>,
>;

/// Column-hide predicate: the column is hidden after rendering only if this
/// holds for the field's value on every row.
pub type HidePredicate = Box<dyn Fn(&CellValue) -> bool>;

/// Hooks attached to a single field.
#[derive(Default)]
pub(crate) struct FieldHooks {
    pub coloring: Option<ColoringFn>,
    pub pattern: Option<PatternFn>,
    pub hide_when: Option<HidePredicate>,
}

// ============================================================================
// HIERARCHY
// ============================================================================

/// Settings of one grouping level, resolved to field positions.
pub(crate) struct HierarchyLevel {
    pub field: usize,
    pub merging: bool,
    pub subtitle: Option<SubtitleFn>,
    pub subtotal: Vec<usize>,
    /// Rows drawn by the subtitle above each block, included in the block's
    /// outline group.
    pub subtitle_rows: u32,
}

/// Builder describing a grouping level before it is appended to a table.
#[derive(Default)]
pub struct GroupLevel {
    merging: bool,
    subtitle: Option<SubtitleFn>,
    subtotal: Vec<String>,
    subtitle_rows: u32,
}

impl GroupLevel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge the field's cells vertically across each block.
    pub fn merging(mut self) -> Self {
        self.merging = true;
        self
    }

    /// Fields summed into a subtotal row whenever a block of this level closes.
    pub fn subtotal<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subtotal = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn subtitle<F>(mut self, render: F) -> Self
    where
        F: FnMut(&mut dyn GridSink, &RowView<'_>, u32, u32) -> std::result::Result<u32, CallbackError>
            + 'static,
    {
        self.subtitle = Some(Box::new(render));
        self
    }

    pub fn subtitle_rows(mut self, rows: u32) -> Self {
        self.subtitle_rows = rows;
        self
    }
}

// ============================================================================
// TABLE
// ============================================================================

pub struct Table {
    pub(crate) schemas: Vec<FieldSchema>,
    pub(crate) layout: Layout,
    pub(crate) rows: Vec<Row>,
    pub(crate) hierarchy: Vec<HierarchyLevel>,
    pub(crate) hooks: Vec<FieldHooks>,
    pub(crate) calculate: Option<CalculationFn>,
    pub(crate) options: TableOptions,
}

impl Table {
    /// Builds a table, computing the column layout and checking that every
    /// row carries exactly one value per field.
    pub fn new(schemas: Vec<FieldSchema>, rows: Vec<Row>) -> Result<Self> {
        let layout = compute_layout(&schemas)?;
        check_arity(schemas.len(), &rows)?;
        let hooks = schemas.iter().map(|_| FieldHooks::default()).collect();

        Ok(Table {
            schemas,
            layout,
            rows,
            hierarchy: Vec::new(),
            hooks,
            calculate: None,
            options: TableOptions::default(),
        })
    }

    pub fn with_options(mut self, options: TableOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn set_row_height(&mut self, height: f64) {
        self.options.row_height = height;
    }

    pub fn schemas(&self) -> &[FieldSchema] {
        &self.schemas
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Grid columns occupied by the visible fields.
    pub fn visible_width(&self) -> u32 {
        self.layout.width
    }

    /// Replaces the dataset wholesale.
    pub fn replace_rows(&mut self, rows: Vec<Row>) -> Result<()> {
        check_arity(self.schemas.len(), &rows)?;
        self.rows = rows;
        Ok(())
    }

    /// Inclusive grid columns of a field, relative to the table's origin.
    pub fn column_span(&self, name: &str) -> Result<(u32, u32)> {
        let field = self.layout.field(name)?;
        Ok((field.grid_start, field.grid_end))
    }

    /// Hide the field's column after rendering when `predicate` holds for
    /// every row.
    pub fn hide_column_when<F>(&mut self, name: &str, predicate: F) -> Result<()>
    where
        F: Fn(&CellValue) -> bool + 'static,
    {
        let index = self.layout.index_of(name)?;
        self.hooks[index].hide_when = Some(Box::new(predicate));
        Ok(())
    }

    pub fn set_coloring<F>(&mut self, name: &str, coloring: F) -> Result<()>
    where
        F: Fn(&RowView<'_>) -> std::result::Result<Option<Color>, CallbackError> + 'static,
    {
        let index = self.layout.index_of(name)?;
        self.hooks[index].coloring = Some(Box::new(coloring));
        Ok(())
    }

    pub fn set_pattern<F>(&mut self, name: &str, pattern: F) -> Result<()>
    where
        F: Fn(&RowView<'_>) -> std::result::Result<Option<PatternFill>, CallbackError> + 'static,
    {
        let index = self.layout.index_of(name)?;
        self.hooks[index].pattern = Some(Box::new(pattern));
        Ok(())
    }

    pub fn set_calculation<F>(&mut self, calculate: F)
    where
        F: FnMut(&mut RowRecord<'_>) -> std::result::Result<(), CallbackError> + 'static,
    {
        self.calculate = Some(Box::new(calculate));
    }

    /// Appends a grouping level. Call order is nesting order: the first
    /// level appended is the outermost.
    pub fn hierarchy_append(&mut self, name: &str, level: GroupLevel) -> Result<()> {
        let field = self.layout.index_of(name)?;
        if self.hierarchy.iter().any(|l| l.field == field) {
            return Err(TableError::DuplicateHierarchy(name.to_string()));
        }

        let mut subtotal = Vec::with_capacity(level.subtotal.len());
        for member in &level.subtotal {
            let index = self.layout.index_of(member)?;
            if self.layout.fields[index].hidden {
                return Err(TableError::HiddenSubtotalField(member.clone()));
            }
            subtotal.push(index);
        }

        self.hierarchy.push(HierarchyLevel {
            field,
            merging: level.merging,
            subtitle: level.subtitle,
            subtotal,
            subtitle_rows: level.subtitle_rows,
        });
        Ok(())
    }

    /// Field names of the hierarchy, outermost first.
    pub fn hierarchy(&self) -> Vec<&str> {
        self.hierarchy
            .iter()
            .map(|l| self.layout.names[l.field].as_str())
            .collect()
    }

    /// One row per distinct hierarchy key over this table's rows; see
    /// [`group::group_by_data`].
    pub fn group_by_data(&self, hierarchy: &[&str], sums: &[&str]) -> Result<Vec<Row>> {
        group::group_by_data(&self.schemas, hierarchy, sums, &self.rows)
    }

    /// A new table holding only the key and sum fields, one row per key.
    pub fn summary(&self, hierarchy: &[&str], sums: &[&str]) -> Result<Table> {
        let schemas = group::grouped_schema(&self.schemas, hierarchy, sums)?;
        let rows = self.group_by_data(hierarchy, sums)?;
        Ok(Table::new(schemas, rows)?.with_options(self.options.clone()))
    }
}

fn check_arity(expected: usize, rows: &[Row]) -> Result<()> {
    match rows.iter().position(|r| r.len() != expected) {
        Some(row) => Err(TableError::Schema {
            row,
            expected,
            found: rows[row].len(),
        }),
        None => Ok(()),
    }
}
