//! FILENAME: report-table/src/render.rs
//! PURPOSE: Single-pass rendering of a table onto a grid sink.
//! CONTEXT: Rows must arrive grouped: equal hierarchy values contiguous,
//! outer levels varying slowest. The pass detects where blocks close,
//! merges the block just finished, stacks subtotal rows (innermost first),
//! lets subtitle hooks draw headers of any height, then writes and styles
//! the data row. A final pass against an end-of-data sentinel flushes the
//! blocks still open.
//!
//! Change tracking lives in `LevelState`, created fresh for every call, so
//! rendering the same table twice produces the same output.

use log::{debug, trace};
use sheet::{subtotal_formula, CellRange, CellValue, GridSink, TextAlign};

use crate::error::{Hook, Result, TableError};
use crate::field::{FieldFormat, Layout};
use crate::options::TableOptions;
use crate::row::{RowRecord, RowView};
use crate::table::{FieldHooks, HierarchyLevel, Table};

/// Change-tracking state of one hierarchy level during a render.
#[derive(Debug, Clone, Default)]
struct LevelState {
    /// Value of the open block; `None` before the first row and after the
    /// end-of-data sentinel.
    last_value: Option<CellValue>,
    /// Grid row where the open block started.
    last_value_row: Option<u32>,
    changed: bool,
}

/// Borrowed pieces of a table plus the per-render state.
struct Pass<'t, 's> {
    layout: &'t Layout,
    hierarchy: &'t mut [HierarchyLevel],
    hooks: &'t [FieldHooks],
    options: &'t TableOptions,
    sink: &'s mut dyn GridSink,
    first_col: u32,
    levels: Vec<LevelState>,
    /// Per field: `Some(true)` while every row so far satisfied its hide
    /// predicate, `None` for fields without one.
    hide_eligible: Vec<Option<bool>>,
    /// Field is a hierarchy level with vertical merging.
    merging: Vec<bool>,
}

impl Table {
    /// Renders the table with its top-left corner at (`first_row`,
    /// `first_col`) and returns the first unused row below it.
    ///
    /// Hook failures propagate immediately. The sink then holds everything
    /// drawn up to the failing row; nothing is rolled back.
    pub fn apply(&mut self, sink: &mut dyn GridSink, first_row: u32, first_col: u32) -> Result<u32> {
        let Table {
            layout,
            rows,
            hierarchy,
            hooks,
            calculate,
            options,
            ..
        } = self;

        debug!(
            "rendering table: {} rows, {} columns, {} hierarchy levels at ({}, {})",
            rows.len(),
            layout.width,
            hierarchy.len(),
            first_row,
            first_col
        );

        let mut merging = vec![false; layout.fields.len()];
        for level in hierarchy.iter().filter(|l| l.merging) {
            merging[level.field] = true;
        }

        let mut pass = Pass {
            layout,
            levels: vec![LevelState::default(); hierarchy.len()],
            hierarchy: hierarchy.as_mut_slice(),
            hide_eligible: hooks
                .iter()
                .map(|h| h.hide_when.as_ref().map(|_| true))
                .collect(),
            hooks: hooks.as_slice(),
            options,
            sink,
            first_col,
            merging,
        };

        let mut cur_row = first_row;
        for (data_index, source) in rows.iter().enumerate() {
            let mut row = source.clone();

            if let Some(calculate) = calculate.as_mut() {
                calculate(&mut RowRecord::new(pass.layout, &mut row)).map_err(|source| {
                    TableError::Callback {
                        hook: Hook::Calculation,
                        row: data_index,
                        source,
                    }
                })?;
            }

            pass.detect_changes(Some(row.as_slice()));
            if data_index > 0 {
                pass.close_previous(cur_row);
            }
            cur_row = pass.emit_subtotals(cur_row);
            cur_row = pass.emit_subtitles(cur_row, &row, data_index)?;
            pass.apply_fills(cur_row, &row, data_index)?;

            pass.sink.set_row_height(cur_row, pass.options.row_height);
            pass.write_values(cur_row, &row);
            pass.update_hide_eligibility(&row);
            pass.style_row(cur_row);

            pass.finalize(Some(row.as_slice()), cur_row);
            cur_row += 1;
        }

        if !rows.is_empty() {
            pass.detect_changes(None);
            pass.close_previous(cur_row);
            cur_row = pass.emit_subtotals(cur_row);
            pass.hide_unused_columns();
            pass.set_column_widths();
        }

        let width = pass.layout.width;
        if cur_row > first_row && width > 0 {
            pass.sink.set_outline_border(
                CellRange::new(first_row, first_col, cur_row - 1, first_col + width - 1),
                pass.options.outline_border,
            );
        }

        debug!("table rendered, next free row {}", cur_row);
        Ok(cur_row)
    }
}

impl Pass<'_, '_> {
    /// Flags every level whose value changed, cascading from the first
    /// changed level to all levels inside it. `None` is the end-of-data
    /// sentinel and changes every level.
    fn detect_changes(&mut self, row: Option<&[CellValue]>) {
        let mut cascade = false;
        for (level, state) in self.hierarchy.iter().zip(self.levels.iter_mut()) {
            let differs = match row {
                None => true,
                Some(values) => state.last_value.as_ref() != Some(&values[level.field]),
            };
            cascade |= differs;
            if cascade {
                state.changed = true;
            }
        }
    }

    /// Merges what the row above `cur_row` completed: multi-column fields
    /// on that row, and the full vertical range of every merging level whose
    /// block just closed.
    fn close_previous(&mut self, cur_row: u32) {
        let prev = cur_row - 1;

        for (index, field) in self.layout.fields.iter().enumerate() {
            if self.merging[index] || field.hidden || !field.is_multi_column() {
                continue;
            }
            let (c1, c2) = field.columns(self.first_col);
            let range = CellRange::row_span(prev, c1, c2);
            self.sink.merge_range(range);
            self.sink.set_borders(range);
        }

        for (level, state) in self.hierarchy.iter().zip(self.levels.iter()) {
            let field = &self.layout.fields[level.field];
            if !level.merging || !state.changed || field.hidden {
                continue;
            }
            let (c1, c2) = field.columns(self.first_col);
            let range = match state.last_value_row {
                Some(start) if start != prev => CellRange::new(start, c1, prev, c2),
                _ if field.is_multi_column() => CellRange::row_span(prev, c1, c2),
                _ => continue,
            };
            trace!("closing block of '{}' at {}", self.layout.names[level.field], range);
            self.sink.merge_range(range);
            self.sink.set_borders(range);
        }
    }

    /// Emits one subtotal row per closed level that has subtotal fields,
    /// innermost level first. Returns the row after the last one emitted.
    fn emit_subtotals(&mut self, cur_row: u32) -> u32 {
        let mut emitted = 0;
        let bold = self.options.font.clone().with_bold(true);

        for (level, state) in self.hierarchy.iter().zip(self.levels.iter()).rev() {
            if level.subtotal.is_empty() || !state.changed {
                continue;
            }
            let block_start = match state.last_value_row {
                Some(start) if start < cur_row => start,
                _ => continue,
            };

            let row = cur_row + emitted;
            let field = &self.layout.fields[level.field];
            self.sink.set_row_height(row, self.options.subtotal_row_height);

            // a hidden field has no column of its own to carry the label
            let label_col = if field.hidden {
                self.first_col
            } else {
                let (c1, c2) = field.columns(self.first_col);
                if c1 != c2 {
                    self.sink.merge_range(CellRange::row_span(row, c1, c2));
                }
                c1
            };
            let label = format!(
                "{} '{}'",
                self.options.subtotal_label_prefix,
                state.last_value.clone().unwrap_or_default()
            );
            self.sink.set_cell_value(row, label_col, CellValue::Text(label));
            self.sink.set_alignment(CellRange::cell(row, label_col), None);
            self.sink.set_font(CellRange::cell(row, label_col), &bold);

            for &member in &level.subtotal {
                let target = &self.layout.fields[member];
                let (c1, c2) = target.columns(self.first_col);
                let range = CellRange::row_span(row, c1, c2);

                self.sink
                    .set_formula(row, c1, &subtotal_formula(c1, block_start, cur_row - 1));
                if c1 != c2 {
                    self.sink.merge_range(range);
                }
                self.sink.set_alignment(range, Some(TextAlign::Right));
                if let Some(format) = target.format.number_format() {
                    self.sink.set_number_format(range, &format);
                }
                self.sink.set_borders(range);
                self.sink.set_fill(range, self.options.subtotal_fill);
            }

            let outline_start = block_start.saturating_sub(level.subtitle_rows);
            for r in outline_start..row {
                self.sink.adjust_row_outline_level(r, 1);
            }

            trace!(
                "subtotal of '{}' for rows {}..={} at row {}",
                self.layout.names[level.field],
                block_start,
                cur_row - 1,
                row
            );
            emitted += 1;
        }

        cur_row + emitted
    }

    /// Runs the subtitle hook of every changed level, outermost first. Each
    /// hook decides where the next free row is.
    fn emit_subtitles(&mut self, mut cur_row: u32, row: &[CellValue], data_index: usize) -> Result<u32> {
        let view = RowView::new(self.layout, row);
        for (level, state) in self.hierarchy.iter_mut().zip(self.levels.iter()) {
            if !state.changed {
                continue;
            }
            if let Some(subtitle) = level.subtitle.as_mut() {
                let next = subtitle(&mut *self.sink, &view, cur_row, self.first_col).map_err(|source| {
                    TableError::Callback {
                        hook: Hook::Subtitle,
                        row: data_index,
                        source,
                    }
                })?;
                if next < cur_row {
                    return Err(TableError::Callback {
                        hook: Hook::Subtitle,
                        row: data_index,
                        source: format!("subtitle moved the cursor back from row {} to {}", cur_row, next).into(),
                    });
                }
                cur_row = next;
            }
        }
        Ok(cur_row)
    }

    /// Applies coloring and pattern hooks to their fields' cells.
    fn apply_fills(&mut self, cur_row: u32, row: &[CellValue], data_index: usize) -> Result<()> {
        let view = RowView::new(self.layout, row);
        for (field, hooks) in self.layout.fields.iter().zip(self.hooks.iter()) {
            if field.hidden {
                continue;
            }
            let (c1, c2) = field.columns(self.first_col);
            let range = CellRange::row_span(cur_row, c1, c2);

            if let Some(coloring) = &hooks.coloring {
                let color = coloring(&view).map_err(|source| TableError::Callback {
                    hook: Hook::Coloring,
                    row: data_index,
                    source,
                })?;
                if let Some(color) = color {
                    self.sink.set_fill(range, color);
                }
            }
            if let Some(pattern) = &hooks.pattern {
                let fill = pattern(&view).map_err(|source| TableError::Callback {
                    hook: Hook::Pattern,
                    row: data_index,
                    source,
                })?;
                if let Some(fill) = fill {
                    self.sink.set_pattern_fill(range, fill);
                }
            }
        }
        Ok(())
    }

    /// Writes visible values. Numeric formats skip literal zeros so printed
    /// reports only show quantities that are there.
    fn write_values(&mut self, cur_row: u32, row: &[CellValue]) {
        for field in &self.layout.fields {
            if field.hidden || field.format == FieldFormat::Empty {
                continue;
            }
            let value = &row[field.index];
            if value.is_empty() || (field.format.is_numeric() && value.is_zero()) {
                continue;
            }
            self.sink
                .set_cell_value(cur_row, self.first_col + field.grid_start, value.clone());
        }
    }

    fn update_hide_eligibility(&mut self, row: &[CellValue]) {
        for (index, hooks) in self.hooks.iter().enumerate() {
            if let Some(predicate) = &hooks.hide_when {
                if self.hide_eligible[index] == Some(true) && !predicate(&row[index]) {
                    self.hide_eligible[index] = Some(false);
                }
            }
        }
    }

    fn style_row(&mut self, cur_row: u32) {
        for field in &self.layout.fields {
            if field.hidden {
                continue;
            }
            let (c1, c2) = field.columns(self.first_col);
            let range = CellRange::row_span(cur_row, c1, c2);
            let horizontal = field.format.is_numeric().then_some(TextAlign::Right);
            self.sink.set_alignment(range, horizontal);
            if let Some(format) = field.format.number_format() {
                self.sink.set_number_format(range, &format);
            }
        }

        let width = self.layout.width;
        if width > 0 {
            let range = CellRange::row_span(cur_row, self.first_col, self.first_col + width - 1);
            self.sink.set_borders(range);
            self.sink.set_font(range, &self.options.font);
        }
    }

    /// Opens a new block at `cur_row` for every changed level.
    fn finalize(&mut self, row: Option<&[CellValue]>, cur_row: u32) {
        for (level, state) in self.hierarchy.iter().zip(self.levels.iter_mut()) {
            if !state.changed {
                continue;
            }
            state.last_value = row.map(|values| values[level.field].clone());
            state.last_value_row = Some(cur_row);
            state.changed = false;
        }
    }

    fn hide_unused_columns(&mut self) {
        for (field, eligible) in self.layout.fields.iter().zip(self.hide_eligible.iter()) {
            if field.hidden || *eligible != Some(true) {
                continue;
            }
            let (c1, c2) = field.columns(self.first_col);
            for col in c1..=c2 {
                self.sink.set_column_hidden(col, true);
            }
        }
    }

    fn set_column_widths(&mut self) {
        for field in self.layout.fields.iter().filter(|f| !f.hidden) {
            let Some(width) = field.width else { continue };
            let (c1, c2) = field.columns(self.first_col);
            for col in c1..=c2 {
                self.sink.set_column_width(col, width);
            }
        }
    }
}
