//! FILENAME: sheet/src/grid.rs
//! PURPOSE: In-memory worksheet that records everything a renderer draws.
//! CONTEXT: Sparse storage (HashMap) keyed by 0-based (row, col), plus the
//! sheet-level layout state a report produces: merged ranges, row heights,
//! row outline levels, hidden and sized columns. It implements `GridSink`
//! and is what the xlsx exporter reads from.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::warn;

use crate::cell::{Cell, CellValue};
use crate::coord::CellRange;
use crate::formula::{is_subtotal, parse_subtotal, SUBTOTAL_SUM};
use crate::sink::GridSink;
use crate::style::{
    BorderLineStyle, BorderStyle, Borders, CellStyle, Color, FontStyle, NumberFormat, PatternFill,
    StyleRegistry, TextAlign,
};

/// Maximum row outline level a viewer supports.
pub const MAX_OUTLINE_LEVEL: u8 = 7;

#[derive(Debug, Clone, Default)]
pub struct Grid {
    /// Sparse storage: keys are (row, col).
    pub cells: HashMap<(u32, u32), Cell>,
    pub styles: StyleRegistry,
    merges: Vec<CellRange>,
    row_heights: BTreeMap<u32, f64>,
    outline_levels: BTreeMap<u32, u8>,
    hidden_columns: BTreeSet<u32>,
    column_widths: BTreeMap<u32, f64>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// The value at a coordinate, `Empty` when nothing was written.
    pub fn value(&self, row: u32, col: u32) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.cells.get(&(row, col)).map(|c| &c.value).unwrap_or(&EMPTY)
    }

    pub fn formula(&self, row: u32, col: u32) -> Option<&str> {
        self.cells.get(&(row, col)).and_then(|c| c.formula.as_deref())
    }

    /// The resolved style of a cell (default style for untouched cells).
    pub fn style(&self, row: u32, col: u32) -> &CellStyle {
        let index = self.cells.get(&(row, col)).map(|c| c.style_index).unwrap_or(0);
        self.styles.get(index)
    }

    pub fn merges(&self) -> &[CellRange] {
        &self.merges
    }

    /// The merged range covering a cell, if any.
    pub fn merge_at(&self, row: u32, col: u32) -> Option<CellRange> {
        self.merges.iter().copied().find(|m| m.contains(row, col))
    }

    pub fn row_height(&self, row: u32) -> Option<f64> {
        self.row_heights.get(&row).copied()
    }

    pub fn row_heights(&self) -> &BTreeMap<u32, f64> {
        &self.row_heights
    }

    pub fn outline_level(&self, row: u32) -> u8 {
        self.outline_levels.get(&row).copied().unwrap_or(0)
    }

    pub fn outline_levels(&self) -> &BTreeMap<u32, u8> {
        &self.outline_levels
    }

    pub fn is_column_hidden(&self, col: u32) -> bool {
        self.hidden_columns.contains(&col)
    }

    pub fn hidden_columns(&self) -> impl Iterator<Item = u32> + '_ {
        self.hidden_columns.iter().copied()
    }

    pub fn column_widths(&self) -> &BTreeMap<u32, f64> {
        &self.column_widths
    }

    /// Applies `modify` to the style of every cell in `range`, interning
    /// each resulting style. Cells are created as needed.
    pub fn update_style<F>(&mut self, range: CellRange, modify: F)
    where
        F: Fn(&mut CellStyle),
    {
        for (row, col) in range.cells() {
            let current = self.cells.get(&(row, col)).map(|c| c.style_index).unwrap_or(0);
            let mut style = self.styles.get(current).clone();
            modify(&mut style);
            let index = self.styles.get_or_create(style);
            self.cells.entry((row, col)).or_default().style_index = index;
        }
    }

    /// Evaluates a `SUBTOTAL(9, range)` formula stored at a cell.
    /// Cells in the range that are themselves subtotals are skipped, as are
    /// non-numeric values. Returns None for anything that is not a
    /// SUBTOTAL sum.
    pub fn evaluate_subtotal(&self, row: u32, col: u32) -> Option<f64> {
        let (func, range) = parse_subtotal(self.formula(row, col)?)?;
        if func != SUBTOTAL_SUM {
            return None;
        }
        let total: f64 = range
            .cells()
            .filter_map(|(r, c)| self.cells.get(&(r, c)))
            .filter(|cell| !cell.formula.as_deref().map(is_subtotal).unwrap_or(false))
            .filter_map(|cell| cell.value.as_number())
            .sum();
        Some(total)
    }
}

impl GridSink for Grid {
    fn set_cell_value(&mut self, row: u32, col: u32, value: CellValue) {
        let cell = self.cells.entry((row, col)).or_default();
        cell.formula = None;
        cell.value = value;
    }

    fn set_formula(&mut self, row: u32, col: u32, formula: &str) {
        let cell = self.cells.entry((row, col)).or_default();
        cell.formula = Some(formula.to_string());
        cell.value = CellValue::Empty;
    }

    fn merge_range(&mut self, range: CellRange) {
        if range.is_single_cell() || self.merges.contains(&range) {
            return;
        }
        if let Some(existing) = self.merges.iter().find(|m| m.intersects(&range)) {
            warn!("merge {} overlaps existing merge {}, skipped", range, existing);
            return;
        }
        self.merges.push(range);
    }

    fn set_borders(&mut self, range: CellRange) {
        self.update_style(range, |style| {
            style.borders = Borders::all(BorderLineStyle::Thin);
        });
    }

    fn set_alignment(&mut self, range: CellRange, horizontal: Option<TextAlign>) {
        let align = horizontal.unwrap_or_default();
        self.update_style(range, |style| {
            style.text_align = align;
            style.wrap_text = true;
        });
    }

    fn set_number_format(&mut self, range: CellRange, format: &NumberFormat) {
        self.update_style(range, |style| style.number_format = format.clone());
    }

    fn set_fill(&mut self, range: CellRange, color: Color) {
        self.update_style(range, |style| {
            style.background = Some(color);
            style.pattern = None;
        });
    }

    fn set_pattern_fill(&mut self, range: CellRange, fill: PatternFill) {
        self.update_style(range, |style| {
            style.background = Some(fill.background);
            style.pattern = Some(fill);
        });
    }

    fn set_font(&mut self, range: CellRange, font: &FontStyle) {
        self.update_style(range, |style| style.font = font.clone());
    }

    fn set_row_height(&mut self, row: u32, height: f64) {
        self.row_heights.insert(row, height);
    }

    fn adjust_row_outline_level(&mut self, row: u32, delta: i8) {
        let current = self.outline_level(row) as i16;
        let level = (current + delta as i16).clamp(0, MAX_OUTLINE_LEVEL as i16) as u8;
        if level == 0 {
            self.outline_levels.remove(&row);
        } else {
            self.outline_levels.insert(row, level);
        }
    }

    fn set_column_hidden(&mut self, col: u32, hidden: bool) {
        if hidden {
            self.hidden_columns.insert(col);
        } else {
            self.hidden_columns.remove(&col);
        }
    }

    fn set_column_width(&mut self, col: u32, width: f64) {
        self.column_widths.insert(col, width);
    }

    fn set_outline_border(&mut self, range: CellRange, style: BorderLineStyle) {
        let edge = BorderStyle::line(style);
        let CellRange {
            first_row,
            first_col,
            last_row,
            last_col,
        } = range;
        self.update_style(CellRange::row_span(first_row, first_col, last_col), |s| {
            s.borders.top = edge.clone()
        });
        self.update_style(CellRange::row_span(last_row, first_col, last_col), |s| {
            s.borders.bottom = edge.clone()
        });
        self.update_style(CellRange::new(first_row, first_col, last_row, first_col), |s| {
            s.borders.left = edge.clone()
        });
        self.update_style(CellRange::new(first_row, last_col, last_row, last_col), |s| {
            s.borders.right = edge.clone()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::subtotal_formula;

    #[test]
    fn test_values_and_formulas_replace_each_other() {
        let mut grid = Grid::new();
        grid.set_formula(0, 0, "=SUBTOTAL(9,B1:B2)");
        assert_eq!(grid.formula(0, 0), Some("=SUBTOTAL(9,B1:B2)"));

        grid.set_cell_value(0, 0, CellValue::Number(1.0));
        assert_eq!(grid.formula(0, 0), None);
        assert_eq!(grid.value(0, 0), &CellValue::Number(1.0));
        assert_eq!(grid.value(5, 5), &CellValue::Empty);
    }

    #[test]
    fn test_overlapping_merge_is_rejected() {
        let mut grid = Grid::new();
        grid.merge_range(CellRange::new(0, 0, 2, 0));
        grid.merge_range(CellRange::new(1, 0, 1, 1));
        grid.merge_range(CellRange::cell(4, 4));

        assert_eq!(grid.merges(), &[CellRange::new(0, 0, 2, 0)]);
        assert_eq!(grid.merge_at(2, 0), Some(CellRange::new(0, 0, 2, 0)));
    }

    #[test]
    fn test_style_updates_compose() {
        let mut grid = Grid::new();
        let range = CellRange::row_span(0, 0, 1);
        grid.set_borders(range);
        grid.set_fill(range, Color::LIGHT_GRAY);
        grid.set_alignment(range, Some(TextAlign::Right));

        let style = grid.style(0, 1);
        assert_eq!(style.borders, Borders::all(BorderLineStyle::Thin));
        assert_eq!(style.background, Some(Color::LIGHT_GRAY));
        assert_eq!(style.text_align, TextAlign::Right);
        // identical styles share one registry entry
        assert_eq!(grid.get_cell(0, 0).unwrap().style_index, grid.get_cell(0, 1).unwrap().style_index);
    }

    #[test]
    fn test_outline_border_touches_edges_only() {
        let mut grid = Grid::new();
        grid.set_outline_border(CellRange::new(0, 0, 2, 2), BorderLineStyle::Medium);

        assert_eq!(grid.style(0, 1).borders.top.style, BorderLineStyle::Medium);
        assert_eq!(grid.style(2, 1).borders.bottom.style, BorderLineStyle::Medium);
        assert_eq!(grid.style(1, 0).borders.left.style, BorderLineStyle::Medium);
        assert_eq!(grid.style(1, 2).borders.right.style, BorderLineStyle::Medium);
        assert!(grid.style(1, 1).borders.top.is_none());
    }

    #[test]
    fn test_outline_levels_clamp() {
        let mut grid = Grid::new();
        for _ in 0..10 {
            grid.adjust_row_outline_level(3, 1);
        }
        assert_eq!(grid.outline_level(3), MAX_OUTLINE_LEVEL);
        grid.adjust_row_outline_level(4, -1);
        assert_eq!(grid.outline_level(4), 0);
        assert!(!grid.outline_levels().contains_key(&4));
    }

    #[test]
    fn test_subtotal_skips_nested_subtotals() {
        let mut grid = Grid::new();
        grid.set_cell_value(0, 1, CellValue::Number(5.0));
        grid.set_cell_value(1, 1, CellValue::Number(7.0));
        grid.set_formula(2, 1, &subtotal_formula(1, 0, 1));
        grid.set_cell_value(3, 1, CellValue::Number(2.0));
        grid.set_cell_value(4, 1, CellValue::text("n/a"));
        grid.set_formula(5, 1, &subtotal_formula(1, 0, 4));

        assert_eq!(grid.evaluate_subtotal(2, 1), Some(12.0));
        assert_eq!(grid.evaluate_subtotal(5, 1), Some(14.0));
        assert_eq!(grid.evaluate_subtotal(0, 1), None);
    }

    #[test]
    fn test_hidden_columns() {
        let mut grid = Grid::new();
        grid.set_column_hidden(2, true);
        grid.set_column_hidden(3, true);
        grid.set_column_hidden(3, false);
        assert_eq!(grid.hidden_columns().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_column_widths() {
        let mut grid = Grid::new();
        grid.set_column_width(1, 20.0);
        grid.set_column_width(1, 12.5);
        grid.set_column_width(4, 7.0);
        let widths: Vec<(u32, f64)> = grid.column_widths().iter().map(|(c, w)| (*c, *w)).collect();
        assert_eq!(widths, vec![(1, 12.5), (4, 7.0)]);
    }
}
