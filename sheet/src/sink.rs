//! FILENAME: sheet/src/sink.rs
//! PURPOSE: The narrow write surface a report renderer draws onto.
//! CONTEXT: Implemented by the in-memory `Grid`; any workbook backend can
//! implement it too. Operations are not idempotent (merges, outline levels),
//! so a region must have exactly one writer.

use crate::cell::CellValue;
use crate::coord::CellRange;
use crate::style::{BorderLineStyle, Color, FontStyle, NumberFormat, PatternFill, TextAlign};

pub trait GridSink {
    fn set_cell_value(&mut self, row: u32, col: u32, value: CellValue);

    /// Stores formula text (leading `=` included) in a cell.
    fn set_formula(&mut self, row: u32, col: u32, formula: &str);

    fn merge_range(&mut self, range: CellRange);

    /// Thin borders on every edge of every cell in the range.
    fn set_borders(&mut self, range: CellRange);

    /// `None` restores the viewer's general alignment.
    fn set_alignment(&mut self, range: CellRange, horizontal: Option<TextAlign>);

    fn set_number_format(&mut self, range: CellRange, format: &NumberFormat);

    fn set_fill(&mut self, range: CellRange, color: Color);

    fn set_pattern_fill(&mut self, range: CellRange, fill: PatternFill);

    fn set_font(&mut self, range: CellRange, font: &FontStyle);

    fn set_row_height(&mut self, row: u32, height: f64);

    /// Shifts a row's outline (grouping) level by `delta`.
    fn adjust_row_outline_level(&mut self, row: u32, delta: i8);

    fn set_column_hidden(&mut self, col: u32, hidden: bool);

    /// Column width in characters of the default font.
    fn set_column_width(&mut self, col: u32, width: f64);

    /// Draws `style` only on the outer edges of the range.
    fn set_outline_border(&mut self, range: CellRange, style: BorderLineStyle);
}
