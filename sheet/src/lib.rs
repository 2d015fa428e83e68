//! FILENAME: sheet/src/lib.rs
//! PURPOSE: Main library entry point for the report grid model.
//! CONTEXT: Re-exports the value, coordinate and style types shared by the
//! table renderer and the xlsx exporter, together with the `GridSink`
//! contract and its in-memory implementation.

pub mod cell;
pub mod coord;
pub mod formula;
pub mod grid;
pub mod sink;
pub mod style;

// Re-export commonly used types at the crate root
pub use cell::{Cell, CellValue};
pub use coord::{a1_to_coord, col_to_index, coord_to_a1, index_to_col, CellCoord, CellRange};
pub use formula::{is_subtotal, parse_subtotal, subtotal_formula};
pub use grid::{Grid, MAX_OUTLINE_LEVEL};
pub use sink::GridSink;
pub use style::{
    BorderLineStyle, BorderStyle, Borders, CellStyle, Color, FontStyle, NumberFormat, PatternFill,
    PatternKind, StyleRegistry, TextAlign, VerticalAlign,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_records_through_the_sink_trait() {
        let mut grid = Grid::new();
        {
            let sink: &mut dyn GridSink = &mut grid;
            sink.set_cell_value(0, 0, CellValue::text("Hello"));
            sink.set_row_height(0, 30.0);
        }

        assert_eq!(grid.value(0, 0), &CellValue::text("Hello"));
        assert_eq!(grid.row_height(0), Some(30.0));
    }

    #[test]
    fn integration_test_subtotal_roundtrip() {
        let mut grid = Grid::new();
        let a1 = a1_to_coord("C2").unwrap();
        grid.set_cell_value(a1.0, a1.1, CellValue::Number(10.0));
        grid.set_cell_value(a1.0 + 1, a1.1, CellValue::Number(20.0));
        grid.set_formula(3, a1.1, &subtotal_formula(a1.1, a1.0, a1.0 + 1));

        assert_eq!(grid.formula(3, 2), Some("=SUBTOTAL(9,C2:C3)"));
        assert_eq!(grid.evaluate_subtotal(3, 2), Some(30.0));
    }
}
