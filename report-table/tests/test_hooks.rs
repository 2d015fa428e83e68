//! FILENAME: tests/test_hooks.rs
//! Caller hooks: calculation, fills, subtitles (including a nested table)
//! and failure propagation.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::*;
use report_table::{FieldFormat, FieldSchema, GroupLevel, Hook, Table, TableError};
use sheet::{CellRange, CellValue, Color, Grid, GridSink, PatternFill, PatternKind};

#[test]
fn test_calculation_rewrites_row_before_drawing() {
    let schemas = vec![
        FieldSchema::new("qty", FieldFormat::Int),
        FieldSchema::new("price", FieldFormat::Currency),
        FieldSchema::new("total", FieldFormat::Currency),
    ];
    let rows = vec![
        vec![2.into(), 1.5.into(), CellValue::Empty],
        vec![4.into(), 2.0.into(), CellValue::Empty],
    ];
    let mut table = Table::new(schemas, rows).unwrap();
    table.set_calculation(|record| {
        let total = record.number("qty").unwrap_or(0.0) * record.number("price").unwrap_or(0.0);
        record.set("total", total)?;
        Ok(())
    });
    let (grid, _) = render(&mut table);

    assert_eq!(grid.value(0, 2), &CellValue::Number(3.0));
    assert_eq!(grid.value(1, 2), &CellValue::Number(8.0));
    // the stored rows are untouched
    assert_eq!(table.rows()[0][2], CellValue::Empty);
}

#[test]
fn test_calculated_values_drive_grouping() {
    let mut table = pairs_table(&[("raw", 1.0), ("raw", 2.0), ("raw", 3.0)]);
    table.set_calculation(|record| {
        let bucket = if record.number("amount").unwrap_or(0.0) < 2.5 { "low" } else { "high" };
        record.set("group", bucket)?;
        Ok(())
    });
    table
        .hierarchy_append("group", GroupLevel::new().subtotal(["amount"]))
        .unwrap();
    let (grid, next) = render(&mut table);

    assert_eq!(next, 5);
    assert_eq!(text(&grid, 2, 0), "Σ 'low'");
    assert_eq!(text(&grid, 4, 0), "Σ 'high'");
}

#[test]
fn test_coloring_and_pattern_fill_field_cells() {
    let mut table = stock_table();
    table
        .set_coloring("qty", |row| {
            Ok((row.number("qty") == Some(0.0)).then_some(Color::LIGHT_RED))
        })
        .unwrap();
    let hatch = PatternFill {
        background: Color::WHITE,
        foreground: Color::GRAY,
        kind: PatternKind::LightUp,
    };
    table
        .set_pattern("article", move |row| {
            Ok((row.get("color") == Some(&CellValue::text("white"))).then_some(hatch))
        })
        .unwrap();
    let (grid, _) = render(&mut table);

    assert_eq!(grid.style(4, 4).background, Some(Color::LIGHT_RED));
    assert_eq!(grid.style(3, 4).background, None);
    // the pattern covers both columns of the article field
    assert_eq!(grid.style(4, 0).pattern, Some(hatch));
    assert_eq!(grid.style(4, 1).pattern, Some(hatch));
    assert_eq!(grid.style(3, 0).pattern, None);
}

#[test]
fn test_subtitle_cursor_is_honoured() {
    let mut table = pairs_table(&[("c1", 1.0), ("c1", 2.0), ("c2", 3.0)]);
    table
        .hierarchy_append(
            "group",
            GroupLevel::new()
                .subtotal(["amount"])
                .subtitle_rows(1)
                .subtitle(|sink, row, cur_row, first_col| {
                    let title = format!("== {} ==", row.get("group").cloned().unwrap_or_default());
                    sink.set_cell_value(cur_row, first_col, CellValue::Text(title));
                    sink.merge_range(CellRange::row_span(cur_row, first_col, first_col + 1));
                    Ok(cur_row + 1)
                }),
        )
        .unwrap();
    let (grid, next) = render(&mut table);

    assert_eq!(next, 7);
    assert_eq!(text(&grid, 0, 0), "== c1 ==");
    assert_eq!(text(&grid, 1, 0), "c1");
    assert_eq!(text(&grid, 3, 0), "Σ 'c1'");
    assert_eq!(grid.formula(3, 1), Some("=SUBTOTAL(9,B2:B3)"));
    assert_eq!(text(&grid, 4, 0), "== c2 ==");
    assert_eq!(grid.formula(6, 1), Some("=SUBTOTAL(9,B6:B6)"));

    // the reserved subtitle row joins its block's outline group
    let levels: Vec<u8> = (0..7).map(|row| grid.outline_level(row)).collect();
    assert_eq!(levels, vec![1, 1, 1, 0, 1, 1, 0]);
}

#[test]
fn test_subtitle_may_render_a_nested_table() {
    let detail = Rc::new(RefCell::new(pairs_table(&[("part", 10.0), ("part", 20.0)])));
    let nested = Rc::clone(&detail);

    let mut table = pairs_table(&[("order-1", 1.0), ("order-2", 2.0)]);
    table
        .hierarchy_append(
            "group",
            GroupLevel::new().subtitle(move |sink, _row, cur_row, first_col| {
                Ok(nested.borrow_mut().apply(sink, cur_row, first_col + 1)?)
            }),
        )
        .unwrap();
    let (grid, next) = render(&mut table);

    // two detail rows, then the order row, per order
    assert_eq!(next, 6);
    assert_eq!(text(&grid, 0, 1), "part");
    assert_eq!(grid.value(1, 2), &CellValue::Number(20.0));
    assert_eq!(text(&grid, 2, 0), "order-1");
    assert_eq!(text(&grid, 3, 1), "part");
    assert_eq!(text(&grid, 5, 0), "order-2");
    assert_eq!(detail.borrow().row_count(), 2);
}

#[test]
fn test_failing_hook_stops_render_with_partial_grid() {
    let mut table = stock_table();
    table
        .set_coloring("price", |row| {
            if row.get("article") == Some(&CellValue::text("sandal")) {
                return Err("no palette for sandals".into());
            }
            Ok(None)
        })
        .unwrap();
    let mut grid = Grid::new();
    let err = table.apply(&mut grid, 0, 0).unwrap_err();

    assert!(matches!(
        err,
        TableError::Callback { hook: Hook::Coloring, row: 3, .. }
    ));
    assert!(err.to_string().contains("no palette for sandals"));
    // rows drawn before the failure stay in the grid
    assert_eq!(text(&grid, 2, 0), "boot");
    assert_eq!(grid.value(3, 0), &CellValue::Empty);
}

#[test]
fn test_failing_calculation_reports_its_row() {
    let mut table = pairs_table(&[("a", 1.0), ("b", -1.0)]);
    table.set_calculation(|record| {
        if record.number("amount").unwrap_or(0.0) < 0.0 {
            return Err("negative amount".into());
        }
        Ok(())
    });
    let mut grid = Grid::new();
    let err = table.apply(&mut grid, 0, 0).unwrap_err();

    assert!(matches!(
        err,
        TableError::Callback { hook: Hook::Calculation, row: 1, .. }
    ));
}

#[test]
fn test_failing_subtitle_is_reported() {
    let mut table = pairs_table(&[("a", 1.0)]);
    table
        .hierarchy_append(
            "group",
            GroupLevel::new().subtitle(|_, _, _, _| Err("header too tall".into())),
        )
        .unwrap();
    let mut grid = Grid::new();
    let err = table.apply(&mut grid, 0, 0).unwrap_err();

    assert!(matches!(
        err,
        TableError::Callback { hook: Hook::Subtitle, row: 0, .. }
    ));
}

#[test]
fn test_subtitle_cannot_move_cursor_back() {
    let mut table = pairs_table(&[("a", 1.0), ("b", 2.0)]);
    table
        .hierarchy_append(
            "group",
            GroupLevel::new().subtitle(|_, _, cur_row, _| Ok(cur_row.saturating_sub(1))),
        )
        .unwrap();
    let mut grid = Grid::new();
    let err = table.apply(&mut grid, 0, 0).unwrap_err();

    // the second block's subtitle points above the subtotal row just drawn
    match err {
        TableError::Callback { hook: Hook::Subtitle, row: 1, source } => {
            assert!(source.to_string().contains("back from row"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_hooks_see_rows_by_name() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);

    let mut table = stock_table();
    table
        .set_coloring("color", move |row| {
            let names: Vec<String> = row.iter().map(|(name, _)| name.to_string()).collect();
            log.borrow_mut().push(names);
            Ok(None)
        })
        .unwrap();
    render(&mut table);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 6);
    assert_eq!(seen[0], vec!["article", "color", "size", "qty", "price"]);
}

#[test]
fn test_sink_trait_object_accepts_custom_sinks() {
    /// Records only values, ignoring layout calls.
    #[derive(Default)]
    struct ValueLog(Vec<(u32, u32, CellValue)>);

    impl GridSink for ValueLog {
        fn set_cell_value(&mut self, row: u32, col: u32, value: CellValue) {
            self.0.push((row, col, value));
        }
        fn set_formula(&mut self, _: u32, _: u32, _: &str) {}
        fn merge_range(&mut self, _: CellRange) {}
        fn set_borders(&mut self, _: CellRange) {}
        fn set_alignment(&mut self, _: CellRange, _: Option<sheet::TextAlign>) {}
        fn set_number_format(&mut self, _: CellRange, _: &sheet::NumberFormat) {}
        fn set_fill(&mut self, _: CellRange, _: Color) {}
        fn set_pattern_fill(&mut self, _: CellRange, _: PatternFill) {}
        fn set_font(&mut self, _: CellRange, _: &sheet::FontStyle) {}
        fn set_row_height(&mut self, _: u32, _: f64) {}
        fn adjust_row_outline_level(&mut self, _: u32, _: i8) {}
        fn set_column_hidden(&mut self, _: u32, _: bool) {}
        fn set_column_width(&mut self, _: u32, _: f64) {}
        fn set_outline_border(&mut self, _: CellRange, _: sheet::BorderLineStyle) {}
    }

    let mut table = pairs_table(&[("a", 1.0), ("b", 0.0)]);
    let mut sink = ValueLog::default();
    assert_eq!(table.apply(&mut sink, 0, 0).unwrap(), 2);
    assert_eq!(
        sink.0,
        vec![
            (0, 0, CellValue::text("a")),
            (0, 1, CellValue::Number(1.0)),
            (1, 0, CellValue::text("b")),
        ]
    );
}
