//! FILENAME: tests/common/mod.rs
//! Fixtures shared by the report table integration tests.

#![allow(dead_code)]

use report_table::{FieldFormat, FieldSchema, Row, Table};
use sheet::{CellValue, Grid};

/// Stock report columns: article (2 columns wide), color, size, qty, price.
pub fn stock_schemas() -> Vec<FieldSchema> {
    vec![
        FieldSchema::new("article", FieldFormat::String).span(2),
        FieldSchema::new("color", FieldFormat::String),
        FieldSchema::new("size", FieldFormat::Int),
        FieldSchema::new("qty", FieldFormat::Int),
        FieldSchema::new("price", FieldFormat::Currency),
    ]
}

/// Rows already grouped by article, then color.
pub fn stock_rows() -> Vec<Row> {
    vec![
        row(&["boot", "black"], 42, 3, 79.9),
        row(&["boot", "black"], 43, 1, 79.9),
        row(&["boot", "brown"], 42, 2, 84.5),
        row(&["sandal", "brown"], 40, 5, 35.0),
        row(&["sandal", "white"], 38, 0, 35.0),
        row(&["sandal", "white"], 39, 4, 35.0),
    ]
}

fn row(keys: &[&str; 2], size: i64, qty: i64, price: f64) -> Row {
    vec![
        keys[0].into(),
        keys[1].into(),
        size.into(),
        qty.into(),
        price.into(),
    ]
}

pub fn stock_table() -> Table {
    Table::new(stock_schemas(), stock_rows()).unwrap()
}

/// Two-column table of (group, amount) rows.
pub fn pairs_table(rows: &[(&str, f64)]) -> Table {
    let schemas = vec![
        FieldSchema::new("group", FieldFormat::String),
        FieldSchema::new("amount", FieldFormat::Int),
    ];
    let rows = rows
        .iter()
        .map(|(group, amount)| vec![CellValue::text(*group), CellValue::Number(*amount)])
        .collect();
    Table::new(schemas, rows).unwrap()
}

/// Renders at the grid origin and returns the grid plus the next free row.
pub fn render(table: &mut Table) -> (Grid, u32) {
    let mut grid = Grid::new();
    let next = table.apply(&mut grid, 0, 0).unwrap();
    (grid, next)
}

pub fn text(grid: &Grid, row: u32, col: u32) -> String {
    grid.value(row, col).to_string()
}
