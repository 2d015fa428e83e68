//! FILENAME: sheet/src/formula.rs
//! PURPOSE: Builds and recognizes "subtotal over visible rows" formulas.
//! CONTEXT: Function 9 of SUBTOTAL sums a range while ignoring hidden rows
//! and any cell that itself holds a SUBTOTAL, which is what keeps stacked
//! group totals from being counted twice.

use crate::coord::{a1_to_coord, index_to_col, CellRange};

/// SUBTOTAL function number for SUM.
pub const SUBTOTAL_SUM: u32 = 9;

/// `=SUBTOTAL(9,C3:C7)` over one column, rows inclusive and 0-based.
pub fn subtotal_formula(col: u32, first_row: u32, last_row: u32) -> String {
    let letter = index_to_col(col);
    format!(
        "=SUBTOTAL({},{letter}{}:{letter}{})",
        SUBTOTAL_SUM,
        first_row.min(last_row) + 1,
        first_row.max(last_row) + 1
    )
}

/// Returns true if the formula text is a SUBTOTAL call.
pub fn is_subtotal(formula: &str) -> bool {
    formula
        .trim_start_matches('=')
        .trim_start()
        .to_ascii_uppercase()
        .starts_with("SUBTOTAL(")
}

/// Parses `=SUBTOTAL(9,A1:A5)` into its function number and range.
pub fn parse_subtotal(formula: &str) -> Option<(u32, CellRange)> {
    let body = formula.trim().trim_start_matches('=').trim();
    let upper = body.to_ascii_uppercase();
    let args = upper.strip_prefix("SUBTOTAL(")?.strip_suffix(')')?;
    let (func, range) = args.split_once(',')?;
    let func: u32 = func.trim().parse().ok()?;
    let (start, end) = range.trim().split_once(':')?;
    let (r1, c1) = a1_to_coord(start.trim())?;
    let (r2, c2) = a1_to_coord(end.trim())?;
    Some((func, CellRange::new(r1, c1, r2, c2)))
}
