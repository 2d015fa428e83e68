//! FILENAME: sheet/src/coord.rs
//! PURPOSE: Grid coordinates, inclusive cell ranges and A1 notation.
//! CONTEXT: Everything internal is 0-based (row, col). A1 text is only
//! produced for formulas handed to the viewer: column "A" = 0, row 1 = 0.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell coordinate as (row, col) with 0-based indices.
pub type CellCoord = (u32, u32);

/// Converts a column string (e.g., "A", "AA") to a 0-based column index.
/// Returns None for an empty string or a non-alphabetic character.
pub fn col_to_index(col_str: &str) -> Option<u32> {
    if col_str.is_empty() {
        return None;
    }
    let mut result: u32 = 0;
    for c in col_str.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
        result = result.checked_mul(26)?.checked_add(digit)?;
    }
    Some(result - 1)
}

/// Converts a 0-based column index to a column string.
/// 0 -> "A", 25 -> "Z", 26 -> "AA".
pub fn index_to_col(mut col_index: u32) -> String {
    let mut result = String::new();
    loop {
        let remainder = col_index % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if col_index < 26 {
            break;
        }
        col_index = col_index / 26 - 1;
    }
    result
}

/// Converts a 0-based (row, col) coordinate to an A1-style reference.
/// (0, 0) -> "A1", (99, 26) -> "AA100"
pub fn coord_to_a1(coord: CellCoord) -> String {
    let (row, col) = coord;
    format!("{}{}", index_to_col(col), row + 1)
}

/// Parses an A1-style reference ("B12") into a 0-based coordinate.
pub fn a1_to_coord(reference: &str) -> Option<CellCoord> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    let col = col_to_index(letters)?;
    let row: u32 = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((row - 1, col))
}

/// An inclusive rectangular range of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRange {
    pub first_row: u32,
    pub first_col: u32,
    pub last_row: u32,
    pub last_col: u32,
}

impl CellRange {
    /// Creates a range, normalizing the corner order.
    pub fn new(row1: u32, col1: u32, row2: u32, col2: u32) -> Self {
        CellRange {
            first_row: row1.min(row2),
            first_col: col1.min(col2),
            last_row: row1.max(row2),
            last_col: col1.max(col2),
        }
    }

    pub fn cell(row: u32, col: u32) -> Self {
        Self::new(row, col, row, col)
    }

    /// A single-row range spanning `first_col..=last_col`.
    pub fn row_span(row: u32, first_col: u32, last_col: u32) -> Self {
        Self::new(row, first_col, row, last_col)
    }

    pub fn is_single_cell(&self) -> bool {
        self.first_row == self.last_row && self.first_col == self.last_col
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.first_row && row <= self.last_row && col >= self.first_col && col <= self.last_col
    }

    pub fn intersects(&self, other: &CellRange) -> bool {
        !(self.last_row < other.first_row
            || self.first_row > other.last_row
            || self.last_col < other.first_col
            || self.first_col > other.last_col)
    }

    /// Iterates every coordinate in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let (c1, c2) = (self.first_col, self.last_col);
        (self.first_row..=self.last_row).flat_map(move |r| (c1..=c2).map(move |c| (r, c)))
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            coord_to_a1((self.first_row, self.first_col)),
            coord_to_a1((self.last_row, self.last_col))
        )
    }
}
