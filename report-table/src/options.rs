//! FILENAME: report-table/src/options.rs
//! PURPOSE: Presentation settings of a rendered table.
//! CONTEXT: Deserializable so report scripts can keep them next to their
//! field declarations; every field has a default.

use serde::{Deserialize, Serialize};
use sheet::{BorderLineStyle, Color, FontStyle};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    /// Height of every data row, in points.
    pub row_height: f64,
    /// Height of inserted subtotal rows, in points.
    pub subtotal_row_height: f64,
    /// Background of subtotal formula cells.
    pub subtotal_fill: Color,
    /// Border drawn around the whole rendered block.
    pub outline_border: BorderLineStyle,
    /// Font applied to every data row.
    pub font: FontStyle,
    /// Prefix of subtotal labels: `<prefix> '<group value>'`.
    pub subtotal_label_prefix: String,
}

impl Default for TableOptions {
    fn default() -> Self {
        TableOptions {
            row_height: 30.0,
            subtotal_row_height: 18.0,
            subtotal_fill: Color::LIGHT_GRAY,
            outline_border: BorderLineStyle::Medium,
            font: FontStyle::default(),
            subtotal_label_prefix: "Σ".to_string(),
        }
    }
}
