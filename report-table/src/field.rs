//! FILENAME: report-table/src/field.rs
//! PURPOSE: Column schema of a report table and its packed grid layout.
//! CONTEXT: Fields are declared once, in the same order as the values of
//! every data row. Visible fields are packed left to right by span; hidden
//! fields keep their row position but occupy no grid columns.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use sheet::{CellValue, NumberFormat};

use crate::error::{Result, TableError};

// ============================================================================
// FORMAT
// ============================================================================

/// How a field's values are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldFormat {
    #[default]
    String,
    Int,
    #[serde(rename = "1digit")]
    OneDigit,
    #[serde(rename = "3digit")]
    ThreeDigit,
    Currency,
    Date,
    /// The column is drawn (borders, fills) but its values are never written.
    Empty,
}

impl FieldFormat {
    /// Numeric formats are right aligned and never print a literal zero.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldFormat::Int | FieldFormat::OneDigit | FieldFormat::ThreeDigit | FieldFormat::Currency
        )
    }

    /// The number format applied to the field's cells, if any.
    pub fn number_format(&self) -> Option<NumberFormat> {
        let number = |decimal_places| NumberFormat::Number {
            decimal_places,
            use_thousands_separator: true,
        };
        match self {
            FieldFormat::Int => Some(number(0)),
            FieldFormat::OneDigit => Some(number(1)),
            FieldFormat::ThreeDigit => Some(number(3)),
            FieldFormat::Currency => Some(number(2)),
            FieldFormat::Date => Some(NumberFormat::Date {
                format: "dd.mm.yyyy".to_string(),
            }),
            FieldFormat::String | FieldFormat::Empty => None,
        }
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

/// Static description of one table column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(default)]
    pub format: FieldFormat,
    /// Grid columns occupied when visible.
    #[serde(default = "default_span")]
    pub span: u32,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub editable: bool,
    #[serde(default)]
    pub default_value: CellValue,
    /// Width of each of the field's grid columns, in characters.
    #[serde(default)]
    pub width: Option<f64>,
}

fn default_span() -> u32 {
    1
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, format: FieldFormat) -> Self {
        FieldSchema {
            name: name.into(),
            format,
            span: 1,
            hidden: false,
            editable: false,
            default_value: CellValue::Empty,
            width: None,
        }
    }

    pub fn span(mut self, span: u32) -> Self {
        self.span = span;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<CellValue>) -> Self {
        self.default_value = value.into();
        self
    }

    pub fn width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }
}

// ============================================================================
// LAYOUT
// ============================================================================

/// Where a field lives: its row position and its grid columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldLayout {
    /// Position in schema order, which is the row value position.
    pub index: usize,
    /// First grid column, relative to the table's origin column.
    pub grid_start: u32,
    /// Last grid column (inclusive). Equal to `grid_start` for hidden fields.
    pub grid_end: u32,
    pub format: FieldFormat,
    pub hidden: bool,
    pub width: Option<f64>,
}

impl FieldLayout {
    pub fn is_multi_column(&self) -> bool {
        self.grid_end != self.grid_start
    }

    /// Absolute column pair for a table drawn at `first_col`.
    pub fn columns(&self, first_col: u32) -> (u32, u32) {
        (first_col + self.grid_start, first_col + self.grid_end)
    }
}

/// Field layouts in schema order plus a name lookup.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub fields: Vec<FieldLayout>,
    pub names: Vec<String>,
    pub by_name: FxHashMap<String, usize>,
    /// Total grid columns occupied by visible fields.
    pub width: u32,
}

impl Layout {
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| TableError::UnknownField(name.to_string()))
    }

    pub fn field(&self, name: &str) -> Result<&FieldLayout> {
        Ok(&self.fields[self.index_of(name)?])
    }
}

/// Packs visible fields into contiguous grid columns in schema order.
pub fn compute_layout(schemas: &[FieldSchema]) -> Result<Layout> {
    let mut layout = Layout::default();
    let mut offset = 0u32;

    for (index, schema) in schemas.iter().enumerate() {
        if schema.span == 0 {
            return Err(TableError::InvalidSpan(schema.name.clone()));
        }
        if layout.by_name.insert(schema.name.clone(), index).is_some() {
            return Err(TableError::DuplicateField(schema.name.clone()));
        }

        let (grid_start, grid_end) = if schema.hidden {
            (offset, offset)
        } else {
            let span = (offset, offset + schema.span - 1);
            offset += schema.span;
            span
        };

        layout.fields.push(FieldLayout {
            index,
            grid_start,
            grid_end,
            format: schema.format,
            hidden: schema.hidden,
            width: schema.width,
        });
        layout.names.push(schema.name.clone());
    }

    layout.width = offset;
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_packs_visible_fields() {
        let schemas = vec![
            FieldSchema::new("code", FieldFormat::String).span(2),
            FieldSchema::new("id", FieldFormat::Int).hidden(),
            FieldSchema::new("qty", FieldFormat::Int),
            FieldSchema::new("note", FieldFormat::String).span(3),
        ];
        let layout = compute_layout(&schemas).unwrap();

        let spans: Vec<(u32, u32)> = layout.fields.iter().map(|f| (f.grid_start, f.grid_end)).collect();
        assert_eq!(spans, vec![(0, 1), (2, 2), (2, 2), (3, 5)]);
        assert_eq!(layout.width, 6);
        assert!(layout.fields[1].hidden);
        assert_eq!(layout.index_of("note").unwrap(), 3);
    }

    #[test]
    fn test_layout_rejects_bad_schemas() {
        let zero = vec![FieldSchema::new("a", FieldFormat::Int).span(0)];
        assert!(matches!(compute_layout(&zero), Err(TableError::InvalidSpan(n)) if n == "a"));

        let dup = vec![
            FieldSchema::new("a", FieldFormat::Int),
            FieldSchema::new("a", FieldFormat::String),
        ];
        assert!(matches!(compute_layout(&dup), Err(TableError::DuplicateField(_))));
    }

    #[test]
    fn test_unknown_field_lookup() {
        let layout = compute_layout(&[FieldSchema::new("a", FieldFormat::Int)]).unwrap();
        assert!(matches!(layout.field("b"), Err(TableError::UnknownField(n)) if n == "b"));
    }

    #[test]
    fn test_numeric_formats() {
        assert!(FieldFormat::Currency.is_numeric());
        assert!(!FieldFormat::Date.is_numeric());
        assert_eq!(
            FieldFormat::OneDigit.number_format().unwrap().to_format_code(),
            "#,##0.0"
        );
        assert_eq!(FieldFormat::String.number_format(), None);
    }

    #[test]
    fn test_schema_deserializes_with_defaults() {
        let schema: FieldSchema =
            serde_json::from_str(r#"{"name": "Sum1", "format": "1digit"}"#).unwrap();
        assert_eq!(schema, FieldSchema::new("Sum1", FieldFormat::OneDigit));

        let schema: FieldSchema =
            serde_json::from_str(r#"{"name": "Article", "span": 2, "width": 12.5}"#).unwrap();
        assert_eq!(schema.width, Some(12.5));
        assert_eq!(compute_layout(&[schema]).unwrap().fields[0].width, Some(12.5));
    }
}
