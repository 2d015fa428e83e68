//! FILENAME: report-table/src/error.rs

use thiserror::Error;

/// Error returned by a caller-supplied hook. The renderer does not inspect
/// it; it is wrapped in `TableError::Callback` and propagated.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Which hook failed during a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Calculation,
    Coloring,
    Pattern,
    Subtitle,
}

impl std::fmt::Display for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Hook::Calculation => "calculation",
            Hook::Coloring => "coloring",
            Hook::Pattern => "pattern",
            Hook::Subtitle => "subtitle",
        })
    }
}

#[derive(Error, Debug)]
pub enum TableError {
    #[error("row {row} has {found} values, schema declares {expected} fields")]
    Schema {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("field '{0}' must span at least one column")]
    InvalidSpan(String),

    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("subtotal field '{0}' is hidden and has no column to hold a formula")]
    HiddenSubtotalField(String),

    #[error("field '{0}' is already part of the hierarchy")]
    DuplicateHierarchy(String),

    #[error("field '{field}' holds a non-numeric value and cannot be summed")]
    NotNumeric { field: String },

    #[error("{hook} hook failed at data row {row}: {source}")]
    Callback {
        hook: Hook,
        row: usize,
        #[source]
        source: CallbackError,
    },
}

pub type Result<T> = std::result::Result<T, TableError>;
