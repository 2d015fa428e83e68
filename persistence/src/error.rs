//! FILENAME: persistence/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XLSX write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("Workbook has no sheets")]
    NoSheets,

    #[error("Coordinate out of XLSX bounds: row {row}, column {col}")]
    OutOfBounds { row: u32, col: u32 },
}
