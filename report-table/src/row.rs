//! FILENAME: report-table/src/row.rs
//! PURPOSE: Name-keyed views over positional data rows.
//! CONTEXT: Rows are stored as plain value vectors aligned with the schema.
//! Hooks see them through these views so caller code addresses fields by
//! name without knowing positions.

use sheet::CellValue;

use crate::error::{Result, TableError};
use crate::field::Layout;

/// One data row: values in schema order.
pub type Row = Vec<CellValue>;

/// Read-only, name-keyed snapshot of a row.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    layout: &'a Layout,
    values: &'a [CellValue],
}

impl<'a> RowView<'a> {
    pub(crate) fn new(layout: &'a Layout, values: &'a [CellValue]) -> Self {
        RowView { layout, values }
    }

    /// The value of a field, or None for a name outside the schema.
    pub fn get(&self, name: &str) -> Option<&'a CellValue> {
        let index = *self.layout.by_name.get(name)?;
        self.values.get(index)
    }

    /// Numeric value of a field; None when absent or not a number.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(CellValue::as_number)
    }

    /// (name, value) pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a CellValue)> + 'a {
        let (layout, values): (&'a Layout, &'a [CellValue]) = (self.layout, self.values);
        layout.names.iter().map(String::as_str).zip(values.iter())
    }

    pub fn values(&self) -> &'a [CellValue] {
        self.values
    }
}

/// Mutable, name-keyed access to a row for the calculation hook.
/// Writes land directly at the field's position.
#[derive(Debug)]
pub struct RowRecord<'a> {
    layout: &'a Layout,
    values: &'a mut [CellValue],
}

impl<'a> RowRecord<'a> {
    pub(crate) fn new(layout: &'a Layout, values: &'a mut [CellValue]) -> Self {
        RowRecord { layout, values }
    }

    pub fn get(&self, name: &str) -> Option<&CellValue> {
        let index = *self.layout.by_name.get(name)?;
        self.values.get(index)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(CellValue::as_number)
    }

    /// Replaces a field's value. Unknown names are an error so that a typo
    /// in report code does not silently drop a computed value.
    pub fn set(&mut self, name: &str, value: impl Into<CellValue>) -> Result<()> {
        let index = self.layout.index_of(name)?;
        let slot = self
            .values
            .get_mut(index)
            .ok_or_else(|| TableError::UnknownField(name.to_string()))?;
        *slot = value.into();
        Ok(())
    }

    pub fn view(&self) -> RowView<'_> {
        RowView::new(self.layout, &*self.values)
    }
}
