//! FILENAME: report-table/src/group.rs
//! PURPOSE: Pre-aggregation of rows by hierarchy key.
//! CONTEXT: Independent of rendering. Produces one row per distinct key,
//! which can feed a summary-only table or be compared against the subtotal
//! formulas a render emits.

use std::cmp::Ordering;

use sheet::CellValue;

use crate::error::{Result, TableError};
use crate::field::{compute_layout, FieldSchema};
use crate::row::Row;

/// Orders one key component as the pair (absent, value): present values
/// first in natural order, absent values after all of them.
fn cmp_key_value(a: &CellValue, b: &CellValue) -> Ordering {
    a.is_empty()
        .cmp(&b.is_empty())
        .then_with(|| a.total_cmp(b))
}

fn cmp_keys(a: &[&CellValue], b: &[&CellValue]) -> Ordering {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| cmp_key_value(x, y))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Output schema of [`group_by_data`]: key and sum fields in schema order.
pub fn grouped_schema(schemas: &[FieldSchema], hierarchy: &[&str], sums: &[&str]) -> Result<Vec<FieldSchema>> {
    let layout = compute_layout(schemas)?;
    for name in hierarchy.iter().chain(sums.iter()) {
        layout.index_of(name)?;
    }
    Ok(schemas
        .iter()
        .filter(|s| hierarchy.contains(&s.name.as_str()) || sums.contains(&s.name.as_str()))
        .cloned()
        .collect())
}

/// Groups `rows` by the values of the `hierarchy` fields and sums the `sums`
/// fields within each group.
///
/// Output rows are ordered by key and laid out in schema order: key fields
/// carry the group's key, sum fields the arithmetic total, and every other
/// field is omitted. `Empty` contributes zero to a sum; any other
/// non-numeric value is an error.
pub fn group_by_data(
    schemas: &[FieldSchema],
    hierarchy: &[&str],
    sums: &[&str],
    rows: &[Row],
) -> Result<Vec<Row>> {
    let layout = compute_layout(schemas)?;
    let key_indexes = hierarchy
        .iter()
        .map(|name| layout.index_of(name))
        .collect::<Result<Vec<_>>>()?;
    for name in sums {
        layout.index_of(name)?;
    }
    if let Some(row) = rows.iter().position(|r| r.len() != schemas.len()) {
        return Err(TableError::Schema {
            row,
            expected: schemas.len(),
            found: rows[row].len(),
        });
    }

    let mut sorted: Vec<&Row> = rows.iter().collect();
    sorted.sort_by(|a, b| cmp_keys(&key_of(a, &key_indexes), &key_of(b, &key_indexes)));

    let mut output = Vec::new();
    let mut start = 0;
    while start < sorted.len() {
        let key = key_of(sorted[start], &key_indexes);
        let end = sorted[start..]
            .iter()
            .position(|r| cmp_keys(&key_of(r, &key_indexes), &key).is_ne())
            .map_or(sorted.len(), |offset| start + offset);
        let members = &sorted[start..end];

        let mut out_row = Row::new();
        for (index, schema) in schemas.iter().enumerate() {
            let name = schema.name.as_str();
            if let Some(position) = hierarchy.iter().position(|h| *h == name) {
                out_row.push(key[position].clone());
            } else if sums.contains(&name) {
                out_row.push(CellValue::Number(sum_field(members, index, name)?));
            }
        }
        output.push(out_row);
        start = end;
    }

    Ok(output)
}

fn key_of<'r>(row: &'r Row, key_indexes: &[usize]) -> Vec<&'r CellValue> {
    key_indexes.iter().map(|&i| &row[i]).collect()
}

fn sum_field(members: &[&Row], index: usize, name: &str) -> Result<f64> {
    members.iter().try_fold(0.0, |total, row| match &row[index] {
        CellValue::Number(n) => Ok(total + n),
        CellValue::Empty => Ok(total),
        _ => Err(TableError::NotNumeric {
            field: name.to_string(),
        }),
    })
}
