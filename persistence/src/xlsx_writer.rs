//! FILENAME: persistence/src/xlsx_writer.rs

use crate::{PersistenceError, Sheet, Workbook};
use chrono::{Datelike, NaiveDate};
use log::{debug, trace};
use rust_xlsxwriter::{
    Format, FormatAlign, FormatBorder, FormatPattern, Workbook as XlsxWorkbook, Worksheet,
};
use sheet::{
    BorderLineStyle, CellStyle, CellValue, Color, Grid, NumberFormat, PatternKind, TextAlign,
    VerticalAlign,
};
use std::collections::BTreeMap;
use std::path::Path;

/// `NaiveDate::num_days_from_ce` of 1899-12-30, day zero of XLSX serials.
const SERIAL_EPOCH_CE: i32 = 693_594;

const DEFAULT_DATE_FORMAT: &str = "dd.mm.yyyy";

pub fn save_xlsx(workbook: &Workbook, path: &Path) -> Result<(), PersistenceError> {
    if workbook.sheets.is_empty() {
        return Err(PersistenceError::NoSheets);
    }
    debug!("saving {} sheet(s) to {}", workbook.sheets.len(), path.display());

    let mut xlsx = XlsxWorkbook::new();
    for sheet in &workbook.sheets {
        let worksheet = xlsx.add_worksheet();
        worksheet.set_name(&sheet.name)?;
        write_sheet(worksheet, sheet)?;
    }

    xlsx.save(path)?;
    Ok(())
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet) -> Result<(), PersistenceError> {
    let grid = &sheet.grid;
    trace!(
        "sheet '{}': {} cells, {} merges",
        sheet.name,
        grid.cells.len(),
        grid.merges().len()
    );

    // One Format per registry entry; cells share them by index
    let formats: Vec<Format> = (0..grid.styles.len())
        .map(|index| convert_style_to_format(grid.styles.get(index)))
        .collect();

    // Column widths are stored in character units already
    for (col, width) in grid.column_widths() {
        worksheet.set_column_width(to_col(0, *col)?, *width)?;
    }
    for col in grid.hidden_columns() {
        worksheet.set_column_hidden(to_col(0, col)?)?;
    }
    for (row, height) in grid.row_heights() {
        worksheet.set_row_height(*row, *height)?;
    }

    // Merges go first; the top-left value is written over the placeholder
    for range in grid.merges() {
        let format = format_at(grid, &formats, range.first_row, range.first_col);
        worksheet.merge_range(
            range.first_row,
            to_col(range.first_row, range.first_col)?,
            range.last_row,
            to_col(range.last_row, range.last_col)?,
            "",
            format,
        )?;
    }

    for ((row, col), cell) in &grid.cells {
        let (row, col16) = (*row, to_col(*row, *col)?);
        let format = format_at(grid, &formats, row, *col);

        if let Some(formula) = &cell.formula {
            let clean_formula = formula.strip_prefix('=').unwrap_or(formula);
            worksheet.write_formula_with_format(row, col16, clean_formula, format)?;
            continue;
        }

        match &cell.value {
            CellValue::Empty => {
                if cell.style_index > 0 {
                    worksheet.write_blank(row, col16, format)?;
                }
            }
            CellValue::Number(n) => {
                worksheet.write_number_with_format(row, col16, *n, format)?;
            }
            CellValue::Text(s) => {
                worksheet.write_string_with_format(row, col16, s, format)?;
            }
            CellValue::Boolean(b) => {
                worksheet.write_boolean_with_format(row, col16, *b, format)?;
            }
            CellValue::Date(date) => {
                let serial = date_serial(*date);
                if grid.style(row, *col).number_format == NumberFormat::General {
                    let dated = format.clone().set_num_format(DEFAULT_DATE_FORMAT);
                    worksheet.write_number_with_format(row, col16, serial, &dated)?;
                } else {
                    worksheet.write_number_with_format(row, col16, serial, format)?;
                }
            }
        }
    }

    for (_, first, last) in outline_runs(grid.outline_levels()) {
        worksheet.group_rows(first, last)?;
    }

    Ok(())
}

fn format_at<'f>(grid: &Grid, formats: &'f [Format], row: u32, col: u32) -> &'f Format {
    let index = grid.get_cell(row, col).map(|c| c.style_index).unwrap_or(0);
    // the registry never shrinks, so every index has a format
    &formats[index.min(formats.len().saturating_sub(1))]
}

fn to_col(row: u32, col: u32) -> Result<u16, PersistenceError> {
    u16::try_from(col).map_err(|_| PersistenceError::OutOfBounds { row, col })
}

/// Days since 1899-12-30, the serial number XLSX stores for a date.
pub fn date_serial(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce() - SERIAL_EPOCH_CE)
}

/// Turns per-row outline levels into `(level, first_row, last_row)` runs,
/// outer levels first. Grouping every run once reproduces the levels.
pub fn outline_runs(levels: &BTreeMap<u32, u8>) -> Vec<(u8, u32, u32)> {
    let max_level = levels.values().copied().max().unwrap_or(0);
    let mut runs = Vec::new();

    for level in 1..=max_level {
        let mut open: Option<(u32, u32)> = None;
        for (&row, _) in levels.iter().filter(|(_, l)| **l >= level) {
            open = match open {
                Some((first, last)) if last + 1 == row => Some((first, row)),
                Some((first, last)) => {
                    runs.push((level, first, last));
                    Some((row, row))
                }
                None => Some((row, row)),
            };
        }
        if let Some((first, last)) = open {
            runs.push((level, first, last));
        }
    }

    runs
}

// ============================================================================
// STYLE CONVERSION
// ============================================================================

fn convert_style_to_format(style: &CellStyle) -> Format {
    let mut format = Format::new();

    // Font settings
    if style.font.bold {
        format = format.set_bold();
    }
    if style.font.italic {
        format = format.set_italic();
    }
    format = format
        .set_font_size(f64::from(style.font.size))
        .set_font_name(&style.font.family);
    if style.font.color != Color::BLACK {
        format = format.set_font_color(color_to_xlsx(style.font.color));
    }

    // Fill: a pattern carries both colors, a plain background is solid
    if let Some(fill) = &style.pattern {
        format = format
            .set_pattern(pattern_to_xlsx(fill.kind))
            .set_foreground_color(color_to_xlsx(fill.foreground))
            .set_background_color(color_to_xlsx(fill.background));
    } else if let Some(background) = style.background {
        format = format
            .set_pattern(FormatPattern::Solid)
            .set_background_color(color_to_xlsx(background));
    }

    format = format.set_align(match style.text_align {
        TextAlign::Left => FormatAlign::Left,
        TextAlign::Center => FormatAlign::Center,
        TextAlign::Right => FormatAlign::Right,
        TextAlign::General => FormatAlign::General,
    });
    format = format.set_align(match style.vertical_align {
        VerticalAlign::Top => FormatAlign::Top,
        VerticalAlign::Middle => FormatAlign::VerticalCenter,
        VerticalAlign::Bottom => FormatAlign::Bottom,
    });

    if style.wrap_text {
        format = format.set_text_wrap();
    }

    let num_format = style.number_format.to_format_code();
    if !num_format.is_empty() {
        format = format.set_num_format(&num_format);
    }

    let borders = &style.borders;
    if !borders.top.is_none() {
        format = format
            .set_border_top(border_style_to_xlsx(borders.top.style))
            .set_border_top_color(color_to_xlsx(borders.top.color));
    }
    if !borders.right.is_none() {
        format = format
            .set_border_right(border_style_to_xlsx(borders.right.style))
            .set_border_right_color(color_to_xlsx(borders.right.color));
    }
    if !borders.bottom.is_none() {
        format = format
            .set_border_bottom(border_style_to_xlsx(borders.bottom.style))
            .set_border_bottom_color(color_to_xlsx(borders.bottom.color));
    }
    if !borders.left.is_none() {
        format = format
            .set_border_left(border_style_to_xlsx(borders.left.style))
            .set_border_left_color(color_to_xlsx(borders.left.color));
    }

    format
}

fn border_style_to_xlsx(style: BorderLineStyle) -> FormatBorder {
    match style {
        BorderLineStyle::None => FormatBorder::None,
        BorderLineStyle::Thin => FormatBorder::Thin,
        BorderLineStyle::Medium => FormatBorder::Medium,
        BorderLineStyle::Thick => FormatBorder::Thick,
        BorderLineStyle::Dashed => FormatBorder::Dashed,
        BorderLineStyle::Dotted => FormatBorder::Dotted,
        BorderLineStyle::Double => FormatBorder::Double,
    }
}

fn pattern_to_xlsx(kind: PatternKind) -> FormatPattern {
    match kind {
        PatternKind::Solid => FormatPattern::Solid,
        PatternKind::LightGray => FormatPattern::LightGray,
        PatternKind::MediumGray => FormatPattern::MediumGray,
        PatternKind::DarkGray => FormatPattern::DarkGray,
        PatternKind::LightHorizontal => FormatPattern::LightHorizontal,
        PatternKind::LightVertical => FormatPattern::LightVertical,
        PatternKind::LightDown => FormatPattern::LightDown,
        PatternKind::LightUp => FormatPattern::LightUp,
        PatternKind::LightGrid => FormatPattern::LightGrid,
        PatternKind::LightTrellis => FormatPattern::LightTrellis,
    }
}

fn color_to_xlsx(color: Color) -> rust_xlsxwriter::Color {
    rust_xlsxwriter::Color::RGB(color.to_rgb())
}
