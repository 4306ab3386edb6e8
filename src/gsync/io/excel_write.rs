use std::collections::HashSet;
use std::path::Path;

use rust_xlsxwriter::Workbook;

use crate::gsync::error::Result;
use crate::gsync::model::{CellValue, Table};

/// Name of the single worksheet written to mirror workbooks.
pub const SHEET_NAME: &str = "Sheet1";

/// Workbook-level defined name holding the number of data rows. Blank cells
/// are not stored, so trailing all-empty rows are only recoverable from it.
pub const ROW_COUNT_NAME: &str = "GsyncRowCount";

/// Writes the table to a single-sheet workbook at the given path.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col_idx, header) in table.columns().iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, header)?;
    }

    for (row_idx, row) in table.rows().iter().enumerate() {
        let excel_row = (row_idx + 1) as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            let excel_col = col_idx as u16;
            match cell {
                CellValue::Empty => {}
                CellValue::String(value) => {
                    worksheet.write_string(excel_row, excel_col, value)?;
                }
                CellValue::Integer(value) => {
                    worksheet.write_number(excel_row, excel_col, *value as f64)?;
                }
                CellValue::Number(value) => {
                    worksheet.write_number(excel_row, excel_col, *value)?;
                }
                CellValue::Boolean(value) => {
                    worksheet.write_boolean(excel_row, excel_col, *value)?;
                }
            }
        }
    }

    if supports_excel_table(table) {
        let mut excel_table = rust_xlsxwriter::Table::new();
        excel_table.set_autofilter(true);
        let col_end = (table.columns().len() as u16).saturating_sub(1);
        let row_end = table.len() as u32;
        worksheet.add_table(0, 0, row_end, col_end, &excel_table)?;
    }

    workbook.define_name(ROW_COUNT_NAME, &format!("={}", table.len()))?;
    workbook.save(path)?;
    Ok(())
}

// Excel tables need a data row and non-blank headers that are unique ignoring case.
fn supports_excel_table(table: &Table) -> bool {
    if table.columns().is_empty() || table.is_empty() {
        return false;
    }
    let mut seen = HashSet::new();
    table
        .columns()
        .iter()
        .all(|header| !header.is_empty() && seen.insert(header.to_lowercase()))
}
