use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};

use crate::gsync::error::{Result, SyncError};
use crate::gsync::io::excel_write::ROW_COUNT_NAME;
use crate::gsync::model::{CellValue, Table};

/// Largest magnitude at which every whole `f64` is still an exact integer.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Reads the first worksheet of a workbook written by
/// [`excel_write`](crate::gsync::io::excel_write). The first row is the header.
pub fn read_table(path: &Path) -> Result<Table> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SyncError::InvalidTable(format!("{} has no worksheets", path.display())))?
        .map_err(SyncError::from)?;

    let mut rows = range.rows();
    let columns: Vec<String> = match rows.next() {
        Some(first_row) => first_row
            .iter()
            .map(|cell| cell_to_string(Some(cell)))
            .collect(),
        None => Vec::new(),
    };
    let mut table = Table::new(columns)?;

    for row in rows {
        table.push_row(row.iter().map(cell_to_value).collect())?;
    }

    // Rows that held only blanks are not part of the used range.
    if let Some(row_count) = stored_row_count(workbook.defined_names()) {
        while table.len() < row_count {
            table.push_row(Vec::new())?;
        }
    }

    Ok(table)
}

fn stored_row_count(names: &[(String, String)]) -> Option<usize> {
    names
        .iter()
        .find(|(name, _)| name == ROW_COUNT_NAME)
        .and_then(|(_, formula)| formula.trim_start_matches('=').trim().parse().ok())
}

fn cell_to_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::Empty => CellValue::Empty,
        DataType::String(value) => CellValue::String(value.clone()),
        DataType::Int(value) => CellValue::Integer(*value),
        DataType::Float(value) if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER => {
            CellValue::Integer(*value as i64)
        }
        DataType::Float(value) => CellValue::Number(*value),
        DataType::Bool(value) => CellValue::Boolean(*value),
        other => CellValue::String(other.to_string()),
    }
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
