use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::gsync::error::Result;
use crate::gsync::model::{CellValue, Table};

/// Writes the table as tab-separated text with a header row.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let mut writer = WriterBuilder::new().delimiter(b'\t').from_path(path)?;
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads tab-separated text. Every field is numericised, so values come back
/// as integers or floats where they look like numbers.
pub fn read_table(path: &Path) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_path(path)?;

    let columns = reader
        .headers()?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let mut table = Table::new(columns)?;

    for record in reader.records() {
        let record = record?;
        table.push_row(record.iter().map(CellValue::infer).collect())?;
    }

    Ok(table)
}
