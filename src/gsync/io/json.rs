use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::gsync::error::Result;
use crate::gsync::model::{CellValue, Record, Table};

/// Writes the table as a pretty-printed list of row objects whose keys follow
/// the column order.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let records: Vec<Value> = table
        .records()
        .map(|row| {
            let object: Map<String, Value> = row
                .iter()
                .map(|(column, cell)| (column.to_string(), cell.to_json()))
                .collect();
            Value::Object(object)
        })
        .collect();
    let json_string = serde_json::to_string_pretty(&records)?;
    fs::write(path, json_string)?;
    Ok(())
}

/// Reads a list of row objects back into a table. Columns come from the
/// object keys, so a file holding no rows yields a table without columns.
pub fn read_table(path: &Path) -> Result<Table> {
    let source = fs::read_to_string(path)?;
    let objects: Vec<Map<String, Value>> = serde_json::from_str(&source)?;
    let records: Vec<Record> = objects
        .into_iter()
        .map(|object| {
            object
                .into_iter()
                .map(|(column, value)| (column, CellValue::from_json(value)))
                .collect()
        })
        .collect();
    Table::from_records(Vec::new(), records)
}
