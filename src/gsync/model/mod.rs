use std::collections::HashSet;
use std::fmt;

use serde_json::Value;

use crate::gsync::error::{Result, SyncError};

/// A single record as returned by the spreadsheet service: column name →
/// value pairs in header order.
pub type Record = Vec<(String, CellValue)>;

/// Records fetched from a worksheet together with its header row, so a sheet
/// without data rows still knows its columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetRecords {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

/// Represents a single cell of a table.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Blank cell.
    Empty,
    /// Plain string literal.
    String(String),
    /// Whole number literal.
    Integer(i64),
    /// Floating point number literal.
    Number(f64),
    /// Boolean literal.
    Boolean(bool),
}

impl CellValue {
    /// Converts a formatted cell string into the most specific value it
    /// represents: integers first, then finite floats, otherwise the string
    /// itself. Blank strings become [`CellValue::Empty`].
    pub fn infer(raw: &str) -> Self {
        if raw.is_empty() {
            return CellValue::Empty;
        }
        let trimmed = raw.trim();
        if let Ok(value) = trimmed.parse::<i64>() {
            return CellValue::Integer(value);
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => CellValue::Number(value),
            _ => CellValue::String(raw.to_string()),
        }
    }

    /// Converts a JSON value into a cell. Nested structures are kept as their
    /// JSON text.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => CellValue::Empty,
            Value::Bool(value) => CellValue::Boolean(value),
            Value::Number(number) => match number.as_i64() {
                Some(value) => CellValue::Integer(value),
                None => number
                    .as_f64()
                    .map(CellValue::Number)
                    .unwrap_or_else(|| CellValue::String(number.to_string())),
            },
            Value::String(value) => CellValue::String(value),
            other => CellValue::String(other.to_string()),
        }
    }

    /// Converts the cell into the JSON representation used in record files.
    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Empty => Value::Null,
            CellValue::String(value) => Value::String(value.clone()),
            CellValue::Integer(value) => Value::from(*value),
            CellValue::Number(value) => serde_json::Number::from_f64(*value)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            CellValue::Boolean(value) => Value::Bool(*value),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::String(value) => f.write_str(value),
            CellValue::Integer(value) => write!(f, "{value}"),
            // Debug keeps the trailing `.0` so whole floats stay floats.
            CellValue::Number(value) => write!(f, "{value:?}"),
            CellValue::Boolean(value) => write!(f, "{value}"),
        }
    }
}

/// In-memory tabular data: ordered rows over a fixed set of named columns,
/// optionally keyed by one of those columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
    index: Option<usize>,
}

impl Table {
    /// Creates an empty table with the given header. Column names must be
    /// unique.
    pub fn new(columns: Vec<String>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(SyncError::InvalidTable(format!(
                    "duplicate column name '{column}'"
                )));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
            index: None,
        })
    }

    /// Builds a table from records. Columns start with `header`; columns that
    /// only appear in records are appended in order of first appearance.
    /// Missing values are left empty.
    pub fn from_records(header: Vec<String>, records: Vec<Record>) -> Result<Self> {
        let mut table = Table::new(header)?;
        for record in &records {
            for (column, _) in record {
                if table.position(column).is_none() {
                    table.columns.push(column.clone());
                }
            }
        }

        for record in records {
            let mut row = vec![CellValue::Empty; table.columns.len()];
            for (column, value) in record {
                if let Some(position) = table.position(&column) {
                    row[position] = value;
                }
            }
            table.rows.push(row);
        }
        Ok(table)
    }

    /// Appends a row, padding it with empty cells up to the column count.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) -> Result<()> {
        if row.len() > self.columns.len() {
            return Err(SyncError::InvalidTable(format!(
                "row has {} cells but the table only has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the position of the named column.
    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }

    /// Designates the column at `position` as the lookup index. Returns
    /// `false`, leaving the table untouched, when the position is out of
    /// range.
    pub fn set_index(&mut self, position: usize) -> bool {
        if position >= self.columns.len() {
            return false;
        }
        self.index = Some(position);
        true
    }

    /// Name of the index column, if one is designated.
    pub fn index_column(&self) -> Option<&str> {
        self.index.map(|position| self.columns[position].as_str())
    }

    /// Looks up the first row whose index cell renders to `key`.
    pub fn get(&self, key: &str) -> Option<Row<'_>> {
        let position = self.index?;
        self.rows
            .iter()
            .find(|row| row[position].to_string() == key)
            .map(|values| Row {
                columns: &self.columns,
                values,
            })
    }

    /// Iterates over the rows as column → value views.
    pub fn records(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|values| Row {
            columns: &self.columns,
            values,
        })
    }
}

/// Borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    values: &'a [CellValue],
}

impl<'a> Row<'a> {
    /// Returns the value stored under `column`.
    pub fn get(&self, column: &str) -> Option<&'a CellValue> {
        let values = self.values;
        self.columns
            .iter()
            .position(|name| name == column)
            .map(|position| &values[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a CellValue)> + 'a {
        let (columns, values) = (self.columns, self.values);
        columns.iter().map(String::as_str).zip(values.iter())
    }
}

/// Turns a header row plus data rows of formatted strings into records,
/// numericising every cell. Short rows are padded with empty values and
/// cells beyond the header are dropped.
pub fn records_from_rows(mut rows: Vec<Vec<String>>) -> Result<SheetRecords> {
    if rows.is_empty() {
        return Ok(SheetRecords::default());
    }
    let header = rows.remove(0);
    let mut seen = HashSet::new();
    for column in &header {
        if !seen.insert(column.as_str()) {
            return Err(SyncError::InvalidTable(format!(
                "the header row contains duplicate column '{column}'"
            )));
        }
    }

    let records = rows
        .into_iter()
        .map(|row| {
            let mut cells = row.into_iter();
            header
                .iter()
                .map(|column| {
                    let value = cells
                        .next()
                        .map(|raw| CellValue::infer(&raw))
                        .unwrap_or(CellValue::Empty);
                    (column.clone(), value)
                })
                .collect()
        })
        .collect();

    Ok(SheetRecords {
        columns: header,
        records,
    })
}
