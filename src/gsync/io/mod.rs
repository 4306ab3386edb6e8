//! Local file formats a synced sheet can be persisted in.

pub mod excel_read;
pub mod excel_write;
pub mod json;
pub mod tsv;

use std::fmt;
use std::path::Path;

use crate::gsync::error::{Result, SyncError};
use crate::gsync::model::Table;

/// Serialization format of a local mirror, selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Tsv,
    Xlsx,
    Json,
}

impl FileFormat {
    /// Resolves the format from the extension of `path`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        match extension {
            "tsv" => Ok(FileFormat::Tsv),
            "xlsx" => Ok(FileFormat::Xlsx),
            "json" => Ok(FileFormat::Json),
            other => Err(SyncError::UnsupportedExtension {
                path: path.to_path_buf(),
                extension: other.to_string(),
            }),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Tsv => "tsv",
            FileFormat::Xlsx => "xlsx",
            FileFormat::Json => "json",
        }
    }

    /// Writes `table` to `path` in this format.
    pub fn write(self, path: &Path, table: &Table) -> Result<()> {
        match self {
            FileFormat::Tsv => tsv::write_table(path, table),
            FileFormat::Xlsx => excel_write::write_table(path, table),
            FileFormat::Json => json::write_table(path, table),
        }
    }

    /// Reads a table previously written in this format.
    pub fn read(self, path: &Path) -> Result<Table> {
        match self {
            FileFormat::Tsv => tsv::read_table(path),
            FileFormat::Xlsx => excel_read::read_table(path),
            FileFormat::Json => json::read_table(path),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
