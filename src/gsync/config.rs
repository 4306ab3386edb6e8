//! Built-in defaults: the known spreadsheet table, credentials location,
//! authorization scopes and the shared scratch directory.

use std::fs;
use std::path::PathBuf;

use crate::gsync::error::{Result, SyncError};

/// Short names of the spreadsheets synced by default, mapped to their ids.
pub const KNOWN_SHEETS: &[(&str, &str)] = &[
    ("zakazky", "1A9yRIG3ilZ9S9JDAMxzfhLtY4yhd5UcaJHyNzR5Lmm4"),
    ("vzorky", "1hsNFcPR9xKE9fNVzbbH4RhAhzbvhot72byn7DygcGm4"),
    ("objednavky", "1qE24ivELb-Qrp5iBL0zgnnnlkQJYrKAS2Ed33_iftW8"),
];

/// Service account key used when no explicit path is given.
pub const DEFAULT_CREDENTIALS_PATH: &str = "secrets/service_account.json";

/// Read-only access to sheet contents and drive metadata.
pub const DEFAULT_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets.readonly",
    "https://www.googleapis.com/auth/drive.readonly",
];

const TEMP_DIR_NAME: &str = "gsync";

/// Looks up the spreadsheet id registered under `name`.
pub fn sheet_id(name: &str) -> Result<&'static str> {
    KNOWN_SHEETS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, id)| *id)
        .ok_or_else(|| SyncError::UnknownSheet(name.to_string()))
}

pub fn default_scopes() -> Vec<String> {
    DEFAULT_SCOPES.iter().map(|scope| scope.to_string()).collect()
}

/// Returns the process-wide scratch directory, creating it if needed.
pub fn temp_dir() -> Result<PathBuf> {
    let dir = std::env::temp_dir().join(TEMP_DIR_NAME);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}
