use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Error type covering the different failure cases that can occur while the
/// tool authenticates, fetches sheets, or persists them locally.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when a tab-separated file cannot be read or written.
    #[error("TSV error: {0}")]
    Tsv(#[from] csv::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Transport level failures talking to the spreadsheet service.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("remote request failed with status {status}: {message}")]
    Remote { status: u16, message: String },

    /// The service account key does not exist.
    #[error("service account credentials file not found: {0}")]
    MissingCredentials(PathBuf),

    /// The service account key was malformed or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Raised when the local path does not carry a supported extension.
    #[error("unsupported file extension {extension:?} for {path}")]
    UnsupportedExtension { path: PathBuf, extension: String },

    /// Raised when a short sheet name is not present in the sheet table.
    #[error("unknown sheet name: {0}")]
    UnknownSheet(String),

    /// Raised when the requested tab does not exist in the spreadsheet.
    #[error("worksheet not found: {0}")]
    WorksheetNotFound(String),

    /// Raised when tabular data does not follow the expected shape.
    #[error("invalid table: {0}")]
    InvalidTable(String),

    /// Raised when saving without any table data.
    #[error("no table data to save for {0}")]
    EmptyTable(String),

    /// Raised when a remote timestamp cannot be parsed.
    #[error("invalid timestamp '{value}': {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
