use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::gsync::config;
use crate::gsync::error::{Result, SyncError};
use crate::gsync::io::FileFormat;
use crate::gsync::model::Table;
use crate::gsync::remote::{GoogleSheetsClient, RemoteBook, SpreadsheetService, WorksheetRef};

/// A local file counts as synced when its modification time lies within
/// this many seconds of the remote last-update time.
pub const SYNC_TOLERANCE_SECS: i64 = 10;

const FRACTIONAL_SECONDS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";
const WHOLE_SECONDS_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Optional settings for [`SyncSheet::new`].
#[derive(Clone)]
pub struct SheetOptions {
    /// Tab to mirror; the first tab when unset.
    pub tab: Option<String>,
    /// Local mirror path; `<temp dir>/<name>.xlsx` when unset.
    pub path: Option<PathBuf>,
    /// Column position used as the row key after load or download.
    pub index_col: Option<usize>,
    /// Pre-authorized handle; a default one is authorized when unset.
    pub service: Option<Arc<dyn SpreadsheetService>>,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            tab: None,
            path: None,
            index_col: Some(0),
            service: None,
        }
    }
}

/// Mirrors one remote worksheet into one local file.
pub struct SyncSheet {
    name: String,
    path: PathBuf,
    format: FileFormat,
    index_col: Option<usize>,
    book: Box<dyn RemoteBook>,
    worksheet: WorksheetRef,
    table: Option<Table>,
    last_update: Option<DateTime<Utc>>,
}

impl SyncSheet {
    /// Opens the remote spreadsheet `spreadsheet_id` and binds it to a local
    /// file. The file extension is validated before any remote call.
    #[instrument(level = "debug", skip(options))]
    pub fn new(spreadsheet_id: &str, name: &str, options: SheetOptions) -> Result<Self> {
        let path = match options.path {
            Some(path) => path,
            None => config::temp_dir()?.join(format!("{name}.xlsx")),
        };
        let format = FileFormat::from_path(&path)?;
        ensure_parent_dir(&path)?;

        let service: Arc<dyn SpreadsheetService> = match options.service {
            Some(service) => service,
            None => Arc::new(GoogleSheetsClient::authorize(None, None)?),
        };
        let book = service.open_by_key(spreadsheet_id)?;
        let worksheet = book.worksheet(options.tab.as_deref())?;

        debug!(
            path = %path.display(),
            spreadsheet = spreadsheet_id,
            tab = %worksheet.title,
            "sync sheet initialised"
        );

        Ok(Self {
            name: name.to_string(),
            path,
            format,
            index_col: options.index_col,
            book,
            worksheet,
            table: None,
            last_update: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    pub fn worksheet(&self) -> &WorksheetRef {
        &self.worksheet
    }

    /// The cached table, without loading or downloading anything.
    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    /// Whether the local file's modification time is within
    /// [`SYNC_TOLERANCE_SECS`] of the remote last-update time. A missing file
    /// or an unreadable timestamp counts as not synced.
    pub fn is_synced(&mut self) -> bool {
        let file_time = match file_modified(&self.path) {
            Ok(file_time) => file_time,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(name = %self.name, path = %self.path.display(), "local file missing");
                return false;
            }
            Err(err) => {
                warn!(name = %self.name, path = %self.path.display(), error = %err, "timestamp check failed");
                return false;
            }
        };
        let sheet_time = self.last_update_time();
        let diff_ms = (file_time - sheet_time).num_milliseconds().abs();
        debug!(
            name = %self.name,
            %file_time,
            %sheet_time,
            diff_ms,
            "compared timestamps"
        );
        within_tolerance(file_time, sheet_time)
    }

    /// Sync state from the cached remote time only; `None` until the remote
    /// time has been fetched.
    fn cached_sync_state(&self) -> Option<bool> {
        let sheet_time = self.last_update?;
        let synced = file_modified(&self.path)
            .is_ok_and(|file_time| within_tolerance(file_time, sheet_time));
        Some(synced)
    }

    /// Fetches the worksheet, drops the first `skip_header` records and saves
    /// the result. Does nothing when already synced unless `force` is set.
    #[instrument(level = "info", skip(self), fields(name = %self.name))]
    pub fn download(&mut self, skip_header: usize, force: bool) -> Result<()> {
        if !force && self.is_synced() {
            info!("up to date, skipping download");
            return Ok(());
        }

        info!(path = %self.path.display(), "downloading from spreadsheet");
        let fetched = self.book.all_records(&self.worksheet)?;
        let records = fetched.records.into_iter().skip(skip_header).collect();
        self.table = Some(Table::from_records(fetched.columns, records)?);
        self.set_index();
        self.save()
    }

    /// Writes the cached table to the local file and stamps the file with the
    /// remote last-update time.
    #[instrument(level = "info", skip(self), fields(name = %self.name, path = %self.path.display()))]
    pub fn save(&mut self) -> Result<()> {
        let has_columns = self
            .table
            .as_ref()
            .is_some_and(|table| !table.columns().is_empty());
        if !has_columns {
            return Err(SyncError::EmptyTable(self.name.clone()));
        }
        let stamp = SystemTime::from(self.last_update_time());
        let table = self
            .table
            .as_ref()
            .ok_or_else(|| SyncError::EmptyTable(self.name.clone()))?;

        self.format.write(&self.path, table)?;
        fs::File::options()
            .write(true)
            .open(&self.path)?
            .set_modified(stamp)?;
        debug!(row_count = table.len(), "saved table");
        Ok(())
    }

    /// Replaces the cached table with the contents of the local file.
    ///
    /// A JSON file without rows carries no column names; in that case the
    /// columns of the previously cached table are kept.
    #[instrument(level = "debug", skip(self), fields(name = %self.name, path = %self.path.display()))]
    pub fn load(&mut self) -> Result<()> {
        let mut loaded = self.format.read(&self.path)?;
        if loaded.columns().is_empty() && loaded.is_empty() {
            if let Some(cached) = &self.table {
                loaded = Table::new(cached.columns().to_vec())?;
            }
        }
        self.table = Some(loaded);
        self.set_index();
        Ok(())
    }

    /// Applies the configured index column to the cached table. An out of
    /// range position is logged and leaves the table unindexed.
    pub fn set_index(&mut self) {
        let (Some(position), Some(table)) = (self.index_col, self.table.as_mut()) else {
            return;
        };
        if !table.set_index(position) {
            warn!(
                name = %self.name,
                index_col = position,
                column_count = table.columns().len(),
                "invalid index column, skipping set_index"
            );
        }
    }

    /// Returns the table, loading it from disk when synced or downloading it
    /// otherwise. Once populated it is never refreshed.
    pub fn df(&mut self) -> Result<&Table> {
        if self.table.is_none() {
            if self.is_synced() {
                self.load()?;
            } else {
                self.download(0, false)?;
            }
        }
        self.table
            .as_ref()
            .ok_or_else(|| SyncError::EmptyTable(self.name.clone()))
    }

    /// Remote last-update time, fetched once and cached.
    ///
    /// When the remote cannot be reached or its timestamp cannot be parsed the
    /// current time is cached instead.
    pub fn last_update_time(&mut self) -> DateTime<Utc> {
        if let Some(last_update) = self.last_update {
            return last_update;
        }

        let last_update = match self
            .book
            .last_update_time()
            .and_then(|stamp| parse_timestamp(&stamp))
        {
            Ok(last_update) => last_update,
            Err(err) => {
                warn!(name = %self.name, error = %err, "failed to retrieve last update time");
                Utc::now()
            }
        };
        self.last_update = Some(last_update);
        last_update
    }
}

impl fmt::Display for SyncSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let synced = match self.cached_sync_state() {
            Some(true) => "true",
            Some(false) => "false",
            None => "unknown",
        };
        write!(
            f,
            "<SyncSheet name={:?} path={} synced={}>",
            self.name,
            self.path.display(),
            synced
        )
    }
}

/// Parses a remote timestamp such as `2024-01-01T12:00:00Z` or
/// `2024-01-01T12:00:00.123Z`.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, FRACTIONAL_SECONDS_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, WHOLE_SECONDS_FORMAT))
        .map(|naive| naive.and_utc())
        .map_err(|source| SyncError::Timestamp {
            value: value.to_string(),
            source,
        })
}

fn within_tolerance(file_time: DateTime<Utc>, sheet_time: DateTime<Utc>) -> bool {
    (file_time - sheet_time).num_milliseconds().abs() < SYNC_TOLERANCE_SECS * 1000
}

fn file_modified(path: &Path) -> io::Result<DateTime<Utc>> {
    let modified = fs::metadata(path)?.modified()?;
    Ok(DateTime::<Utc>::from(modified))
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
