use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::gsync::config::KNOWN_SHEETS;
use crate::gsync::error::Result;
use crate::gsync::io::FileFormat;
use crate::gsync::remote::SpreadsheetService;
use crate::gsync::sync::{SheetOptions, SyncSheet, ensure_parent_dir};

/// Drives a set of [`SyncSheet`]s in order.
pub struct SyncManager {
    sheets: Vec<SyncSheet>,
}

impl SyncManager {
    pub fn new(sheets: Vec<SyncSheet>) -> Self {
        Self { sheets }
    }

    /// Builds one sheet per entry of [`KNOWN_SHEETS`], mirrored as
    /// `<dir>/<name>.<format>` and sharing `service`.
    pub fn from_known_sheets(
        service: Arc<dyn SpreadsheetService>,
        dir: &Path,
        format: FileFormat,
    ) -> Result<Self> {
        let sheets = KNOWN_SHEETS
            .iter()
            .map(|(name, id)| {
                let options = SheetOptions {
                    path: Some(dir.join(format!("{name}.{}", format.extension()))),
                    service: Some(Arc::clone(&service)),
                    ..SheetOptions::default()
                };
                SyncSheet::new(id, name, options)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(sheets))
    }

    pub fn sheets(&self) -> &[SyncSheet] {
        &self.sheets
    }

    pub fn sheets_mut(&mut self) -> &mut [SyncSheet] {
        &mut self.sheets
    }

    /// Downloads every sheet in turn. The first failure aborts the run and
    /// leaves the remaining sheets untouched.
    #[instrument(level = "info", skip(self), fields(sheet_count = self.sheets.len()))]
    pub fn sync_all(&mut self, force: bool) -> Result<()> {
        for sheet in &mut self.sheets {
            ensure_parent_dir(sheet.path())?;
            sheet.download(0, force)?;
        }
        info!("all sheets processed");
        Ok(())
    }

    /// Current sync state of every sheet, by name.
    pub fn statuses(&mut self) -> Vec<(String, bool)> {
        self.sheets
            .iter_mut()
            .map(|sheet| (sheet.name().to_string(), sheet.is_synced()))
            .collect()
    }
}
