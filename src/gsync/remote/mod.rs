//! Seams towards the remote spreadsheet service.

pub mod google;

use crate::gsync::error::Result;
use crate::gsync::model::SheetRecords;

pub use google::GoogleSheetsClient;

/// An authenticated handle able to open spreadsheets by id.
pub trait SpreadsheetService {
    fn open_by_key(&self, spreadsheet_id: &str) -> Result<Box<dyn RemoteBook>>;
}

/// One opened spreadsheet.
pub trait RemoteBook {
    fn id(&self) -> &str;

    /// Selects the tab titled `title`, or the first tab when `None`.
    fn worksheet(&self, title: Option<&str>) -> Result<WorksheetRef>;

    /// Fetches the header and every row below it as formatted, numericised
    /// values.
    fn all_records(&self, worksheet: &WorksheetRef) -> Result<SheetRecords>;

    /// Last modification of the spreadsheet as an ISO-8601 UTC string.
    fn last_update_time(&self) -> Result<String>;
}

/// Identifies a tab inside a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksheetRef {
    pub title: String,
    pub index: usize,
}
