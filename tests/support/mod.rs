#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use gsync::model::{SheetRecords, records_from_rows};
use gsync::remote::{RemoteBook, SpreadsheetService, WorksheetRef};
use gsync::{Result, SyncError};

/// Shared, inspectable state of one fake spreadsheet.
#[derive(Default)]
pub struct BookState {
    pub tabs: Vec<(String, Vec<Vec<String>>)>,
    pub modified_time: Option<String>,
    pub fail_records: bool,
    pub record_fetches: usize,
    pub timestamp_fetches: usize,
}

/// In-memory stand-in for the spreadsheet service.
#[derive(Default)]
pub struct FakeService {
    books: HashMap<String, Rc<RefCell<BookState>>>,
    opens: Rc<RefCell<usize>>,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a spreadsheet with one tab and returns a handle to its state.
    pub fn add_book(
        &mut self,
        id: &str,
        modified_time: &str,
        rows: &[&[&str]],
    ) -> Rc<RefCell<BookState>> {
        let state = Rc::new(RefCell::new(BookState {
            tabs: vec![("Sheet1".to_string(), to_rows(rows))],
            modified_time: Some(modified_time.to_string()),
            ..BookState::default()
        }));
        self.books.insert(id.to_string(), Rc::clone(&state));
        state
    }

    pub fn opens(&self) -> usize {
        *self.opens.borrow()
    }

    pub fn into_arc(self) -> Arc<dyn SpreadsheetService> {
        Arc::new(self)
    }
}

pub fn to_rows(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

impl SpreadsheetService for FakeService {
    fn open_by_key(&self, spreadsheet_id: &str) -> Result<Box<dyn RemoteBook>> {
        *self.opens.borrow_mut() += 1;
        let state = self.books.get(spreadsheet_id).ok_or(SyncError::Remote {
            status: 404,
            message: format!("spreadsheet {spreadsheet_id} not found"),
        })?;
        Ok(Box::new(FakeBook {
            id: spreadsheet_id.to_string(),
            state: Rc::clone(state),
        }))
    }
}

struct FakeBook {
    id: String,
    state: Rc<RefCell<BookState>>,
}

impl RemoteBook for FakeBook {
    fn id(&self) -> &str {
        &self.id
    }

    fn worksheet(&self, title: Option<&str>) -> Result<WorksheetRef> {
        let state = self.state.borrow();
        let index = match title {
            Some(title) => state.tabs.iter().position(|(name, _)| name == title),
            None if state.tabs.is_empty() => None,
            None => Some(0),
        };
        index
            .map(|index| WorksheetRef {
                title: state.tabs[index].0.clone(),
                index,
            })
            .ok_or_else(|| SyncError::WorksheetNotFound(title.unwrap_or("first tab").to_string()))
    }

    fn all_records(&self, worksheet: &WorksheetRef) -> Result<SheetRecords> {
        let mut state = self.state.borrow_mut();
        state.record_fetches += 1;
        if state.fail_records {
            return Err(SyncError::Remote {
                status: 500,
                message: "backend error".to_string(),
            });
        }
        records_from_rows(state.tabs[worksheet.index].1.clone())
    }

    fn last_update_time(&self) -> Result<String> {
        let mut state = self.state.borrow_mut();
        state.timestamp_fetches += 1;
        state.modified_time.clone().ok_or(SyncError::Remote {
            status: 503,
            message: "drive unavailable".to_string(),
        })
    }
}
