use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info, instrument};
use yup_oauth2::ServiceAccountAuthenticator;
use yup_oauth2::authenticator::DefaultAuthenticator;

use crate::gsync::config::{self, DEFAULT_CREDENTIALS_PATH};
use crate::gsync::error::{Result, SyncError};
use crate::gsync::model::{SheetRecords, records_from_rows};
use crate::gsync::remote::{RemoteBook, SpreadsheetService, WorksheetRef};

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3/files";

/// Google Sheets handle authorized through a service account.
///
/// Cloning is cheap; every clone and every book opened from it share the same
/// HTTP client and token cache.
#[derive(Clone)]
pub struct GoogleSheetsClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: Client,
    // Drives the async authenticator; HTTP calls themselves are blocking.
    runtime: Runtime,
    authenticator: DefaultAuthenticator,
    scopes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
    #[serde(default)]
    index: usize,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFileMetadata {
    modified_time: String,
}

impl GoogleSheetsClient {
    /// Authorizes against Google with a service account key.
    ///
    /// `credentials_path` defaults to [`DEFAULT_CREDENTIALS_PATH`] and `scopes`
    /// to [`config::DEFAULT_SCOPES`]. A token is requested immediately so a
    /// rejected key fails here rather than on the first sheet access.
    #[instrument(level = "info", skip_all)]
    pub fn authorize(credentials_path: Option<&Path>, scopes: Option<Vec<String>>) -> Result<Self> {
        let credentials_path = credentials_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_PATH));
        if !credentials_path.exists() {
            return Err(SyncError::MissingCredentials(credentials_path));
        }
        let scopes = scopes.unwrap_or_else(config::default_scopes);

        let runtime = Builder::new_current_thread().enable_all().build()?;
        let key = runtime
            .block_on(yup_oauth2::read_service_account_key(&credentials_path))
            .map_err(|err| {
                SyncError::Auth(format!(
                    "malformed service account key {}: {err}",
                    credentials_path.display()
                ))
            })?;
        let client_email = key.client_email.clone();
        let authenticator = runtime
            .block_on(ServiceAccountAuthenticator::builder(key).build())
            .map_err(|err| SyncError::Auth(err.to_string()))?;

        let inner = ClientInner {
            http: Client::builder().build()?,
            runtime,
            authenticator,
            scopes,
        };
        inner.access_token()?;
        info!(%client_email, credentials = %credentials_path.display(), "authorized spreadsheet client");

        Ok(Self {
            inner: Arc::new(inner),
        })
    }
}

impl ClientInner {
    fn access_token(&self) -> Result<String> {
        let token = self
            .runtime
            .block_on(self.authenticator.token(&self.scopes))
            .map_err(|err| SyncError::Auth(err.to_string()))?;
        token
            .token()
            .map(str::to_string)
            .ok_or_else(|| SyncError::Auth("token response carried no access token".into()))
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        let access_token = self.access_token()?;
        debug!(url, "GET");
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .query(query)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(SyncError::Remote {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json()?)
    }
}

impl SpreadsheetService for GoogleSheetsClient {
    #[instrument(level = "debug", skip(self))]
    fn open_by_key(&self, spreadsheet_id: &str) -> Result<Box<dyn RemoteBook>> {
        let url = format!("{SHEETS_API_BASE}/{spreadsheet_id}");
        let metadata: SpreadsheetMetadata = self
            .inner
            .get_json(&url, &[("fields", "sheets.properties")])?;

        let mut tabs: Vec<WorksheetRef> = metadata
            .sheets
            .into_iter()
            .map(|entry| WorksheetRef {
                title: entry.properties.title,
                index: entry.properties.index,
            })
            .collect();
        tabs.sort_by_key(|tab| tab.index);
        debug!(tab_count = tabs.len(), "opened spreadsheet");

        Ok(Box::new(GoogleBook {
            id: spreadsheet_id.to_string(),
            tabs,
            inner: Arc::clone(&self.inner),
        }))
    }
}

struct GoogleBook {
    id: String,
    tabs: Vec<WorksheetRef>,
    inner: Arc<ClientInner>,
}

impl RemoteBook for GoogleBook {
    fn id(&self) -> &str {
        &self.id
    }

    fn worksheet(&self, title: Option<&str>) -> Result<WorksheetRef> {
        let found = match title {
            Some(title) => self.tabs.iter().find(|tab| tab.title == title),
            None => self.tabs.first(),
        };
        found.cloned().ok_or_else(|| {
            SyncError::WorksheetNotFound(format!(
                "{} in spreadsheet {}",
                title.unwrap_or("first tab"),
                self.id
            ))
        })
    }

    #[instrument(level = "debug", skip_all, fields(spreadsheet = %self.id, tab = %worksheet.title))]
    fn all_records(&self, worksheet: &WorksheetRef) -> Result<SheetRecords> {
        let range = format!("'{}'", worksheet.title.replace('\'', "''"));
        let url = format!(
            "{SHEETS_API_BASE}/{}/values/{}",
            self.id,
            urlencoding::encode(&range)
        );
        let value_range: ValueRange = self.inner.get_json(
            &url,
            &[
                ("valueRenderOption", "FORMATTED_VALUE"),
                ("majorDimension", "ROWS"),
            ],
        )?;

        let rows: Vec<Vec<String>> = value_range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(value_to_text).collect())
            .collect();
        debug!(row_count = rows.len(), "fetched sheet values");
        records_from_rows(rows)
    }

    fn last_update_time(&self) -> Result<String> {
        let url = format!("{DRIVE_API_BASE}/{}", self.id);
        let metadata: DriveFileMetadata = self.inner.get_json(
            &url,
            &[("fields", "modifiedTime"), ("supportsAllDrives", "true")],
        )?;
        Ok(metadata.modified_time)
    }
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
