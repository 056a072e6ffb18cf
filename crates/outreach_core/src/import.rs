//! Contact import from CSV text and public spreadsheet URLs.
//!
//! Both entry points end in [`parse_contacts_csv`], which locates the email,
//! name, company and role columns by substring match on the header row and
//! emits one [`RawContactRow`] per data row with a non-empty email.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::LazyLock;

use csv::{ReaderBuilder, StringRecord, Trim};
use regex::Regex;
use tracing::{debug, info};
use url::{form_urlencoded, Url};

use crate::domain::RawContactRow;
use crate::ports::SheetFetcher;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Reasons an import is aborted. No partial result is ever returned.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("Invalid Google Sheets URL format")]
    InvalidUrlFormat,
    #[error("Failed to fetch sheet (HTTP {status}). Make sure the sheet is shared publicly.")]
    FetchFailed { status: u16 },
    #[error("Failed to reach the spreadsheet service: {0}")]
    Transport(String),
    #[error("The sheet is empty")]
    EmptySheet,
    #[error("The sheet needs a header row and at least one data row")]
    MissingDataRows,
    #[error("No email column found. Add a column named 'email'.")]
    MissingEmailColumn,
    #[error("No valid contacts found in the sheet")]
    NoValidContacts,
}

// ---------------------------------------------------------------------------
// Header synonyms
// ---------------------------------------------------------------------------

pub const EMAIL_HEADERS: &[&str] = &["email", "e-mail", "mail"];
pub const NAME_HEADERS: &[&str] = &["name", "full name", "firstname"];
pub const COMPANY_HEADERS: &[&str] = &["company", "organization", "org"];
pub const ROLE_HEADERS: &[&str] = &["role", "title", "position", "job"];

/// Column positions resolved from a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    email: usize,
    name: Option<usize>,
    company: Option<usize>,
    role: Option<usize>,
}

impl ColumnMap {
    fn locate(header: &StringRecord) -> Result<Self, ImportError> {
        let headers: Vec<String> = header
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let find = |synonyms: &[&str], skip: Option<usize>| {
            (0..headers.len())
                .find(|&i| Some(i) != skip && synonyms.iter().any(|s| headers[i].contains(s)))
        };

        let email = find(EMAIL_HEADERS, None).ok_or(ImportError::MissingEmailColumn)?;
        Ok(Self {
            email,
            name: find(NAME_HEADERS, Some(email)),
            company: find(COMPANY_HEADERS, Some(email)),
            role: find(ROLE_HEADERS, Some(email)),
        })
    }

    fn extract(&self, record: &StringRecord) -> Option<RawContactRow> {
        let email = record.get(self.email)?.trim();
        if email.is_empty() {
            return None;
        }
        let optional = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        };
        Some(RawContactRow {
            name: optional(self.name),
            email: email.to_string(),
            company: optional(self.company),
            role: optional(self.role),
        })
    }
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

/// Parses CSV text (uploaded, pasted or fetched) into raw contact rows.
///
/// Quoted fields may contain commas; `""` inside quotes is an escaped quote.
pub fn parse_contacts_csv(text: &str) -> Result<Vec<RawContactRow>, ImportError> {
    if text.trim().is_empty() {
        return Err(ImportError::EmptySheet);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    // `&str` input is valid UTF-8 and `flexible` accepts ragged rows, so the
    // reader has no error left to report.
    let records: Vec<StringRecord> = reader.records().filter_map(Result::ok).collect();

    let Some((header, data)) = records.split_first() else {
        return Err(ImportError::MissingDataRows);
    };
    if data.is_empty() {
        return Err(ImportError::MissingDataRows);
    }

    let columns = ColumnMap::locate(header)?;
    debug!(?columns, data_rows = data.len(), "Resolved CSV columns");

    let rows: Vec<RawContactRow> = data.iter().filter_map(|r| columns.extract(r)).collect();
    if rows.is_empty() {
        return Err(ImportError::NoValidContacts);
    }

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Spreadsheet URLs
// ---------------------------------------------------------------------------

static SHEETS_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://docs\.google\.com/spreadsheets/d/[a-zA-Z0-9_-]+").expect("valid regex")
});

pub const SHEETS_HOST: &str = "docs.google.com";

/// Cheap structural check, usable before any network I/O.
pub fn is_valid_sheets_url(url: &str) -> bool {
    SHEETS_URL_RE.is_match(url.trim())
}

/// A spreadsheet and tab resolved from a share URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRef {
    pub sheet_id: String,
    pub gid: String,
}

impl SheetRef {
    /// The unauthenticated CSV export endpoint for this sheet tab.
    pub fn export_url(&self) -> String {
        format!(
            "https://{SHEETS_HOST}/spreadsheets/d/{}/export?format=csv&gid={}",
            self.sheet_id, self.gid
        )
    }
}

/// Resolves the sheet id and tab `gid` from a share URL.
///
/// `gid` is read from the query string or the fragment and defaults to `"0"`.
pub fn parse_sheet_url(raw: &str) -> Result<SheetRef, ImportError> {
    if !is_valid_sheets_url(raw) {
        return Err(ImportError::InvalidUrlFormat);
    }
    let url = Url::parse(raw.trim()).map_err(|_| ImportError::InvalidUrlFormat)?;

    let sheet_id = match url.path_segments().map(|s| s.collect::<Vec<_>>()).as_deref() {
        Some(["spreadsheets", "d", id, ..]) if !id.is_empty() => id.to_string(),
        _ => return Err(ImportError::InvalidUrlFormat),
    };

    let gid = find_gid(url.query_pairs())
        .or_else(|| url.fragment().and_then(|f| find_gid(form_urlencoded::parse(f.as_bytes()))))
        .unwrap_or_else(|| "0".to_string());

    Ok(SheetRef { sheet_id, gid })
}

fn find_gid(pairs: form_urlencoded::Parse<'_>) -> Option<String> {
    pairs
        .into_iter()
        .find(|(k, v)| k == "gid" && !v.is_empty())
        .map(|(_, v)| v.into_owned())
}

/// Fetches a public spreadsheet tab as CSV and parses it into raw contact rows.
#[tracing::instrument(name = "Import contacts from sheet", skip(fetcher))]
pub async fn import_from_sheet_url(
    fetcher: &dyn SheetFetcher,
    url: &str,
) -> Result<Vec<RawContactRow>, ImportError> {
    let sheet = parse_sheet_url(url)?;
    let export_url = sheet.export_url();

    let response = fetcher
        .fetch_csv(&export_url)
        .await
        .map_err(|e| ImportError::Transport(e.to_string()))?;
    if !response.is_success() {
        return Err(ImportError::FetchFailed { status: response.status });
    }

    let rows = parse_contacts_csv(&response.body)?;
    info!(sheet_id = %sheet.sheet_id, gid = %sheet.gid, rows = rows.len(), "Sheet imported");
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Stale result guard
// ---------------------------------------------------------------------------

/// Stamp handed out when an import starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ImportTicket(u64);

/// Sequence-stamps imports so that a result is only applied if no newer
/// import has started since.
#[derive(Debug, Default)]
pub struct ImportSequencer {
    latest: AtomicU64,
}

impl ImportSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new import, superseding every earlier ticket.
    pub fn begin(&self) -> ImportTicket {
        ImportTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: ImportTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}
