//! services/api/src/adapters/sheets.rs
//!
//! This module contains the HTTP adapter used to download public spreadsheet
//! tabs as CSV. It implements the `SheetFetcher` port from the `core` crate.

use async_trait::async_trait;
use outreach_core::ports::{FetchedBody, PortError, PortResult, SheetFetcher};
use std::time::Duration;
use tracing::{debug, warn};

/// Largest sheet export accepted, in bytes.
pub const MAX_SHEET_BYTES: usize = 10 * 1024 * 1024;

/// An adapter that implements `SheetFetcher` with a `reqwest` client.
#[derive(Clone)]
pub struct HttpSheetFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpSheetFetcher {
    /// Creates a new `HttpSheetFetcher` whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            max_bytes: MAX_SHEET_BYTES,
        })
    }

    /// Overrides the download cap.
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    fn too_large(&self) -> PortError {
        warn!(max_bytes = self.max_bytes, "Sheet export exceeds the download limit");
        PortError::Unexpected(format!(
            "sheet export is larger than {} bytes",
            self.max_bytes
        ))
    }
}

#[async_trait]
impl SheetFetcher for HttpSheetFetcher {
    async fn fetch_csv(&self, export_url: &str) -> PortResult<FetchedBody> {
        let mut response = self
            .client
            .get(export_url)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let status = response.status().as_u16();
        if response
            .content_length()
            .is_some_and(|len| len > self.max_bytes as u64)
        {
            return Err(self.too_large());
        }

        // The declared length may be missing or wrong, so count while reading.
        let mut buf = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?
        {
            if buf.len() + chunk.len() > self.max_bytes {
                return Err(self.too_large());
            }
            buf.extend_from_slice(&chunk);
        }
        let body = String::from_utf8_lossy(&buf).into_owned();
        debug!(status, bytes = body.len(), "Sheet export fetched");

        Ok(FetchedBody { status, body })
    }
}
