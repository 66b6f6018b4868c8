//! HTTP client for the analysis backend.
//!
//! All calls are blocking `ureq` requests against the backend's REST
//! endpoints. Failures are flattened to user-facing strings with the
//! server's own `error` field taking precedence over transport detail.

use std::io::Read;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::api::types::{BackendHealth, ErrorBody, LocalitiesResponse, QueryResponse, TableRow};
use crate::api::{ExportError, ExportFormat, ExportPayload, LocalityFetchError, QueryError};
use crate::config::PlotwiseConfig;

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

/// Operations the chat session needs from an analysis backend.
///
/// `BackendClient` is the HTTP implementation; tests substitute a stub.
pub trait Backend {
    /// Run a natural-language query and return the structured result.
    fn query(&self, text: &str) -> Result<QueryResponse, QueryError>;

    /// List the localities the backend has data for.
    fn localities(&self) -> Result<LocalitiesResponse, LocalityFetchError>;

    /// Render `rows` server-side into a downloadable file.
    fn download(&self, rows: &[TableRow], format: ExportFormat)
    -> Result<ExportPayload, ExportError>;

    /// Probe the backend health endpoint.
    fn health(&self) -> Result<BackendHealth>;
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

const QUERY_FALLBACK: &str = "Failed to process query";
const LOCALITIES_FALLBACK: &str = "Failed to fetch localities";
const DOWNLOAD_FALLBACK: &str = "Failed to download data";

/// Blocking client for the Django analysis backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
}

#[derive(Serialize)]
struct QueryBody<'a> {
    query: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DownloadBody<'a> {
    table_data: &'a [TableRow],
    format: &'a str,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &PlotwiseConfig) -> Self {
        Self::new(&config.backend.base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Backend for BackendClient {
    fn query(&self, text: &str) -> Result<QueryResponse, QueryError> {
        let response = ureq::post(&self.url("/api/query/"))
            .send_json(QueryBody { query: text })
            .map_err(|err| QueryError(failure_message(err, QUERY_FALLBACK)))?;
        response
            .into_json()
            .map_err(|err| QueryError(format!("invalid response from backend: {err}")))
    }

    fn localities(&self) -> Result<LocalitiesResponse, LocalityFetchError> {
        let response = ureq::get(&self.url("/api/localities/"))
            .call()
            .map_err(|err| LocalityFetchError(failure_message(err, LOCALITIES_FALLBACK)))?;
        response
            .into_json()
            .map_err(|err| LocalityFetchError(format!("invalid response from backend: {err}")))
    }

    fn download(
        &self,
        rows: &[TableRow],
        format: ExportFormat,
    ) -> Result<ExportPayload, ExportError> {
        if rows.is_empty() {
            return Err(ExportError::NoData);
        }
        let response = ureq::post(&self.url("/api/download/"))
            .send_json(DownloadBody {
                table_data: rows,
                format: format.as_str(),
            })
            .map_err(|err| ExportError::Backend(failure_message(err, DOWNLOAD_FALLBACK)))?;
        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|err| ExportError::Backend(err.to_string()))?;
        Ok(ExportPayload {
            bytes,
            content_type: format.content_type(),
            filename: format.filename(),
        })
    }

    fn health(&self) -> Result<BackendHealth> {
        let url = self.url("/api/health/");
        let response = ureq::get(&url)
            .call()
            .with_context(|| format!("health check failed for {url}"))?;
        response
            .into_json()
            .context("failed to parse health response")
    }
}

// ---------------------------------------------------------------------------
// Failure mapping
// ---------------------------------------------------------------------------

fn failure_message(err: ureq::Error, fallback: &str) -> String {
    match err {
        ureq::Error::Status(code, response) => parse_error_body(response)
            .unwrap_or_else(|| format!("request failed with status {code}")),
        ureq::Error::Transport(transport) => describe(transport.to_string(), fallback),
    }
}

fn parse_error_body(response: ureq::Response) -> Option<String> {
    let body: ErrorBody = response.into_json().ok()?;
    body.error.filter(|message| !message.is_empty())
}

fn describe(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_trailing_slash() {
        let client = BackendClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/api/query/"), "http://localhost:8000/api/query/");
    }

    #[test]
    fn from_config_uses_backend_url() {
        let client = BackendClient::from_config(&PlotwiseConfig::default());
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn download_body_uses_the_wire_field_names() {
        let rows: Vec<TableRow> = vec![];
        let body = DownloadBody {
            table_data: &rows,
            format: "csv",
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"tableData":[],"format":"csv"}"#);
    }

    #[test]
    fn download_with_no_rows_skips_the_network() {
        // Unroutable on purpose; the guard fires before any connection.
        let client = BackendClient::new("http://127.0.0.1:9");
        let result = client.download(&[], ExportFormat::Csv);
        assert!(matches!(result, Err(ExportError::NoData)));
    }

    #[test]
    fn server_error_field_wins() {
        let response =
            ureq::Response::new(400, "Bad Request", r#"{"error": "No data provided"}"#).unwrap();
        let message = failure_message(ureq::Error::Status(400, response), DOWNLOAD_FALLBACK);
        assert_eq!(message, "No data provided");
    }

    #[test]
    fn missing_error_field_reports_the_status() {
        let response = ureq::Response::new(500, "Internal Server Error", "{}").unwrap();
        let message = failure_message(ureq::Error::Status(500, response), QUERY_FALLBACK);
        assert_eq!(message, "request failed with status 500");
    }

    #[test]
    fn unparseable_error_body_reports_the_status() {
        let response = ureq::Response::new(502, "Bad Gateway", "<html>nope</html>").unwrap();
        let message = failure_message(ureq::Error::Status(502, response), QUERY_FALLBACK);
        assert_eq!(message, "request failed with status 502");
    }

    #[test]
    fn describe_falls_back_when_empty() {
        assert_eq!(
            describe("connection refused".into(), QUERY_FALLBACK),
            "connection refused"
        );
        assert_eq!(describe("  ".into(), QUERY_FALLBACK), QUERY_FALLBACK);
    }
}
