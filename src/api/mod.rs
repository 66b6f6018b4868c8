//! Analysis backend boundary.
//!
//! Everything that crosses the wire to the remote analysis API lives here:
//!
//! - [`types`] - wire-shaped request/response structs and their validation
//!   into normalized payloads
//! - [`client`] - the blocking HTTP client and the [`client::Backend`] trait
//!   the session core is written against
//!
//! Failures are normalized into three user-visible error categories, one per
//! operation family: [`QueryError`], [`LocalityFetchError`], [`ExportError`].
//! None of them are fatal; each surface decides how to show them (chat
//! bubble, stderr line, alert).

pub mod client;
pub mod types;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// A chat query could not be answered.
///
/// The payload is the user-facing message, resolved from the backend's
/// `error` field when present, else the transport description, else a
/// generic fallback. Surfaces render it as a bot message prefixed `Error: `.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct QueryError(pub String);

/// The locality list could not be fetched. Non-critical: callers fall back
/// to an empty list.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct LocalityFetchError(pub String);

/// A table export failed.
#[derive(Debug, Clone, Error)]
pub enum ExportError {
    /// The table has no rows. Raised before any network call is made.
    #[error("No data available to download")]
    NoData,
    /// The requested format is not one the backend accepts.
    #[error("unknown format \"{0}\": use csv or json")]
    UnknownFormat(String),
    /// The backend download call failed.
    #[error("{0}")]
    Backend(String),
}

// ---------------------------------------------------------------------------
// Export format
// ---------------------------------------------------------------------------

/// File format accepted by the backend download endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Parse a user- or wire-supplied format name, case-insensitively.
    pub fn parse(s: &str) -> Result<Self, ExportError> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(ExportError::UnknownFormat(s.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Json => "application/json",
        }
    }

    /// Export files are named identically regardless of query content.
    pub fn filename(self) -> String {
        format!("real_estate_data.{}", self.as_str())
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bytes returned by a successful export, ready to be saved or streamed.
#[derive(Debug, Clone)]
pub struct ExportPayload {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
