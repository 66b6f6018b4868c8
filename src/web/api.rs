//! JSON API handlers for the embedded chat page.
//!
//! Endpoints:
//! - `GET  /api/state`      - full transcript render model
//! - `POST /api/chat`       - submit a query, returns the updated model
//! - `GET  /api/localities` - known locality names
//! - `POST /api/export`     - table download as a file attachment
//! - `GET  /api/health`     - proxied backend health

use std::io::Cursor;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tiny_http::{Header, Response, StatusCode};

use super::content_type_json;
use crate::api::client::Backend;
use crate::api::{ExportError, ExportFormat, ExportPayload};
use crate::session::Session;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ChatRequest {
    query: String,
}

#[derive(Deserialize)]
struct ExportRequest {
    message_id: u64,
    format: String,
}

#[derive(Serialize)]
struct LocalitiesView {
    localities: Vec<String>,
    count: usize,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/state
pub fn get_state<B: Backend>(session: &mut Session<B>) -> Result<Response<Cursor<Vec<u8>>>> {
    json_response(&session.view())
}

/// POST /api/chat
///
/// Rejects blank queries with 400 and overlapping submissions with
/// 409. Backend failures do not error here: they come back as a bot
/// message inside the transcript.
pub fn post_chat<B: Backend>(
    session: &mut Session<B>,
    body: &str,
) -> Result<Response<Cursor<Vec<u8>>>> {
    let req: ChatRequest = match serde_json::from_str(body) {
        Ok(req) => req,
        Err(_) => return status_json(400, &serde_json::json!({ "error": "invalid request body" })),
    };

    if req.query.trim().is_empty() {
        return status_json(400, &serde_json::json!({ "error": "query must not be empty" }));
    }

    match session.send(&req.query) {
        Some(_) => json_response(&session.view()),
        None => status_json(
            409,
            &serde_json::json!({ "error": "a request is already in flight" }),
        ),
    }
}

/// GET /api/localities
pub fn get_localities<B: Backend>(session: &mut Session<B>) -> Result<Response<Cursor<Vec<u8>>>> {
    // Re-fetch so a backend that finished loading late still shows up;
    // on failure the last known list is served.
    session.refresh_localities();
    let localities = session.localities().to_vec();
    let count = localities.len();
    json_response(&LocalitiesView { localities, count })
}

/// POST /api/export
///
/// On success the response body is the exported file itself, served
/// with a `Content-Disposition: attachment` header.
pub fn post_export<B: Backend>(
    session: &mut Session<B>,
    body: &str,
) -> Result<Response<Cursor<Vec<u8>>>> {
    let req: ExportRequest = match serde_json::from_str(body) {
        Ok(req) => req,
        Err(_) => return status_json(400, &serde_json::json!({ "error": "invalid request body" })),
    };

    let format = match ExportFormat::parse(&req.format) {
        Ok(format) => format,
        Err(err) => return status_json(400, &serde_json::json!({ "error": err.to_string() })),
    };

    match session.export(req.message_id, format) {
        Ok(payload) => attachment_response(payload),
        Err(err @ (ExportError::NoData | ExportError::UnknownFormat(_))) => {
            status_json(400, &serde_json::json!({ "error": err.to_string() }))
        }
        Err(ExportError::Backend(message)) => {
            status_json(502, &serde_json::json!({ "error": message }))
        }
    }
}

/// GET /api/health
pub fn get_health<B: Backend>(session: &mut Session<B>) -> Result<Response<Cursor<Vec<u8>>>> {
    match session.health() {
        Ok(health) => json_response(&health),
        Err(err) => status_json(502, &serde_json::json!({ "error": err.to_string() })),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Serialize data as a 200 JSON response.
fn json_response<T: Serialize>(data: &T) -> Result<Response<Cursor<Vec<u8>>>> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(200)))
}

/// Serialize data as a JSON response with an explicit status code.
fn status_json(code: u16, data: &serde_json::Value) -> Result<Response<Cursor<Vec<u8>>>> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(code)))
}

/// Wrap an export payload as a file download.
fn attachment_response(payload: ExportPayload) -> Result<Response<Cursor<Vec<u8>>>> {
    let content_type = Header::from_bytes("Content-Type", payload.content_type)
        .map_err(|_| anyhow::anyhow!("invalid content type header"))?;
    let disposition = Header::from_bytes(
        "Content-Disposition",
        format!("attachment; filename=\"{}\"", payload.filename),
    )
    .map_err(|_| anyhow::anyhow!("invalid content disposition header"))?;

    Ok(Response::from_data(payload.bytes)
        .with_header(content_type)
        .with_header(disposition)
        .with_status_code(StatusCode(200)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
