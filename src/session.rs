//! Session orchestration.
//!
//! A session owns the message store, the backend client and the cached
//! locality list, and runs the query round-trip from user text to
//! appended answer. Backend failures never escape: they land in the
//! transcript as bot messages prefixed "Error: ".

use anyhow::Result;

use crate::api::client::Backend;
use crate::api::types::{BackendHealth, QueryKind};
use crate::api::{ExportError, ExportFormat, ExportPayload};
use crate::store::{Analysis, MessageStore};
use crate::view::{TranscriptView, compose};

/// One chat session against an analysis backend.
pub struct Session<B: Backend> {
    backend: B,
    store: MessageStore,
    localities: Vec<String>,
}

impl<B: Backend> Session<B> {
    /// Create a session without touching the network.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            store: MessageStore::new(),
            localities: Vec::new(),
        }
    }

    /// Create a session and fetch the locality list up front.
    ///
    /// A failed fetch is not fatal; the session starts with an empty
    /// list and a warning on stderr.
    pub fn connect(backend: B) -> Self {
        let mut session = Self::new(backend);
        session.refresh_localities();
        session
    }

    /// Re-fetch the locality list from the backend.
    pub fn refresh_localities(&mut self) {
        match self.backend.localities() {
            Ok(response) => self.localities = response.localities,
            Err(err) => eprintln!("warning: failed to fetch localities: {err}"),
        }
    }

    /// Run one query round-trip.
    ///
    /// Returns the id of the appended bot message, or `None` when the
    /// text is blank or another request is already in flight (the input
    /// boundary rejects, nothing is appended or queued).
    pub fn send(&mut self, text: &str) -> Option<u64> {
        let text = text.trim();
        if text.is_empty() || !self.store.begin_request() {
            return None;
        }
        self.store.append_user(text);

        let id = match self.backend.query(text) {
            Ok(response) => {
                let analysis = Analysis {
                    chart: response.chart_data.map(|data| data.validate()),
                    table: response.table_data,
                    localities: response.localities,
                    metrics: response.metrics,
                    kind: QueryKind::from_wire(response.kind.as_deref()),
                };
                self.store.append_bot(&response.summary, analysis)
            }
            Err(err) => self.store.append_bot_text(&format!("Error: {err}")),
        };

        self.store.finish_request();
        Some(id)
    }

    /// Download the table rows of one bot message in the given format.
    ///
    /// Fails with [`ExportError::NoData`] before any network call when
    /// the message is missing or carries no rows.
    pub fn export(
        &self,
        message_id: u64,
        format: ExportFormat,
    ) -> Result<ExportPayload, ExportError> {
        let rows = self
            .store
            .message(message_id)
            .and_then(|message| message.analysis.as_ref())
            .map(|analysis| analysis.table.as_slice())
            .unwrap_or_default();
        if rows.is_empty() {
            return Err(ExportError::NoData);
        }
        self.backend.download(rows, format)
    }

    /// Probe the backend health endpoint.
    pub fn health(&self) -> Result<BackendHealth> {
        self.backend.health()
    }

    /// Compose the render model for the current transcript.
    pub fn view(&self) -> TranscriptView {
        compose(&self.store, &self.localities)
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn localities(&self) -> &[String] {
        &self.localities
    }
}
