/// In-memory chat transcript.
///
/// Holds the ordered message history for one session plus the single
/// in-flight request flag. Ids are assigned here, start at 1 and only
/// grow; the web frontend uses them to detect new messages and the
/// export path uses them to find a bot message's table rows.
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::api::types::{ChartPayload, QueryKind, TableRow};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

/// Structured results attached to a bot message.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub chart: Option<ChartPayload>,
    pub table: Vec<TableRow>,
    pub localities: Vec<String>,
    pub metrics: Vec<String>,
    pub kind: QueryKind,
}

/// One transcript entry.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: u64,
    pub role: Role,
    pub text: String,
    pub sent_at: DateTime<Local>,
    pub analysis: Option<Analysis>,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Ordered message history plus the in-flight request flag.
#[derive(Debug, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
    next_id: u64,
    loading: bool,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user message and return its id.
    pub fn append_user(&mut self, text: &str) -> u64 {
        self.push(Role::User, text.to_string(), None)
    }

    /// Append a bot message carrying analysis results.
    pub fn append_bot(&mut self, text: &str, analysis: Analysis) -> u64 {
        self.push(Role::Bot, text.to_string(), Some(analysis))
    }

    /// Append a plain bot message (errors, notices).
    pub fn append_bot_text(&mut self, text: &str) -> u64 {
        self.push(Role::Bot, text.to_string(), None)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Look up a message by id.
    pub fn message(&self, id: u64) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Id of the newest message, if any.
    pub fn last_id(&self) -> Option<u64> {
        self.messages.last().map(|m| m.id)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether a backend request is currently in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Claim the single in-flight request slot.
    ///
    /// Returns `false` when a request is already running; the caller must
    /// not start another one.
    pub fn begin_request(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        true
    }

    /// Release the in-flight request slot.
    pub fn finish_request(&mut self) {
        self.loading = false;
    }

    // -- Internal --

    fn push(&mut self, role: Role, text: String, analysis: Option<Analysis>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.messages.push(Message {
            id,
            role,
            text,
            sent_at: Local::now(),
            analysis,
        });
        id
    }
}
