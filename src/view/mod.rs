//! View composition.
//!
//! Builds the complete render model for one transcript: message bubbles
//! in order, with chart and table panels under bot messages that carry
//! data. The composer is pure; painting happens in the web frontend or
//! the terminal printer, which both consume the same model.

use serde::Serialize;

use crate::store::{Message, MessageStore, Role};
use crate::transform::{ChartSpec, TableSpec, build_chart, build_table};

// ---------------------------------------------------------------------------
// View model
// ---------------------------------------------------------------------------

/// Everything a renderer needs to paint the session.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptView {
    pub messages: Vec<MessageView>,
    pub localities: Vec<String>,
    pub loading: bool,
    /// Welcome card, present only while the transcript is empty.
    pub intro: Option<IntroView>,
    /// Newest message id; renderers scroll it into view after painting.
    pub scroll_to: Option<u64>,
}

/// One rendered bubble plus its optional data panels.
#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    pub id: u64,
    pub role: Role,
    pub text: String,
    /// Clock time of the append, "HH:MM".
    pub time: String,
    pub chart: Option<ChartSpec>,
    pub table: Option<TableSpec>,
    /// Export formats offered under the table panel; empty without one.
    pub exports: Vec<String>,
}

/// Empty-transcript placeholder.
#[derive(Debug, Clone, Serialize)]
pub struct IntroView {
    pub heading: String,
    pub hint: String,
    pub examples: String,
}

impl Default for IntroView {
    fn default() -> Self {
        Self {
            heading: "Welcome! 👋".to_string(),
            hint: "Ask me about real estate data for any locality.".to_string(),
            examples: "Try: \"Analyze Wakad\" or \"Compare Ambegaon Budruk and Aundh\""
                .to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// Compose the full render model from the store and the cached locality
/// list.
pub fn compose(store: &MessageStore, localities: &[String]) -> TranscriptView {
    TranscriptView {
        messages: store.messages().iter().map(compose_message).collect(),
        localities: localities.to_vec(),
        loading: store.is_loading(),
        intro: store.is_empty().then(IntroView::default),
        scroll_to: store.last_id(),
    }
}

fn compose_message(message: &Message) -> MessageView {
    let (chart, table) = match &message.analysis {
        Some(analysis) => (build_chart(analysis), build_table(&analysis.table)),
        None => (None, None),
    };
    let exports = if table.is_some() {
        vec!["csv".to_string(), "json".to_string()]
    } else {
        Vec::new()
    };
    MessageView {
        id: message.id,
        role: message.role,
        text: message.text.clone(),
        time: message.sent_at.format("%H:%M").to_string(),
        chart,
        table,
        exports,
    }
}
