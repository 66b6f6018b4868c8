//! Conversation lifecycle tests.
//!
//! Drives a [`Session`] against a scripted backend double: append
//! semantics, the error-as-bubble rule, the in-flight guard, locality
//! caching, export gating, and the page render model.

use std::cell::Cell;
use std::rc::Rc;

use plotwise::api::client::Backend;
use plotwise::api::types::{BackendHealth, LocalitiesResponse, QueryResponse, TableRow};
use plotwise::api::{ExportError, ExportFormat, ExportPayload, LocalityFetchError, QueryError};
use plotwise::session::Session;
use plotwise::store::Role;

// ---------------------------------------------------------------------------
// Backend double
// ---------------------------------------------------------------------------

/// Canned single-locality reply with chart and table blocks.
const WAKAD_REPLY: &str = r#"{
    "summary": "Analysis for Wakad",
    "chartData": {
        "years": [2020, 2021, 2022],
        "prices": [5000.0, 5500.0, 6000.0],
        "demand": [120, 140, 160]
    },
    "tableData": [
        {"year": 2020, "price": 5000.0, "demand": 120},
        {"year": 2021, "price": 5500.0, "demand": 140},
        {"year": 2022, "price": 6000.0, "demand": 160}
    ],
    "localities": ["Wakad"],
    "metrics": ["price", "demand"],
    "type": "single"
}"#;

/// Scripted backend: canned replies plus a download call counter.
struct StubBackend {
    reply: Result<String, String>,
    locality_names: Result<Vec<String>, String>,
    downloads: Rc<Cell<usize>>,
}

impl StubBackend {
    fn replying(json: &str) -> Self {
        Self {
            reply: Ok(json.to_string()),
            locality_names: Ok(vec!["Wakad".to_string(), "Aundh".to_string()]),
            downloads: Rc::new(Cell::new(0)),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            locality_names: Err(message.to_string()),
            downloads: Rc::new(Cell::new(0)),
        }
    }
}

impl Backend for StubBackend {
    fn query(&self, _text: &str) -> Result<QueryResponse, QueryError> {
        match &self.reply {
            Ok(json) => Ok(serde_json::from_str(json).expect("stub fixture parses")),
            Err(message) => Err(QueryError(message.clone())),
        }
    }

    fn localities(&self) -> Result<LocalitiesResponse, LocalityFetchError> {
        match &self.locality_names {
            Ok(names) => Ok(LocalitiesResponse {
                localities: names.clone(),
                count: names.len(),
            }),
            Err(message) => Err(LocalityFetchError(message.clone())),
        }
    }

    fn download(
        &self,
        rows: &[TableRow],
        format: ExportFormat,
    ) -> Result<ExportPayload, ExportError> {
        self.downloads.set(self.downloads.get() + 1);
        Ok(ExportPayload {
            bytes: format!("{} rows as {}", rows.len(), format).into_bytes(),
            content_type: format.content_type(),
            filename: format.filename(),
        })
    }

    fn health(&self) -> anyhow::Result<BackendHealth> {
        Ok(BackendHealth {
            status: "healthy".to_string(),
            data_loaded: true,
            rows: 42,
        })
    }
}

// ---------------------------------------------------------------------------
// Send lifecycle
// ---------------------------------------------------------------------------

#[test]
fn successful_query_appends_an_exchange() {
    let mut session = Session::new(StubBackend::replying(WAKAD_REPLY));

    let id = session.send("Analyze Wakad").expect("query accepted");

    let store = session.store();
    assert_eq!(store.len(), 2);

    let reply = store.message(id).expect("bot reply recorded");
    assert_eq!(reply.role, Role::Bot);
    assert_eq!(reply.text, "Analysis for Wakad");

    let analysis = reply.analysis.as_ref().expect("analysis attached");
    assert_eq!(analysis.table.len(), 3);
    assert_eq!(analysis.localities, ["Wakad"]);

    let chart = analysis.chart.as_ref().expect("chart attached");
    assert_eq!(chart.years, ["2020", "2021", "2022"]);
}

#[test]
fn user_message_precedes_the_reply() {
    let mut session = Session::new(StubBackend::replying(WAKAD_REPLY));

    let reply_id = session.send("Analyze Wakad").expect("query accepted");
    let user = session.store().message(reply_id - 1).expect("user message");

    assert_eq!(user.role, Role::User);
    assert_eq!(user.text, "Analyze Wakad");
    assert!(user.analysis.is_none());
}

#[test]
fn backend_failure_becomes_an_error_bubble() {
    let mut session = Session::new(StubBackend::failing("Invalid locality"));

    let id = session.send("Analyze Nowhere").expect("still recorded");
    let reply = session.store().message(id).expect("bot reply");

    assert_eq!(reply.text, "Error: Invalid locality");
    assert!(reply.analysis.is_none());
}

#[test]
fn blank_input_is_rejected_at_the_boundary() {
    let mut session = Session::new(StubBackend::replying(WAKAD_REPLY));

    assert_eq!(session.send("   "), None);
    assert!(session.store().is_empty());
}

#[test]
fn loading_flag_clears_after_each_send() {
    let mut session = Session::new(StubBackend::replying(WAKAD_REPLY));

    session.send("Analyze Wakad");
    assert!(!session.store().is_loading());

    assert!(session.send("Analyze Wakad again").is_some());
    assert_eq!(session.store().len(), 4);
}

// ---------------------------------------------------------------------------
// Localities
// ---------------------------------------------------------------------------

#[test]
fn connect_populates_the_locality_list() {
    let session = Session::connect(StubBackend::replying(WAKAD_REPLY));
    assert_eq!(session.localities(), ["Wakad", "Aundh"]);
}

#[test]
fn locality_fetch_failure_leaves_the_list_empty() {
    let session = Session::connect(StubBackend::failing("backend down"));
    assert!(session.localities().is_empty());
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[test]
fn export_sends_the_reply_table_to_the_backend() {
    let mut session = Session::new(StubBackend::replying(WAKAD_REPLY));
    let id = session.send("Analyze Wakad").expect("query accepted");

    let payload = session.export(id, ExportFormat::Csv).expect("export");

    assert_eq!(payload.filename, "real_estate_data.csv");
    assert_eq!(payload.content_type, "text/csv");
    assert_eq!(payload.bytes, b"3 rows as csv");
}

#[test]
fn export_without_a_table_never_reaches_the_backend() {
    let backend = StubBackend::failing("Invalid locality");
    let downloads = Rc::clone(&backend.downloads);
    let mut session = Session::new(backend);

    let id = session.send("Analyze Nowhere").expect("recorded");
    let err = session
        .export(id, ExportFormat::Json)
        .expect_err("nothing to export");

    assert_eq!(err.to_string(), "No data available to download");
    assert_eq!(downloads.get(), 0);
}

#[test]
fn export_of_an_unknown_message_is_rejected() {
    let backend = StubBackend::replying(WAKAD_REPLY);
    let downloads = Rc::clone(&backend.downloads);
    let session = Session::new(backend);

    let err = session
        .export(99, ExportFormat::Csv)
        .expect_err("no such message");

    assert_eq!(err.to_string(), "No data available to download");
    assert_eq!(downloads.get(), 0);
}

// ---------------------------------------------------------------------------
// Render model
// ---------------------------------------------------------------------------

#[test]
fn view_shows_the_intro_until_the_first_message() {
    let mut session = Session::new(StubBackend::replying(WAKAD_REPLY));

    let view = session.view();
    assert!(view.messages.is_empty());
    let intro = view.intro.expect("intro on empty transcript");
    assert_eq!(intro.heading, "Welcome! 👋");

    session.send("Analyze Wakad");
    let view = session.view();
    assert!(view.intro.is_none());
    assert_eq!(view.messages.len(), 2);
    assert_eq!(view.scroll_to, session.store().last_id());
}

#[test]
fn view_offers_exports_only_where_a_table_renders() {
    let mut session = Session::new(StubBackend::replying(WAKAD_REPLY));
    session.send("Analyze Wakad");

    let view = session.view();
    let user = &view.messages[0];
    let bot = &view.messages[1];

    assert!(user.exports.is_empty());
    assert!(user.table.is_none());
    assert_eq!(bot.exports, ["csv", "json"]);
    assert!(bot.table.is_some());
    assert!(bot.chart.is_some());
}

#[test]
fn error_reply_renders_without_panels() {
    let mut session = Session::new(StubBackend::failing("Invalid locality"));
    session.send("Analyze Nowhere");

    let view = session.view();
    let bot = &view.messages[1];

    assert_eq!(bot.text, "Error: Invalid locality");
    assert!(bot.chart.is_none());
    assert!(bot.table.is_none());
    assert!(bot.exports.is_empty());
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[test]
fn health_proxies_the_backend() {
    let session = Session::new(StubBackend::replying(WAKAD_REPLY));

    let health = session.health().expect("healthy");
    assert_eq!(health.status, "healthy");
    assert!(health.data_loaded);
    assert_eq!(health.rows, 42);
}
