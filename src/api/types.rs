//! Wire types for the analysis backend and their validation.
//!
//! The backend's response shape is loose: every field may be absent, numbers
//! arrive as JSON numbers or nulls, and `type` is a free string. Everything
//! is deserialized with defaults and then normalized into [`ChartPayload`] /
//! [`QueryKind`] at this boundary instead of being trusted downstream.
//!
//! Map and row ordering is load-bearing: comparison series colors follow the
//! map's entry order and table columns follow the first row's key order, so
//! ordered maps are used for both.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One table row: column name → scalar cell, in the backend's key order.
pub type TableRow = IndexMap<String, Value>;

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// Response body of `POST /api/query/`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryResponse {
    pub summary: String,
    pub chart_data: Option<ChartData>,
    pub table_data: Vec<TableRow>,
    pub localities: Vec<String>,
    pub metrics: Vec<String>,
    /// `"single"` or `"comparison"`; anything else normalizes to single.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Chart block of a query response, exactly as the backend sends it.
///
/// Single-locality responses carry `prices`/`demand`; comparison responses
/// carry the `*_by_locality` maps with `null` gaps for years a locality has
/// no data for. Field names match the wire keys.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChartData {
    pub years: Vec<Value>,
    pub prices: Option<Vec<Option<f64>>>,
    pub demand: Option<Vec<Option<f64>>>,
    pub prices_by_locality: Option<IndexMap<String, Vec<Option<f64>>>>,
    pub demand_by_locality: Option<IndexMap<String, Vec<Option<f64>>>>,
}

/// Response body of `GET /api/localities/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalitiesResponse {
    pub localities: Vec<String>,
    pub count: usize,
}

/// Response body of `GET /api/health/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendHealth {
    pub status: String,
    pub data_loaded: bool,
    pub rows: u64,
}

/// Error body the backend attaches to non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ErrorBody {
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Normalized forms
// ---------------------------------------------------------------------------

/// Whether a response analyzes one locality or compares several.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryKind {
    #[default]
    Single,
    Comparison,
}

impl QueryKind {
    /// Normalize the backend's free-string `type` field.
    pub fn from_wire(kind: Option<&str>) -> Self {
        match kind {
            Some("comparison") => Self::Comparison,
            _ => Self::Single,
        }
    }
}

/// Validated chart data attached to a bot message.
///
/// Invariant: every numeric sequence has length `years.len()`. Sequences
/// violating it are dropped during [`ChartData::validate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartPayload {
    pub years: Vec<String>,
    pub prices: Option<Vec<Option<f64>>>,
    pub demand: Option<Vec<Option<f64>>>,
    pub prices_by_locality: IndexMap<String, Vec<Option<f64>>>,
    pub demand_by_locality: IndexMap<String, Vec<Option<f64>>>,
}

impl ChartData {
    /// Normalize the wire block: render period labels as text and enforce
    /// the length invariant, dropping any sequence that does not span every
    /// period (with a stderr note, since it points at a backend bug).
    pub fn validate(self) -> ChartPayload {
        let years: Vec<String> = self.years.iter().map(label_text).collect();
        let expected = years.len();

        let prices = self.prices.filter(|s| check_len("prices", s.len(), expected));
        let demand = self.demand.filter(|s| check_len("demand", s.len(), expected));

        let prices_by_locality = filter_map_series(self.prices_by_locality, "price", expected);
        let demand_by_locality = filter_map_series(self.demand_by_locality, "demand", expected);

        ChartPayload {
            years,
            prices,
            demand,
            prices_by_locality,
            demand_by_locality,
        }
    }
}

fn filter_map_series(
    map: Option<IndexMap<String, Vec<Option<f64>>>>,
    metric: &str,
    expected: usize,
) -> IndexMap<String, Vec<Option<f64>>> {
    let mut kept = IndexMap::new();
    for (locality, values) in map.unwrap_or_default() {
        if check_len(&format!("{metric} for {locality}"), values.len(), expected) {
            kept.insert(locality, values);
        }
    }
    kept
}

fn check_len(what: &str, actual: usize, expected: usize) -> bool {
    if actual == expected {
        true
    } else {
        eprintln!("warning: dropping chart series ({what}): {actual} values for {expected} periods");
        false
    }
}

/// Display form of a period label. The backend sends years as JSON numbers.
fn label_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => n.to_string(),
        },
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
