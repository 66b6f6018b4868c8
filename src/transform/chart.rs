//! Chart assembly.
//!
//! Only metrics the answer declares are plotted; payload data for an
//! undeclared metric is ignored. A comparison answer gets one series
//! per (locality, declared metric) pair, colored by walking the hue
//! wheel in 60° steps (demand offset by 30°) so identical locality
//! ordering reproduces identical colors. A single-locality answer gets
//! at most two series in fixed base colors. Demand series move to a
//! secondary axis when both metrics are declared so the two never
//! share a scale.

use serde::Serialize;

use crate::api::types::QueryKind;
use crate::store::Analysis;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which vertical scale a series is plotted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Primary,
    Secondary,
}

/// One plotted line. `data` is aligned with the chart's year labels;
/// `None` marks a year the locality has no record for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub data: Vec<Option<f64>>,
    pub border_color: String,
    pub background_color: String,
    pub fill: bool,
    pub axis: Axis,
}

/// A complete renderable chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub y2_title: Option<String>,
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Build the chart for one bot message, or `None` when there is
/// nothing to plot (no payload, no year labels, or no data for a
/// declared metric).
pub fn build_chart(analysis: &Analysis) -> Option<ChartSpec> {
    let payload = analysis.chart.as_ref()?;
    if payload.years.is_empty() {
        return None;
    }

    let want_price = analysis.metrics.iter().any(|m| m == "price");
    let want_demand = analysis.metrics.iter().any(|m| m == "demand");
    // The split is decided by the declaration, not by which series
    // survive validation, so a dropped price sequence cannot pull
    // demand back onto the price scale.
    let demand_axis = if want_price && want_demand {
        Axis::Secondary
    } else {
        Axis::Primary
    };

    let comparison = analysis.kind == QueryKind::Comparison && analysis.localities.len() > 1;
    let mut series = Vec::new();

    if comparison {
        if want_price {
            for (i, (locality, values)) in payload.prices_by_locality.iter().enumerate() {
                series.push(Series {
                    label: format!("{locality} - Price (₹/sqft)"),
                    data: values.clone(),
                    border_color: hsl(i * 60),
                    background_color: hsla(i * 60),
                    fill: false,
                    axis: Axis::Primary,
                });
            }
        }
        if want_demand {
            for (i, (locality, values)) in payload.demand_by_locality.iter().enumerate() {
                series.push(Series {
                    label: format!("{locality} - Demand (units)"),
                    data: values.clone(),
                    border_color: hsl(i * 60 + 30),
                    background_color: hsla(i * 60 + 30),
                    fill: false,
                    axis: demand_axis,
                });
            }
        }
    } else {
        if want_price && let Some(prices) = &payload.prices {
            series.push(Series {
                label: "Price (₹/sqft)".to_string(),
                data: prices.clone(),
                border_color: "rgb(75, 192, 192)".to_string(),
                background_color: "rgba(75, 192, 192, 0.2)".to_string(),
                fill: true,
                axis: Axis::Primary,
            });
        }
        if want_demand && let Some(demand) = &payload.demand {
            series.push(Series {
                label: "Demand (units sold)".to_string(),
                data: demand.clone(),
                border_color: "rgb(255, 99, 132)".to_string(),
                background_color: "rgba(255, 99, 132, 0.2)".to_string(),
                fill: true,
                axis: demand_axis,
            });
        }
    }

    if series.is_empty() {
        return None;
    }

    let secondary = series.iter().any(|s| s.axis == Axis::Secondary);
    Some(ChartSpec {
        title: chart_title(comparison, &analysis.localities),
        x_title: "Year".to_string(),
        y_title: y_title(&analysis.metrics),
        y2_title: secondary.then(|| "Demand (units)".to_string()),
        labels: payload.years.clone(),
        series,
    })
}

fn chart_title(comparison: bool, localities: &[String]) -> String {
    if comparison {
        format!("Comparison: {}", localities.join(" vs "))
    } else if let Some(first) = localities.first() {
        format!("{first} Analysis")
    } else {
        "Locality Analysis".to_string()
    }
}

fn y_title(metrics: &[String]) -> String {
    if metrics.iter().any(|m| m == "price") {
        "Price (₹/sqft)".to_string()
    } else {
        "Units".to_string()
    }
}

fn hsl(hue: usize) -> String {
    format!("hsl({hue}, 70%, 50%)")
}

fn hsla(hue: usize) -> String {
    format!("hsla({hue}, 70%, 50%, 0.1)")
}
