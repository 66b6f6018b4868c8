//! Table assembly and scalar formatting.
//!
//! Columns come from the first row's key order. Missing cells render
//! as "-" and large numbers use Indian-style digit grouping.

use serde::Serialize;
use serde_json::Value;

use crate::api::types::TableRow;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One table column: the raw payload key and its display title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub key: String,
    pub title: String,
}

/// A fully formatted table. Every row has one cell per column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSpec {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Build the table for one bot message, or `None` when there are no rows.
pub fn build_table(rows: &[TableRow]) -> Option<TableSpec> {
    let first = rows.first()?;
    let columns: Vec<Column> = first
        .keys()
        .map(|key| Column {
            key: key.clone(),
            title: column_title(key),
        })
        .collect();
    let rows = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| format_value(row.get(&column.key)))
                .collect()
        })
        .collect();
    Some(TableSpec { columns, rows })
}

/// Turn a payload key like "total_sales - igr" into "Total_sales Igr".
/// Hyphens become spaces, runs of whitespace collapse and each word is
/// capitalized. Underscores are left alone.
fn column_title(key: &str) -> String {
    key.replace('-', " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Scalar formatting
// ---------------------------------------------------------------------------

/// Render one cell. Absent keys and JSON nulls both come out as "-".
pub fn format_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) => format_number(f),
            None => n.to_string(),
        },
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Display rule for numbers: values from 1000 up get Indian digit
/// grouping, fractional values round to two decimals, whole values
/// print bare.
pub fn format_number(n: f64) -> String {
    if n >= 1000.0 {
        group_indian(n)
    } else if n.fract() != 0.0 {
        format!("{n:.2}")
    } else {
        format!("{n}")
    }
}

fn group_indian(n: f64) -> String {
    let fixed = format!("{n:.2}");
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let grouped = group_digits_indian(int_part);
    if frac_part == "00" {
        grouped
    } else {
        format!("{grouped}.{frac_part}")
    }
}

/// Indian grouping: the last three digits form one group, everything
/// before them is grouped in pairs ("1234567" -> "12,34,567").
fn group_digits_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(cells: &[(&str, Value)]) -> TableRow {
        cells
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn no_rows_builds_no_table() {
        assert!(build_table(&[]).is_none());
    }

    #[test]
    fn columns_follow_first_row_key_order() {
        let rows = vec![
            row(&[
                ("final location", json!("Wakad")),
                ("year", json!(2020)),
                ("city", json!("Pune")),
            ]),
            // Later rows may carry extra keys; they are not columns.
            row(&[
                ("city", json!("Pune")),
                ("year", json!(2021)),
                ("final location", json!("Wakad")),
                ("extra", json!(1)),
            ]),
        ];
        let spec = build_table(&rows).unwrap();

        let keys: Vec<&str> = spec.columns.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["final location", "year", "city"]);
        // Years are numbers and numbers from 1000 up get grouped.
        assert_eq!(spec.rows[0], vec!["Wakad", "2,020", "Pune"]);
        assert_eq!(spec.rows[1], vec!["Wakad", "2,021", "Pune"]);
    }

    #[test]
    fn missing_cells_render_a_dash() {
        let rows = vec![
            row(&[("year", json!(2020)), ("total units", json!(150))]),
            row(&[("year", json!(2021))]),
        ];
        let spec = build_table(&rows).unwrap();
        assert_eq!(spec.rows[1], vec!["2,021", "-"]);
    }

    #[test]
    fn column_titles_are_capitalized_words() {
        assert_eq!(column_title("year"), "Year");
        assert_eq!(column_title("final location"), "Final Location");
        assert_eq!(column_title("total_sales - igr"), "Total_sales Igr");
        assert_eq!(
            column_title("flat - weighted average rate"),
            "Flat Weighted Average Rate"
        );
        assert_eq!(
            column_title("total carpet area supplied (sqft)"),
            "Total Carpet Area Supplied (sqft)"
        );
    }

    #[test]
    fn display_rules_for_scalars() {
        assert_eq!(format_value(Some(&json!(1500))), "1,500");
        assert_eq!(format_value(Some(&json!(12.3456))), "12.35");
        assert_eq!(format_value(Some(&json!(7))), "7");
        assert_eq!(format_value(Some(&json!(null))), "-");
        assert_eq!(format_value(None), "-");
        assert_eq!(format_value(Some(&json!("Wakad"))), "Wakad");
        assert_eq!(format_value(Some(&json!(true))), "true");
    }

    #[test]
    fn indian_grouping_pairs_after_the_first_three() {
        assert_eq!(format_number(1000.0), "1,000");
        assert_eq!(format_number(12345.0), "12,345");
        assert_eq!(format_number(150000.0), "1,50,000");
        assert_eq!(format_number(1234567.0), "12,34,567");
        assert_eq!(format_number(999.0), "999");
    }

    #[test]
    fn grouped_values_keep_their_fraction() {
        assert_eq!(format_number(100000.75), "1,00,000.75");
        assert_eq!(format_number(1234.567), "1,234.57");
        assert_eq!(format_number(1500.004), "1,500");
    }

    #[test]
    fn negative_values_are_never_grouped() {
        assert_eq!(format_number(-1234.5), "-1234.50");
        assert_eq!(format_number(-5.0), "-5");
    }
}
