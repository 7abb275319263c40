//! Result grid rendering
//!
//! Turns any `(columns, rows)` payload into table markup without knowing its
//! schema. The same renderer serves table browsing and free queries.
//!
//! # Security Warning
//!
//! Column names and cell values are inserted into the markup verbatim, with no
//! HTML escaping. The backend and the database contents are trusted.

use serde_json::Value;

use crate::page::Surface;
use crate::schema::ResultSet;

/// Header and body fragments of a rendered result set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultGrid {
    /// `<thead>` fragment with one header cell per column
    pub header: String,

    /// `<tbody>` fragment with one row per result row
    pub body: String,
}

impl ResultGrid {
    pub fn new(result: &ResultSet) -> Self {
        let mut header = String::from("<thead><tr>");
        for name in &result.columns {
            header.push_str(&build_result_header(name));
        }
        header.push_str("</tr></thead>");

        let mut body = String::from("<tbody>");
        for row in &result.rows {
            body.push_str(&build_result_row(row));
        }
        body.push_str("</tbody>");

        Self { header, body }
    }

    pub fn markup(&self) -> String {
        format!("{}{}", self.header, self.body)
    }
}

/// Replace whatever `surface` shows with the grid for `result`
///
/// Rows are rendered with as many cells as they carry; a row that disagrees
/// with the column count is shown as-is.
pub fn render_result_set(surface: &mut Surface, result: &ResultSet) {
    let grid = ResultGrid::new(result);
    surface.clear();
    surface.append(&grid.header);
    surface.append(&grid.body);
}

pub fn build_result_header(name: &str) -> String {
    format!("<th>{}</th>", name)
}

pub fn build_result_row(row: &[Value]) -> String {
    let mut markup = String::from("<tr>");
    for value in row {
        markup.push_str("<th>");
        markup.push_str(&value_text(value));
        markup.push_str("</th>");
    }
    markup.push_str("</tr>");
    markup
}

/// Default text conversion of a JSON value, as a browser would print it
///
/// `null` prints as `null`, arrays join their items with commas (nulls
/// inside arrays print empty) and objects print as `[object Object]`.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => {
            if number.is_i64() || number.is_u64() {
                number.to_string()
            } else {
                number
                    .as_f64()
                    .map(float_text)
                    .unwrap_or_else(|| number.to_string())
            }
        }
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => value_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Shortest round-trip digits laid out the way a browser prints a number
///
/// Decimal exponents from -6 up to 20 are written positionally, anything
/// outside uses `e+N` / `e-N`. Negative zero prints as `0`.
fn float_text(float: f64) -> String {
    if float == 0.0 {
        return "0".to_string();
    }
    if float.is_nan() {
        return "NaN".to_string();
    }
    if float.is_infinite() {
        return if float > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    // `{:e}` yields the shortest digits, e.g. `1.2345e-7`
    let scientific = format!("{:e}", float.abs());
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return float.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return float.to_string();
    };

    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let count = digits.len() as i32;
    // Position of the decimal point relative to the first digit
    let point = exponent + 1;

    let text = if count <= point && point <= 21 {
        format!("{}{}", digits, "0".repeat((point - count) as usize))
    } else if 0 < point && point <= 21 {
        let (whole, fraction) = digits.split_at(point as usize);
        format!("{}.{}", whole, fraction)
    } else if -6 < point && point <= 0 {
        format!("0.{}{}", "0".repeat(-point as usize), digits)
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", first, sign, exponent.abs())
        } else {
            format!("{}.{}e{}{}", first, rest, sign, exponent.abs())
        }
    };

    if float < 0.0 {
        format!("-{}", text)
    } else {
        text
    }
}
