use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::table::{Table, Value};

static RE_PRICE_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[$,]").expect("invalid regex: price noise"));

#[derive(Debug, thiserror::Error)]
pub enum CleanError {
    #[error("Missing column: {0}")]
    MissingColumn(String),
    #[error("Could not convert '{value}' to a number (row {row})")]
    Conversion { row: usize, value: String },
}

/// What to do with a row whose sanitized value still is not a number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CleanPolicy {
    /// Fail the whole batch on the first bad value.
    #[default]
    Strict,
    /// Drop offending rows and report them.
    SkipInvalid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    pub row: usize,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanReport {
    pub cleaned: usize,
    /// Rows kept with no price (empty cells or `NaN`).
    pub missing: usize,
    pub skipped: Vec<SkippedRow>,
}

/// Strips currency signs and thousands separators and parses what is left.
/// Only finite numbers count as prices.
pub fn parse_price(raw: &str) -> Option<f64> {
    RE_PRICE_NOISE
        .replace_all(raw, "")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// `Some(Value::Number)` for a price, `Some(Value::Empty)` for a missing one
/// and `None` when the cell cannot be converted.
fn clean_cell(cell: &Value) -> Option<Value> {
    match cell {
        Value::Number(n) if n.is_finite() => Some(Value::Number(*n)),
        Value::Number(_) | Value::Empty => Some(Value::Empty),
        Value::Text(s) => match RE_PRICE_NOISE.replace_all(s, "").trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Some(Value::Number(n)),
            Ok(n) if n.is_nan() => Some(Value::Empty),
            _ => None,
        },
    }
}

/// Converts `column` to numbers in place. Empty and `NaN` cells are kept as
/// missing values.
///
/// Under [`CleanPolicy::Strict`] the table is left untouched when any value
/// fails to convert. Row numbers in errors and reports are zero-based
/// positions in the input table.
pub fn clean_column(
    table: &mut Table,
    column: &str,
    policy: CleanPolicy,
) -> Result<CleanReport, CleanError> {
    let idx = table
        .column_index(column)
        .ok_or_else(|| CleanError::MissingColumn(column.to_string()))?;

    let mut converted = Vec::with_capacity(table.len());
    let mut report = CleanReport::default();

    for (row, cells) in table.rows().iter().enumerate() {
        match (clean_cell(&cells[idx]), policy) {
            (Some(value), _) => {
                if value.as_number().is_some() {
                    report.cleaned += 1;
                } else {
                    report.missing += 1;
                }
                converted.push(Some(value));
            }
            (None, CleanPolicy::Strict) => {
                return Err(CleanError::Conversion {
                    row,
                    value: cells[idx].to_string(),
                });
            }
            (None, CleanPolicy::SkipInvalid) => {
                let value = cells[idx].to_string();
                log::warn!("Skipping row {}: '{}' is not a number", row, value);
                report.skipped.push(SkippedRow { row, value });
                converted.push(None);
            }
        }
    }

    let rows = std::mem::take(table.rows_mut());
    *table.rows_mut() = rows
        .into_iter()
        .zip(converted)
        .filter_map(|(mut cells, value)| {
            cells[idx] = value?;
            Some(cells)
        })
        .collect();

    Ok(report)
}

pub fn clean_prices(table: &mut Table, policy: CleanPolicy) -> Result<CleanReport, CleanError> {
    clean_column(table, crate::PRICE_COLUMN, policy)
}
