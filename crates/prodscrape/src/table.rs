use std::fmt::Display;

use serde::Serialize;

use crate::types::Record;

/// A single cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Number(f64),
    Empty,
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Empty => Ok(()),
        }
    }
}

/// Ordered rows sharing one ordered column set.
///
/// Every row holds exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Flattens scraped records into a `title, description, price` table.
    pub fn from_records(records: &[Record]) -> Self {
        let mut table = Table::new(
            Record::COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>(),
        );
        for record in records {
            table.rows.push(vec![
                Value::Text(record.title.clone()),
                Value::Text(record.description.clone()),
                Value::Text(record.price.clone()),
            ]);
        }
        table
    }

    /// Appends a row, padding short rows with `Value::Empty` and dropping
    /// cells beyond the column count.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Empty);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// A column is numeric when it has at least one number and every other
    /// cell in it is empty.
    pub fn is_numeric_column(&self, idx: usize) -> bool {
        let mut seen_number = false;
        for row in &self.rows {
            match &row[idx] {
                Value::Number(_) => seen_number = true,
                Value::Empty => {}
                Value::Text(_) => return false,
            }
        }
        seen_number
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Vec<Value>> {
        &mut self.rows
    }

    /// Converts every column whose non-empty text cells all parse as finite
    /// `f64` (or `NaN`) into a numeric column. `NaN` becomes `Value::Empty`.
    pub fn infer_numeric_columns(&mut self) {
        fn numeric(s: &str) -> Option<f64> {
            s.trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite() || n.is_nan())
        }

        for idx in 0..self.columns.len() {
            let mut any = false;
            let all_numeric = self.rows.iter().all(|row| match &row[idx] {
                Value::Text(s) => {
                    any = true;
                    numeric(s).is_some()
                }
                Value::Number(_) => {
                    any = true;
                    true
                }
                Value::Empty => true,
            });
            if !(any && all_numeric) {
                continue;
            }
            for row in &mut self.rows {
                let replacement = match &row[idx] {
                    Value::Text(s) => match numeric(s) {
                        Some(n) if n.is_finite() => Some(Value::Number(n)),
                        _ => Some(Value::Empty),
                    },
                    Value::Number(n) if n.is_nan() => Some(Value::Empty),
                    _ => None,
                };
                if let Some(value) = replacement {
                    row[idx] = value;
                }
            }
        }
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const MAX_CELL: usize = 40;

        let render = |v: &Value| -> String {
            let s = v.to_string();
            if s.chars().count() > MAX_CELL {
                let cut: String = s.chars().take(MAX_CELL - 1).collect();
                format!("{cut}…")
            } else {
                s
            }
        };

        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(render).collect())
            .collect();

        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &cells {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        for (col, &w) in self.columns.iter().zip(&widths) {
            write!(f, "{col:<w$}  ")?;
        }
        writeln!(f)?;
        for row in &cells {
            for (cell, &w) in row.iter().zip(&widths) {
                write!(f, "{cell:<w$}  ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
