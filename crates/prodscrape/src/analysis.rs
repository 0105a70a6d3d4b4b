use std::fmt::Display;

use serde::Serialize;

use crate::table::{Table, Value};

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Missing column: {0}")]
    MissingColumn(String),
    #[error("Column '{0}' is not numeric")]
    NotNumeric(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; undefined below two values.
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnStats {
    fn from_values(name: &str, mut values: Vec<f64>) -> Option<Self> {
        values.retain(|v| v.is_finite());
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let std = (count > 1).then(|| {
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            var.sqrt()
        });

        Some(Self {
            name: name.to_string(),
            count,
            mean,
            std,
            min: values[0],
            q25: quantile(&values, 0.25),
            q50: quantile(&values, 0.5),
            q75: quantile(&values, 0.75),
            max: values[count - 1],
        })
    }
}

/// Linear interpolation between closest ranks over pre-sorted values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub columns: Vec<ColumnStats>,
}

impl Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.columns.is_empty() {
            return writeln!(f, "No numeric columns to describe.");
        }

        write!(f, "{:<8}", "")?;
        for col in &self.columns {
            write!(f, "{:>14}", col.name)?;
        }
        writeln!(f)?;

        let stat_rows: [(&str, fn(&ColumnStats) -> String); 8] = [
            ("count", |c| format!("{:.6}", c.count as f64)),
            ("mean", |c| format!("{:.6}", c.mean)),
            ("std", |c| c.std.map_or("NaN".to_string(), |s| format!("{s:.6}"))),
            ("min", |c| format!("{:.6}", c.min)),
            ("25%", |c| format!("{:.6}", c.q25)),
            ("50%", |c| format!("{:.6}", c.q50)),
            ("75%", |c| format!("{:.6}", c.q75)),
            ("max", |c| format!("{:.6}", c.max)),
        ];
        for (label, render) in stat_rows {
            write!(f, "{label:<8}")?;
            for col in &self.columns {
                write!(f, "{:>14}", render(col))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Descriptive statistics over every numeric column. Empty cells and
/// non-finite numbers are ignored.
pub fn describe(table: &Table) -> Summary {
    let columns = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(idx, _)| table.is_numeric_column(*idx))
        .filter_map(|(idx, name)| {
            let values = table
                .rows()
                .iter()
                .filter_map(|row| row[idx].as_number())
                .collect();
            ColumnStats::from_values(name, values)
        })
        .collect();

    Summary { columns }
}

/// The `n` rows with the largest value in `column`, descending. Equal values
/// keep their original row order. Rows without a value, or with a
/// non-finite one, are left out.
pub fn top_n(table: &Table, column: &str, n: usize) -> Result<Table, AnalysisError> {
    let idx = table
        .column_index(column)
        .ok_or_else(|| AnalysisError::MissingColumn(column.to_string()))?;

    if table.rows().iter().any(|row| matches!(row[idx], Value::Text(_))) {
        return Err(AnalysisError::NotNumeric(column.to_string()));
    }

    let mut ranked = table
        .rows()
        .iter()
        .filter_map(|row| {
            row[idx]
                .as_number()
                .filter(|v| v.is_finite())
                .map(|v| (v, row))
        })
        .collect::<Vec<_>>();
    ranked.sort_by(|(a, _), (b, _)| b.total_cmp(a));

    let mut top = Table::new(table.columns().to_vec());
    for (_, row) in ranked.into_iter().take(n) {
        top.push_row(row.clone());
    }
    Ok(top)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub rows: usize,
    pub ranked_by: String,
    pub summary: Summary,
    pub top: Table,
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Basic Data Analysis ({} rows):", self.rows)?;
        writeln!(f, "{}", self.summary)?;
        writeln!(f, "Products with highest {}:", self.ranked_by)?;
        write!(f, "{}", self.top)
    }
}

pub fn analyze(table: &Table, column: &str, n: usize) -> Result<Report, AnalysisError> {
    Ok(Report {
        rows: table.len(),
        ranked_by: column.to_string(),
        summary: describe(table),
        top: top_n(table, column, n)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priced(items: &[(&str, f64)]) -> Table {
        let mut table = Table::new(vec!["title".into(), "price".into()]);
        for (title, price) in items {
            table.push_row(vec![Value::Text(title.to_string()), Value::Number(*price)]);
        }
        table
    }

    fn titles(table: &Table) -> Vec<String> {
        table.column("title").unwrap().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_top_n_returns_five_highest_descending() {
        let table = priced(&[
            ("a", 10.0),
            ("b", 70.0),
            ("c", 30.0),
            ("d", 50.0),
            ("e", 20.0),
            ("f", 60.0),
            ("g", 40.0),
        ]);

        let top = top_n(&table, "price", 5).unwrap();

        assert_eq!(top.len(), 5);
        assert_eq!(titles(&top), vec!["b", "f", "d", "g", "c"]);
        assert_eq!(top.columns(), table.columns());
    }

    #[test]
    fn test_top_n_ties_keep_row_order() {
        let table = priced(&[("first", 5.0), ("second", 9.0), ("third", 5.0), ("fourth", 5.0)]);

        let top = top_n(&table, "price", 3).unwrap();

        assert_eq!(titles(&top), vec!["second", "first", "third"]);
    }

    #[test]
    fn test_top_n_fewer_rows_than_n() {
        let table = priced(&[("a", 1.0), ("b", 2.0)]);

        let top = top_n(&table, "price", 5).unwrap();

        assert_eq!(titles(&top), vec!["b", "a"]);
    }

    #[test]
    fn test_top_n_skips_missing_and_nan() {
        let mut table = priced(&[("a", 10.0), ("b", f64::NAN), ("c", 5.0)]);
        table.push_row(vec![Value::Text("d".into()), Value::Empty]);

        let top = top_n(&table, "price", 5).unwrap();

        assert_eq!(titles(&top), vec!["a", "c"]);
    }

    #[test]
    fn test_top_n_rejects_text_column() {
        let table = priced(&[("a", 1.0)]);

        assert!(matches!(
            top_n(&table, "title", 5),
            Err(AnalysisError::NotNumeric(_))
        ));
        assert!(matches!(
            top_n(&table, "rating", 5),
            Err(AnalysisError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_describe_matches_reference_values() {
        let table = priced(&[("a", 1.0), ("b", 2.0), ("c", 3.0), ("d", 4.0)]);

        let summary = describe(&table);

        assert_eq!(summary.columns.len(), 1);
        let stats = &summary.columns[0];
        assert_eq!(stats.name, "price");
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, 2.5);
        assert!((stats.std.unwrap() - 1.290_994_448_735_805_6).abs() < 1e-12);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.q25, 1.75);
        assert_eq!(stats.q50, 2.5);
        assert_eq!(stats.q75, 3.25);
        assert_eq!(stats.max, 4.0);
    }

    #[test]
    fn test_describe_single_value_has_no_std() {
        let summary = describe(&priced(&[("a", 42.0)]));

        assert_eq!(summary.columns[0].std, None);
        assert_eq!(summary.columns[0].q75, 42.0);
    }

    #[test]
    fn test_describe_ignores_nan() {
        let table = priced(&[("a", 10.0), ("b", f64::NAN), ("c", 5.0)]);

        let stats = &describe(&table).columns[0];

        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean, 7.5);
        assert_eq!(stats.max, 10.0);
        assert_eq!(stats.q75, 8.75);
        assert!(stats.std.unwrap().is_finite());
    }

    #[test]
    fn test_describe_skips_text_columns() {
        let mut table = Table::new(vec!["title".into(), "price".into()]);
        table.push_row(vec![Value::Text("a".into()), Value::Text("$1".into())]);

        assert!(describe(&table).columns.is_empty());
    }

    #[test]
    fn test_analyze_report_renders() {
        let table = priced(&[("Asus", 1250.0), ("Nokia", 24.99)]);

        let report = analyze(&table, "price", 5).unwrap();
        let rendered = report.to_string();

        assert_eq!(report.rows, 2);
        assert!(rendered.contains("Basic Data Analysis"));
        assert!(rendered.contains("mean"));
        assert!(rendered.contains("Products with highest price:"));
        assert!(rendered.find("Asus").unwrap() < rendered.find("Nokia").unwrap());
    }
}
