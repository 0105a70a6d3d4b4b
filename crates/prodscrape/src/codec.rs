//! Tabular file I/O. The codec is picked from the file extension, and an
//! unknown extension is rejected before anything touches the filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use calamine::{Data, Reader, open_workbook_auto};
use rust_xlsxwriter::Workbook;

use crate::table::{Table, Value};

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to read spreadsheet: {0}")]
    XlsxRead(#[from] calamine::Error),
    #[error("Failed to write spreadsheet: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),
    #[error("Spreadsheet has no worksheet or header row: {}", .0.display())]
    Empty(PathBuf),
    #[error("Table too large for a worksheet: {0}")]
    TooLarge(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Xlsx,
}

impl Format {
    /// Matches on [`Path::extension`], so a bare dotfile such as `.csv` has no
    /// extension and is rejected.
    pub fn from_path(path: &Path) -> Result<Self, CodecError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("csv") => Ok(Format::Csv),
            Some("xlsx") => Ok(Format::Xlsx),
            _ => Err(CodecError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

pub fn load_table(path: impl AsRef<Path>) -> Result<Table, CodecError> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;

    let mut table = match format {
        Format::Csv => read_csv(path)?,
        Format::Xlsx => read_xlsx(path)?,
    };
    table.infer_numeric_columns();

    log::info!(
        "Loaded {} rows x {} columns from {}",
        table.len(),
        table.columns().len(),
        path.display()
    );
    Ok(table)
}

/// Writes `table` without any positional index column, creating the parent
/// directory when it does not exist yet.
pub fn save_table(table: &Table, path: impl AsRef<Path>) -> Result<(), CodecError> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    match format {
        Format::Csv => write_csv(table, path)?,
        Format::Xlsx => write_xlsx(table, path)?,
    }

    log::info!("Saved {} rows to {}", table.len(), path.display());
    Ok(())
}

fn read_csv(path: &Path) -> Result<Table, CodecError> {
    let mut reader = csv::Reader::from_path(path)?;
    let columns = reader
        .headers()?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    let mut table = Table::new(columns);
    for record in reader.records() {
        let record = record?;
        table.push_row(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Value::Empty
                    } else {
                        Value::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(table)
}

fn write_csv(table: &Table, path: &Path) -> Result<(), CodecError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Empty,
        Data::Int(i) => Value::Number(*i as f64),
        Data::Float(f) => Value::Number(*f),
        Data::String(s) if s.is_empty() => Value::Empty,
        Data::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}

fn read_xlsx(path: &Path) -> Result<Table, CodecError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| CodecError::Empty(path.to_path_buf()))??;

    let mut rows = range.rows();
    let columns = rows
        .next()
        .ok_or_else(|| CodecError::Empty(path.to_path_buf()))?
        .iter()
        .map(|cell| cell.to_string())
        .collect::<Vec<_>>();

    let mut table = Table::new(columns);
    for row in rows {
        table.push_row(row.iter().map(cell_value).collect());
    }
    Ok(table)
}

fn sheet_col(col: usize) -> Result<u16, CodecError> {
    u16::try_from(col).map_err(|_| CodecError::TooLarge(format!("column {col}")))
}

fn sheet_row(row: usize) -> Result<u32, CodecError> {
    row.checked_add(1)
        .and_then(|r| u32::try_from(r).ok())
        .ok_or_else(|| CodecError::TooLarge(format!("row {row}")))
}

fn write_xlsx(table: &Table, path: &Path) -> Result<(), CodecError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in table.columns().iter().enumerate() {
        worksheet.write_string(0, sheet_col(col)?, name)?;
    }
    for (r, row) in table.rows().iter().enumerate() {
        let r = sheet_row(r)?;
        for (col, value) in row.iter().enumerate() {
            let col = sheet_col(col)?;
            match value {
                Value::Text(s) => {
                    worksheet.write_string(r, col, s)?;
                }
                Value::Number(n) => {
                    worksheet.write_number(r, col, *n)?;
                }
                Value::Empty => {}
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;

    fn sample_table() -> Table {
        Table::from_records(&[
            Record {
                title: "Asus ROG Strix".to_string(),
                description: "15.6\", Core i7, 16GB".to_string(),
                price: "$1,250.00".to_string(),
            },
            Record {
                title: "Samsung Galaxy".to_string(),
                description: "5 mpx. Android 5.0".to_string(),
                price: "$93.99".to_string(),
            },
        ])
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            Format::from_path(Path::new("data/raw/products.csv")).unwrap(),
            Format::Csv
        );
        assert_eq!(
            Format::from_path(Path::new("report.XLSX")).unwrap(),
            Format::Xlsx
        );
        assert!(matches!(
            Format::from_path(Path::new("products")),
            Err(CodecError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_format_from_path_bare_dotfile() {
        assert!(matches!(
            Format::from_path(Path::new("data/.csv")),
            Err(CodecError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_sheet_index_overflow() {
        assert_eq!(sheet_col(3).unwrap(), 3);
        assert!(matches!(
            sheet_col(usize::from(u16::MAX) + 1),
            Err(CodecError::TooLarge(_))
        ));
        assert_eq!(sheet_row(0).unwrap(), 1);
        assert!(matches!(
            sheet_row(u32::MAX as usize),
            Err(CodecError::TooLarge(_))
        ));
    }

    #[test]
    fn test_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.csv");
        let table = sample_table();

        save_table(&table, &path).unwrap();
        let loaded = load_table(&path).unwrap();

        assert_eq!(loaded.len(), table.len());
        assert_eq!(loaded.columns(), table.columns());
        assert_eq!(loaded.rows()[0][1], Value::Text("15.6\", Core i7, 16GB".into()));
    }

    #[test]
    fn test_csv_has_no_index_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.csv");

        save_table(&sample_table(), &path).unwrap();
        let written = fs::read_to_string(&path).unwrap();

        assert_eq!(written.lines().next(), Some("title,description,price"));
        assert_eq!(written.lines().count(), 3);
    }

    #[test]
    fn test_xlsx_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.xlsx");
        let mut table = Table::new(vec!["title".into(), "price".into()]);
        table.push_row(vec![Value::Text("Asus".into()), Value::Number(1250.0)]);
        table.push_row(vec![Value::Text("Acer".into()), Value::Number(93.99)]);
        table.push_row(vec![Value::Text("Nokia".into()), Value::Empty]);

        save_table(&table, &path).unwrap();
        let loaded = load_table(&path).unwrap();

        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.columns(), table.columns());
        assert_eq!(loaded.rows()[0][1], Value::Number(1250.0));
        assert_eq!(loaded.rows()[2][1], Value::Empty);
    }

    #[test]
    fn test_csv_numeric_columns_are_inferred() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cleaned.csv");
        fs::write(&path, "title,price\nAsus,1250\nAcer,93.99\n").unwrap();

        let loaded = load_table(&path).unwrap();

        assert_eq!(loaded.rows()[0][1], Value::Number(1250.0));
        assert_eq!(loaded.rows()[1][0], Value::Text("Acer".into()));
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("processed").join("cleaned.csv");

        save_table(&sample_table(), &path).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_unsupported_format_does_no_io() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("products.json");
        let nested = dir.path().join("out").join("products.json");

        assert!(matches!(
            load_table(&missing),
            Err(CodecError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            save_table(&sample_table(), &nested),
            Err(CodecError::UnsupportedFormat(_))
        ));
        assert!(!nested.exists());
        assert!(!dir.path().join("out").exists());
    }
}
