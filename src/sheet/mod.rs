use calamine::{open_workbook_auto, Reader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ColumnNames, SheetConfig};
use crate::models::{ComparisonRow, LinkPair};
use crate::parsers::format_price;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Spreadsheet not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported spreadsheet type: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Worksheet '{0}' not found")]
    MissingWorksheet(String),

    #[error("Spreadsheet is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SheetError>;

/// Header row plus data rows, every cell rendered as trimmed text.
#[derive(Debug, Clone, Default)]
struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    fn cell<'a>(&'a self, row: &'a [String], column: Option<usize>) -> &'a str {
        column
            .and_then(|index| row.get(index))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Outcome of checking a sheet without running a comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetReport {
    pub rows: usize,
    pub blank_links: usize,
    pub has_expected_skus: bool,
}

/// Load the link pairs to compare, skipping rows without both links.
pub fn read_link_pairs(path: &Path, config: &SheetConfig) -> Result<Vec<LinkPair>> {
    let table = load_table(path, &config.sheet_name)?;
    let pairs = pairs_from_table(&table, &config.columns)?;
    info!("Read {} link pairs from {}", pairs.len(), path.display());
    Ok(pairs)
}

/// Check the file exists and carries the link columns; count blank link cells.
pub fn validate(path: &Path, config: &SheetConfig) -> Result<SheetReport> {
    let table = load_table(path, &config.sheet_name)?;
    check_columns(&table, &config.columns)?;

    let columns = &config.columns;
    let mut report = SheetReport {
        rows: table.rows.len(),
        has_expected_skus: table.column(&columns.sku_a).is_some()
            || table.column(&columns.sku_b).is_some(),
        ..SheetReport::default()
    };

    for name in [&columns.link_a, &columns.link_b] {
        let index = table.column(name);
        let blanks = table
            .rows
            .iter()
            .filter(|row| table.cell(row, index).is_empty())
            .count();
        if blanks > 0 {
            warn!("Column '{}' has {} blank cells", name, blanks);
        }
        report.blank_links += blanks;
    }

    Ok(report)
}

/// Write compared rows as CSV with prices at `precision` decimals.
pub fn save_results(path: &Path, rows: &[ComparisonRow], precision: u32) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "Seq",
        "Store price",
        "Store SKU",
        "Competitor price",
        "Competitor SKU",
    ])?;
    for row in rows {
        writer.write_record([
            row.sequence.to_string(),
            format_price(row.a_price, precision),
            row.a_sku.clone(),
            format_price(row.b_price, precision),
            row.b_sku.clone(),
        ])?;
    }
    writer.flush()?;

    info!("Saved {} results to {}", rows.len(), path.display());
    Ok(())
}

fn load_table(path: &Path, sheet_name: &str) -> Result<Table> {
    if !path.exists() {
        return Err(SheetError::NotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => load_csv(path),
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => load_workbook(path, sheet_name),
        _ => Err(SheetError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn load_workbook(path: &Path, sheet_name: &str) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;
    if !workbook.sheet_names().iter().any(|name| name == sheet_name) {
        return Err(SheetError::MissingWorksheet(sheet_name.to_string()));
    }

    let range = workbook.worksheet_range(sheet_name)?;
    let mut rows = range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| cell.to_string().trim().to_string())
                .collect::<Vec<String>>()
        });

    Ok(Table {
        headers: rows.next().unwrap_or_default(),
        rows: rows.collect(),
    })
}

fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader
        .headers()?
        .iter()
        .map(|header| header.trim().trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(|cell| cell.trim().to_string()).collect());
    }

    Ok(Table { headers, rows })
}

fn check_columns(table: &Table, columns: &ColumnNames) -> Result<()> {
    let missing: Vec<String> = [&columns.link_a, &columns.link_b]
        .into_iter()
        .filter(|name| table.column(name).is_none())
        .cloned()
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SheetError::MissingColumns(missing))
    }
}

fn pairs_from_table(table: &Table, columns: &ColumnNames) -> Result<Vec<LinkPair>> {
    check_columns(table, columns)?;

    let link_a = table.column(&columns.link_a);
    let link_b = table.column(&columns.link_b);
    let sku_a = table.column(&columns.sku_a);
    let sku_b = table.column(&columns.sku_b);

    let mut pairs = Vec::new();
    for (index, row) in table.rows.iter().enumerate() {
        let a = table.cell(row, link_a);
        let b = table.cell(row, link_b);

        if a.is_empty() && b.is_empty() {
            continue;
        }
        if a.is_empty() || b.is_empty() {
            // Header is line 1, so data row `index` sits on line index + 2.
            warn!("Skipping sheet line {}: missing a link", index + 2);
            continue;
        }

        let expected = |column: Option<usize>| {
            Some(table.cell(row, column).to_string()).filter(|sku| !sku.is_empty())
        };
        pairs.push(LinkPair::new(a, b).with_expected_skus(expected(sku_a), expected(sku_b)));
    }

    Ok(pairs)
}
