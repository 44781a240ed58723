use pretty_assertions::assert_eq;
use std::path::PathBuf;

use price_checker::config::SheetConfig;
use price_checker::models::LinkPair;
use price_checker::sheet::{self, SheetError, SheetReport};

fn workbook() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/links.xlsx")
}

fn sheet_named(name: &str) -> SheetConfig {
    SheetConfig {
        sheet_name: name.to_string(),
        ..SheetConfig::default()
    }
}

#[test]
fn reads_link_pairs_from_xlsx() {
    let pairs = sheet::read_link_pairs(&workbook(), &SheetConfig::default()).unwrap();

    assert_eq!(
        pairs,
        vec![
            LinkPair::new("https://store.test/1", "https://rival.test/1")
                .with_expected_skus(Some("AB-100".to_string()), None),
            LinkPair::new("https://store.test/3", "https://rival.test/3")
                .with_expected_skus(None, Some("CD-300".to_string())),
        ]
    );
}

#[test]
fn validates_xlsx_and_counts_blank_links() {
    let report = sheet::validate(&workbook(), &SheetConfig::default()).unwrap();
    assert_eq!(
        report,
        SheetReport {
            rows: 3,
            blank_links: 1,
            has_expected_skus: true,
        }
    );
}

#[test]
fn missing_worksheet_is_reported_by_name() {
    match sheet::read_link_pairs(&workbook(), &sheet_named("Prices")) {
        Err(SheetError::MissingWorksheet(name)) => assert_eq!(name, "Prices"),
        other => panic!("expected missing worksheet, got {:?}", other),
    }
}

#[test]
fn worksheet_without_link_column_is_rejected() {
    match sheet::read_link_pairs(&workbook(), &sheet_named("NoLinkB")) {
        Err(SheetError::MissingColumns(missing)) => assert_eq!(missing, vec!["链接B"]),
        other => panic!("expected missing columns, got {:?}", other),
    }
}
