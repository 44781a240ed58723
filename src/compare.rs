use rust_decimal::Decimal;

use crate::models::{AlertKind, ComparisonRow, LinkPair};
use crate::parsers::{format_price, normalize_sku, round_price};

/// Exact-match rules for prices and SKUs.
#[derive(Debug, Clone, Copy)]
pub struct Comparator {
    price_precision: u32,
}

impl Comparator {
    pub fn new(price_precision: u32) -> Self {
        Self { price_precision }
    }

    pub fn price_precision(&self) -> u32 {
        self.price_precision
    }

    pub fn prices_match(&self, a: Decimal, b: Decimal) -> bool {
        round_price(a, self.price_precision) == round_price(b, self.price_precision)
    }

    /// Empty SKUs never match, not even each other.
    pub fn skus_match(&self, a: &str, b: &str) -> bool {
        let a = normalize_sku(a);
        let b = normalize_sku(b);
        !a.is_empty() && !b.is_empty() && a == b
    }

    pub fn format_price(&self, value: Decimal) -> String {
        format_price(value, self.price_precision)
    }

    /// Alerts raised for one compared row.
    ///
    /// The store/competitor SKU checks against the sheet only run once the two
    /// scraped SKUs already disagree, and only for columns the sheet filled in.
    pub fn alerts_for(&self, row: &ComparisonRow, pair: &LinkPair) -> Vec<AlertKind> {
        let mut alerts = Vec::new();

        if !self.prices_match(row.a_price, row.b_price) {
            alerts.push(AlertKind::PriceMismatch);
        }

        if !self.skus_match(&row.a_sku, &row.b_sku) {
            alerts.push(AlertKind::SkuMismatch);

            if let Some(expected) = &pair.expected_sku_a {
                if !self.skus_match(&row.a_sku, expected) {
                    alerts.push(AlertKind::LocalSkuMismatch);
                }
            }
            if let Some(expected) = &pair.expected_sku_b {
                if !self.skus_match(&row.b_sku, expected) {
                    alerts.push(AlertKind::CompetitorSkuMismatch);
                }
            }
        }

        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn row(a_price: &str, b_price: &str, a_sku: &str, b_sku: &str) -> ComparisonRow {
        ComparisonRow {
            sequence: 1,
            a_price: dec(a_price),
            b_price: dec(b_price),
            a_sku: a_sku.to_string(),
            b_sku: b_sku.to_string(),
        }
    }

    #[test]
    fn prices_ignore_trailing_zero_formatting() {
        let comparator = Comparator::new(2);
        assert!(comparator.prices_match(dec("12.5"), dec("12.50")));
        assert!(comparator.prices_match(dec("12.004"), dec("12.00")));
        assert!(!comparator.prices_match(dec("12.50"), dec("12.51")));
    }

    #[test]
    fn precision_controls_price_equality() {
        assert!(Comparator::new(0).prices_match(dec("12.4"), dec("12.1")));
        assert!(!Comparator::new(1).prices_match(dec("12.4"), dec("12.1")));
    }

    #[test]
    fn skus_ignore_case_and_surrounding_whitespace() {
        let comparator = Comparator::new(2);
        assert!(comparator.skus_match(" abc123 ", "ABC123"));
        assert!(!comparator.skus_match("ABC123", "ABC124"));
    }

    #[test]
    fn empty_skus_never_match() {
        let comparator = Comparator::new(2);
        assert!(!comparator.skus_match("", ""));
        assert!(!comparator.skus_match("  ", "ABC"));
    }

    #[test]
    fn matching_row_raises_no_alerts() {
        let comparator = Comparator::new(2);
        let pair = LinkPair::new("a", "b");
        assert!(comparator
            .alerts_for(&row("10", "10.00", "x1", "X1"), &pair)
            .is_empty());
    }

    #[test]
    fn sku_mismatch_checks_expected_columns() {
        let comparator = Comparator::new(2);
        let pair = LinkPair::new("a", "b")
            .with_expected_skus(Some("X1".to_string()), Some("Y9".to_string()));

        assert_eq!(
            comparator.alerts_for(&row("10", "11", "x1", "Y2"), &pair),
            vec![
                AlertKind::PriceMismatch,
                AlertKind::SkuMismatch,
                AlertKind::CompetitorSkuMismatch
            ]
        );
    }

    #[test]
    fn blank_expected_columns_skip_sub_alerts() {
        let comparator = Comparator::new(2);
        let pair = LinkPair::new("a", "b").with_expected_skus(Some("  ".to_string()), None);

        assert_eq!(
            comparator.alerts_for(&row("10", "10", "", "Y2"), &pair),
            vec![AlertKind::SkuMismatch]
        );
    }

    #[test]
    fn format_price_uses_precision() {
        assert_eq!(Comparator::new(2).format_price(dec("3")), "3.00");
        assert_eq!(Comparator::new(1).format_price(dec("3.25")), "3.3");
    }
}
