use rust_decimal::Decimal;

use super::MISSING_SKU;

/// One input row: the store link, the competitor link and, when the sheet
/// lists them, the SKUs each link is expected to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPair {
    pub link_a: String,
    pub link_b: String,
    pub expected_sku_a: Option<String>,
    pub expected_sku_b: Option<String>,
}

impl LinkPair {
    pub fn new(link_a: impl Into<String>, link_b: impl Into<String>) -> Self {
        Self {
            link_a: link_a.into(),
            link_b: link_b.into(),
            expected_sku_a: None,
            expected_sku_b: None,
        }
    }

    pub fn with_expected_skus(
        mut self,
        sku_a: Option<String>,
        sku_b: Option<String>,
    ) -> Self {
        self.expected_sku_a = sku_a.filter(|s| !s.trim().is_empty());
        self.expected_sku_b = sku_b.filter(|s| !s.trim().is_empty());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRow {
    pub sequence: usize,
    pub a_price: Decimal,
    pub b_price: Decimal,
    pub a_sku: String,
    pub b_sku: String,
}

impl ComparisonRow {
    pub fn sku_display(sku: &str) -> &str {
        if sku.is_empty() {
            MISSING_SKU
        } else {
            sku
        }
    }
}
