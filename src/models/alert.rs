use std::fmt;

/// The four mismatch alerts raised while comparing a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    PriceMismatch,
    SkuMismatch,
    LocalSkuMismatch,
    CompetitorSkuMismatch,
}

impl AlertKind {
    pub fn message(&self) -> &'static str {
        match self {
            AlertKind::PriceMismatch => "Store and competitor prices differ",
            AlertKind::SkuMismatch => "Store and competitor SKUs differ",
            AlertKind::LocalSkuMismatch => {
                "Store SKU differs from the SKU listed for the store link"
            }
            AlertKind::CompetitorSkuMismatch => {
                "Competitor SKU differs from the SKU listed for the competitor link"
            }
        }
    }

    /// Alert color as 0xRRGGBB.
    pub fn color(&self) -> u32 {
        match self {
            AlertKind::PriceMismatch => 0xFF0000,
            AlertKind::SkuMismatch => 0xFFFF00,
            AlertKind::LocalSkuMismatch => 0x0080FF,
            AlertKind::CompetitorSkuMismatch => 0xFFA500,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AlertKind::PriceMismatch => "PRICE",
            AlertKind::SkuMismatch => "SKU",
            AlertKind::LocalSkuMismatch => "STORE SKU",
            AlertKind::CompetitorSkuMismatch => "COMPETITOR SKU",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
