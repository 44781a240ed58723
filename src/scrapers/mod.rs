mod price;
mod sku;

pub use price::{panel_id_from_source, PriceScraper};
pub use sku::SkuScraper;
