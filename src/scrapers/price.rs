use rust_decimal::Decimal;
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::browser::{Locator, PageSession};
use crate::config::Config;
use crate::parsers::parse_price;

/// Reads the listed price from a product page.
///
/// The price node sits under a purchase panel whose `id` is generated per
/// page load, so the panel is located first and its id spliced into the
/// configured XPath.
pub struct PriceScraper {
    config: Arc<Config>,
}

impl PriceScraper {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Price on `url`, or zero when anything along the way fails.
    pub async fn fetch(&self, session: &mut dyn PageSession, url: &str) -> Decimal {
        if let Err(e) = session.open(url).await {
            error!("Failed to open page {}: {}", url, e);
            return Decimal::ZERO;
        }

        let Some(panel_id) = self.panel_id(session).await else {
            error!("No price panel id found on {}", url);
            return Decimal::ZERO;
        };

        let locator = Locator::XPath(self.config.price_xpath(&panel_id));
        match session.find(&locator, self.config.element_timeout()).await {
            Ok(Some(element)) => parse_price(&element.text, self.config.compare.price_precision),
            Ok(None) => {
                error!("Price element not found on {}", url);
                Decimal::ZERO
            }
            Err(e) => {
                error!("Failed to read price on {}: {}", url, e);
                Decimal::ZERO
            }
        }
    }

    async fn panel_id(&self, session: &mut dyn PageSession) -> Option<String> {
        let locator = Locator::ClassName(self.config.price.panel_class.clone());
        match session.find(&locator, self.config.element_timeout()).await {
            Ok(Some(panel)) => {
                if let Some(id) = panel.id.filter(|id| !id.is_empty()) {
                    return Some(id);
                }
                debug!("Price panel has no id attribute, falling back to page source");
            }
            Ok(None) => debug!("Price panel not found live, falling back to page source"),
            Err(e) => warn!("Price panel lookup failed: {}", e),
        }

        match session.page_source().await {
            Ok(html) => panel_id_from_source(&html, &self.config.panel_selector()),
            Err(e) => {
                error!("Failed to read page source: {}", e);
                None
            }
        }
    }
}

/// Find the `id` of the first `div` matching `panel_selector` in raw HTML.
pub fn panel_id_from_source(html: &str, panel_selector: &str) -> Option<String> {
    let selector = match Selector::parse(&format!("div{}", panel_selector)) {
        Ok(selector) => selector,
        Err(e) => {
            warn!("Invalid panel selector {:?}: {:?}", panel_selector, e);
            return None;
        }
    };

    let document = Html::parse_document(html);
    let panel_id = document
        .select(&selector)
        .filter_map(|panel| panel.value().attr("id"))
        .find(|id| !id.is_empty())
        .map(str::to_string);
    panel_id
}
