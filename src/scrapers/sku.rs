use std::sync::Arc;
use tokio::time::sleep;
use tracing::{error, warn};

use crate::browser::{Locator, PageSession};
use crate::config::Config;
use crate::parsers::{clean_sku, clean_text};

pub struct SkuScraper {
    config: Arc<Config>,
}

impl SkuScraper {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// SKU shown on `url`, or an empty string when it cannot be read.
    pub async fn fetch(&self, session: &mut dyn PageSession, url: &str) -> String {
        if let Err(e) = session.open(url).await {
            error!("Failed to open page {}: {}", url, e);
            return String::new();
        }

        let locator = Locator::Css(self.config.sku_selector());
        match session.find(&locator, self.config.element_timeout()).await {
            Ok(Some(element)) => clean_sku(&clean_text(&element.text)),
            Ok(None) => {
                error!("SKU element not found on {}", url);
                String::new()
            }
            Err(e) => {
                error!("Failed to read SKU on {}: {}", url, e);
                String::new()
            }
        }
    }

    /// Up to `task.retry_times` attempts with a fixed `task.retry_delay_secs`
    /// pause between them. The first non-empty SKU wins.
    pub async fn fetch_with_retry(&self, session: &mut dyn PageSession, url: &str) -> String {
        let attempts = self.config.task.retry_times.max(1);
        let delay = self.config.retry_delay();

        for attempt in 1..=attempts {
            let sku = self.fetch(session, url).await;
            if !sku.is_empty() {
                return sku;
            }

            if attempt < attempts {
                warn!(
                    "SKU not read from {}, retrying in {:?} (attempt {}/{})",
                    url,
                    delay,
                    attempt + 1,
                    attempts
                );
                sleep(delay).await;
            }
        }

        error!("Could not read SKU from {} after {} attempts", url, attempts);
        String::new()
    }
}
