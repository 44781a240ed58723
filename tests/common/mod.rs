#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use price_checker::browser::{BrowserError, ElementSnapshot, Locator, PageSession};
use price_checker::config::Config;

/// Config with every delay zeroed so runs finish immediately.
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.task.request_delay_secs = 0;
    config.task.retry_delay_secs = 0;
    config.task.retry_times = 2;
    config.browser.timeout_secs = 1;
    config
}

/// Elements a product page exposes for the given panel id, price and SKU text.
pub fn product_page(
    config: &Config,
    panel_id: &str,
    price: &str,
    sku: &str,
) -> HashMap<Locator, ElementSnapshot> {
    let mut elements = HashMap::new();
    elements.insert(
        Locator::ClassName(config.price.panel_class.clone()),
        ElementSnapshot {
            text: String::new(),
            id: Some(panel_id.to_string()),
        },
    );
    elements.insert(
        Locator::XPath(config.price_xpath(panel_id)),
        ElementSnapshot {
            text: price.to_string(),
            id: None,
        },
    );
    elements.insert(
        Locator::Css(config.sku_selector()),
        ElementSnapshot {
            text: sku.to_string(),
            id: None,
        },
    );
    elements
}

/// Shared log of what the session was asked to do.
#[derive(Debug, Default)]
pub struct SessionLog {
    pub starts: usize,
    pub opened: Vec<String>,
    pub closed: usize,
}

/// Browser tab backed by a fixed url -> elements map.
pub struct ScriptedSession {
    pages: HashMap<String, HashMap<Locator, ElementSnapshot>>,
    current: Option<String>,
    fail_start: bool,
    pub log: Arc<Mutex<SessionLog>>,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            current: None,
            fail_start: false,
            log: Arc::new(Mutex::new(SessionLog::default())),
        }
    }

    /// A session whose browser never comes up.
    pub fn without_browser() -> Self {
        Self {
            fail_start: true,
            ..Self::new()
        }
    }

    pub fn page(mut self, url: &str, elements: HashMap<Locator, ElementSnapshot>) -> Self {
        self.pages.insert(url.to_string(), elements);
        self
    }
}

#[async_trait]
impl PageSession for ScriptedSession {
    async fn start(&mut self) -> Result<(), BrowserError> {
        self.log.lock().unwrap().starts += 1;
        if self.fail_start {
            return Err(BrowserError::Config("chrome executable not found".to_string()));
        }
        Ok(())
    }

    async fn open(&mut self, url: &str) -> Result<(), BrowserError> {
        self.log.lock().unwrap().opened.push(url.to_string());
        self.current = Some(url.to_string());
        Ok(())
    }

    async fn find(
        &mut self,
        locator: &Locator,
        _timeout: Duration,
    ) -> Result<Option<ElementSnapshot>, BrowserError> {
        Ok(self
            .current
            .as_ref()
            .and_then(|url| self.pages.get(url))
            .and_then(|elements| elements.get(locator))
            .cloned())
    }

    async fn page_source(&mut self) -> Result<String, BrowserError> {
        Ok(String::new())
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.log.lock().unwrap().closed += 1;
        self.current = None;
        Ok(())
    }
}

pub fn csv_sheet(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}
