use async_trait::async_trait;
use chromiumoxide::error::CdpError;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use super::{BrowserError, ElementSnapshot, Locator, PageSession};

#[derive(Debug, Clone, Default)]
pub(crate) struct FakePage {
    pub elements: HashMap<Locator, ElementSnapshot>,
    pub source: String,
    /// `find` calls on this page that come back empty before elements show up.
    pub misses_before_ready: usize,
}

/// In-memory stand-in for a browser tab.
#[derive(Debug, Default)]
pub(crate) struct FakeSession {
    pub pages: HashMap<String, FakePage>,
    pub unreachable: HashSet<String>,
    pub fail_start: bool,
    pub starts: usize,
    pub opened: Vec<String>,
    pub find_calls: usize,
    pub closed: bool,
    current: Option<String>,
}

impl FakeSession {
    pub fn without_browser() -> Self {
        Self {
            fail_start: true,
            ..Self::default()
        }
    }

    pub fn with_page(mut self, url: &str, page: FakePage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }
}

#[async_trait]
impl PageSession for FakeSession {
    async fn start(&mut self) -> Result<(), BrowserError> {
        self.starts += 1;
        if self.fail_start {
            return Err(BrowserError::Config("no browser available".to_string()));
        }
        Ok(())
    }

    async fn open(&mut self, url: &str) -> Result<(), BrowserError> {
        self.opened.push(url.to_string());
        if self.unreachable.contains(url) {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                source: CdpError::Timeout,
            });
        }
        self.current = Some(url.to_string());
        Ok(())
    }

    async fn find(
        &mut self,
        locator: &Locator,
        _timeout: Duration,
    ) -> Result<Option<ElementSnapshot>, BrowserError> {
        self.find_calls += 1;
        let Some(page) = self.current.as_ref().and_then(|url| self.pages.get_mut(url)) else {
            return Ok(None);
        };
        if page.misses_before_ready > 0 {
            page.misses_before_ready -= 1;
            return Ok(None);
        }
        Ok(page.elements.get(locator).cloned())
    }

    async fn page_source(&mut self) -> Result<String, BrowserError> {
        Ok(self
            .current
            .as_ref()
            .and_then(|url| self.pages.get(url))
            .map(|page| page.source.clone())
            .unwrap_or_default())
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.closed = true;
        self.current = None;
        Ok(())
    }
}
