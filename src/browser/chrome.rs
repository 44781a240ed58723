use async_trait::async_trait;
use chromiumoxide::{Browser, Element, Page};
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use super::{BrowserError, ElementSnapshot, Locator, PageSession};
use crate::config::BrowserConfig;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Chrome driven over the DevTools protocol, one tab for the whole run.
pub struct ChromeSession {
    settings: BrowserConfig,
    browser: Option<Browser>,
    page: Option<Page>,
    handler_task: Option<JoinHandle<()>>,
}

impl ChromeSession {
    pub fn new(settings: BrowserConfig) -> Self {
        Self {
            settings,
            browser: None,
            page: None,
            handler_task: None,
        }
    }

    pub fn is_started(&self) -> bool {
        self.page.is_some()
    }

    async fn ensure_page(&mut self) -> Result<&Page, BrowserError> {
        if self.page.is_none() {
            let page = self.launch().await?;
            self.page = Some(page);
        }
        match self.page.as_ref() {
            Some(page) => Ok(page),
            None => Err(BrowserError::Config("browser page unavailable".to_string())),
        }
    }

    async fn launch(&mut self) -> Result<Page, BrowserError> {
        let (browser, mut handler) = match &self.settings.remote_debugging_url {
            Some(url) => {
                info!("Connecting to running Chrome at {}", url);
                Browser::connect(url.clone())
                    .await
                    .map_err(BrowserError::Launch)?
            }
            None => {
                let mut builder = chromiumoxide::BrowserConfig::builder()
                    .no_sandbox()
                    .window_size(self.settings.window_width, self.settings.window_height)
                    .request_timeout(Duration::from_secs(self.settings.timeout_secs))
                    .arg("--disable-gpu")
                    .arg("--disable-dev-shm-usage")
                    .arg("--disable-infobars");
                if !self.settings.headless {
                    builder = builder.with_head();
                }
                let config = builder.build().map_err(BrowserError::Config)?;
                Browser::launch(config)
                    .await
                    .map_err(BrowserError::Launch)?
            }
        };

        self.handler_task = Some(tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        }));

        let page = browser.new_page("about:blank").await?;
        page.set_user_agent(self.settings.user_agent.clone()).await?;
        self.browser = Some(browser);

        info!("Browser session started");
        Ok(page)
    }
}

async fn locate(page: &Page, locator: &Locator) -> Result<Option<Element>, BrowserError> {
    match locator {
        Locator::XPath(xpath) => Ok(page.find_xpaths(xpath.as_str()).await?.into_iter().next()),
        _ => {
            let selector = locator.as_css().unwrap_or_default();
            Ok(page.find_elements(selector).await?.into_iter().next())
        }
    }
}

async fn snapshot(element: &Element) -> Result<ElementSnapshot, BrowserError> {
    let text = element.inner_text().await?.unwrap_or_default();
    let id = element.attribute("id").await?;
    Ok(ElementSnapshot {
        text: text.trim().to_string(),
        id,
    })
}

#[async_trait]
impl PageSession for ChromeSession {
    async fn start(&mut self) -> Result<(), BrowserError> {
        self.ensure_page().await.map(|_| ())
    }

    async fn open(&mut self, url: &str) -> Result<(), BrowserError> {
        let page = self.ensure_page().await?;
        page.goto(url)
            .await
            .map_err(|source| BrowserError::Navigation {
                url: url.to_string(),
                source,
            })?;
        Ok(())
    }

    async fn find(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<Option<ElementSnapshot>, BrowserError> {
        let page = self.ensure_page().await?;
        let deadline = Instant::now() + timeout;

        loop {
            match locate(page, locator).await {
                Ok(Some(element)) => return snapshot(&element).await.map(Some),
                Ok(None) => {}
                Err(e) => debug!("Lookup of {} not ready: {}", locator, e),
            }

            if Instant::now() >= deadline {
                warn!("Timed out after {:?} waiting for {}", timeout, locator);
                return Ok(None);
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn page_source(&mut self) -> Result<String, BrowserError> {
        let page = self.ensure_page().await?;
        Ok(page.content().await?)
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                warn!("Failed to close browser tab: {}", e);
            }
        }

        // An attached browser belongs to someone else; only a launched one is shut down.
        if let Some(mut browser) = self.browser.take() {
            if self.settings.remote_debugging_url.is_none() {
                if let Err(e) = browser.close().await {
                    warn!("Failed to close browser: {}", e);
                }
                if let Err(e) = browser.wait().await {
                    warn!("Failed to reap browser process: {}", e);
                }
            }
            info!("Browser session closed");
        }

        if let Some(task) = self.handler_task.take() {
            task.abort();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn close_always_stops_the_handler_task() {
        let mut session = ChromeSession::new(BrowserConfig::default());
        let handler = tokio::spawn(futures::future::pending::<()>());
        let abort = handler.abort_handle();
        session.handler_task = Some(handler);

        session.close().await.unwrap();
        tokio::time::timeout(Duration::from_secs(1), async {
            while !abort.is_finished() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        assert!(!session.is_started());
    }
}
