use async_trait::async_trait;
use chromiumoxide::error::CdpError;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

mod chrome;
#[cfg(test)]
pub(crate) mod fake;

pub use chrome::ChromeSession;

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Invalid browser configuration: {0}")]
    Config(String),

    #[error("Failed to start browser: {0}")]
    Launch(#[source] CdpError),

    #[error("Failed to open {url}: {source}")]
    Navigation {
        url: String,
        #[source]
        source: CdpError,
    },

    #[error("Browser protocol error: {0}")]
    Cdp(#[from] CdpError),
}

/// How an element is looked up on the current page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    XPath(String),
    /// One or more space separated class names, all of which must match.
    ClassName(String),
    Css(String),
}

impl Locator {
    /// CSS form of class and CSS locators. XPath has none.
    pub fn as_css(&self) -> Option<String> {
        match self {
            Locator::XPath(_) => None,
            Locator::ClassName(classes) => Some(
                classes
                    .split_whitespace()
                    .map(|class| format!(".{}", class))
                    .collect(),
            ),
            Locator::Css(selector) => Some(selector.clone()),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::XPath(xpath) => write!(f, "xpath {}", xpath),
            Locator::ClassName(class) => write!(f, "class {}", class),
            Locator::Css(selector) => write!(f, "selector {}", selector),
        }
    }
}

/// What the pipeline reads from a located element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementSnapshot {
    /// Visible text, trimmed.
    pub text: String,
    pub id: Option<String>,
}

/// A single browser tab driven by the comparison run.
///
/// Implementations start the browser lazily on first use and must tolerate
/// `close` being called when nothing was started.
#[async_trait]
pub trait PageSession: Send {
    /// Bring the browser up. A failure here means no page can be read at all.
    async fn start(&mut self) -> Result<(), BrowserError>;

    async fn open(&mut self, url: &str) -> Result<(), BrowserError>;

    /// Wait up to `timeout` for the element to appear. `Ok(None)` on timeout.
    async fn find(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<Option<ElementSnapshot>, BrowserError>;

    async fn page_source(&mut self) -> Result<String, BrowserError>;

    async fn close(&mut self) -> Result<(), BrowserError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_locator_becomes_compound_css() {
        let locator = Locator::ClassName("purchasePanel--cG3DU6bX  normalPanel".to_string());
        assert_eq!(
            locator.as_css().as_deref(),
            Some(".purchasePanel--cG3DU6bX.normalPanel")
        );
        assert_eq!(Locator::XPath("//span".to_string()).as_css(), None);
        assert_eq!(
            Locator::Css("[class='a b']".to_string()).as_css().as_deref(),
            Some("[class='a b']")
        );
    }
}
