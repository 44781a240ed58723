use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "price_checker";
const ENV_PREFIX: &str = "PRICE_CHECKER";
const PANEL_ID_PLACEHOLDER: &str = "{panel_id}";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub browser: BrowserConfig,
    pub price: PriceConfig,
    pub sku: SkuConfig,
    pub sheet: SheetConfig,
    pub task: TaskConfig,
    pub compare: CompareConfig,
    pub log: LogConfig,
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Attach to an already running Chrome (`ws://...` or `http://host:9222`) instead of launching one.
    pub remote_debugging_url: Option<String>,
    pub headless: bool,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            remote_debugging_url: None,
            headless: false,
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
            window_width: 1366,
            window_height: 768,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceConfig {
    /// Space separated class list carried by the purchase panel.
    pub panel_class: String,
    pub xpath_template: String,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            panel_class: "purchasePanel--cG3DU6bX normalPanel--tH79cfP4 normalPanel".to_string(),
            xpath_template: "//*[@id=\"{panel_id}\"]/div[2]/div[3]/div/div/div[1]/span[3]"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkuConfig {
    pub class_name: String,
}

impl Default for SkuConfig {
    fn default() -> Self {
        Self {
            class_name: "valueItemText--HiKnUqGa f-els-1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub sheet_name: String,
    pub columns: ColumnNames,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet1".to_string(),
            columns: ColumnNames::default(),
        }
    }
}

/// Header names in the input sheet. Only the two link columns are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub link_a: String,
    pub link_b: String,
    pub sku_a: String,
    pub sku_b: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            link_a: "链接A".to_string(),
            link_b: "链接B".to_string(),
            sku_a: "A店SKU".to_string(),
            sku_b: "B店SKU".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    pub interval_minutes: u64,
    pub retry_times: u32,
    pub retry_delay_secs: u64,
    pub request_delay_secs: u64,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 60,
            retry_times: 3,
            retry_delay_secs: 5,
            request_delay_secs: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    pub price_precision: u32,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self { price_precision: 2 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub dir: String,
    pub file: String,
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: "logs".to_string(),
            file: "app.log".to_string(),
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub webhook_url: Option<String>,
}

impl Config {
    /// Layer defaults, an optional TOML file and `PRICE_CHECKER__*` environment variables.
    ///
    /// An explicit `path` must exist; without one, `price_checker.toml` in the
    /// working directory is picked up when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => ::config::File::from(path).required(true),
            None => ::config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = ::config::Config::builder()
            .add_source(::config::Config::try_from(&Config::default())?)
            .add_source(file)
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to assemble configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.task.retry_times == 0 {
            bail!("task.retry_times must be at least 1");
        }
        if self.compare.price_precision > 10 {
            bail!(
                "compare.price_precision must be at most 10, got {}",
                self.compare.price_precision
            );
        }
        if !self.price.xpath_template.contains(PANEL_ID_PLACEHOLDER) {
            bail!("price.xpath_template must contain {}", PANEL_ID_PLACEHOLDER);
        }
        if let Some(webhook_url) = &self.notify.webhook_url {
            url::Url::parse(webhook_url)
                .with_context(|| format!("notify.webhook_url is not a valid URL: {}", webhook_url))?;
        }
        Ok(())
    }

    pub fn price_xpath(&self, panel_id: &str) -> String {
        self.price
            .xpath_template
            .replace(PANEL_ID_PLACEHOLDER, panel_id)
    }

    /// Attribute selector matching the SKU node's exact class attribute.
    pub fn sku_selector(&self) -> String {
        format!("[class='{}']", self.sku.class_name)
    }

    /// CSS selector for the purchase panel, e.g. `.purchasePanel--x.normalPanel`.
    pub fn panel_selector(&self) -> String {
        self.price
            .panel_class
            .split_whitespace()
            .map(|class| format!(".{}", class))
            .collect()
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.browser.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.task.retry_delay_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_secs(self.task.request_delay_secs)
    }

    pub fn run_interval(&self) -> Option<Duration> {
        match self.task.interval_minutes {
            0 => None,
            minutes => Some(Duration::from_secs(minutes * 60)),
        }
    }
}
