use anyhow::{Context, Result};
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::wd::WindowHandle;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::page::{FormPage, PageError};
use crate::types::{CompiledLocator, LocatorStrategy};
use crate::webdriver_manager::GLOBAL_WEBDRIVER_MANAGER;

/// Supported browser types
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum BrowserType {
    /// Mozilla Firefox
    Firefox,
    /// Google Chrome/Chromium
    Chrome,
}

impl std::str::FromStr for BrowserType {
    type Err = anyhow::Error;

    /// Parse browser type from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "firefox" => Ok(BrowserType::Firefox),
            "chrome" | "chromium" => Ok(BrowserType::Chrome),
            _ => anyhow::bail!("Unsupported browser: {}", s),
        }
    }
}

impl BrowserType {
    /// Standard WebDriver port for this browser type
    pub fn standard_url(&self) -> String {
        match self {
            BrowserType::Firefox => "http://localhost:4444".to_string(),
            BrowserType::Chrome => "http://localhost:9515".to_string(),
        }
    }

    pub fn driver_name(&self) -> &'static str {
        match self {
            BrowserType::Firefox => "geckodriver",
            BrowserType::Chrome => "chromedriver",
        }
    }
}

/// How to obtain the browser session
#[derive(Clone, Debug)]
pub struct SessionOptions {
    pub browser: BrowserType,
    /// Explicit WebDriver endpoint; bypasses driver auto-start
    pub webdriver_url: Option<String>,
    /// Attach to an already-running Chrome via its debugger address
    /// (host:port) instead of launching a fresh browser
    pub attach: Option<String>,
    pub headless: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            browser: BrowserType::Chrome,
            webdriver_url: None,
            attach: None,
            headless: true,
        }
    }
}

/// Browser session for WebDriver automation
pub struct Browser {
    client: Client,
    browser_type: BrowserType,
}

impl Browser {
    /// Connect a new session: ensure a driver process is reachable, then
    /// either launch a browser or attach to a running Chrome.
    pub async fn connect(options: SessionOptions) -> Result<Self> {
        info!("Connecting to {:?} WebDriver", options.browser);

        if options.attach.is_some() && options.browser != BrowserType::Chrome {
            anyhow::bail!("--attach is only supported for Chrome");
        }

        let webdriver_url = match &options.webdriver_url {
            Some(raw) => {
                // Validate early so a typo fails with a clear message
                let parsed = url::Url::parse(raw)
                    .with_context(|| format!("Invalid WebDriver URL: {}", raw))?;
                parsed.to_string().trim_end_matches('/').to_string()
            }
            None => {
                GLOBAL_WEBDRIVER_MANAGER
                    .ensure_driver(&options.browser)
                    .await?
            }
        };

        if !Self::is_webdriver_running(&webdriver_url).await {
            let driver = options.browser.driver_name();
            anyhow::bail!(
                "Cannot connect to {} at {}.\n\
                Please ensure {} is running:\n\
                  For Firefox: geckodriver --port 4444\n\
                  For Chrome: chromedriver --port 9515",
                driver,
                webdriver_url,
                driver
            );
        }
        Self::log_driver_status(&webdriver_url).await;

        let mut caps = serde_json::Map::new();
        match options.browser {
            BrowserType::Firefox => {
                let mut args = Vec::new();
                if options.headless {
                    args.push("--headless".to_string());
                }
                caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
            }
            BrowserType::Chrome => {
                let mut chrome_opts = serde_json::Map::new();
                if let Some(address) = &options.attach {
                    // Take over an already-running Chrome; no args allowed
                    // alongside debuggerAddress.
                    chrome_opts.insert("debuggerAddress".to_string(), json!(address));
                } else {
                    let mut args = vec!["--no-sandbox".to_string()];
                    if options.headless {
                        args.push("--headless=new".to_string());
                        args.push("--disable-gpu".to_string());
                        args.push("--disable-dev-shm-usage".to_string());
                    }
                    // Unique profile dir; Chrome refuses to share one
                    let profile_dir = tempfile::Builder::new()
                        .prefix("webfill-chrome-")
                        .tempdir()?;
                    #[allow(deprecated)]
                    let profile_path = profile_dir.into_path();
                    args.push(format!("--user-data-dir={}", profile_path.display()));
                    chrome_opts.insert("args".to_string(), json!(args));
                }
                caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));
            }
        }

        debug!("Connecting to WebDriver at {}", webdriver_url);
        let client = match ClientBuilder::rustls()
            .capabilities(caps.clone())
            .connect(&webdriver_url)
            .await
        {
            Ok(client) => client,
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("Session is already started")
                    || error_str.contains("session not created")
                {
                    // The driver is stuck holding a dead session; restart it
                    // and connect once more.
                    info!("WebDriver appears to be in a bad state, attempting recovery...");
                    GLOBAL_WEBDRIVER_MANAGER.stop_all();
                    tokio::time::sleep(std::time::Duration::from_millis(500)).await;

                    let new_url = GLOBAL_WEBDRIVER_MANAGER
                        .ensure_driver(&options.browser)
                        .await
                        .context("Failed to restart WebDriver after recovery")?;

                    ClientBuilder::rustls()
                        .capabilities(caps)
                        .connect(&new_url)
                        .await
                        .context("Failed to connect to WebDriver after restart")?
                } else {
                    return Err(e).context("Failed to connect to WebDriver");
                }
            }
        };

        Ok(Browser {
            client,
            browser_type: options.browser,
        })
    }

    async fn is_webdriver_running(url: &str) -> bool {
        let status_url = format!("{}/status", url);
        match reqwest::get(&status_url).await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Log the driver's build info from /status; mismatched driver and
    /// browser versions are the usual cause of flaky sessions.
    async fn log_driver_status(url: &str) {
        let status_url = format!("{}/status", url);
        let Ok(response) = reqwest::get(&status_url).await else {
            return;
        };
        let Ok(body) = response.json::<serde_json::Value>().await else {
            return;
        };
        if let Some(build) = body
            .get("value")
            .and_then(|v| v.get("build"))
            .and_then(|b| b.get("version"))
            .and_then(|v| v.as_str())
        {
            info!("WebDriver build: {}", build);
        }
    }

    pub fn browser_type(&self) -> BrowserType {
        self.browser_type
    }

    pub async fn goto(&self, url: &str) -> Result<()> {
        info!("Navigating to {}", url);
        self.client.goto(url).await?;
        Ok(())
    }

    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}

fn to_fantoccini(compiled: &CompiledLocator) -> Locator<'_> {
    match compiled {
        CompiledLocator::Css(css) => Locator::Css(css),
        CompiledLocator::XPath(xpath) => Locator::XPath(xpath),
    }
}

/// Classify a fantoccini error by its WebDriver error string; the variants
/// the retry logic cares about are stable protocol-level names.
fn map_cmd_error(err: fantoccini::error::CmdError) -> PageError {
    let msg = err.to_string();
    let lowered = msg.to_lowercase();
    if lowered.contains("no such element") {
        PageError::NotFound
    } else if lowered.contains("stale") {
        PageError::Stale
    } else if lowered.contains("invalid element state") {
        PageError::InvalidState
    } else {
        PageError::Driver(msg)
    }
}

#[async_trait]
impl FormPage for Browser {
    type Element = Element;

    async fn find(
        &self,
        strategy: LocatorStrategy,
        locator: &str,
    ) -> Result<Self::Element, PageError> {
        let compiled = strategy.compile(locator);
        self.client
            .find(to_fantoccini(&compiled))
            .await
            .map_err(map_cmd_error)
    }

    async fn tag_name(&self, element: &Self::Element) -> Result<String, PageError> {
        element.tag_name().await.map_err(map_cmd_error)
    }

    async fn text(&self, element: &Self::Element) -> Result<String, PageError> {
        element.text().await.map_err(map_cmd_error)
    }

    async fn attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, PageError> {
        element.attr(name).await.map_err(map_cmd_error)
    }

    async fn is_enabled(&self, element: &Self::Element) -> Result<bool, PageError> {
        element.is_enabled().await.map_err(map_cmd_error)
    }

    async fn clear(&self, element: &Self::Element) -> Result<(), PageError> {
        element.clear().await.map_err(map_cmd_error)
    }

    async fn send_keys(&self, element: &Self::Element, text: &str) -> Result<(), PageError> {
        element.send_keys(text).await.map_err(map_cmd_error)
    }

    async fn options(&self, element: &Self::Element) -> Result<Vec<Self::Element>, PageError> {
        element
            .find_all(Locator::Css("option"))
            .await
            .map_err(map_cmd_error)
    }

    async fn select_index(&self, element: &Self::Element, index: usize) -> Result<(), PageError> {
        element
            .clone()
            .select_by_index(index)
            .await
            .map_err(map_cmd_error)
    }

    async fn window_handles(&self) -> Result<Vec<String>, PageError> {
        let handles = self.client.windows().await.map_err(map_cmd_error)?;
        Ok(handles.into_iter().map(String::from).collect())
    }

    async fn current_window(&self) -> Result<String, PageError> {
        let handle = self.client.window().await.map_err(map_cmd_error)?;
        Ok(String::from(handle))
    }

    async fn switch_window(&self, handle: &str) -> Result<(), PageError> {
        let handle = WindowHandle::try_from(handle.to_string())
            .map_err(|e| PageError::Driver(e.to_string()))?;
        self.client
            .switch_to_window(handle)
            .await
            .map_err(map_cmd_error)
    }

    async fn current_url(&self) -> Result<String, PageError> {
        let url = self.client.current_url().await.map_err(map_cmd_error)?;
        Ok(url.to_string())
    }
}
