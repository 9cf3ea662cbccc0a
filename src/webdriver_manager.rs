use anyhow::{Context, Result};
use lazy_static::lazy_static;
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::webdriver::BrowserType;

lazy_static! {
    /// Single manager for the whole process so drivers started for one
    /// command are reused and cleaned up on exit.
    pub static ref GLOBAL_WEBDRIVER_MANAGER: WebDriverManager = WebDriverManager::new();
}

/// Manages WebDriver processes (geckodriver, chromedriver)
pub struct WebDriverManager {
    processes: Mutex<Vec<ManagedDriver>>,
}

struct ManagedDriver {
    child: Child,
    url: String,
}

impl WebDriverManager {
    pub fn new() -> Self {
        Self {
            processes: Mutex::new(Vec::new()),
        }
    }

    /// Ensure a WebDriver is reachable for the given browser type.
    /// Returns the URL to connect to.
    pub async fn ensure_driver(&self, browser_type: &BrowserType) -> Result<String> {
        // A driver we started earlier may still be alive
        let managed_urls: Vec<String> = {
            let processes = self.processes.lock().unwrap();
            processes.iter().map(|p| p.url.clone()).collect()
        };
        for url in managed_urls {
            if Self::is_driver_ready(&url).await {
                debug!("Using existing managed WebDriver at {}", url);
                return Ok(url);
            }
        }

        // Externally managed driver on the standard port
        let url = browser_type.standard_url();
        if Self::is_driver_ready(&url).await {
            debug!("Found external WebDriver at {}", url);
            return Ok(url);
        }

        info!("WebDriver not detected, attempting to start automatically...");
        self.start_driver(browser_type).await
    }

    async fn start_driver(&self, browser_type: &BrowserType) -> Result<String> {
        let command = browser_type.driver_name();
        let url = browser_type.standard_url();
        let port = url.rsplit(':').next().unwrap_or("0").to_string();

        if !Self::command_exists(command) {
            anyhow::bail!(
                "{} not found in PATH. Please install it:\n\
                  macOS: brew install {}\n\
                  Linux: Download from official releases",
                command,
                command
            );
        }

        info!("Starting {} on port {}", command, port);
        let arg = match browser_type {
            BrowserType::Firefox => vec!["--port".to_string(), port],
            BrowserType::Chrome => vec![format!("--port={}", port)],
        };

        let child = Command::new(command)
            .args(&arg)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context(format!("Failed to start {}", command))?;

        {
            let mut processes = self.processes.lock().unwrap();
            processes.push(ManagedDriver {
                child,
                url: url.clone(),
            });
        }

        // Wait for the driver to come up (3 seconds total)
        let max_attempts = 30;
        for attempt in 1..=max_attempts {
            if Self::is_driver_ready(&url).await {
                info!("WebDriver started successfully at {}", url);
                return Ok(url);
            }
            if attempt < max_attempts {
                sleep(Duration::from_millis(100)).await;
            }
        }

        self.stop_all();
        anyhow::bail!("WebDriver failed to start within timeout")
    }

    /// Check that a driver at the URL is running and reports ready
    async fn is_driver_ready(url: &str) -> bool {
        let status_url = format!("{}/status", url);
        match reqwest::Client::new()
            .get(&status_url)
            .timeout(Duration::from_secs(1))
            .send()
            .await
        {
            Ok(response) => match response.json::<serde_json::Value>().await {
                Ok(body) => body
                    .get("value")
                    .and_then(|v| v.get("ready"))
                    .and_then(|r| r.as_bool())
                    .unwrap_or(false),
                Err(_) => false,
            },
            Err(_) => false,
        }
    }

    /// Check if a command exists in PATH
    fn command_exists(command: &str) -> bool {
        #[cfg(unix)]
        {
            Command::new("which")
                .arg(command)
                .output()
                .map(|output| output.status.success())
                .unwrap_or(false)
        }

        #[cfg(windows)]
        {
            Command::new("where")
                .arg(command)
                .output()
                .map(|output| output.status.success())
                .unwrap_or(false)
        }
    }

    /// Kill every driver process we started
    pub fn stop_all(&self) {
        let mut processes = self.processes.lock().unwrap();
        for mut process in processes.drain(..) {
            debug!("Stopping WebDriver at {}", process.url);
            let _ = process.child.kill();
            let _ = process.child.wait();
        }
    }
}

impl Default for WebDriverManager {
    fn default() -> Self {
        Self::new()
    }
}
