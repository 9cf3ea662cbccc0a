use anyhow::Result;
use std::time::Duration;

use crate::filler::{FillConfig, FormFiller};
use crate::page::FormPage;
use crate::webdriver::{Browser, BrowserType, SessionOptions};

/// Session flags shared by every command that talks to a browser
#[derive(Clone, Debug)]
pub struct SessionArgs {
    pub browser: String,
    pub webdriver_url: Option<String>,
    pub attach: Option<String>,
    pub no_headless: bool,
}

impl SessionArgs {
    fn to_options(&self) -> Result<SessionOptions> {
        let browser: BrowserType = self.browser.parse()?;
        Ok(SessionOptions {
            browser,
            webdriver_url: self.webdriver_url.clone(),
            attach: self.attach.clone(),
            headless: !self.no_headless,
        })
    }
}

/// Engine tunables overridable from the CLI
pub fn build_config(timeout_secs: Option<u64>, threshold: Option<f64>) -> FillConfig {
    let mut config = FillConfig::default();
    if let Some(secs) = timeout_secs {
        config.element_timeout = Duration::from_secs(secs);
        config.select_ready_timeout = Duration::from_secs(secs);
    }
    if let Some(threshold) = threshold {
        config.match_threshold = threshold;
    }
    config
}

/// Connect a browser session and wrap it in a filler, remembering the
/// window that is active right after connecting as the main tab.
pub async fn start_session(args: &SessionArgs, config: FillConfig) -> Result<FormFiller<Browser>> {
    let browser = Browser::connect(args.to_options()?).await?;

    let filler = FormFiller::new(browser, config);
    match filler.page().current_window().await {
        Ok(handle) => Ok(filler.with_main_handle(handle)),
        Err(_) => Ok(filler),
    }
}
