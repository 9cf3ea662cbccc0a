use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::errors::FillError;
use crate::matching::{DEFAULT_MATCH_THRESHOLD, match_score, normalize};
use crate::page::{FormPage, PageError};
use crate::tab_focus::TabFocus;
use crate::types::{
    FieldMode, FillRequest, LocatorStrategy, MatchResult, OptionEntry, OptionSignature,
};

/// Tunables for the fill engine. The defaults mirror the values the retry
/// behavior was tuned with; all of them can be overridden from the CLI.
#[derive(Clone, Debug)]
pub struct FillConfig {
    /// How long to wait for the target element to appear
    pub element_timeout: Duration,
    /// Poll interval for both the element wait and the select-ready wait
    pub poll_interval: Duration,
    /// How long to wait for a select's options to (re)load
    pub select_ready_timeout: Duration,
    /// Soft deadline: after this much waiting, accept the options as-is
    /// even if the signature never changed
    pub select_settle_grace: Duration,
    /// Attempts at editing a text field before giving up
    pub text_attempts: u32,
    /// Fixed delay between text-fill attempts
    pub text_retry_delay: Duration,
    /// Minimum similarity score for a non-empty select target
    pub match_threshold: f64,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            element_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(250),
            select_ready_timeout: Duration::from_secs(10),
            select_settle_grace: Duration::from_secs(1),
            text_attempts: 3,
            text_retry_delay: Duration::from_millis(500),
            match_threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

/// What a successful fill did
#[derive(Clone, Debug, PartialEq)]
pub enum FillReport {
    /// Text was cleared and typed
    Text,
    /// An option was chosen by fuzzy match
    Select(MatchResult),
}

impl FillReport {
    pub fn message(&self) -> String {
        match self {
            FillReport::Text => "value entered".to_string(),
            FillReport::Select(result) => {
                format!("selected '{}' (score {:.2})", result.label, result.score)
            }
        }
    }
}

/// The field resolution engine.
///
/// One instance per browser session; the tab-focus main handle it tracks is
/// the only state that survives across [`FormFiller::fill_field`] calls.
pub struct FormFiller<P: FormPage> {
    page: P,
    tabs: TabFocus,
    config: FillConfig,
}

impl<P: FormPage> FormFiller<P> {
    pub fn new(page: P, config: FillConfig) -> Self {
        Self {
            page,
            tabs: TabFocus::new(),
            config,
        }
    }

    /// Seed the tab-focus manager with a known-good window handle,
    /// typically the one active right after connecting.
    pub fn with_main_handle(mut self, handle: impl Into<String>) -> Self {
        self.tabs = TabFocus::with_handle(handle);
        self
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    /// Fill one field: focus the right tab, wait for the element, then
    /// dispatch on mode. Transient DOM churn is retried internally; what
    /// comes back is either success or a specific, final failure.
    pub async fn fill_field(&mut self, request: &FillRequest) -> Result<FillReport, FillError> {
        info!(
            mode = %request.mode,
            strategy = %request.strategy,
            locator = %request.locator,
            value = %request.value,
            "filling field"
        );

        let locator = request.locator.trim();
        if locator.is_empty() {
            warn!("blank locator value");
            return Err(FillError::MissingLocator);
        }

        // Best-effort: a focus failure is logged inside and never fatal,
        // the element may still be reachable on the current tab.
        self.tabs.focus_active_tab(&self.page).await;

        match self.page.current_url().await {
            Ok(url) => info!(%url, "current page"),
            Err(_) => warn!("could not read current URL"),
        }

        let element = self.wait_for_element(request.strategy, locator).await?;

        match request.mode {
            FieldMode::Select => {
                let result = self
                    .fill_select_with_retry(element, request.strategy, locator, &request.value)
                    .await?;
                Ok(FillReport::Select(result))
            }
            FieldMode::Normal => {
                self.fill_text(request.strategy, locator, &request.value)
                    .await?;
                Ok(FillReport::Text)
            }
        }
    }

    /// Poll for element presence up to the configured timeout.
    async fn wait_for_element(
        &self,
        strategy: LocatorStrategy,
        locator: &str,
    ) -> Result<P::Element, FillError> {
        let deadline = Instant::now() + self.config.element_timeout;
        loop {
            match self.page.find(strategy, locator).await {
                Ok(element) => return Ok(element),
                Err(PageError::Driver(msg)) => {
                    warn!(%msg, "driver failure while waiting for element");
                    return Err(FillError::WaitFailed(msg));
                }
                Err(_) => {} // not there yet, keep polling
            }

            if Instant::now() >= deadline {
                warn!(%strategy, %locator, "element wait timed out");
                return Err(FillError::ElementNotFound {
                    strategy,
                    locator: locator.to_string(),
                });
            }
            sleep(self.config.poll_interval).await;
        }
    }

    /// Text path: re-find the element fresh on every attempt, skip over
    /// disabled/read-only states, clear and type.
    async fn fill_text(
        &self,
        strategy: LocatorStrategy,
        locator: &str,
        value: &str,
    ) -> Result<(), FillError> {
        let attempts = self.config.text_attempts;
        let mut last_error = String::from("element never became editable");

        for attempt in 1..=attempts {
            // Never reuse a handle across attempts; the DOM may have been
            // replaced since the last try.
            let element = match self.page.find(strategy, locator).await {
                Ok(element) => element,
                Err(err) if err.is_transient() => {
                    warn!(attempt, attempts, %locator, "text element lookup failed");
                    last_error = err.to_string();
                    sleep(self.config.text_retry_delay).await;
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            match self.page.is_enabled(&element).await {
                Ok(true) => {}
                Ok(false) => {
                    info!(attempt, attempts, %locator, "text element disabled");
                    sleep(self.config.text_retry_delay).await;
                    continue;
                }
                Err(err) if err.is_transient() => {
                    last_error = err.to_string();
                    sleep(self.config.text_retry_delay).await;
                    continue;
                }
                Err(err) => return Err(err.into()),
            }

            let readonly = match self.page.attribute(&element, "readonly").await {
                Ok(attr) => attr.unwrap_or_default().to_lowercase(),
                Err(err) if err.is_transient() => {
                    last_error = err.to_string();
                    sleep(self.config.text_retry_delay).await;
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            if readonly == "true" || readonly == "readonly" {
                info!(attempt, attempts, %locator, "text element readonly");
                sleep(self.config.text_retry_delay).await;
                continue;
            }

            match self.write_text(&element, value).await {
                Ok(()) => {
                    info!(%locator, "text input succeeded");
                    return Ok(());
                }
                Err(err) if err.is_transient() => {
                    warn!(attempt, attempts, %err, "text input failed");
                    last_error = err.to_string();
                    sleep(self.config.text_retry_delay).await;
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(FillError::TextEditFailed {
            attempts,
            last_error,
        })
    }

    async fn write_text(&self, element: &P::Element, value: &str) -> Result<(), PageError> {
        self.page.clear(element).await?;
        if !value.is_empty() {
            self.page.send_keys(element, value).await?;
        }
        Ok(())
    }

    /// Select path: try an immediate match on the element we already have;
    /// if that fails, wait for the option list to (re)load and match again.
    async fn fill_select_with_retry(
        &self,
        element: P::Element,
        strategy: LocatorStrategy,
        locator: &str,
        target: &str,
    ) -> Result<MatchResult, FillError> {
        match self.select_best(&element, target, None).await {
            Ok(result) => return Ok(result),
            Err(err) => warn!(%err, "immediate select failed, waiting for options"),
        }

        // Snapshot whatever options existed before the failure so we can
        // detect the list being repopulated.
        let initial = match self.page.options(&element).await {
            Ok(options) => self.read_signature(&options).await,
            Err(_) => OptionSignature::default(),
        };

        let (element, options) = self
            .wait_for_select_ready(strategy, locator, &initial)
            .await?;

        self.select_best(&element, target, Some(options)).await
    }

    /// Score every option against the target and select the best by index.
    /// An option matches on either its visible text or its value attribute,
    /// whichever scores higher; first occurrence wins ties.
    async fn select_best(
        &self,
        element: &P::Element,
        target: &str,
        options: Option<Vec<P::Element>>,
    ) -> Result<MatchResult, FillError> {
        let tag = self.page.tag_name(element).await?.to_lowercase();
        if tag != "select" {
            return Err(FillError::NotASelect { tag });
        }

        let options = match options {
            Some(options) => options,
            None => self.page.options(element).await?,
        };
        if options.is_empty() {
            return Err(FillError::NoOptions);
        }

        let target = target.trim();
        let norm_target = normalize(target);

        let mut best: Option<MatchResult> = None;
        for (index, option) in options.iter().enumerate() {
            let entry = self.read_option(option).await?;
            let score = match_score(&norm_target, &normalize(&entry.text))
                .max(match_score(&norm_target, &normalize(&entry.value)));

            debug!(index, text = %entry.text, value = %entry.value, score, "option scored");

            if best.as_ref().is_none_or(|b| score > b.score) {
                best = Some(MatchResult {
                    index,
                    score,
                    label: entry.label().to_string(),
                });
            }
        }

        let best = best.ok_or(FillError::Undecided)?;

        if !norm_target.is_empty() && best.score < self.config.match_threshold {
            return Err(FillError::NoSimilarOption {
                target: target.to_string(),
                best_score: best.score,
                best_label: best.label,
            });
        }

        self.page.select_index(element, best.index).await?;
        info!(index = best.index, label = %best.label, score = best.score, "option selected");
        Ok(best)
    }

    async fn read_option(&self, option: &P::Element) -> Result<OptionEntry, PageError> {
        let text = self.page.text(option).await?;
        let value = self.page.attribute(option, "value").await?.unwrap_or_default();
        Ok(OptionEntry::new(text.trim(), value.trim()))
    }

    /// Snapshot of an option list; options that can no longer be read are
    /// transiently unreadable and simply omitted.
    async fn read_signature(&self, options: &[P::Element]) -> OptionSignature {
        let mut entries = Vec::with_capacity(options.len());
        for option in options {
            if let Ok(entry) = self.read_option(option).await {
                entries.push(entry);
            }
        }
        OptionSignature::new(entries)
    }

    /// Poll until the select's options look (re)loaded: a changed
    /// signature, a count that grew past a lone placeholder, or the settle
    /// grace elapsing. Nothing to compare against counts as ready.
    async fn wait_for_select_ready(
        &self,
        strategy: LocatorStrategy,
        locator: &str,
        initial: &OptionSignature,
    ) -> Result<(P::Element, Vec<P::Element>), FillError> {
        let started = Instant::now();
        let deadline = started + self.config.select_ready_timeout;

        loop {
            if let Some(found) = self.poll_select_ready(strategy, locator, initial, started).await {
                return Ok(found);
            }

            if Instant::now() >= deadline {
                warn!(%strategy, %locator, "select options never became ready");
                return Err(FillError::OptionsNotReady {
                    strategy,
                    locator: locator.to_string(),
                });
            }
            sleep(self.config.poll_interval).await;
        }
    }

    async fn poll_select_ready(
        &self,
        strategy: LocatorStrategy,
        locator: &str,
        initial: &OptionSignature,
        started: Instant,
    ) -> Option<(P::Element, Vec<P::Element>)> {
        let element = self.page.find(strategy, locator).await.ok()?;

        if !self.page.is_enabled(&element).await.unwrap_or(false) {
            return None;
        }

        let options = self.page.options(&element).await.ok()?;
        if options.is_empty() {
            return None;
        }

        let signature = self.read_signature(&options).await;

        let ready = initial.is_empty()
            || (!signature.is_empty() && signature != *initial)
            || (options.len() > 1 && initial.len() <= 1)
            || started.elapsed() > self.config.select_settle_grace;

        ready.then_some((element, options))
    }
}

#[cfg(test)]
#[path = "filler_test.rs"]
mod filler_test;
