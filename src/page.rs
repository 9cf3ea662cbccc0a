use async_trait::async_trait;
use thiserror::Error;

use crate::types::LocatorStrategy;

/// Errors from the underlying page session, reduced to the classes the
/// engine's retry logic cares about.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("no such element")]
    NotFound,
    #[error("stale element reference")]
    Stale,
    #[error("invalid element state")]
    InvalidState,
    #[error("{0}")]
    Driver(String),
}

impl PageError {
    /// Transient failures are retried locally; they mean the DOM moved
    /// underneath us, not that the request was wrong.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PageError::NotFound | PageError::Stale | PageError::InvalidState
        )
    }
}

/// Capability interface over a live browser session.
///
/// The engine is generic over this trait: production uses the
/// fantoccini-backed [`crate::webdriver::Browser`], tests drive a scripted
/// mock. Elements are opaque handles owned by the implementation; a handle
/// may go stale at any time, which surfaces as [`PageError::Stale`].
#[async_trait]
pub trait FormPage: Send + Sync {
    type Element: Clone + Send + Sync;

    /// Find the first element matching the locator.
    async fn find(
        &self,
        strategy: LocatorStrategy,
        locator: &str,
    ) -> Result<Self::Element, PageError>;

    async fn tag_name(&self, element: &Self::Element) -> Result<String, PageError>;

    async fn text(&self, element: &Self::Element) -> Result<String, PageError>;

    async fn attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, PageError>;

    async fn is_enabled(&self, element: &Self::Element) -> Result<bool, PageError>;

    async fn clear(&self, element: &Self::Element) -> Result<(), PageError>;

    async fn send_keys(&self, element: &Self::Element, text: &str) -> Result<(), PageError>;

    /// Child `<option>` elements of a select-like element, in DOM order.
    async fn options(&self, element: &Self::Element) -> Result<Vec<Self::Element>, PageError>;

    /// Choose the option at the given index of a select-like element.
    async fn select_index(&self, element: &Self::Element, index: usize) -> Result<(), PageError>;

    async fn window_handles(&self) -> Result<Vec<String>, PageError>;

    async fn current_window(&self) -> Result<String, PageError>;

    async fn switch_window(&self, handle: &str) -> Result<(), PageError>;

    async fn current_url(&self) -> Result<String, PageError>;
}
