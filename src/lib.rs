//! # webfill
#![allow(clippy::uninlined_format_args)]
//!
//! CLI tool that fills web forms over WebDriver, with fuzzy matching for
//! `<select>` dropdowns whose options load asynchronously.
//!
//! The core is a field resolution engine: given a locator (id, name, class,
//! CSS selector or XPath) and a value, it waits for the element to appear,
//! retries through stale references and disabled states, and for selects
//! picks the closest-matching option by normalized string similarity.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Type into a text field (found by id)
//! webfill fill id area "84.5"
//!
//! # Choose the dropdown option closest to "1층"
//! webfill fill id floor "1층" --mode select
//!
//! # Attach to a Chrome already running with --remote-debugging-port=9222
//! webfill fill id floor "1층" --mode select --attach 127.0.0.1:9222
//!
//! # Fill every preset field in order, stopping at the first failure
//! webfill run --values values.json
//!
//! # Show the stored presets
//! webfill presets
//! ```
//!
//! ## Preset format
//!
//! Presets are an ordered JSON array; loading a missing file just means
//! "no presets yet":
//!
//! ```json
//! [
//!   {
//!     "item": "floor",
//!     "mode": "select",
//!     "locator_type": "id",
//!     "locator_value": "floor"
//!   }
//! ]
//! ```
//!
//! ## Library Usage
//!
//! ```no_run
//! use webfill::filler::{FillConfig, FormFiller};
//! use webfill::types::{FieldMode, FillRequest, LocatorStrategy};
//! use webfill::webdriver::{Browser, SessionOptions};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let browser = Browser::connect(SessionOptions::default()).await?;
//! let mut filler = FormFiller::new(browser, FillConfig::default());
//!
//! let request = FillRequest::new(
//!     LocatorStrategy::Id,
//!     "floor",
//!     "1층",
//!     FieldMode::Select,
//! );
//! let report = filler.fill_field(&request).await?;
//! println!("{}", report.message());
//! # Ok(())
//! # }
//! ```

/// Error taxonomy and exit codes
pub mod errors;
/// The field resolution and fill engine
pub mod filler;
/// String normalization and similarity scoring
pub mod matching;
/// Capability trait over a live page session
pub mod page;
/// Preset JSON persistence
pub mod presets;
/// Outer retry policy and send-all sequencing
pub mod runner;
/// Main-tab tracking
pub mod tab_focus;
/// Core data types
pub mod types;
/// fantoccini-backed browser session
pub mod webdriver;
/// WebDriver process lifecycle
pub mod webdriver_manager;

#[cfg(test)]
pub mod mock_page;

pub use errors::FillError;
pub use filler::{FillConfig, FillReport, FormFiller};
pub use page::{FormPage, PageError};
pub use types::{FieldMode, FillOutcome, FillRequest, FormPreset, LocatorStrategy, MatchResult};
pub use webdriver::{Browser, BrowserType, SessionOptions};
