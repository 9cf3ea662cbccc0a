use thiserror::Error;

use crate::page::PageError;
use crate::types::LocatorStrategy;

/// Failure taxonomy for a single fill_field call.
///
/// Transient conditions (stale references, disabled or read-only fields)
/// are absorbed by the retry loops in the engine and only show up here once
/// every attempt has been used up.
#[derive(Debug, Error)]
pub enum FillError {
    /// Locator value was blank; no browser interaction was attempted (exit code 1)
    #[error("locator value is empty")]
    MissingLocator,

    /// Element never appeared within the wait timeout (exit code 2)
    #[error("element not found: {strategy}='{locator}'")]
    ElementNotFound {
        strategy: LocatorStrategy,
        locator: String,
    },

    /// Select mode on something that is not a `<select>` (exit code 1)
    #[error("select mode but element is <{tag}>, not <select>")]
    NotASelect { tag: String },

    /// The select had no options to choose from (exit code 1)
    #[error("select has no options")]
    NoOptions,

    /// No option was scored at all; defensive, the empty list is caught first (exit code 1)
    #[error("could not decide which option to select")]
    Undecided,

    /// Best match confidence was below the threshold for a non-empty target (exit code 3)
    #[error("no option similar to '{target}' (best score {best_score:.2}: '{best_label}')")]
    NoSimilarOption {
        target: String,
        best_score: f64,
        best_label: String,
    },

    /// The option list never became ready within the wait timeout (exit code 5)
    #[error("select options did not become ready: {strategy}='{locator}'")]
    OptionsNotReady {
        strategy: LocatorStrategy,
        locator: String,
    },

    /// Text field stayed uneditable through every retry (exit code 1)
    #[error("could not edit text field after {attempts} attempts: {last_error}")]
    TextEditFailed { attempts: u32, last_error: String },

    /// Unexpected driver failure while waiting for the element (exit code 4)
    #[error("problem while waiting for element: {0}")]
    WaitFailed(String),

    /// Driver failure outside the retryable set (exit code 4)
    #[error("webdriver error: {0}")]
    Page(#[from] PageError),
}

impl FillError {
    /// Process exit code for this error when it reaches the binary boundary
    pub fn exit_code(&self) -> i32 {
        match self {
            FillError::ElementNotFound { .. } => 2,
            FillError::NoSimilarOption { .. } => 3,
            FillError::WaitFailed(_) | FillError::Page(_) => 4,
            FillError::OptionsNotReady { .. } => 5,
            FillError::MissingLocator
            | FillError::NotASelect { .. }
            | FillError::NoOptions
            | FillError::Undecided
            | FillError::TextEditFailed { .. } => 1,
        }
    }

    /// Whether an outer (caller-level) retry of the whole fill could help.
    /// Bad input stays bad; everything else may be timing.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FillError::MissingLocator)
    }
}

/// Map any command error to an exit code. FillError carries its own code;
/// anything else falls back to message sniffing for driver problems.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(fill) = err.downcast_ref::<FillError>() {
        return fill.exit_code();
    }

    let msg = err.to_string();
    if msg.contains("WebDriver") || msg.contains("chromedriver") || msg.contains("geckodriver") {
        4
    } else if msg.contains("timeout") || msg.contains("timed out") {
        5
    } else {
        1
    }
}
