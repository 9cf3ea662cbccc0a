use serde::{Deserialize, Serialize};
use std::fmt;

/// How a form element is located on the page
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
pub enum LocatorStrategy {
    /// Match on the element's id attribute
    #[serde(rename = "id")]
    Id,
    /// Match on the element's name attribute
    #[serde(rename = "name")]
    Name,
    /// Match on a single class name
    #[serde(rename = "class name")]
    #[value(name = "class")]
    ClassName,
    /// Full CSS selector
    #[serde(rename = "css selector")]
    #[value(name = "css")]
    CssSelector,
    /// XPath expression
    #[serde(rename = "xpath")]
    #[value(name = "xpath")]
    XPath,
}

impl fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LocatorStrategy::Id => "id",
            LocatorStrategy::Name => "name",
            LocatorStrategy::ClassName => "class name",
            LocatorStrategy::CssSelector => "css selector",
            LocatorStrategy::XPath => "xpath",
        };
        write!(f, "{}", name)
    }
}

/// A locator compiled down to one of the two native WebDriver strategies
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompiledLocator {
    Css(String),
    XPath(String),
}

impl LocatorStrategy {
    /// Compile a (strategy, value) pair into a CSS selector or XPath
    /// expression. Id and Name become attribute selectors so that values
    /// containing CSS metacharacters still match; ClassName assumes a
    /// single class token.
    pub fn compile(&self, value: &str) -> CompiledLocator {
        match self {
            LocatorStrategy::Id => CompiledLocator::Css(format!(r#"[id="{}"]"#, escape_css(value))),
            LocatorStrategy::Name => {
                CompiledLocator::Css(format!(r#"[name="{}"]"#, escape_css(value)))
            }
            LocatorStrategy::ClassName => CompiledLocator::Css(format!(".{}", value.trim())),
            LocatorStrategy::CssSelector => CompiledLocator::Css(value.to_string()),
            LocatorStrategy::XPath => CompiledLocator::XPath(value.to_string()),
        }
    }
}

fn escape_css(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// How a field receives its value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FieldMode {
    /// Free text input (input, textarea)
    Normal,
    /// Dropdown selection with fuzzy matching
    Select,
}

impl fmt::Display for FieldMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldMode::Normal => write!(f, "normal"),
            FieldMode::Select => write!(f, "select"),
        }
    }
}

/// One field-fill request as handed to the engine
#[derive(Clone, Debug)]
pub struct FillRequest {
    pub strategy: LocatorStrategy,
    pub locator: String,
    /// Value to type or to match against the option list; may be empty
    pub value: String,
    pub mode: FieldMode,
}

impl FillRequest {
    pub fn new(
        strategy: LocatorStrategy,
        locator: impl Into<String>,
        value: impl Into<String>,
        mode: FieldMode,
    ) -> Self {
        Self {
            strategy,
            locator: locator.into(),
            value: value.into(),
            mode,
        }
    }
}

/// Text and value attribute of one `<option>`, both trimmed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionEntry {
    pub text: String,
    pub value: String,
}

impl OptionEntry {
    pub fn new(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: value.into(),
        }
    }

    /// Label for logs and messages: visible text, or the value attribute
    /// when the text is blank.
    pub fn label(&self) -> &str {
        if self.text.is_empty() {
            &self.value
        } else {
            &self.text
        }
    }
}

/// Ordered snapshot of a `<select>`'s options, compared to detect when a
/// dynamic option list has been repopulated. Equal only when every entry
/// matches in content and order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OptionSignature(Vec<OptionEntry>);

impl OptionSignature {
    pub fn new(entries: Vec<OptionEntry>) -> Self {
        Self(entries)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> &[OptionEntry] {
        &self.0
    }
}

/// Outcome of matching a target against an option list
#[derive(Clone, Debug, PartialEq)]
pub struct MatchResult {
    /// Index of the chosen option (selection happens by index, never by
    /// label, so duplicated labels stay unambiguous)
    pub index: usize,
    /// Similarity score of the chosen option, in [0, 1]
    pub score: f64,
    /// Label of the chosen option
    pub label: String,
}

/// What the caller gets back: never an error across this boundary
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FillOutcome {
    pub success: bool,
    pub message: String,
}

impl FillOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// One persisted preset record. The serialized field names and enum values
/// are a stable wire format shared with earlier versions of the tool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormPreset {
    /// Human-facing name of the field, e.g. "floor" or "unit area"
    pub item: String,
    pub mode: FieldMode,
    pub locator_type: LocatorStrategy,
    pub locator_value: String,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
