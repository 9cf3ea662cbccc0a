//! Scripted in-memory page for engine tests. Element handles are indices
//! into a flat store; per-call behavior (lookup failures, enabled-state
//! flips, option list repopulation) is driven by queues popped in call
//! order.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::page::{FormPage, PageError};
use crate::types::LocatorStrategy;

#[derive(Clone, Debug)]
pub struct MockElement(pub usize);

#[derive(Clone, Debug, Default)]
pub struct ElementSpec {
    pub tag: String,
    pub text: String,
    pub attrs: HashMap<String, String>,
    pub enabled: bool,
    pub options: Vec<usize>,
}

impl ElementSpec {
    pub fn text_input() -> Self {
        Self {
            tag: "input".to_string(),
            enabled: true,
            ..Default::default()
        }
    }

    pub fn select(options: Vec<usize>) -> Self {
        Self {
            tag: "select".to_string(),
            enabled: true,
            options,
            ..Default::default()
        }
    }

    pub fn option(text: &str, value: &str) -> Self {
        let mut attrs = HashMap::new();
        attrs.insert("value".to_string(), value.to_string());
        Self {
            tag: "option".to_string(),
            text: text.to_string(),
            attrs,
            enabled: true,
            ..Default::default()
        }
    }
}

#[derive(Default)]
struct State {
    elements: Vec<ElementSpec>,
    /// Per-locator find behavior, checked first
    find_map: HashMap<String, Result<usize, ()>>,
    /// Global queue of find results, popped per call
    find_plan: VecDeque<Result<usize, PageError>>,
    /// Fallback when both of the above are exhausted
    default_find: Option<Result<usize, PageError>>,
    /// Queue of is_enabled answers; falls back to the element's own flag
    enabled_plan: VecDeque<bool>,
    /// Queue of option lists; falls back to the element's children
    options_plan: VecDeque<Vec<usize>>,
    /// Queue of clear/send_keys failures; falls back to Ok
    write_plan: VecDeque<Result<(), PageError>>,

    windows: Vec<String>,
    current_window: String,
    window_urls: HashMap<String, String>,

    total_calls: usize,
    find_calls: usize,
    typed: Vec<String>,
    cleared: usize,
    selected: Option<usize>,
    switches: Vec<String>,
}

fn clone_page_error(err: &PageError) -> PageError {
    match err {
        PageError::NotFound => PageError::NotFound,
        PageError::Stale => PageError::Stale,
        PageError::InvalidState => PageError::InvalidState,
        PageError::Driver(msg) => PageError::Driver(msg.clone()),
    }
}

/// Cloned handles share state, so a test keeps one clone for assertions
/// while the filler owns another.
#[derive(Clone, Default)]
pub struct MockPage {
    state: Arc<Mutex<State>>,
}

impl MockPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_element(&self, spec: ElementSpec) -> usize {
        let mut state = self.state.lock().unwrap();
        state.elements.push(spec);
        state.elements.len() - 1
    }

    pub fn add_option(&self, text: &str, value: &str) -> usize {
        self.add_element(ElementSpec::option(text, value))
    }

    pub fn set_default_find(&self, result: Result<usize, PageError>) {
        self.state.lock().unwrap().default_find = Some(result);
    }

    pub fn map_locator(&self, locator: &str, result: Result<usize, ()>) {
        self.state
            .lock()
            .unwrap()
            .find_map
            .insert(locator.to_string(), result);
    }

    pub fn push_find(&self, result: Result<usize, PageError>) {
        self.state.lock().unwrap().find_plan.push_back(result);
    }

    pub fn push_enabled(&self, enabled: bool) {
        self.state.lock().unwrap().enabled_plan.push_back(enabled);
    }

    pub fn push_options(&self, options: Vec<usize>) {
        self.state.lock().unwrap().options_plan.push_back(options);
    }

    pub fn push_write(&self, result: Result<(), PageError>) {
        self.state.lock().unwrap().write_plan.push_back(result);
    }

    pub fn set_windows(&self, windows: &[&str], current: &str) {
        let mut state = self.state.lock().unwrap();
        state.windows = windows.iter().map(|w| w.to_string()).collect();
        state.current_window = current.to_string();
    }

    pub fn set_window_url(&self, window: &str, url: &str) {
        self.state
            .lock()
            .unwrap()
            .window_urls
            .insert(window.to_string(), url.to_string());
    }

    pub fn total_calls(&self) -> usize {
        self.state.lock().unwrap().total_calls
    }

    pub fn find_calls(&self) -> usize {
        self.state.lock().unwrap().find_calls
    }

    pub fn typed(&self) -> Vec<String> {
        self.state.lock().unwrap().typed.clone()
    }

    pub fn cleared(&self) -> usize {
        self.state.lock().unwrap().cleared
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.lock().unwrap().selected
    }

    pub fn switches(&self) -> Vec<String> {
        self.state.lock().unwrap().switches.clone()
    }
}

#[async_trait]
impl FormPage for MockPage {
    type Element = MockElement;

    async fn find(
        &self,
        _strategy: LocatorStrategy,
        locator: &str,
    ) -> Result<Self::Element, PageError> {
        let mut state = self.state.lock().unwrap();
        state.total_calls += 1;
        state.find_calls += 1;

        if let Some(mapped) = state.find_map.get(locator) {
            return match mapped {
                Ok(id) => Ok(MockElement(*id)),
                Err(()) => Err(PageError::NotFound),
            };
        }
        if let Some(planned) = state.find_plan.pop_front() {
            return planned.map(MockElement);
        }
        match &state.default_find {
            Some(Ok(id)) => Ok(MockElement(*id)),
            Some(Err(err)) => Err(clone_page_error(err)),
            None => Err(PageError::NotFound),
        }
    }

    async fn tag_name(&self, element: &Self::Element) -> Result<String, PageError> {
        let mut state = self.state.lock().unwrap();
        state.total_calls += 1;
        Ok(state.elements[element.0].tag.clone())
    }

    async fn text(&self, element: &Self::Element) -> Result<String, PageError> {
        let mut state = self.state.lock().unwrap();
        state.total_calls += 1;
        Ok(state.elements[element.0].text.clone())
    }

    async fn attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, PageError> {
        let mut state = self.state.lock().unwrap();
        state.total_calls += 1;
        Ok(state.elements[element.0].attrs.get(name).cloned())
    }

    async fn is_enabled(&self, element: &Self::Element) -> Result<bool, PageError> {
        let mut state = self.state.lock().unwrap();
        state.total_calls += 1;
        if let Some(planned) = state.enabled_plan.pop_front() {
            return Ok(planned);
        }
        Ok(state.elements[element.0].enabled)
    }

    async fn clear(&self, _element: &Self::Element) -> Result<(), PageError> {
        let mut state = self.state.lock().unwrap();
        state.total_calls += 1;
        if let Some(planned) = state.write_plan.pop_front() {
            planned?;
        }
        state.cleared += 1;
        Ok(())
    }

    async fn send_keys(&self, _element: &Self::Element, text: &str) -> Result<(), PageError> {
        let mut state = self.state.lock().unwrap();
        state.total_calls += 1;
        if let Some(planned) = state.write_plan.pop_front() {
            planned?;
        }
        state.typed.push(text.to_string());
        Ok(())
    }

    async fn options(&self, element: &Self::Element) -> Result<Vec<Self::Element>, PageError> {
        let mut state = self.state.lock().unwrap();
        state.total_calls += 1;
        if let Some(planned) = state.options_plan.pop_front() {
            return Ok(planned.into_iter().map(MockElement).collect());
        }
        Ok(state.elements[element.0]
            .options
            .iter()
            .copied()
            .map(MockElement)
            .collect())
    }

    async fn select_index(&self, _element: &Self::Element, index: usize) -> Result<(), PageError> {
        let mut state = self.state.lock().unwrap();
        state.total_calls += 1;
        state.selected = Some(index);
        Ok(())
    }

    async fn window_handles(&self) -> Result<Vec<String>, PageError> {
        let mut state = self.state.lock().unwrap();
        state.total_calls += 1;
        Ok(state.windows.clone())
    }

    async fn current_window(&self) -> Result<String, PageError> {
        let mut state = self.state.lock().unwrap();
        state.total_calls += 1;
        if state.windows.is_empty() && state.current_window.is_empty() {
            return Err(PageError::Driver("no current window".to_string()));
        }
        Ok(state.current_window.clone())
    }

    async fn switch_window(&self, handle: &str) -> Result<(), PageError> {
        let mut state = self.state.lock().unwrap();
        state.total_calls += 1;
        state.switches.push(handle.to_string());
        state.current_window = handle.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String, PageError> {
        let mut state = self.state.lock().unwrap();
        state.total_calls += 1;
        let url = state
            .window_urls
            .get(&state.current_window)
            .cloned()
            .unwrap_or_else(|| "about:blank".to_string());
        Ok(url)
    }
}
