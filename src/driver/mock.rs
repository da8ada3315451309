//! Scripted in-memory driver for unit-testing page objects and components
//! without a browser.
//!
//! Tests register elements under the selectors the code under test will use,
//! then assert on the recorded interactions afterwards. Waits resolve
//! immediately from current state; nothing sleeps.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::driver::{ChildEntry, Driver};
use crate::error::{Result, UiError};

/// One scripted element, registered under a selector.
#[derive(Debug, Clone)]
pub struct MockElement {
    visible: bool,
    value: String,
    text: String,
    attributes: HashMap<String, String>,
    options: Vec<ChildEntry>,
}

impl Default for MockElement {
    fn default() -> Self {
        Self {
            visible: true,
            value: String::new(),
            text: String::new(),
            attributes: HashMap::new(),
            options: Vec::new(),
        }
    }
}

impl MockElement {
    /// A visible element with no value, text, or options.
    pub fn new() -> Self {
        Self::default()
    }

    /// An element that never reports as visible.
    pub fn hidden() -> Self {
        Self {
            visible: false,
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Appends an option child, as a `<select>` would contain.
    pub fn with_option(mut self, value: impl Into<String>, text: impl Into<String>) -> Self {
        self.options.push(ChildEntry {
            value: value.into(),
            text: text.into(),
        });
        self
    }
}

#[derive(Debug, Default)]
struct State {
    url: String,
    elements: HashMap<String, MockElement>,
    conditions: HashMap<String, bool>,
    navigation_redirects: HashMap<String, String>,
    click_redirects: HashMap<String, String>,
    navigations: Vec<String>,
    clicks: Vec<String>,
    fills: Vec<(String, String)>,
    selections: Vec<(String, String)>,
}

/// In-memory [`Driver`] implementation.
///
/// Cloning shares the underlying state, so a test can keep one handle for
/// assertions while the code under test holds another.
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    state: Arc<Mutex<State>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panicked test may have poisoned the lock; the state is still fine.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets the URL reported by [`Driver::current_url`].
    pub fn set_url(&self, url: impl Into<String>) {
        self.lock().url = url.into();
    }

    /// Registers an element under a selector, replacing any previous one.
    pub fn add_element(&self, selector: impl Into<String>, element: MockElement) {
        self.lock().elements.insert(selector.into(), element);
    }

    /// Scripts the outcome of a condition predicate. Unscripted predicates
    /// hold by default, so pages load instantly in tests.
    pub fn set_condition(&self, predicate: impl Into<String>, holds: bool) {
        self.lock().conditions.insert(predicate.into(), holds);
    }

    /// After a click on `selector`, the current URL becomes `url`.
    pub fn redirect_on_click(&self, selector: impl Into<String>, url: impl Into<String>) {
        self.lock().click_redirects.insert(selector.into(), url.into());
    }

    /// A navigation to `requested` lands on `actual` instead.
    pub fn redirect_navigation(&self, requested: impl Into<String>, actual: impl Into<String>) {
        self.lock()
            .navigation_redirects
            .insert(requested.into(), actual.into());
    }

    pub fn navigations(&self) -> Vec<String> {
        self.lock().navigations.clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.lock().clicks.clone()
    }

    pub fn fills(&self) -> Vec<(String, String)> {
        self.lock().fills.clone()
    }

    /// Selections recorded by [`Driver::click_child_with_text`], as
    /// `(selector, option text)` pairs.
    pub fn selections(&self) -> Vec<(String, String)> {
        self.lock().selections.clone()
    }

    /// Total number of mutating interactions (clicks, fills, selections).
    pub fn interaction_count(&self) -> usize {
        let state = self.lock();
        state.clicks.len() + state.fills.len() + state.selections.len()
    }

    /// Current value of a registered element, if any.
    pub fn value_of(&self, selector: &str) -> Option<String> {
        self.lock()
            .elements
            .get(selector)
            .map(|element| element.value.clone())
    }
}

impl Driver for MockDriver {
    fn navigate(&self, url: &str) -> Result<()> {
        let mut guard = self.lock();
        let state = &mut *guard;
        state.navigations.push(url.to_string());
        state.url = state
            .navigation_redirects
            .get(url)
            .cloned()
            .unwrap_or_else(|| url.to_string());
        Ok(())
    }

    fn current_url(&self) -> Result<String> {
        Ok(self.lock().url.clone())
    }

    fn wait_for_condition(&self, js_predicate: &str, _timeout: Duration) -> Result<bool> {
        Ok(self
            .lock()
            .conditions
            .get(js_predicate)
            .copied()
            .unwrap_or(true))
    }

    fn wait_for_visible(&self, selector: &str, _timeout: Duration) -> Result<bool> {
        Ok(self
            .lock()
            .elements
            .get(selector)
            .map(|element| element.visible)
            .unwrap_or(false))
    }

    fn click(&self, selector: &str) -> Result<()> {
        let mut guard = self.lock();
        let state = &mut *guard;
        if !state.elements.contains_key(selector) {
            return Err(UiError::ElementNotFound(format!(
                "'{selector}' is not registered"
            )));
        }
        state.clicks.push(selector.to_string());
        if let Some(url) = state.click_redirects.get(selector).cloned() {
            state.url = url;
        }
        Ok(())
    }

    fn fill(&self, selector: &str, value: &str) -> Result<()> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let element = state.elements.get_mut(selector).ok_or_else(|| {
            UiError::ElementNotFound(format!("'{selector}' is not registered"))
        })?;
        element.value = value.to_string();
        state.fills.push((selector.to_string(), value.to_string()));
        Ok(())
    }

    fn read_value(&self, selector: &str) -> Result<String> {
        self.lock()
            .elements
            .get(selector)
            .map(|element| element.value.clone())
            .ok_or_else(|| UiError::ElementNotFound(format!("'{selector}' is not registered")))
    }

    fn read_attribute(&self, selector: &str, name: &str) -> Result<Option<String>> {
        self.lock()
            .elements
            .get(selector)
            .map(|element| element.attributes.get(name).cloned())
            .ok_or_else(|| UiError::ElementNotFound(format!("'{selector}' is not registered")))
    }

    fn read_text(&self, selector: &str) -> Result<String> {
        self.lock()
            .elements
            .get(selector)
            .map(|element| element.text.trim().to_string())
            .ok_or_else(|| UiError::ElementNotFound(format!("'{selector}' is not registered")))
    }

    fn child_entries(&self, selector: &str, _child: &str) -> Result<Vec<ChildEntry>> {
        self.lock()
            .elements
            .get(selector)
            .map(|element| {
                element
                    .options
                    .iter()
                    .map(|entry| ChildEntry {
                        value: entry.value.clone(),
                        text: entry.text.trim().to_string(),
                    })
                    .collect()
            })
            .ok_or_else(|| UiError::ElementNotFound(format!("'{selector}' is not registered")))
    }

    fn click_child_with_text(&self, selector: &str, child: &str, text: &str) -> Result<()> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let element = state.elements.get_mut(selector).ok_or_else(|| {
            UiError::ElementNotFound(format!("'{selector}' is not registered"))
        })?;
        let entry = element
            .options
            .iter()
            .find(|entry| entry.text.trim() == text)
            .cloned()
            .ok_or_else(|| {
                UiError::ElementNotFound(format!(
                    "no '{child}' child of '{selector}' with text '{text}'"
                ))
            })?;
        element.value = entry.value;
        state.selections.push((selector.to_string(), text.to_string()));
        Ok(())
    }
}
