//! Automation engine abstraction.
//!
//! Components and page objects talk to the browser exclusively through the
//! [`Driver`] trait: a small set of verbs (navigate, wait, click, fill, read)
//! that any CDP- or WebDriver-backed engine can provide. The crate ships two
//! implementations: [`ChromeDriver`] for real runs and [`MockDriver`] for
//! unit-testing page objects without a browser.

pub mod chrome;
pub mod mock;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use chrome::ChromeDriver;
pub use mock::{MockDriver, MockElement};

/// Shared handle under which components and pages hold their engine.
pub type DriverHandle = Arc<dyn Driver>;

/// Value and display text of one descendant element, in document order.
///
/// For `<option>` children, `value` is the raw value attribute and `text` the
/// trimmed label shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildEntry {
    pub value: String,
    pub text: String,
}

/// The capability surface the component and page layers are written against.
///
/// Implementations own all locator resolution: when a selector matches more
/// than one node, the first *displayed* match wins. Waits report expiry as
/// `Ok(false)`; `Err` is reserved for engine failures.
pub trait Driver {
    /// Navigates the active tab and waits for the load event.
    fn navigate(&self, url: &str) -> Result<()>;

    /// URL the active tab is currently on.
    fn current_url(&self) -> Result<String>;

    /// Polls a JavaScript predicate until it is truthy or the timeout expires.
    fn wait_for_condition(&self, js_predicate: &str, timeout: Duration) -> Result<bool>;

    /// Polls until an element matching `selector` is present and displayed.
    fn wait_for_visible(&self, selector: &str, timeout: Duration) -> Result<bool>;

    /// Clicks the first displayed element matching `selector`.
    fn click(&self, selector: &str) -> Result<()>;

    /// Replaces the content of an input element with `value`.
    fn fill(&self, selector: &str, value: &str) -> Result<()>;

    /// Current value of an input-like element.
    fn read_value(&self, selector: &str) -> Result<String>;

    /// Attribute value, or `None` when the attribute is absent.
    fn read_attribute(&self, selector: &str, name: &str) -> Result<Option<String>>;

    /// Trimmed text content of the element.
    fn read_text(&self, selector: &str) -> Result<String>;

    /// Value/text pairs of every `child` descendant of `selector`.
    fn child_entries(&self, selector: &str, child: &str) -> Result<Vec<ChildEntry>>;

    /// Activates the `child` descendant of `selector` whose trimmed text
    /// equals `text`. For `<select>` parents this updates the value and fires
    /// the input/change events a real click would.
    fn click_child_with_text(&self, selector: &str, child: &str, text: &str) -> Result<()>;
}
