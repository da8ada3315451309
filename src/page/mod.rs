//! Page objects for the Frappe desk.
//!
//! A [`PageContext`] ties a driver to one expected URL, a readiness
//! condition, and the configured timeouts; concrete pages embed it by value
//! and get navigation and load assertion through the [`Page`] trait.

pub mod apps;
pub mod home;
pub mod login;

use std::cell::Cell;
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::{DEFAULT_OBJECT_LOAD_TIMEOUT_MS, DEFAULT_PAGE_LOAD_TIMEOUT_MS, EnvConfig};
use crate::driver::DriverHandle;
use crate::error::{Result, UiError};

pub use apps::AppsPage;
pub use home::HomePage;
pub use login::LoginPage;

/// Signal that the Frappe desk finished bootstrapping.
pub const DESK_READY: &str = "window.frappe && frappe.boot";
/// Plain document readiness, for pages outside the desk.
pub const DOCUMENT_READY: &str = "document.readyState === 'complete'";

const LOCATION_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Lifecycle of a page object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    /// No navigation has happened through this object yet.
    Unloaded,
    /// Navigation completed and the location matched.
    Navigated,
    /// The readiness condition held on the expected location.
    Loaded,
}

/// Shared page machinery: driver, expected URL, readiness, timeouts, state.
pub struct PageContext {
    driver: DriverHandle,
    url: String,
    ready_condition: String,
    page_timeout: Duration,
    object_timeout: Duration,
    state: Cell<PageState>,
}

impl PageContext {
    pub fn new(driver: DriverHandle, url: impl Into<String>) -> Self {
        Self {
            driver,
            url: url.into(),
            ready_condition: DOCUMENT_READY.to_string(),
            page_timeout: Duration::from_millis(DEFAULT_PAGE_LOAD_TIMEOUT_MS),
            object_timeout: Duration::from_millis(DEFAULT_OBJECT_LOAD_TIMEOUT_MS),
            state: Cell::new(PageState::Unloaded),
        }
    }

    /// Applies the configured timeouts.
    pub fn with_config(mut self, config: &EnvConfig) -> Self {
        self.page_timeout = config.page_load_timeout;
        self.object_timeout = config.object_load_timeout;
        self
    }

    /// Replaces the readiness condition (default: document complete).
    pub fn with_ready_condition(mut self, condition: impl Into<String>) -> Self {
        self.ready_condition = condition.into();
        self
    }

    pub fn driver(&self) -> &DriverHandle {
        &self.driver
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> PageState {
        self.state.get()
    }

    pub fn object_timeout(&self) -> Duration {
        self.object_timeout
    }

    /// Drives the browser to the expected URL and asserts the location
    /// matches within the page timeout.
    pub fn navigate(&self) -> Result<()> {
        log::info!("navigating to {}", self.url);
        self.driver.navigate(&self.url)?;

        if !self.wait_for_location()? {
            let landed = self.driver.current_url()?;
            return Err(UiError::NavigationFailed(format!(
                "expected {} within {}ms, landed on {}",
                self.url,
                self.page_timeout.as_millis(),
                landed
            )));
        }
        self.state.set(PageState::Navigated);
        Ok(())
    }

    /// Polls the readiness condition and checks the location. `Ok(false)`
    /// covers both a timed-out condition and a location mismatch; errors are
    /// reserved for engine failures.
    pub fn is_loaded(&self) -> Result<bool> {
        if !self
            .driver
            .wait_for_condition(&self.ready_condition, self.page_timeout)?
        {
            return Ok(false);
        }

        let current = self.driver.current_url()?;
        if !location_matches(&current, &self.url) {
            log::debug!("expected {}, currently on {}", self.url, current);
            return Ok(false);
        }

        self.state.set(PageState::Loaded);
        Ok(true)
    }

    fn wait_for_location(&self) -> Result<bool> {
        let deadline = Instant::now() + self.page_timeout;
        loop {
            if location_matches(&self.driver.current_url()?, &self.url) {
                return Ok(true);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            thread::sleep((deadline - now).min(LOCATION_POLL_INTERVAL));
        }
    }
}

impl fmt::Debug for PageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageContext")
            .field("url", &self.url)
            .field("state", &self.state.get())
            .finish()
    }
}

/// A page object with one embedded [`PageContext`].
pub trait Page {
    fn context(&self) -> &PageContext;

    fn navigate(&self) -> Result<()> {
        self.context().navigate()
    }

    fn is_loaded(&self) -> Result<bool> {
        self.context().is_loaded()
    }

    fn state(&self) -> PageState {
        self.context().state()
    }

    fn current_url(&self) -> Result<String> {
        self.context().driver().current_url()
    }
}

/// Whether `current` is the expected location: exact, or the expected path
/// extended by a deeper path, query, or fragment.
fn location_matches(current: &str, expected: &str) -> bool {
    let current = current.trim_end_matches('/');
    let expected = expected.trim_end_matches('/');
    if current == expected {
        return true;
    }
    current
        .strip_prefix(expected)
        .is_some_and(|rest| rest.starts_with('/') || rest.starts_with('?') || rest.starts_with('#'))
}
