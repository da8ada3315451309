//! Environment-derived test configuration and URL handling.
//!
//! Configuration is read once at startup from `E2E_*` environment variables
//! and passed by reference into drivers and page objects. Nothing in here
//! talks to a browser.

use std::str::FromStr;
use std::time::Duration;

use crate::error::{Result, UiError};

/// Default upper bound for full page transitions.
pub const DEFAULT_PAGE_LOAD_TIMEOUT_MS: u64 = 60_000;
/// Default upper bound for a single element or condition to show up.
pub const DEFAULT_OBJECT_LOAD_TIMEOUT_MS: u64 = 10_000;

/// Browser family the suite runs against.
///
/// All variants speak CDP; non-default kinds are resolved to an executable
/// path at launch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrowserKind {
    #[default]
    Chromium,
    Chrome,
    Edge,
}

impl FromStr for BrowserKind {
    type Err = UiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "chromium" => Ok(BrowserKind::Chromium),
            "chrome" => Ok(BrowserKind::Chrome),
            "edge" => Ok(BrowserKind::Edge),
            other => Err(UiError::Config {
                name: "E2E_BROWSER".to_string(),
                message: format!("unknown browser '{other}', expected chromium, chrome or edge"),
            }),
        }
    }
}

/// Test-run configuration assembled from the environment.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Scheme and host of the deployment under test, e.g. `https://erp`.
    pub base_domain: String,
    /// Environment suffix appended to the domain, e.g. `-staging.example.com`.
    pub environment: String,
    pub browser: BrowserKind,
    pub headless: bool,
    /// 0 = quiet, higher values enable more verbose driver logging.
    pub debug_level: u8,
    pub page_load_timeout: Duration,
    pub object_load_timeout: Duration,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            base_domain: String::new(),
            environment: String::new(),
            browser: BrowserKind::default(),
            headless: true,
            debug_level: 0,
            page_load_timeout: Duration::from_millis(DEFAULT_PAGE_LOAD_TIMEOUT_MS),
            object_load_timeout: Duration::from_millis(DEFAULT_OBJECT_LOAD_TIMEOUT_MS),
        }
    }
}

impl EnvConfig {
    /// Reads configuration from `E2E_*` environment variables.
    ///
    /// `E2E_BASE_DOMAIN` is required; everything else falls back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env), with the variable source
    /// injected. Tests use this to avoid mutating process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_domain = lookup("E2E_BASE_DOMAIN").ok_or_else(|| UiError::Config {
            name: "E2E_BASE_DOMAIN".to_string(),
            message: "required variable is not set".to_string(),
        })?;

        let mut config = Self {
            base_domain,
            environment: lookup("E2E_ENVIRONMENT").unwrap_or_default(),
            ..Self::default()
        };

        if let Some(raw) = lookup("E2E_BROWSER") {
            config.browser = raw.parse()?;
        }
        if let Some(raw) = lookup("E2E_HEADLESS") {
            config.headless = parse_bool("E2E_HEADLESS", &raw)?;
        }
        if let Some(raw) = lookup("E2E_DEBUG_LEVEL") {
            config.debug_level = parse_number("E2E_DEBUG_LEVEL", &raw)?;
        }
        if let Some(raw) = lookup("E2E_PAGE_TIMEOUT_MS") {
            config.page_load_timeout = Duration::from_millis(parse_number("E2E_PAGE_TIMEOUT_MS", &raw)?);
        }
        if let Some(raw) = lookup("E2E_OBJECT_TIMEOUT_MS") {
            config.object_load_timeout =
                Duration::from_millis(parse_number("E2E_OBJECT_TIMEOUT_MS", &raw)?);
        }

        Ok(config)
    }

    /// Root URL of the deployment under test: domain plus environment suffix,
    /// with escape sequences decoded.
    pub fn root_url(&self) -> String {
        clean_url(&format!("{}{}", self.base_domain, self.environment))
    }

    /// Route table rooted at [`root_url`](Self::root_url).
    pub fn urls(&self) -> Urls {
        Urls::from_root(&self.root_url())
    }
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(UiError::Config {
            name: name.to_string(),
            message: format!("expected a boolean, got '{other}'"),
        }),
    }
}

fn parse_number<T: FromStr>(name: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e| UiError::Config {
        name: name.to_string(),
        message: format!("expected a number, got '{raw}': {e}"),
    })
}

/// Decodes literal `\x3a` escape sequences back into `:`.
///
/// Secrets tooling hands URLs over with the colon escaped so they survive
/// shell interpolation; everything downstream wants the plain form.
pub fn clean_url(raw: &str) -> String {
    raw.replace("\\x3a", ":")
}

/// Well-known routes of a Frappe deployment, resolved against one root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Urls {
    pub root: String,
    pub login: String,
    pub app: String,
    pub home: String,
    pub apps: String,
    pub users: String,
}

impl Urls {
    pub fn from_root(root: &str) -> Self {
        let root = root.trim_end_matches('/').to_string();
        Self {
            login: format!("{root}/login"),
            app: format!("{root}/app"),
            home: format!("{root}/app/home"),
            apps: format!("{root}/apps"),
            users: format!("{root}/app/users"),
            root,
        }
    }
}
