//! # frappe-e2e
//!
//! Page objects and typed UI component wrappers for end-to-end testing of
//! Frappe/ERPNext applications via Chrome DevTools Protocol (CDP).
//!
//! ## Features
//!
//! - **Page Objects**: Login flow, app switcher, and desk pages with explicit
//!   navigation and load assertions
//! - **UI Components**: Inputs and selects with enable/disable guards,
//!   one-time labels, and auto-fill strategies
//! - **Option Sets**: Dropdown options as insertion-ordered maps of
//!   snake_case keys to display text, selectable by key, index, or at random
//! - **Driver Abstraction**: Everything runs against a small capability
//!   trait, backed by real Chrome or by an in-memory mock for fast unit tests
//!
//! ## Driving a real browser
//!
//! ```rust,no_run
//! use frappe_e2e::auth::Credentials;
//! use frappe_e2e::config::EnvConfig;
//! use frappe_e2e::driver::ChromeDriver;
//! use frappe_e2e::page::{LoginPage, Page};
//! use std::sync::Arc;
//!
//! # fn main() -> frappe_e2e::Result<()> {
//! // Reads E2E_BASE_DOMAIN, E2E_HEADLESS, timeouts, ... from the environment
//! let config = EnvConfig::from_env()?;
//! let driver = Arc::new(ChromeDriver::launch(&config)?);
//!
//! let login = LoginPage::new(driver, &config)?;
//! let home = login.login(&Credentials::new("admin@example.com", "secret"))?;
//! assert!(home.is_loaded()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing page objects without a browser
//!
//! The [`MockDriver`] implements the same capability trait from scripted
//! in-memory state:
//!
//! ```rust
//! use frappe_e2e::component::{Input, Select};
//! use frappe_e2e::driver::{MockDriver, MockElement};
//! use std::sync::Arc;
//!
//! # fn main() -> frappe_e2e::Result<()> {
//! let mock = MockDriver::new();
//! mock.add_element("input[data-fieldname='customer_name']", MockElement::new());
//! mock.add_element(
//!     "select[data-fieldname='status']",
//!     MockElement::new()
//!         .with_option("Open", "Open")
//!         .with_option("Closed", "Closed"),
//! );
//!
//! let driver: frappe_e2e::DriverHandle = Arc::new(mock);
//! let name = Input::by_fieldname(driver.clone(), "customer_name")?;
//! name.fill("Acme Corp")?;
//!
//! let status = Select::by_fieldname(driver, "status")?;
//! assert_eq!(status.select("closed")?, "closed");
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`driver`]: The engine capability trait, the CDP implementation, and the mock
//! - [`component`]: Input and select wrappers plus fill strategies
//! - [`page`]: Page contexts and the concrete Frappe pages
//! - [`config`]: Environment-derived configuration and the URL table
//! - [`auth`]: Credentials and credential providers
//! - [`error`]: Error types and result alias

pub mod auth;
pub mod component;
pub mod config;
pub mod driver;
pub mod error;
pub mod page;

pub use auth::{CredentialProvider, Credentials, StaticCredentials};
pub use component::{
    Component, FillStrategy, Fillable, Input, OptionSet, Select, SelectTarget, Selectable,
};
pub use component::select::normalize_key;
pub use config::{BrowserKind, EnvConfig, Urls, clean_url};
pub use driver::{ChildEntry, ChromeDriver, Driver, DriverHandle, MockDriver, MockElement};
pub use error::{Result, SelectionError, UiError};
pub use page::{AppsPage, HomePage, LoginPage, Page, PageContext, PageState};
