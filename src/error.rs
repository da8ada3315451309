//! Error types for page-object and component operations.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, UiError>;

/// Errors surfaced by components, page objects, and the underlying driver.
#[derive(Debug, Error)]
pub enum UiError {
    /// An element did not become visible within the allowed time.
    #[error("element '{locator}' did not become visible within {timeout_ms}ms")]
    VisibilityTimeout { locator: String, timeout_ms: u64 },

    /// A required property was read before it was ever set.
    #[error("property '{property}' was read before being set")]
    EmptyProperty { property: String },

    /// Parent access on a component that was built without one.
    #[error("component '{component}' has no parent")]
    MissingParent { component: String },

    /// A locator or label string was empty or whitespace-only.
    #[error("invalid locator: {reason}")]
    InvalidLocator { reason: String },

    /// A component label may only be assigned once.
    #[error("label already set to '{current}', refusing to overwrite with '{attempted}'")]
    LabelAlreadySet { current: String, attempted: String },

    /// A mutating action was attempted on a disabled component.
    #[error("component '{component}' is disabled, cannot {action}")]
    ComponentDisabled { component: String, action: String },

    /// Selection on a dropdown control failed.
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// No element matched the given selector.
    #[error("element not found: {0}")]
    ElementNotFound(String),

    /// Navigation did not complete or landed on an unexpected location.
    #[error("navigation failed: {0}")]
    NavigationFailed(String),

    /// A driver interaction failed at the engine level.
    #[error("{action} failed: {message}")]
    ActionFailed { action: String, message: String },

    /// The browser process could not be started.
    #[error("browser launch failed: {0}")]
    LaunchFailed(String),

    /// Attaching to a running browser failed.
    #[error("browser connection failed: {0}")]
    ConnectionFailed(String),

    /// In-page script evaluation failed or returned an unusable result.
    #[error("evaluation failed: {0}")]
    EvaluationFailed(String),

    /// A credential provider had no entry for the requested role.
    #[error("no credentials configured for role '{0}'")]
    UnknownRole(String),

    /// An environment or configuration value could not be parsed.
    #[error("invalid configuration value for {name}: {message}")]
    Config { name: String, message: String },
}

/// Failure modes of [`Select::select`](crate::component::Select::select).
///
/// Each variant carries enough context to diagnose the failure from the
/// message alone: the valid keys, the valid index range, or the offending
/// type.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// The option set resolved to zero usable entries.
    #[error("no options available for '{locator}'")]
    NoOptions { locator: String },

    /// The requested key does not exist in the option set.
    #[error("key '{key}' not found, available keys: [{}]", .available.join(", "))]
    KeyNotFound { key: String, available: Vec<String> },

    /// The requested index falls outside the option set.
    #[error("index {index} out of range, valid indices are 0..={}", .count.saturating_sub(1))]
    IndexOutOfRange { index: i64, count: usize },

    /// The selection target had a type no selection mode accepts.
    #[error("invalid value type for selection: {received}")]
    InvalidValueType { received: String },

    /// A resolved key vanished between resolution and lookup. Should be
    /// unreachable; kept so the failure is diagnosable if it ever happens.
    #[error("original value for key '{key}' not found in option set")]
    OriginalValueNotFound { key: String },
}
