//! Credential handling for login flows.
//!
//! The crate never owns secrets: a [`CredentialProvider`] is supplied by the
//! test harness, typically a [`StaticCredentials`] map loaded from a fixture
//! file or CI secret.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

use crate::error::{Result, UiError};

/// A username/password pair for one account.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Credentials end up in failure logs via Debug, keep the password out.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Resolves a role name (e.g. `admin`, `sales_user`) to credentials.
pub trait CredentialProvider {
    fn resolve(&self, role: &str) -> Result<Credentials>;
}

/// In-memory role map, the usual provider for test suites.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    roles: HashMap<String, Credentials>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a role, replacing any previous entry for the same name.
    pub fn with_role(mut self, role: impl Into<String>, credentials: Credentials) -> Self {
        self.roles.insert(role.into(), credentials);
        self
    }

    /// Loads a role map from JSON of the form
    /// `{"admin": {"username": "...", "password": "..."}}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let roles: HashMap<String, Credentials> =
            serde_json::from_str(json).map_err(|e| UiError::Config {
                name: "credentials".to_string(),
                message: format!("failed to parse credential JSON: {e}"),
            })?;
        Ok(Self { roles })
    }
}

impl CredentialProvider for StaticCredentials {
    fn resolve(&self, role: &str) -> Result<Credentials> {
        self.roles
            .get(role)
            .cloned()
            .ok_or_else(|| UiError::UnknownRole(role.to_string()))
    }
}
