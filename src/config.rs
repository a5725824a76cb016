//! Backend configuration parsed from environment variables.

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_ROLE_CHECK_TIMEOUT_SECS: u64 = 10;

/// Errors produced while building a [`BackendConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing configuration: env var {var} not set")]
    MissingVar { var: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

/// Typed configuration for the hosted storefront backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Base URL of the backend-as-a-service, without a trailing slash.
    pub base_url: String,
    /// Publishable API key sent with every request.
    pub api_key: String,
    /// Public site origin; used as the email-confirmation redirect base.
    pub site_url: String,
    pub timeouts: HttpTimeouts,
    /// Ceiling on a single admin-role lookup before it is abandoned.
    pub role_check_timeout_secs: u64,
}

impl BackendConfig {
    /// Build typed backend config from environment variables.
    ///
    /// Required:
    /// - `SHOWROOM_BACKEND_URL`: backend base URL
    /// - `SHOWROOM_BACKEND_KEY`: publishable API key
    /// - `SHOWROOM_SITE_URL`: public site origin for confirmation redirects
    ///
    /// Optional:
    /// - `SHOWROOM_REQUEST_TIMEOUT_SECS`: default 15
    /// - `SHOWROOM_CONNECT_TIMEOUT_SECS`: default 10
    /// - `SHOWROOM_ROLE_CHECK_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build typed backend config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a required key is absent.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = require(&lookup, "SHOWROOM_BACKEND_URL")?
            .trim_end_matches('/')
            .to_string();
        let api_key = require(&lookup, "SHOWROOM_BACKEND_KEY")?;
        let site_url = require(&lookup, "SHOWROOM_SITE_URL")?
            .trim_end_matches('/')
            .to_string();
        let timeouts = HttpTimeouts {
            request_secs: parse_u64(&lookup, "SHOWROOM_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(&lookup, "SHOWROOM_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let role_check_timeout_secs =
            parse_u64(&lookup, "SHOWROOM_ROLE_CHECK_TIMEOUT_SECS", DEFAULT_ROLE_CHECK_TIMEOUT_SECS);

        Ok(Self { base_url, api_key, site_url, timeouts, role_check_timeout_secs })
    }

    /// Redirect address sent with sign-up requests for email confirmation.
    #[must_use]
    pub fn confirm_redirect(&self) -> String {
        format!("{}/", self.site_url)
    }
}

fn require(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingVar { var: key.to_owned() })
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    lookup(key)
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
