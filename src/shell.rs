//! UI bridge — notifications and navigation requested by the session manager.
//!
//! The embedding UI injects a [`Shell`] implementation; the SDK never talks
//! to a toast widget or router directly, and never through process globals.

use serde::{Deserialize, Serialize};

/// Severity of a user-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
}

/// User-visible notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self { severity: Severity::Success, message: message.into() }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, message: message.into() }
    }
}

/// Navigation targets the session manager can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    /// Public landing page.
    Landing,
    /// Protected admin area.
    AdminPanel,
}

impl Destination {
    /// Route path the UI router should navigate to.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Landing => "/",
            Self::AdminPanel => "/admin",
        }
    }
}

/// Surface the embedding UI provides for notifications and navigation.
pub trait Shell: Send + Sync {
    /// Show a toast-style notification.
    fn notify(&self, notice: Notice);

    /// Navigate the UI to `to`.
    fn navigate(&self, to: Destination);
}
