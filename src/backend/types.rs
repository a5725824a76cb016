//! Backend types — provider-neutral identity, session, and role types.
//!
//! The hosted backend owns identities and sessions; this crate only observes
//! them. Everything here is shared by the HTTP clients and the session
//! manager, and by the mock implementations used in tests.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

// =============================================================================
// ERRORS
// =============================================================================

/// Errors produced by identity-service operations.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The identifier/secret pair was rejected by the identity service.
    #[error("credentials rejected: {message}")]
    CredentialsRejected { message: String },

    /// The HTTP request to the identity service failed.
    #[error("identity request failed: {0}")]
    ApiRequest(String),

    /// The identity service returned a non-success HTTP status.
    #[error("identity response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The identity service response body could not be deserialized.
    #[error("identity response parse failed: {0}")]
    ApiParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// Errors produced by role-store lookups.
///
/// "Row not found" is not an error; lookups report it as `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum RoleError {
    /// The HTTP request to the role store failed.
    #[error("role request failed: {0}")]
    ApiRequest(String),

    /// The role store returned a non-success status that is not the
    /// row-not-found code.
    #[error("role response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The role store response body could not be deserialized.
    #[error("role response parse failed: {0}")]
    ApiParse(String),
}

// =============================================================================
// IDENTITY & SESSION
// =============================================================================

/// Authenticated principal record, owned by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Unique identifier assigned by the identity service.
    pub id: Uuid,
    /// Primary email, when the account has one.
    #[serde(default)]
    pub email: Option<String>,
    /// Free-form metadata attached by the identity service.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Session issued by the identity service. Expiry and refresh are managed
/// entirely on the provider side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: String,
    pub user: Identity,
}

/// Session-change event emitted by the identity service.
#[derive(Debug, Clone)]
pub enum SessionChange {
    SignedIn(AuthSession),
    Refreshed(AuthSession),
    SignedOut,
}

impl SessionChange {
    /// The session carried by the event, if any.
    #[must_use]
    pub fn into_session(self) -> Option<AuthSession> {
        match self {
            Self::SignedIn(session) | Self::Refreshed(session) => Some(session),
            Self::SignedOut => None,
        }
    }
}

// =============================================================================
// ROLES
// =============================================================================

/// Role name carried by administrator grants.
pub const ADMIN_ROLE: &str = "admin";

/// One row of the `user_roles` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrant {
    pub role: String,
}

// =============================================================================
// TRAIT SEAMS
// =============================================================================

/// Identity-service operations consumed by the session manager.
#[async_trait::async_trait]
pub trait IdentityApi: Send + Sync {
    /// Verify an email/password pair and establish a session.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, IdentityError>;

    /// Create an account. `confirm_redirect` is the address the confirmation
    /// email links back to. Does not establish a session.
    async fn sign_up(&self, email: &str, password: &str, confirm_redirect: &str) -> Result<(), IdentityError>;

    /// Terminate the current session.
    async fn sign_out(&self) -> Result<(), IdentityError>;

    /// Fetch the current session snapshot, if one exists.
    async fn current_session(&self) -> Result<Option<AuthSession>, IdentityError>;

    /// Subscribe to session-change events. The subscription stays live for
    /// the lifetime of the receiver.
    fn subscribe(&self) -> broadcast::Receiver<SessionChange>;
}

/// Role-store lookups consumed by the session manager.
#[async_trait::async_trait]
pub trait RoleLookup: Send + Sync {
    /// Find the grant matching `{user_id, role}`. At most one row is
    /// expected; absence is `Ok(None)`, never an error.
    async fn find_role(&self, user_id: Uuid, role: &str) -> Result<Option<RoleGrant>, RoleError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
