//! Identity service HTTP client.
//!
//! ARCHITECTURE
//! ============
//! Thin HTTP wrapper over the hosted identity endpoints (`/auth/v1/*`). The
//! client keeps the live session in a store shared with the role store (so
//! lookups can attach the bearer token) and emits [`SessionChange`] events on
//! a broadcast channel after successful sign-in/sign-out. Pure parsing is
//! split from transport for testability.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use super::types::{AuthSession, Identity, IdentityApi, IdentityError, SessionChange};

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Shared in-memory store of the live session. The identity client is the
/// only writer; the role store reads the bearer token from it.
pub(crate) type SessionStore = Arc<Mutex<Option<AuthSession>>>;

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpIdentityClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    session: SessionStore,
    events: broadcast::Sender<SessionChange>,
}

impl HttpIdentityClient {
    pub(crate) fn new(http: reqwest::Client, base_url: String, api_key: String, session: SessionStore) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { http, base_url, api_key, session, events }
    }

    fn stored_session(&self) -> Option<AuthSession> {
        self.session.lock().expect("session store poisoned").clone()
    }

    fn store_session(&self, session: Option<AuthSession>) {
        *self.session.lock().expect("session store poisoned") = session;
    }

    fn emit(&self, change: SessionChange) {
        // No receivers is fine: the manager may not have started yet.
        let _ = self.events.send(change);
    }
}

#[async_trait::async_trait]
impl IdentityApi for HttpIdentityClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, IdentityError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let body = PasswordGrantRequest { email, password };

        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| IdentityError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| IdentityError::ApiRequest(e.to_string()))?;

        let session = parse_session_response(status, &text)?;
        self.store_session(Some(session.clone()));
        self.emit(SessionChange::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str, confirm_redirect: &str) -> Result<(), IdentityError> {
        let url = format!("{}/auth/v1/signup", self.base_url);
        let body = PasswordGrantRequest { email, password };

        let response = self
            .http
            .post(&url)
            .query(&[("redirect_to", confirm_redirect)])
            .header("apikey", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| IdentityError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        if status_is_success(status) {
            // Account created; the session only exists once the email is
            // confirmed and the user signs in.
            return Ok(());
        }

        let text = response
            .text()
            .await
            .map_err(|e| IdentityError::ApiRequest(e.to_string()))?;
        Err(rejection_or_response_error(status, text))
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        let Some(session) = self.stored_session() else {
            // Nothing to terminate on the provider side.
            self.emit(SessionChange::SignedOut);
            return Ok(());
        };

        let url = format!("{}/auth/v1/logout", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| IdentityError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        if !status_is_success(status) {
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::ApiResponse { status, body });
        }

        self.store_session(None);
        self.emit(SessionChange::SignedOut);
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<AuthSession>, IdentityError> {
        let Some(mut session) = self.stored_session() else {
            return Ok(None);
        };

        // Revalidate against the provider rather than trusting memory; the
        // provider owns expiry and refresh.
        let url = format!("{}/auth/v1/user", self.base_url);
        let response = self
            .http
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| IdentityError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            // Session expired or revoked upstream.
            self.store_session(None);
            return Ok(None);
        }

        let text = response
            .text()
            .await
            .map_err(|e| IdentityError::ApiRequest(e.to_string()))?;
        if !status_is_success(status) {
            return Err(IdentityError::ApiResponse { status, body: text });
        }

        let user = parse_identity(&text)?;
        session.user = user;
        self.store_session(Some(session.clone()));
        Ok(Some(session))
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.events.subscribe()
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Serialize)]
struct PasswordGrantRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Default, serde::Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

// =============================================================================
// PARSING
// =============================================================================

fn status_is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Statuses the identity service uses for rejected identifier/secret pairs
/// (bad credentials, unconfirmed email, weak password, duplicate account).
fn status_is_rejection(status: u16) -> bool {
    matches!(status, 400 | 401 | 403 | 422)
}

/// Best-effort human message from an identity error body.
fn rejection_message(body: &str) -> String {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
    parsed
        .error_description
        .or(parsed.msg)
        .or(parsed.message)
        .unwrap_or_else(|| "invalid credentials".to_owned())
}

fn rejection_or_response_error(status: u16, body: String) -> IdentityError {
    if status_is_rejection(status) {
        IdentityError::CredentialsRejected { message: rejection_message(&body) }
    } else {
        IdentityError::ApiResponse { status, body }
    }
}

fn parse_session_response(status: u16, body: &str) -> Result<AuthSession, IdentityError> {
    if !status_is_success(status) {
        return Err(rejection_or_response_error(status, body.to_owned()));
    }
    serde_json::from_str(body).map_err(|e| IdentityError::ApiParse(e.to_string()))
}

fn parse_identity(body: &str) -> Result<Identity, IdentityError> {
    serde_json::from_str(body).map_err(|e| IdentityError::ApiParse(e.to_string()))
}

#[cfg(test)]
#[path = "identity_test.rs"]
mod tests;
