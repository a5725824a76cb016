//! Session manager — authenticated identity and admin authorization state.
//!
//! ARCHITECTURE
//! ============
//! The manager owns a [`watch`]-published [`AuthState`] snapshot. A spawned
//! event task subscribes to the identity service's session-change stream and
//! concurrently fetches the initial session snapshot; both paths funnel into
//! the same session-changed handler, so state converges regardless of which
//! completes first. Consumers read or subscribe to the snapshot and call the
//! sign-in/up/out operations; they never mutate state directly.
//!
//! CONCURRENCY
//! ===========
//! Admin-role resolution is guarded by an in-flight flag (a second trigger
//! while one lookup is running is a no-op) and a bounded wait; an
//! unresponsive role store fails closed instead of hanging the UI. A
//! liveness flag checked before every state write discards the effects of
//! requests that complete after teardown.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::backend::types::{
    ADMIN_ROLE, AuthSession, Identity, IdentityApi, IdentityError, RoleLookup, SessionChange,
};
use crate::config::BackendConfig;
use crate::shell::{Destination, Notice, Shell};

const MSG_SIGN_IN_OK: &str = "Login realizado com sucesso!";
const MSG_SIGN_IN_ERR: &str = "Erro ao fazer login";
const MSG_SIGN_UP_OK: &str = "Cadastro realizado! Você já pode fazer login.";
const MSG_SIGN_UP_ERR: &str = "Erro ao criar conta";
const MSG_SIGN_OUT_OK: &str = "Logout realizado com sucesso!";
const MSG_SIGN_OUT_ERR: &str = "Erro ao sair";

// =============================================================================
// STATE
// =============================================================================

/// Snapshot of the authentication state, published on every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    /// Current authenticated principal, if any.
    pub identity: Option<Identity>,
    /// Current provider-issued session, if any.
    pub session: Option<AuthSession>,
    /// True only while a signed-in identity holds the administrator role.
    pub is_admin: bool,
    /// True until the first resolution (session plus role check) completes.
    pub is_loading: bool,
    /// True while an admin-role lookup is in flight.
    pub is_checking_roles: bool,
}

impl AuthState {
    fn initial() -> Self {
        Self { identity: None, session: None, is_admin: false, is_loading: true, is_checking_roles: false }
    }
}

/// Tunables for a [`SessionManager`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Address confirmation emails link back to after sign-up.
    pub confirm_redirect: String,
    /// Ceiling on a single admin-role lookup.
    pub role_check_timeout: Duration,
}

impl SessionOptions {
    #[must_use]
    pub fn from_config(config: &BackendConfig) -> Self {
        Self {
            confirm_redirect: config.confirm_redirect(),
            role_check_timeout: Duration::from_secs(config.role_check_timeout_secs),
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            confirm_redirect: "http://localhost:3000/".to_owned(),
            role_check_timeout: Duration::from_secs(crate::config::DEFAULT_ROLE_CHECK_TIMEOUT_SECS),
        }
    }
}

// =============================================================================
// MANAGER
// =============================================================================

/// Handle owning the session state and its event task.
///
/// Create one at the root of the UI tree with [`SessionManager::start`] and
/// pass it (or receivers from [`SessionManager::subscribe`]) down to
/// consumers. Dropping the handle tears the event task down.
pub struct SessionManager {
    inner: Arc<Inner>,
    task: JoinHandle<()>,
}

struct Inner {
    identity_api: Arc<dyn IdentityApi>,
    roles: Arc<dyn RoleLookup>,
    shell: Arc<dyn Shell>,
    state: watch::Sender<AuthState>,
    /// Cleared on teardown; checked before every state write.
    alive: AtomicBool,
    /// Re-entrancy guard for admin-role resolution.
    role_check_in_flight: AtomicBool,
    options: SessionOptions,
}

impl SessionManager {
    /// Start the manager: subscribe to session-change events, then fetch the
    /// initial session snapshot. Both funnel into the same handler.
    #[must_use]
    pub fn start(
        identity_api: Arc<dyn IdentityApi>,
        roles: Arc<dyn RoleLookup>,
        shell: Arc<dyn Shell>,
        options: SessionOptions,
    ) -> Self {
        let (state, _) = watch::channel(AuthState::initial());
        let events = identity_api.subscribe();
        let inner = Arc::new(Inner {
            identity_api,
            roles,
            shell,
            state,
            alive: AtomicBool::new(true),
            role_check_in_flight: AtomicBool::new(false),
            options,
        });
        let task = tokio::spawn(run(Arc::clone(&inner), events));
        Self { inner, task }
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to state changes. The receiver sees every published
    /// snapshot that is current at read time.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    /// Verify credentials and establish a session.
    ///
    /// On success the UI is notified and navigated to the admin area; the
    /// state snapshot updates through the provider's session-change event.
    ///
    /// # Errors
    ///
    /// Re-returns the provider error after showing a failure notification,
    /// so calling UI can react (e.g. keep the form open).
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), IdentityError> {
        match self.inner.identity_api.sign_in_with_password(email, password).await {
            Ok(_) => {
                self.inner.shell.notify(Notice::success(MSG_SIGN_IN_OK));
                self.inner.shell.navigate(Destination::AdminPanel);
                Ok(())
            }
            Err(e) => {
                self.inner.shell.notify(Notice::error(notice_message(&e, MSG_SIGN_IN_ERR)));
                Err(e)
            }
        }
    }

    /// Request account creation with a confirmation redirect. Does not
    /// establish a session and does not navigate.
    ///
    /// # Errors
    ///
    /// Re-returns the provider error after showing a failure notification.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<(), IdentityError> {
        match self
            .inner
            .identity_api
            .sign_up(email, password, &self.inner.options.confirm_redirect)
            .await
        {
            Ok(()) => {
                self.inner.shell.notify(Notice::success(MSG_SIGN_UP_OK));
                Ok(())
            }
            Err(e) => {
                self.inner.shell.notify(Notice::error(notice_message(&e, MSG_SIGN_UP_ERR)));
                Err(e)
            }
        }
    }

    /// Terminate the session. On success the admin flag is cleared
    /// immediately and the UI is navigated to the landing page; identity and
    /// session clear through the provider's `SignedOut` event.
    ///
    /// # Errors
    ///
    /// Re-returns the provider error after showing a failure notification;
    /// state is left untouched since the provider remains the source of
    /// truth for whether the session actually ended.
    pub async fn sign_out(&self) -> Result<(), IdentityError> {
        match self.inner.identity_api.sign_out().await {
            Ok(()) => {
                self.inner.apply(|state| state.is_admin = false);
                self.inner.shell.notify(Notice::success(MSG_SIGN_OUT_OK));
                self.inner.shell.navigate(Destination::Landing);
                Ok(())
            }
            Err(e) => {
                self.inner.shell.notify(Notice::error(notice_message(&e, MSG_SIGN_OUT_ERR)));
                Err(e)
            }
        }
    }

    /// Tear the manager down: further state writes are discarded and the
    /// event task (with its subscription) stops.
    pub fn shutdown(&self) {
        self.inner.alive.store(false, Ordering::SeqCst);
        self.task.abort();
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Server message for rejected credentials, UI fallback otherwise.
fn notice_message(error: &IdentityError, fallback: &str) -> String {
    match error {
        IdentityError::CredentialsRejected { message } => message.clone(),
        _ => fallback.to_owned(),
    }
}

// =============================================================================
// EVENT TASK
// =============================================================================

async fn run(inner: Arc<Inner>, mut events: broadcast::Receiver<SessionChange>) {
    let bootstrap = {
        let inner = Arc::clone(&inner);
        async move {
            match inner.identity_api.current_session().await {
                Ok(session) => inner.handle_session_change(session).await,
                Err(e) => {
                    tracing::error!(error = %e, "session bootstrap failed");
                    inner.apply(|state| {
                        state.is_admin = false;
                        state.is_loading = false;
                    });
                }
            }
        }
    };

    let listen = {
        let inner = Arc::clone(&inner);
        async move {
            loop {
                match events.recv().await {
                    Ok(change) => inner.handle_session_change(change.into_session()).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "session event stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    };

    tokio::join!(bootstrap, listen);
}

impl Inner {
    /// Single gate for state writes. No-op after teardown.
    fn apply(&self, mutate: impl FnOnce(&mut AuthState)) {
        if !self.alive.load(Ordering::SeqCst) {
            return;
        }
        self.state.send_modify(mutate);
    }

    /// Record a new session snapshot and re-derive the admin flag.
    ///
    /// An empty identity clears the admin flag in the same publication that
    /// clears the identity; no consumer can observe a signed-out admin.
    async fn handle_session_change(&self, session: Option<AuthSession>) {
        if !self.alive.load(Ordering::SeqCst) {
            return;
        }

        match session {
            Some(session) => {
                let user_id = session.user.id;
                self.apply(move |state| {
                    state.identity = Some(session.user.clone());
                    state.session = Some(session);
                });
                self.resolve_admin(user_id).await;
            }
            None => self.apply(|state| {
                state.identity = None;
                state.session = None;
                state.is_admin = false;
                state.is_loading = false;
            }),
        }
    }

    /// Resolve whether `user_id` holds the administrator role.
    ///
    /// Fail-closed: timeout, lookup error, and absence all leave the flag
    /// false. Only a matching grant sets it.
    async fn resolve_admin(&self, user_id: Uuid) {
        // One lookup at a time; a second trigger while one is in flight is a
        // no-op and keeps the earlier result.
        if self
            .role_check_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }
        self.apply(|state| state.is_checking_roles = true);

        let lookup = self.roles.find_role(user_id, ADMIN_ROLE);
        match tokio::time::timeout(self.options.role_check_timeout, lookup).await {
            Err(_) => {
                // Ceiling elapsed: abandon the wait and fail closed so the
                // UI never hangs on an unresponsive role store.
                tracing::warn!(%user_id, "admin role check timed out");
                self.apply(|state| {
                    state.is_admin = false;
                    state.is_checking_roles = false;
                    state.is_loading = false;
                });
                self.role_check_in_flight.store(false, Ordering::SeqCst);
                return;
            }
            Ok(Ok(grant)) => {
                self.apply(|state| state.is_admin = grant.is_some());
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, %user_id, "admin role check failed");
                self.apply(|state| state.is_admin = false);
            }
        }

        self.apply(|state| {
            state.is_checking_roles = false;
            state.is_loading = false;
        });
        self.role_check_in_flight.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
