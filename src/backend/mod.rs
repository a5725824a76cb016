//! Backend — HTTP adapters for the hosted storefront backend.
//!
//! DESIGN
//! ======
//! The backend-as-a-service exposes an identity service (`/auth/v1/*`) and a
//! row store (`/rest/v1/*`). [`Backend::from_config`] assembles one client
//! for each behind the [`IdentityApi`] and [`RoleLookup`] seams, sharing a
//! single HTTP client and session store so role lookups ride on the live
//! access token.

pub mod identity;
pub mod roles;
pub mod types;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use identity::HttpIdentityClient;
use roles::HttpRoleStore;
pub use types::{
    ADMIN_ROLE, AuthSession, Identity, IdentityApi, IdentityError, RoleError, RoleGrant, RoleLookup, SessionChange,
};

use crate::config::BackendConfig;

/// Assembled HTTP clients for the hosted backend.
pub struct Backend {
    pub identity: Arc<HttpIdentityClient>,
    pub roles: Arc<HttpRoleStore>,
}

impl Backend {
    /// Build both backend clients from a typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &BackendConfig) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| IdentityError::HttpClientBuild(e.to_string()))?;

        let session = Arc::new(Mutex::new(None));
        let identity = Arc::new(HttpIdentityClient::new(
            http.clone(),
            config.base_url.clone(),
            config.api_key.clone(),
            Arc::clone(&session),
        ));
        let roles = Arc::new(HttpRoleStore::new(
            http,
            config.base_url.clone(),
            config.api_key.clone(),
            session,
        ));

        Ok(Self { identity, roles })
    }
}
