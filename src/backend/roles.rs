//! Role store HTTP client.
//!
//! The `user_roles` table lives behind the backend's row-store HTTP surface
//! (`/rest/v1/*`). Lookups request single-object representation so "zero
//! rows" comes back as the store's row-not-found code rather than an empty
//! list; that code is the normal negative result, not an error.

use uuid::Uuid;

use super::identity::SessionStore;
use super::types::{RoleError, RoleGrant, RoleLookup};

/// Row-not-found code returned by the row store when single-object
/// representation matches zero rows.
const NOT_FOUND_CODE: &str = "PGRST116";

const SINGLE_OBJECT_ACCEPT: &str = "application/vnd.pgrst.object+json";

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpRoleStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    session: SessionStore,
}

impl HttpRoleStore {
    pub(crate) fn new(http: reqwest::Client, base_url: String, api_key: String, session: SessionStore) -> Self {
        Self { http, base_url, api_key, session }
    }

    fn bearer_token(&self) -> String {
        // Row-level policies scope `user_roles` to the signed-in user, so
        // prefer the live access token; fall back to the publishable key.
        self.session
            .lock()
            .expect("session store poisoned")
            .as_ref()
            .map_or_else(|| self.api_key.clone(), |s| s.access_token.clone())
    }
}

#[async_trait::async_trait]
impl RoleLookup for HttpRoleStore {
    async fn find_role(&self, user_id: Uuid, role: &str) -> Result<Option<RoleGrant>, RoleError> {
        let url = format!("{}/rest/v1/user_roles", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("user_id", format!("eq.{user_id}")),
                ("role", format!("eq.{role}")),
                ("select", "role".to_owned()),
            ])
            .header("apikey", &self.api_key)
            .header("Accept", SINGLE_OBJECT_ACCEPT)
            .bearer_auth(self.bearer_token())
            .send()
            .await
            .map_err(|e| RoleError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| RoleError::ApiRequest(e.to_string()))?;

        parse_role_response(status, &text)
    }
}

// =============================================================================
// PARSING
// =============================================================================

#[derive(Default, serde::Deserialize)]
struct StoreErrorBody {
    #[serde(default)]
    code: Option<String>,
}

fn parse_role_response(status: u16, body: &str) -> Result<Option<RoleGrant>, RoleError> {
    if (200..300).contains(&status) {
        let grant: RoleGrant = serde_json::from_str(body).map_err(|e| RoleError::ApiParse(e.to_string()))?;
        return Ok(Some(grant));
    }

    let parsed: StoreErrorBody = serde_json::from_str(body).unwrap_or_default();
    if parsed.code.as_deref() == Some(NOT_FOUND_CODE) {
        return Ok(None);
    }

    Err(RoleError::ApiResponse { status, body: body.to_owned() })
}

#[cfg(test)]
#[path = "roles_test.rs"]
mod tests;
