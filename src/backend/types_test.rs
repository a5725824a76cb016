use super::*;

fn session_json() -> &'static str {
    r#"{
        "access_token": "jwt-access",
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "jwt-refresh",
        "user": {
            "id": "7b0a0e2e-43a1-4b0e-9c48-1f2b9a4a61f0",
            "email": "admin@example.com",
            "metadata": {"plan": "staff"}
        }
    }"#
}

#[test]
fn auth_session_deserializes_wire_shape() {
    let session: AuthSession = serde_json::from_str(session_json()).unwrap();
    assert_eq!(session.access_token, "jwt-access");
    assert_eq!(session.token_type, "bearer");
    assert_eq!(session.expires_in, 3600);
    assert_eq!(session.refresh_token, "jwt-refresh");
    assert_eq!(session.user.email.as_deref(), Some("admin@example.com"));
    assert_eq!(session.user.metadata["plan"], "staff");
}

#[test]
fn identity_tolerates_missing_optional_fields() {
    let identity: Identity = serde_json::from_str(r#"{"id": "7b0a0e2e-43a1-4b0e-9c48-1f2b9a4a61f0"}"#).unwrap();
    assert!(identity.email.is_none());
    assert!(identity.metadata.is_null());
}

#[test]
fn auth_session_serde_round_trip() {
    let session: AuthSession = serde_json::from_str(session_json()).unwrap();
    let json = serde_json::to_string(&session).unwrap();
    let restored: AuthSession = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, session);
}

#[test]
fn session_change_carries_session_for_signed_in_and_refreshed() {
    let session: AuthSession = serde_json::from_str(session_json()).unwrap();
    assert_eq!(
        SessionChange::SignedIn(session.clone()).into_session().as_ref(),
        Some(&session)
    );
    assert_eq!(
        SessionChange::Refreshed(session.clone()).into_session().as_ref(),
        Some(&session)
    );
    assert!(SessionChange::SignedOut.into_session().is_none());
}

#[test]
fn role_grant_deserializes_selected_row() {
    let grant: RoleGrant = serde_json::from_str(r#"{"role": "admin"}"#).unwrap();
    assert_eq!(grant.role, ADMIN_ROLE);
}
