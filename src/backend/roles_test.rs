use super::*;

#[test]
fn parse_role_response_maps_matching_row() {
    let grant = parse_role_response(200, r#"{"role": "admin"}"#).unwrap();
    assert_eq!(grant, Some(RoleGrant { role: "admin".to_owned() }));
}

#[test]
fn parse_role_response_treats_not_found_code_as_negative() {
    let body = r#"{"code": "PGRST116", "message": "JSON object requested, multiple (or no) rows returned"}"#;
    let grant = parse_role_response(406, body).unwrap();
    assert_eq!(grant, None);
}

#[test]
fn parse_role_response_keeps_other_store_errors() {
    let err = parse_role_response(500, r#"{"code": "PGRST301", "message": "connection refused"}"#).unwrap_err();
    match err {
        RoleError::ApiResponse { status, .. } => assert_eq!(status, 500),
        other => panic!("expected ApiResponse, got {other:?}"),
    }
}

#[test]
fn parse_role_response_handles_unparseable_error_bodies() {
    let err = parse_role_response(502, "<html>bad gateway</html>").unwrap_err();
    assert!(matches!(err, RoleError::ApiResponse { status: 502, .. }));
}

#[test]
fn parse_role_response_flags_unparseable_success_bodies() {
    let err = parse_role_response(200, "[]").unwrap_err();
    assert!(matches!(err, RoleError::ApiParse(_)));
}
