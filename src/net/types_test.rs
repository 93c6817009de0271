use super::*;

// =============================================================================
// ApiRequest
// =============================================================================

#[test]
fn request_starts_without_body_or_id() {
    let req = ApiRequest::new(Method::GET, "http://localhost:5000/api/savings");
    assert!(req.body.is_none());
    assert!(req.request_id.is_none());
}

#[test]
fn request_with_body() {
    let req = ApiRequest::new(Method::POST, "http://x/api/savings").with_body(serde_json::json!({ "amount": 10 }));
    assert_eq!(req.body, Some(serde_json::json!({ "amount": 10 })));
}

// =============================================================================
// ApiResponse
// =============================================================================

#[test]
fn success_range() {
    assert!(ApiResponse::new(200, "").is_success());
    assert!(ApiResponse::new(204, "").is_success());
    assert!(!ApiResponse::new(301, "").is_success());
    assert!(!ApiResponse::new(401, "").is_success());
}

#[test]
fn server_message_from_json_body() {
    let resp = ApiResponse::new(401, r#"{"message":"token expired"}"#);
    assert_eq!(resp.server_message().as_deref(), Some("token expired"));
}

#[test]
fn server_message_absent_field() {
    let resp = ApiResponse::new(401, r#"{"error":"nope"}"#);
    assert!(resp.server_message().is_none());
}

#[test]
fn server_message_non_string_field() {
    let resp = ApiResponse::new(401, r#"{"message":42}"#);
    assert!(resp.server_message().is_none());
}

#[test]
fn server_message_plain_text_body() {
    let resp = ApiResponse::new(401, "Unauthorized");
    assert!(resp.server_message().is_none());
}

#[test]
fn json_empty_body_is_null() {
    let value: Value = ApiResponse::new(204, "").json().unwrap();
    assert_eq!(value, Value::Null);
}

#[test]
fn json_invalid_body_is_decode_error() {
    let err = ApiResponse::new(200, "<html>").json::<Value>().unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}
