use super::*;
use crate::test_helpers::{Harness, TEST_API_URL};

// =============================================================================
// user_from_body
// =============================================================================

#[test]
fn user_under_user_key() {
    let body = serde_json::json!({ "user": { "username": "alice", "email": "a@example.test" } });
    let user = user_from_body(&body).unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(user.email.as_deref(), Some("a@example.test"));
}

#[test]
fn user_at_top_level() {
    let body = serde_json::json!({ "username": "bob", "firstName": "Bob" });
    let user = user_from_body(&body).unwrap();
    assert_eq!(user.first_name.as_deref(), Some("Bob"));
}

#[test]
fn no_user_in_message_only_body() {
    assert!(user_from_body(&serde_json::json!({ "message": "Logged in" })).is_none());
    assert!(user_from_body(&Value::Null).is_none());
}

#[test]
fn numeric_username_is_not_a_user() {
    assert!(user_from_body(&serde_json::json!({ "username": 5 })).is_none());
}

// =============================================================================
// login / register
// =============================================================================

#[tokio::test]
async fn login_posts_credentials_while_logged_out() {
    let h = Harness::production();
    h.transport.respond(200, r#"{"message":"ok"}"#);
    let creds = Credentials { username: "alice".into(), password: "s3cret".into() };

    let user = login(&h.client, &creds).await.unwrap();

    assert!(user.is_none());
    let sent = h.transport.requests();
    assert_eq!(sent[0].url, format!("{TEST_API_URL}/auth/login"));
    assert_eq!(sent[0].body, Some(serde_json::json!({ "username": "alice", "password": "s3cret" })));
}

#[tokio::test]
async fn login_returns_server_user() {
    let h = Harness::production();
    h.transport.respond(200, r#"{"user":{"username":"alice","id":"u1"}}"#);
    let creds = Credentials { username: "alice".into(), password: "pw".into() };

    let user = login(&h.client, &creds).await.unwrap().unwrap();

    assert_eq!(user.id, Some(serde_json::json!("u1")));
}

#[tokio::test]
async fn login_rejection_is_unauthorized() {
    let h = Harness::production();
    h.transport.respond(401, r#"{"message":"Invalid credentials"}"#);
    let creds = Credentials { username: "alice".into(), password: "wrong".into() };

    let err = login(&h.client, &creds).await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized { message } if message == "Invalid credentials"));
}

#[tokio::test]
async fn register_serializes_camel_case() {
    let h = Harness::production();
    let registration = Registration {
        username: "carol".into(),
        email: "c@example.test".into(),
        password: "pw".into(),
        first_name: Some("Carol".into()),
        last_name: None,
    };

    register(&h.client, &registration).await.unwrap();

    let body = h.transport.requests()[0].body.clone().unwrap();
    assert_eq!(body["firstName"], "Carol");
    assert!(body.get("lastName").is_none());
}
