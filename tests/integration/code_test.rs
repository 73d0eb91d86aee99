//! Integration tests for single-use authorization codes.

mod helpers;

use sessionkv_core::config::AppConfig;
use sessionkv_core::error::ErrorKind;
use sessionkv_core::traits::{KeyedRecordStore, RawRecord};
use sessionkv_entity::code::{AUTHORIZATION_CODE_TABLE, AuthenticationContext, CODE_INDEX};

fn context() -> AuthenticationContext {
    AuthenticationContext::new("alice", "photo-printer")
        .with_scope("photos.read")
        .with_redirect_uri("https://printer.example.com/cb")
}

#[tokio::test]
async fn test_code_redeems_exactly_once() {
    let app = helpers::TestApp::new();
    app.codes.store("abc", &context()).await.unwrap();

    let first: Option<AuthenticationContext> = app.codes.redeem("abc").await.unwrap();
    assert_eq!(first, Some(context()));
    assert_eq!(app.store.record_count(AUTHORIZATION_CODE_TABLE), 0);

    let second: Option<AuthenticationContext> = app.codes.redeem("abc").await.unwrap();
    assert!(second.is_none());
}

#[tokio::test]
async fn test_unknown_code_is_absent() {
    let app = helpers::TestApp::new();
    let result: Option<AuthenticationContext> = app.codes.redeem("nope").await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_duplicate_code_is_an_integrity_violation() {
    let app = helpers::TestApp::new();
    for key in ["abc#1", "abc#2"] {
        let record = RawRecord::new(key, serde_json::json!({"code": "abc", "authentication": ""}))
            .with_index(CODE_INDEX, "abc");
        app.store.save(AUTHORIZATION_CODE_TABLE, record).await.unwrap();
    }

    let err = app
        .codes
        .redeem::<AuthenticationContext>("abc")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::IntegrityViolation);
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_issued_code_consumes_once() {
    let mut config = AppConfig::default();
    config.authorization_code.code_length = 10;
    let app = helpers::TestApp::with_config(config);

    let code = app.codes.create_authorization_code(&context()).await.unwrap();
    assert_eq!(code.len(), 10);

    let restored: AuthenticationContext = app.codes.consume_authorization_code(&code).await.unwrap();
    assert_eq!(restored, context());

    let err = app
        .codes
        .consume_authorization_code::<AuthenticationContext>(&code)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidGrant);
}
