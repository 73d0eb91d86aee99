//! Integration tests for the session lifecycle.

mod helpers;

use serde_json::json;
use sessionkv_auth::session::{PRINCIPAL_NAME_INDEX_NAME, SECURITY_CONTEXT_ATTRIBUTE};
use sessionkv_core::config::AppConfig;
use sessionkv_entity::session::SESSION_TABLE;

use helpers::at;

#[tokio::test]
async fn test_sliding_expiration_scenario() {
    let app = helpers::TestApp::new();

    let mut session = app.sessions.create_session_at(at(0));
    assert_eq!(session.max_inactive_interval_seconds(), 1800);
    app.sessions.save(&mut session).await.unwrap();

    let mut loaded = app
        .sessions
        .get_session_at(session.id(), at(1000))
        .await
        .unwrap()
        .expect("session alive at t=1000");
    loaded.set_last_accessed_time(at(1000));
    app.sessions.save(&mut loaded).await.unwrap();

    assert!(
        app.sessions
            .get_session_at(session.id(), at(2000))
            .await
            .unwrap()
            .is_some()
    );
    assert!(
        app.sessions
            .get_session_at(session.id(), at(2900))
            .await
            .unwrap()
            .is_none()
    );
    // The expired record was removed, so it stays gone.
    assert!(
        app.sessions
            .get_session_at(session.id(), at(1000))
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(app.store.record_count(SESSION_TABLE), 0);
}

#[tokio::test]
async fn test_never_expiring_session() {
    let app = helpers::TestApp::new();
    let mut session = app.sessions.create_session_at(at(0));
    session.set_max_inactive_interval_seconds(-1);
    app.sessions.save(&mut session).await.unwrap();

    let loaded = app
        .sessions
        .get_session_at(session.id(), at(4_000_000_000))
        .await
        .unwrap();
    assert!(loaded.is_some());
}

#[tokio::test]
async fn test_attributes_survive_round_trip() {
    let app = helpers::TestApp::new();
    let mut session = app.sessions.create_session();
    session.set_attribute("locale", "fr-CA");
    session.set_attribute("cart", json!({"items": [{"sku": "A1", "qty": 2}]}));
    app.sessions.save(&mut session).await.unwrap();

    let loaded = app.sessions.get_session(session.id()).await.unwrap().unwrap();
    assert_eq!(loaded.attributes(), session.attributes());
    assert_eq!(loaded.creation_time(), session.creation_time());
    assert_eq!(
        loaded.max_inactive_interval_seconds(),
        session.max_inactive_interval_seconds()
    );
}

#[tokio::test]
async fn test_resave_keeps_a_single_record() {
    let app = helpers::TestApp::new();
    let mut session = app.sessions.create_session();
    for step in 0..3 {
        session.set_attribute("step", step);
        app.sessions.save(&mut session).await.unwrap();
    }

    assert_eq!(app.store.record_count(SESSION_TABLE), 1);
    let loaded = app.sessions.get_session(session.id()).await.unwrap().unwrap();
    assert_eq!(loaded.attribute("step"), Some(&json!(2)));
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let app = helpers::TestApp::new();
    app.sessions.delete("never-created").await.unwrap();

    let mut session = app.sessions.create_session();
    app.sessions.save(&mut session).await.unwrap();
    app.sessions.delete(session.id()).await.unwrap();
    app.sessions.delete(session.id()).await.unwrap();
    assert!(app.sessions.get_session(session.id()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_sessions_for_principal() {
    let app = helpers::TestApp::new();

    let mut ids = Vec::new();
    for _ in 0..2 {
        let mut session = app.sessions.create_session();
        session.set_attribute(
            SECURITY_CONTEXT_ATTRIBUTE,
            json!({"authentication": {"name": "alice", "authenticated": true}}),
        );
        app.sessions.save(&mut session).await.unwrap();
        ids.push(session.id().to_string());
    }

    let mut bob = app.sessions.create_session();
    bob.set_attribute(PRINCIPAL_NAME_INDEX_NAME, "bob");
    app.sessions.save(&mut bob).await.unwrap();

    let found = app.sessions.find_by_principal_name("alice").await.unwrap();
    assert_eq!(found.len(), 2);
    for id in &ids {
        assert_eq!(found[id].id(), id);
    }

    assert!(app.sessions.find_by_principal_name("carol").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_logout_clears_principal_index() {
    let app = helpers::TestApp::new();
    let mut session = app.sessions.create_session();
    session.set_attribute(PRINCIPAL_NAME_INDEX_NAME, "alice");
    app.sessions.save(&mut session).await.unwrap();

    session.remove_attribute(PRINCIPAL_NAME_INDEX_NAME);
    app.sessions.save(&mut session).await.unwrap();

    assert!(app.sessions.find_by_principal_name("alice").await.unwrap().is_empty());
    assert!(app.sessions.get_session(session.id()).await.unwrap().is_some());
}

#[tokio::test]
async fn test_configured_default_interval() {
    let mut config = AppConfig::default();
    config.session.default_max_inactive_interval_seconds = 60;
    let app = helpers::TestApp::with_config(config);

    let mut session = app.sessions.create_session_at(at(0));
    app.sessions.save(&mut session).await.unwrap();
    assert!(app.sessions.get_session_at(session.id(), at(59)).await.unwrap().is_some());
    assert!(app.sessions.get_session_at(session.id(), at(60)).await.unwrap().is_none());
}
