//! Integration tests for the expired session sweep.

mod helpers;

use std::sync::Arc;

use sessionkv_entity::session::SESSION_TABLE;
use sessionkv_worker::SessionCleanupJob;

use helpers::at;

#[tokio::test]
async fn test_sweep_reclaims_abandoned_sessions() {
    let app = helpers::TestApp::new();

    let mut abandoned = Vec::new();
    for _ in 0..20 {
        let mut session = app.sessions.create_session_at(at(0));
        app.sessions.save(&mut session).await.unwrap();
        abandoned.push(session.id().to_string());
    }
    let mut active = app.sessions.create_session_at(at(0));
    active.set_last_accessed_time(at(1500));
    app.sessions.save(&mut active).await.unwrap();

    let report = app.sessions.cleanup_expired_sessions_at(at(2000)).await.unwrap();
    assert_eq!(report.found, 20);
    assert_eq!(report.deleted, 20);
    assert_eq!(report.failed, 0);
    assert_eq!(app.store.record_count(SESSION_TABLE), 1);

    let again = app.sessions.cleanup_expired_sessions_at(at(2000)).await.unwrap();
    assert_eq!(again.found, 0);
}

#[tokio::test]
async fn test_sweep_and_lazy_expiry_agree() {
    let app = helpers::TestApp::new();
    let mut session = app.sessions.create_session_at(at(0));
    app.sessions.save(&mut session).await.unwrap();

    let early = app.sessions.cleanup_expired_sessions_at(at(1799)).await.unwrap();
    assert_eq!(early.found, 0);
    assert!(app.sessions.get_session_at(session.id(), at(1799)).await.unwrap().is_some());

    let due = app.sessions.cleanup_expired_sessions_at(at(1800)).await.unwrap();
    assert_eq!(due.deleted, 1);
}

#[tokio::test]
async fn test_sweep_tolerates_concurrent_delete() {
    let app = helpers::TestApp::new();
    let mut session = app.sessions.create_session_at(at(0));
    app.sessions.save(&mut session).await.unwrap();

    let sweep = {
        let sessions = Arc::clone(&app.sessions);
        tokio::spawn(async move { sessions.cleanup_expired_sessions_at(at(5000)).await })
    };
    app.sessions.delete(session.id()).await.unwrap();

    let report = sweep.await.unwrap().unwrap();
    assert_eq!(report.failed, 0);
    assert_eq!(app.store.record_count(SESSION_TABLE), 0);
}

#[tokio::test]
async fn test_cleanup_job_runs_against_wall_clock() {
    let app = helpers::TestApp::new();
    let mut stale = app.sessions.create_session_at(at(0));
    app.sessions.save(&mut stale).await.unwrap();
    let mut fresh = app.sessions.create_session();
    app.sessions.save(&mut fresh).await.unwrap();

    let job = SessionCleanupJob::new(Arc::clone(&app.sessions));
    let report = job.run().await.unwrap();
    assert_eq!(report.deleted, 1);
    assert!(app.sessions.get_session(fresh.id()).await.unwrap().is_some());
}
