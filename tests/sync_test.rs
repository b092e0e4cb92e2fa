// tests/sync_test.rs

mod common;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use common::*;
use unatrack_core::alerts::{DEFAULT_LOOKAHEAD_DAYS, pending_alerts};
use unatrack_core::sync::{UserId, sync_all, sync_user};
use unatrack_core::{
    Activity, Course, CredentialCipher, InMemoryStore, RecordStore, Result, ScraperError,
    StoredCredentials,
};
use wiremock::MockServer;

const SECRET: &str = "test-secret-for-the-sync-suite";

fn cipher() -> CredentialCipher {
    CredentialCipher::from_secret(SECRET).unwrap()
}

async fn store_with_user(user_id: UserId, password: &str) -> InMemoryStore {
    let store = InMemoryStore::new();
    store
        .set_credentials(
            user_id,
            StoredCredentials {
                ra: RA.to_string(),
                encrypted_password: cipher().encrypt(password),
            },
        )
        .await;
    store
}

#[tokio::test]
async fn user_without_credentials_is_reported() {
    let server = MockServer::start().await;
    let store = InMemoryStore::new();

    let report = sync_user(&store, &cipher(), &test_config(&server), 1).await;

    assert!(!report.success);
    assert_eq!(report.error.as_deref(), Some("Credenciais UNAERP não encontradas"));
}

#[tokio::test]
async fn undecryptable_password_is_reported() {
    let server = MockServer::start().await;
    let store = InMemoryStore::new();
    store
        .set_credentials(
            1,
            StoredCredentials {
                ra: RA.to_string(),
                encrypted_password: "not-a-fernet-token".to_string(),
            },
        )
        .await;

    let report = sync_user(&store, &cipher(), &test_config(&server), 1).await;

    assert!(!report.success);
    assert_eq!(report.error.as_deref(), Some("Erro ao acessar credenciais"));
}

#[tokio::test]
async fn password_from_another_secret_is_reported() {
    let server = MockServer::start().await;
    let store = InMemoryStore::new();
    let foreign = CredentialCipher::from_secret("some-other-secret").unwrap();
    store
        .set_credentials(
            1,
            StoredCredentials {
                ra: RA.to_string(),
                encrypted_password: foreign.encrypt(PASSWORD),
            },
        )
        .await;

    let report = sync_user(&store, &cipher(), &test_config(&server), 1).await;

    assert_eq!(report.error.as_deref(), Some("Erro ao acessar credenciais"));
}

#[tokio::test]
async fn login_failure_is_passed_through() {
    let server = MockServer::start().await;
    mount_portal(&server).await;
    let store = store_with_user(1, "senha-antiga").await;

    let report = sync_user(&store, &cipher(), &test_config(&server), 1).await;

    assert!(!report.success);
    assert_eq!(report.error.as_deref(), Some("Falha no login"));
    assert!(store.last_synced(1).await.is_none());
}

#[tokio::test]
async fn first_sync_creates_records_and_second_is_idempotent() {
    let server = MockServer::start().await;
    mount_portal(&server).await;
    let store = store_with_user(1, PASSWORD).await;
    let config = test_config(&server);

    let first = sync_user(&store, &cipher(), &config, 1).await;
    assert!(first.success, "unexpected error: {:?}", first.error);
    assert_eq!(first.courses_created, 2);
    assert_eq!(first.assignments_created, 3);
    assert_eq!(first.total_courses, 2);
    assert_eq!(first.total_assignments, 3);
    let synced_at = store.last_synced(1).await.expect("sync timestamp");

    let second = sync_user(&store, &cipher(), &config, 1).await;
    assert!(second.success);
    assert_eq!(second.courses_created, 0);
    assert_eq!(second.assignments_created, 0);
    assert_eq!(second.total_assignments, 3);
    assert!(store.last_synced(1).await.unwrap() >= synced_at);

    assert_eq!(store.courses(1).await.len(), 2);
    let stored = store.activities(1).await;
    assert_eq!(stored.len(), 3);
    let list = stored.iter().find(|a| a.title == "Lista 1").unwrap();
    assert_eq!(list.course_name, "Cálculo I");
    assert_eq!(list.due_date, NaiveDate::from_ymd_opt(2025, 11, 20));
    assert!(!list.completed);
}

#[tokio::test]
async fn synced_activities_feed_the_alert_window() {
    let server = MockServer::start().await;
    mount_portal(&server).await;
    let store = store_with_user(1, PASSWORD).await;

    sync_user(&store, &cipher(), &test_config(&server), 1).await;
    let today = NaiveDate::from_ymd_opt(2025, 11, 12).unwrap();

    let alerts = pending_alerts(&store.activities(1).await, today, DEFAULT_LOOKAHEAD_DAYS);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].title, "Prova 1");
    assert_eq!(alerts[0].days_until_due, 2);

    assert!(store.mark_alert_sent(1, "Cálculo I", "Prova 1").await);
    assert!(pending_alerts(&store.activities(1).await, today, DEFAULT_LOOKAHEAD_DAYS).is_empty());
}

#[tokio::test]
async fn sync_all_isolates_users() {
    let server = MockServer::start().await;
    mount_portal(&server).await;
    let store = store_with_user(1, PASSWORD).await;

    let reports = sync_all(&store, &cipher(), &test_config(&server), &[1, 2]).await;

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].0, 1);
    assert!(reports[0].1.success);
    assert_eq!(reports[1].0, 2);
    assert_eq!(
        reports[1].1.error.as_deref(),
        Some("Credenciais UNAERP não encontradas")
    );
}

/// A store whose writes always fail.
struct BrokenStore {
    credentials: StoredCredentials,
}

#[async_trait]
impl RecordStore for BrokenStore {
    async fn credentials(&self, _user_id: UserId) -> Result<Option<StoredCredentials>> {
        Ok(Some(self.credentials.clone()))
    }

    async fn upsert_course(&self, _user_id: UserId, _course: &Course) -> Result<bool> {
        Err(ScraperError::StoreError("database is read-only".to_string()))
    }

    async fn upsert_activity(
        &self,
        _user_id: UserId,
        _course_name: &str,
        _activity: &Activity,
    ) -> Result<bool> {
        Ok(true)
    }

    async fn mark_synced(&self, _user_id: UserId, _at: DateTime<Utc>) -> Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn store_failures_are_unexpected_errors() {
    let server = MockServer::start().await;
    mount_portal(&server).await;
    let store = BrokenStore {
        credentials: StoredCredentials {
            ra: RA.to_string(),
            encrypted_password: cipher().encrypt(PASSWORD),
        },
    };

    let report = sync_user(&store, &cipher(), &test_config(&server), 1).await;

    assert!(!report.success);
    assert_eq!(
        report.error.as_deref(),
        Some("Erro inesperado: Record store failure: database is read-only")
    );
}
