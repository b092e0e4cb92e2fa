//! Persists crawl results for registered users.

mod memory;

pub use memory::InMemoryStore;

use crate::cipher::CredentialCipher;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::models::{Activity, Course, Credentials};
use crate::scrape::scrape_account;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, error, info, info_span};

pub type UserId = u64;

const MISSING_CREDENTIALS: &str = "Credenciais UNAERP não encontradas";
const UNREADABLE_CREDENTIALS: &str = "Erro ao acessar credenciais";

/// Portal credentials as kept by the record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub ra: String,
    /// Fernet token produced by [`CredentialCipher::encrypt`].
    pub encrypted_password: String,
}

/// An activity as persisted for a user, with its notification state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredActivity {
    pub course_name: String,
    pub title: String,
    pub url: String,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    pub alert_sent: bool,
}

/// Storage backend for users' courses and activities.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// The user's portal credentials, or `None` when none were registered.
    async fn credentials(&self, user_id: UserId) -> Result<Option<StoredCredentials>>;

    /// Inserts the course keyed by `(user, course name)` if it is new.
    /// Returns `true` when it was created.
    async fn upsert_course(&self, user_id: UserId, course: &Course) -> Result<bool>;

    /// Inserts the activity keyed by `(user, course name, title)` if it is new.
    /// An existing record only gains a due date when it had none.
    /// Returns `true` when it was created.
    async fn upsert_activity(
        &self,
        user_id: UserId,
        course_name: &str,
        activity: &Activity,
    ) -> Result<bool>;

    async fn mark_synced(&self, user_id: UserId, at: DateTime<Utc>) -> Result<()>;
}

/// Outcome of syncing one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub success: bool,
    pub courses_created: usize,
    pub assignments_created: usize,
    pub total_courses: usize,
    pub total_assignments: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncReport {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Crawls the portal for one user and stores what was found.
pub async fn sync_user<S>(
    store: &S,
    cipher: &CredentialCipher,
    config: &ClientConfig,
    user_id: UserId,
) -> SyncReport
where
    S: RecordStore + ?Sized,
{
    let span = info_span!("sync_user", user_id);
    async {
        let report = match run(store, cipher, config, user_id).await {
            Ok(report) => report,
            Err(e) => {
                error!("Unexpected error while syncing: {}", e);
                SyncReport::failed(format!("Erro inesperado: {e}"))
            }
        };
        info!(
            "Sync finished: success={}, {} new courses, {} new activities",
            report.success, report.courses_created, report.assignments_created
        );
        report
    }
    .instrument(span)
    .await
}

async fn run<S>(
    store: &S,
    cipher: &CredentialCipher,
    config: &ClientConfig,
    user_id: UserId,
) -> Result<SyncReport>
where
    S: RecordStore + ?Sized,
{
    let Some(stored) = store.credentials(user_id).await? else {
        error!("User has no portal credentials");
        return Ok(SyncReport::failed(MISSING_CREDENTIALS));
    };

    let password = match cipher.decrypt(&stored.encrypted_password) {
        Ok(password) => password,
        Err(e) => {
            error!("Could not decrypt the stored password: {}", e);
            return Ok(SyncReport::failed(UNREADABLE_CREDENTIALS));
        }
    };

    let result = scrape_account(config, &Credentials::new(stored.ra, password)).await;
    if !result.success {
        let message = result.error.unwrap_or_default();
        error!("Scrape failed: {}", message);
        return Ok(SyncReport::failed(message));
    }

    let mut report = SyncReport {
        success: true,
        total_courses: result.courses.len(),
        total_assignments: result.assignments_count,
        ..Default::default()
    };

    for scraped in &result.courses {
        let course = &scraped.course_info;
        if store.upsert_course(user_id, course).await? {
            report.courses_created += 1;
            info!("Course created: {}", course.name);
        }

        for activity in &scraped.assignments {
            if store.upsert_activity(user_id, &course.name, activity).await? {
                report.assignments_created += 1;
                info!("Activity created: {} ({})", activity.title, course.name);
            }
        }
    }

    store.mark_synced(user_id, Utc::now()).await?;
    Ok(report)
}

/// Syncs several users concurrently. Each user gets an independent crawl, so
/// one failure never affects the others. Reports come back in input order.
pub async fn sync_all<S>(
    store: &S,
    cipher: &CredentialCipher,
    config: &ClientConfig,
    user_ids: &[UserId],
) -> Vec<(UserId, SyncReport)>
where
    S: RecordStore + ?Sized,
{
    info!("Starting sync for {} users", user_ids.len());
    let reports = futures::future::join_all(
        user_ids
            .iter()
            .map(|&user_id| sync_user(store, cipher, config, user_id)),
    )
    .await;

    user_ids.iter().copied().zip(reports).collect()
}
