use super::{RecordStore, StoredActivity, StoredCredentials, UserId};
use crate::error::Result;
use crate::models::{Activity, Course};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;

#[derive(Default)]
struct Records {
    credentials: HashMap<UserId, StoredCredentials>,
    courses: BTreeMap<(UserId, String), Course>,
    activities: BTreeMap<(UserId, String, String), StoredActivity>,
    last_sync: HashMap<UserId, DateTime<Utc>>,
}

/// A [`RecordStore`] kept in process memory.
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<Records>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_credentials(&self, user_id: UserId, credentials: StoredCredentials) {
        self.records
            .lock()
            .await
            .credentials
            .insert(user_id, credentials);
    }

    pub async fn courses(&self, user_id: UserId) -> Vec<Course> {
        let records = self.records.lock().await;
        records
            .courses
            .iter()
            .filter(|((owner, _), _)| *owner == user_id)
            .map(|(_, course)| course.clone())
            .collect()
    }

    /// The user's activities ordered by course name, then title.
    pub async fn activities(&self, user_id: UserId) -> Vec<StoredActivity> {
        let records = self.records.lock().await;
        records
            .activities
            .iter()
            .filter(|((owner, _, _), _)| *owner == user_id)
            .map(|(_, activity)| activity.clone())
            .collect()
    }

    pub async fn last_synced(&self, user_id: UserId) -> Option<DateTime<Utc>> {
        self.records.lock().await.last_sync.get(&user_id).copied()
    }

    /// Flags an activity as already notified. Returns `false` if it is unknown.
    pub async fn mark_alert_sent(&self, user_id: UserId, course_name: &str, title: &str) -> bool {
        let mut records = self.records.lock().await;
        let key = (user_id, course_name.to_string(), title.to_string());
        match records.activities.get_mut(&key) {
            Some(activity) => {
                activity.alert_sent = true;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn credentials(&self, user_id: UserId) -> Result<Option<StoredCredentials>> {
        Ok(self.records.lock().await.credentials.get(&user_id).cloned())
    }

    async fn upsert_course(&self, user_id: UserId, course: &Course) -> Result<bool> {
        let mut records = self.records.lock().await;
        let key = (user_id, course.name.clone());
        if records.courses.contains_key(&key) {
            return Ok(false);
        }
        records.courses.insert(key, course.clone());
        Ok(true)
    }

    async fn upsert_activity(
        &self,
        user_id: UserId,
        course_name: &str,
        activity: &Activity,
    ) -> Result<bool> {
        let mut records = self.records.lock().await;
        let key = (user_id, course_name.to_string(), activity.title.clone());

        if let Some(existing) = records.activities.get_mut(&key) {
            if existing.due_date.is_none() {
                existing.due_date = activity.due_date;
            }
            return Ok(false);
        }

        records.activities.insert(
            key,
            StoredActivity {
                course_name: course_name.to_string(),
                title: activity.title.clone(),
                url: activity.url.clone(),
                due_date: activity.due_date,
                completed: false,
                alert_sent: false,
            },
        );
        Ok(true)
    }

    async fn mark_synced(&self, user_id: UserId, at: DateTime<Utc>) -> Result<()> {
        self.records.lock().await.last_sync.insert(user_id, at);
        Ok(())
    }
}
