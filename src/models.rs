use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Portal login credentials: the student's RA and cleartext password.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// The student registration number (RA), used as the portal username.
    pub ra: String,
    pub password: String,
}

impl Credentials {
    pub fn new(ra: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            ra: ra.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("ra", &self.ra)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Represents a course the student is enrolled in.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Course {
    /// The course name as shown in the portal navigation.
    pub name: String,
    /// The lecturer. The dashboard does not expose it, so this is usually "N/A".
    pub instructor: String,
    /// Link to the course page, if the portal rendered one.
    pub href: Option<String>,
}

impl Course {
    pub const UNKNOWN_INSTRUCTOR: &'static str = "N/A";

    pub fn new(name: impl Into<String>, href: Option<String>) -> Self {
        Self {
            name: name.into(),
            instructor: Self::UNKNOWN_INSTRUCTOR.to_string(),
            href,
        }
    }
}

/// A numbered instructional unit (course section) discovered from the course tiles.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Unit {
    /// Section number used in the `section=` query parameter. Never 0.
    pub section: u32,
    /// Display name of the unit.
    pub name: String,
    /// Whether the tile tooltip announces assignments or quizzes.
    pub has_gradable_activities: bool,
}

/// Moodle module type of an activity.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Assignment,
    Quiz,
    Workshop,
    Feedback,
    Forum,
    Folder,
    Page,
}

impl ActivityKind {
    /// Classifies an activity by substring match on its URL; unknown modules count as assignments.
    pub fn from_url(url: &str) -> Self {
        const MARKERS: [(&str, ActivityKind); 7] = [
            ("quiz", ActivityKind::Quiz),
            ("assign", ActivityKind::Assignment),
            ("workshop", ActivityKind::Workshop),
            ("feedback", ActivityKind::Feedback),
            ("forum", ActivityKind::Forum),
            ("folder", ActivityKind::Folder),
            ("page", ActivityKind::Page),
        ];

        MARKERS
            .iter()
            .find(|(marker, _)| url.contains(marker))
            .map(|(_, kind)| *kind)
            .unwrap_or(ActivityKind::Assignment)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assignment => "assignment",
            Self::Quiz => "quiz",
            Self::Workshop => "workshop",
            Self::Feedback => "feedback",
            Self::Forum => "forum",
            Self::Folder => "folder",
            Self::Page => "page",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A gradable item found inside a course.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Activity {
    pub title: String,
    /// Absolute URL of the activity page; unique within one course crawl.
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    /// The deadline, when one of the due-date strategies found it.
    pub due_date: Option<NaiveDate>,
    /// Name of the unit the activity was found in. `None` for main-page fallback results.
    pub unit_name: Option<String>,
    pub unit_number: Option<u32>,
}

/// A course together with the activities crawled from it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ScrapedCourse {
    #[serde(flatten)]
    pub course_info: Course,
    pub assignments: Vec<Activity>,
}

/// Outcome of one full-account crawl.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ScrapeResult {
    pub success: bool,
    pub courses: Vec<ScrapedCourse>,
    /// Total number of activities across `courses`.
    pub assignments_count: usize,
    pub error: Option<String>,
}

impl ScrapeResult {
    pub fn completed(courses: Vec<ScrapedCourse>) -> Self {
        let assignments_count = courses.iter().map(|c| c.assignments.len()).sum();
        Self {
            success: true,
            courses,
            assignments_count,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            courses: Vec::new(),
            assignments_count: 0,
            error: Some(error.into()),
        }
    }
}

/// Configuration for spacing out requests with randomized delays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayConfig {
    /// Minimum sleep duration in milliseconds between requests.
    pub min_delay_ms: u64,
    /// Maximum sleep duration in milliseconds between requests.
    pub max_delay_ms: u64,
    /// Whether the randomized delay logic is active.
    pub enabled: bool,
}

impl Default for DelayConfig {
    /// Default configuration: 1000ms - 3000ms, enabled.
    fn default() -> Self {
        Self {
            min_delay_ms: 1000,
            max_delay_ms: 3000,
            enabled: true,
        }
    }
}
