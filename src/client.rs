use crate::config::ClientConfig;
use crate::error::{Result, ScraperError};
use crate::models::{Activity, Course, Unit};
use crate::parsers;
use crate::parsers::activities::SeenUrls;
use chrono::NaiveDate;
use rand::Rng;
use reqwest::cookie::Jar;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// A fetched page: the URL after redirects and its body.
struct Page {
    url: Url,
    body: String,
}

/// An HTTP session against the portal.
///
/// Each client owns its cookie jar, so one client corresponds to one logged-in
/// account. Requests are strictly sequential.
pub struct UnatrackCoreClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl UnatrackCoreClient {
    /// Creates a client for the production portal with default settings.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let cookie_jar = Arc::new(Jar::default());

        let client = reqwest::Client::builder()
            .cookie_provider(cookie_jar)
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Logs into the portal with a student RA and password.
    pub async fn login(&self, ra: &str, password: &str) -> Result<()> {
        info!("Starting login for user: {}", ra);

        // --- STEP 1: GET the login page to get the "logintoken" ---
        let login_url = self.config.login_url()?;
        let page = self.fetch(login_url.clone()).await?;
        debug!("Login page reached at {}", page.url);

        let token = parsers::login::parse_login_token(&page.body)?;
        debug!(
            "Login token obtained: {}...",
            token.chars().take(10).collect::<String>()
        );

        // --- STEP 2: POST credentials back to the same endpoint ---
        let params = [
            ("username", ra),
            ("password", password),
            ("logintoken", token.as_str()),
            ("anchor", ""),
        ];

        self.pause().await;
        let response = self
            .client
            .post(login_url)
            .form(&params)
            .send()
            .await?
            .error_for_status()?;

        // --- STEP 3: Check where the portal sent us ---
        let final_url = response.url().clone();
        let body = response.text().await?;

        if parsers::login::is_logged_in(&final_url, &body) {
            info!("Login succeeded for user: {}", ra);
            return Ok(());
        }

        warn!("Login failed for user: {}. The final URL was {}", ra, final_url);
        for message in parsers::login::parse_login_errors(&body) {
            warn!("Portal error message: {}", message);
        }
        if parsers::login::is_login_page(&final_url) {
            warn!("Still on the login page after posting credentials");
        }

        Err(ScraperError::AuthenticationFailed)
    }

    /// Lists the enrolled courses from the dashboard.
    ///
    /// Unexpected markup yields an empty list; only transport failures are errors.
    pub async fn get_courses(&self) -> Result<Vec<Course>> {
        let page = self.fetch(self.config.dashboard_url()?).await?;

        if parsers::login::is_login_page(&page.url) {
            warn!("Dashboard redirected to the login page, no courses listed");
            return Ok(Vec::new());
        }

        Ok(parsers::courses::parse_courses_from_html(&page.body))
    }

    /// Crawls a course: discovers its units, visits the gradable ones and
    /// resolves the due date of every activity found.
    ///
    /// Returns [`ScraperError::SessionExpired`] when the course page redirects
    /// to the login form. A unit page that fails to load or redirects to login
    /// is skipped; the remaining units are still visited.
    pub async fn get_assignments(&self, course_url: &str) -> Result<Vec<Activity>> {
        let course_url = self.config.resolve(course_url)?;
        info!("Fetching activities from: {}", course_url);

        let page = self.fetch(course_url.clone()).await?;
        if parsers::login::is_login_page(&page.url) {
            warn!("Redirected to login, the session may have expired");
            return Err(ScraperError::SessionExpired);
        }

        let units = parsers::units::parse_units_from_html(&page.body);
        let gradable: Vec<&Unit> = units.iter().filter(|u| u.has_gradable_activities).collect();
        debug!(
            "Found {} units, {} with gradable activities",
            units.len(),
            gradable.len()
        );

        let mut seen = SeenUrls::new();
        let mut activities = Vec::new();

        for unit in &gradable {
            info!("Unit {} ({}) has activities, visiting it", unit.section, unit.name);

            let section_page = match self.fetch(section_url(&course_url, unit.section)).await {
                Ok(page) => page,
                Err(e) => {
                    warn!("Could not open unit {} of {}: {}", unit.section, course_url, e);
                    continue;
                }
            };
            if parsers::login::is_login_page(&section_page.url) {
                warn!("Unit {} redirected to login, skipping it", unit.section);
                continue;
            }

            let links = parsers::activities::parse_section_activities(
                &section_page.body,
                &section_page.url,
                &mut seen,
            );
            for link in links {
                let due_date = self.get_due_date(&link.url).await;
                let activity = link.into_activity(due_date, Some(*unit));
                log_activity(&activity);
                activities.push(activity);
            }
        }

        if gradable.is_empty() {
            info!("No unit announces gradable activities, scanning the course page");
            let links =
                parsers::activities::parse_main_page_activities(&page.body, &page.url, &mut seen);
            for link in links {
                let due_date = self.get_due_date(&link.url).await;
                let activity = link.into_activity(due_date, None);
                log_activity(&activity);
                activities.push(activity);
            }
        }

        info!("Found {} activities in {}", activities.len(), course_url);
        Ok(activities)
    }

    /// Resolves the deadline of one activity. Never fails: any problem is
    /// logged and reported as "no date".
    pub async fn get_due_date(&self, activity_url: &str) -> Option<NaiveDate> {
        debug!("Extracting due date from: {}", activity_url);

        let url = match self.config.resolve(activity_url) {
            Ok(url) => url,
            Err(e) => {
                warn!("Invalid activity URL {}: {}", activity_url, e);
                return None;
            }
        };

        let page = match self.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Could not open activity {}: {}", activity_url, e);
                return None;
            }
        };

        if parsers::login::is_login_page(&page.url) {
            debug!("Activity {} redirected to login", activity_url);
            return None;
        }

        parsers::due_date::parse_due_date_from_html(&page.body, activity_url)
    }

    /// Releases the session. Dropping the client has the same effect; this
    /// makes the end of a crawl explicit.
    pub fn close(self) {
        debug!("Closing portal session");
    }

    async fn fetch(&self, url: Url) -> Result<Page> {
        self.pause().await;

        let response = self.client.get(url).send().await?.error_for_status()?;
        let url = response.url().clone();
        let body = response.text().await?;

        Ok(Page { url, body })
    }

    /// Sleeps for a random duration within the configured delay range.
    async fn pause(&self) {
        let delay = &self.config.delay;
        if !delay.enabled || delay.max_delay_ms == 0 {
            return;
        }

        let millis = {
            let mut rng = rand::rng();
            rng.random_range(delay.min_delay_ms..=delay.max_delay_ms.max(delay.min_delay_ms))
        };
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}

fn section_url(course_url: &Url, section: u32) -> Url {
    let mut url = course_url.clone();
    url.query_pairs_mut()
        .append_pair("section", &section.to_string());
    url
}

fn log_activity(activity: &Activity) {
    let due = activity
        .due_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "Não definido".to_string());
    info!(
        "Activity found in {}: {} ({}) - due: {}",
        activity.unit_name.as_deref().unwrap_or("course page"),
        activity.title,
        activity.kind,
        due
    );
}
