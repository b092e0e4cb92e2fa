use crate::client::UnatrackCoreClient;
use crate::config::ClientConfig;
use crate::error::{Result, ScraperError};
use crate::models::{Credentials, ScrapeResult, ScrapedCourse};
use tracing::{Instrument, error, info, info_span, warn};

/// Message reported for every kind of login failure.
pub const LOGIN_FAILED: &str = "Falha no login";

/// Runs a complete crawl for one account and reports it as a [`ScrapeResult`].
///
/// Never returns an error: a failed login becomes `"Falha no login"` and any
/// later failure becomes the error's message. The session is closed on every
/// path.
pub async fn scrape_account(config: &ClientConfig, credentials: &Credentials) -> ScrapeResult {
    let span = info_span!("scrape_account", ra = %credentials.ra);
    run(config, credentials).instrument(span).await
}

async fn run(config: &ClientConfig, credentials: &Credentials) -> ScrapeResult {
    let client = match UnatrackCoreClient::with_config(config.clone()) {
        Ok(client) => client,
        Err(e) => {
            error!("Could not build the HTTP client: {}", e);
            return ScrapeResult::failed(e.to_string());
        }
    };

    if let Err(e) = client.login(&credentials.ra, &credentials.password).await {
        warn!("Login failed: {}", e);
        client.close();
        return ScrapeResult::failed(LOGIN_FAILED);
    }

    let outcome = crawl(&client).await;
    client.close();

    match outcome {
        Ok(courses) => {
            let result = ScrapeResult::completed(courses);
            info!(
                "Scrape finished: {} courses, {} activities",
                result.courses.len(),
                result.assignments_count
            );
            result
        }
        Err(e) => {
            error!("Scrape failed: {}", e);
            ScrapeResult::failed(e.to_string())
        }
    }
}

async fn crawl(client: &UnatrackCoreClient) -> Result<Vec<ScrapedCourse>> {
    let courses = client.get_courses().await?;
    let mut scraped = Vec::with_capacity(courses.len());

    for course in courses {
        let assignments = match course.href.as_deref() {
            Some(href) => match client.get_assignments(href).await {
                Ok(assignments) => assignments,
                Err(ScraperError::SessionExpired) => {
                    warn!(
                        "Session expired while opening '{}', reporting it without activities",
                        course.name
                    );
                    Vec::new()
                }
                Err(e) => return Err(e),
            },
            None => {
                warn!("Course '{}' has no link, skipping its activities", course.name);
                Vec::new()
            }
        };
        scraped.push(ScrapedCourse {
            course_info: course,
            assignments,
        });
    }

    Ok(scraped)
}
