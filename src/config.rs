use crate::error::{Result, ScraperError};
use crate::models::DelayConfig;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://ead.unaerp.br";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/100.0.0.0 Safari/537.36";

const LOGIN_PATH: &str = "/login/index.php";
const DASHBOARD_PATH: &str = "/my/";

/// Transport settings for one portal client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root of the portal, e.g. `https://ead.unaerp.br`.
    pub base_url: Url,
    pub user_agent: String,
    /// Per-request timeout. A stalled page fails the crawl instead of hanging it.
    pub request_timeout: Duration,
    pub delay: DelayConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            // The literal is a valid absolute URL.
            base_url: Url::parse(DEFAULT_BASE_URL).unwrap(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(30),
            delay: DelayConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Builds a config for a portal at `base_url` with default transport settings.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            ..Default::default()
        })
    }

    /// Reads overrides from the environment (loading `.env` first when present).
    ///
    /// Recognized variables: `UNAERP_BASE_URL`, `UNAERP_TIMEOUT_SECS`,
    /// `UNAERP_DELAY_ENABLED`, `UNAERP_DELAY_MIN_MS`, `UNAERP_DELAY_MAX_MS`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();
        if let Ok(base_url) = env::var("UNAERP_BASE_URL") {
            config.base_url = Url::parse(&base_url)?;
        }
        if let Some(secs) = env_parse::<u64>("UNAERP_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(enabled) = env_parse::<bool>("UNAERP_DELAY_ENABLED")? {
            config.delay.enabled = enabled;
        }
        if let Some(min) = env_parse::<u64>("UNAERP_DELAY_MIN_MS")? {
            config.delay.min_delay_ms = min;
        }
        if let Some(max) = env_parse::<u64>("UNAERP_DELAY_MAX_MS")? {
            config.delay.max_delay_ms = max;
        }

        if config.delay.min_delay_ms > config.delay.max_delay_ms {
            return Err(ScraperError::ConfigError(format!(
                "delay range is inverted: {}ms > {}ms",
                config.delay.min_delay_ms, config.delay.max_delay_ms
            )));
        }

        Ok(config)
    }

    pub fn login_url(&self) -> Result<Url> {
        Ok(self.base_url.join(LOGIN_PATH)?)
    }

    pub fn dashboard_url(&self) -> Result<Url> {
        Ok(self.base_url.join(DASHBOARD_PATH)?)
    }

    /// Resolves a possibly relative portal link against the base URL.
    pub fn resolve(&self, href: &str) -> Result<Url> {
        Ok(self.base_url.join(href)?)
    }
}

fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ScraperError::ConfigError(format!("{key} has an invalid value: {raw}"))),
        Err(_) => Ok(None),
    }
}
