use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("Request to the portal failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Invalid portal URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("The portal session appears to have expired")]
    SessionExpired,

    #[error("Authentication failed. Please check your credentials.")]
    AuthenticationFailed,

    #[error("Could not find the login token on the page")]
    TokenNotFound,

    #[error("Stored credential could not be decrypted")]
    DecryptionError,

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Record store failure: {0}")]
    StoreError(String),
}

impl ScraperError {
    /// Whether the dispatcher may retry the same crawl without new credentials.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RequestError(_) | Self::SessionExpired)
    }
}

pub type Result<T> = std::result::Result<T, ScraperError>;
