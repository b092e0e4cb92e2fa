// Declare all our modules
pub mod alerts;
mod cipher;
mod client;
mod config;
mod error;
mod models;
pub mod parsers;
mod scrape;
pub mod sync;

// Publicly export the parts of our library that users will need
pub use cipher::CredentialCipher;
pub use client::UnatrackCoreClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{Result, ScraperError};
pub use models::*; // Exposes all structs like Course, Activity, ScrapeResult, etc.
pub use parsers::date::parse_due_date;
pub use scrape::{LOGIN_FAILED, scrape_account};
pub use sync::{InMemoryStore, RecordStore, StoredActivity, StoredCredentials, SyncReport};
