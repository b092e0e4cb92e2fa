use crate::error::{Result, ScraperError};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;
use fernet::Fernet;
use std::env;

const KEY_LEN: usize = 32;
const KEY_PADDING: u8 = b'0';

/// Encrypts portal passwords at rest with a key derived from the process secret.
///
/// The key is the first 32 bytes of the secret, right-padded with ASCII `'0'`
/// bytes, encoded as a URL-safe base64 Fernet key. Tokens written by an
/// earlier deployment with the same secret stay readable.
pub struct CredentialCipher {
    fernet: Fernet,
}

impl CredentialCipher {
    pub fn from_secret(secret: &str) -> Result<Self> {
        let mut key = [KEY_PADDING; KEY_LEN];
        let bytes = secret.as_bytes();
        let len = bytes.len().min(KEY_LEN);
        key[..len].copy_from_slice(&bytes[..len]);

        let fernet = Fernet::new(&URL_SAFE.encode(key))
            .ok_or_else(|| ScraperError::ConfigError("could not build the Fernet key".to_string()))?;
        Ok(Self { fernet })
    }

    /// Builds the cipher from the `SECRET_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let secret = env::var("SECRET_KEY")
            .map_err(|_| ScraperError::ConfigError("SECRET_KEY is not set".to_string()))?;
        Self::from_secret(&secret)
    }

    pub fn encrypt(&self, cleartext: &str) -> String {
        self.fernet.encrypt(cleartext.as_bytes())
    }

    pub fn decrypt(&self, token: &str) -> Result<String> {
        let bytes = self
            .fernet
            .decrypt(token)
            .map_err(|_| ScraperError::DecryptionError)?;
        String::from_utf8(bytes).map_err(|_| ScraperError::DecryptionError)
    }
}
