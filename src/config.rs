//! Credentials and polling configuration

use std::fmt;
use std::time::Duration;

/// Default number of status checks before giving up on a report.
/// 20 attempts at the default interval allows five minutes for generation,
/// which covers listings exports for catalogs of typical size.
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 20;

/// Default delay before each status check, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;

/// Configuration errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required credential is empty
    #[error("missing credential: {0} must not be empty")]
    MissingCredential(&'static str),

    /// Poll settings are unusable
    #[error("invalid poll configuration: {0}")]
    InvalidPollConfig(String),
}

/// Seller credentials for one run
///
/// Built once by the caller and handed to the pipeline; nothing in the core
/// reads the environment. `Debug` redacts the secrets.
#[derive(Clone)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
    refresh_token: String,
    marketplace_id: String,
    seller_id: String,
}

impl Credentials {
    /// Create credentials, rejecting empty values
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
        marketplace_id: impl Into<String>,
        seller_id: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let credentials = Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
            marketplace_id: marketplace_id.into(),
            seller_id: seller_id.into(),
        };

        for (name, value) in [
            ("CLIENT_ID", &credentials.client_id),
            ("CLIENT_SECRET", &credentials.client_secret),
            ("REFRESH_TOKEN", &credentials.refresh_token),
            ("MARKETPLACE_ID", &credentials.marketplace_id),
            ("SELLER_ID", &credentials.seller_id),
        ] {
            if value.is_empty() {
                return Err(ConfigError::MissingCredential(name));
            }
        }

        Ok(credentials)
    }

    /// LWA client id
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// LWA client secret
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Long-lived LWA refresh token
    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    /// Marketplace the report is requested for
    pub fn marketplace_id(&self) -> &str {
        &self.marketplace_id
    }

    /// Seller the credentials belong to
    pub fn seller_id(&self) -> &str {
        &self.seller_id
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("marketplace_id", &self.marketplace_id)
            .field("seller_id", &self.seller_id)
            .finish()
    }
}

/// Fixed-cadence polling settings
///
/// The poller sleeps `interval` before every status check and performs at most
/// `max_attempts` checks. There is no backoff and no jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    max_attempts: u32,
    interval: Duration,
}

impl PollConfig {
    /// Create poll settings; at least one attempt is required
    pub fn new(max_attempts: u32, interval: Duration) -> Result<Self, ConfigError> {
        if max_attempts == 0 {
            return Err(ConfigError::InvalidPollConfig(
                "max attempts must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            max_attempts,
            interval,
        })
    }

    /// Maximum number of status checks
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before each status check
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Total time spent sleeping if the report never finishes
    pub fn worst_case_wait(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }
}
