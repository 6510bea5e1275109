use crate::domain::reading::CarbonReading;
use std::time::Duration;

pub mod electricitymap;
pub mod eso;
pub mod gridstatus;
pub mod watttime;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("credentials not configured")]
    Credentials,
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Transport(e.to_string())
        }
    }
}

/// Three-way outcome of a provider call. A zone outside the provider's
/// coverage is `NotApplicable`, which is not an error and is never logged
/// as one.
#[derive(Debug, Clone)]
pub enum ProviderResponse {
    Reading(CarbonReading),
    NotApplicable,
}

#[async_trait::async_trait]
pub trait CarbonProvider: Send + Sync {
    /// Stable identifier, also the cache namespace prefix.
    fn id(&self) -> &'static str;

    /// How long a reading from this provider stays servable from cache.
    fn cache_ttl(&self) -> Duration;

    async fn fetch(&self, zone: &str) -> Result<ProviderResponse, ProviderError>;
}
