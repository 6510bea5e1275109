use crate::config::AppConfig;
use crate::domain::reading::{CarbonReading, Measurement};
use crate::providers::{CarbonProvider, ProviderError, ProviderResponse};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// National grid operator for Great Britain. Public REST read, average-type
/// intensity per half-hour settlement period.
pub struct EsoProvider {
    pub base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl EsoProvider {
    pub fn new(cfg: &AppConfig, client: reqwest::Client) -> Self {
        Self {
            base_url: cfg.eso_base_url.clone(),
            timeout: Duration::from_millis(cfg.provider_timeout_ms),
            client,
        }
    }
}

#[async_trait::async_trait]
impl CarbonProvider for EsoProvider {
    fn id(&self) -> &'static str {
        "ESO"
    }

    fn cache_ttl(&self) -> Duration {
        Duration::from_secs(300)
    }

    async fn fetch(&self, zone: &str) -> Result<ProviderResponse, ProviderError> {
        if zone != "GBR-13" {
            return Ok(ProviderResponse::NotApplicable);
        }

        let resp = self
            .client
            .get(format!("{}/regional/regionid/13", self.base_url))
            .timeout(self.timeout)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ProviderError::Status(resp.status().as_u16()));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        let period = body
            .get("data")
            .and_then(|d| d.get(0))
            .ok_or_else(|| ProviderError::Malformed("response missing data[0]".to_string()))?;
        let actual = period
            .get("intensity")
            .and_then(|i| i.get("actual"))
            .and_then(|v| v.as_f64())
            .ok_or_else(|| {
                ProviderError::Malformed("response missing intensity.actual".to_string())
            })?;

        let now = Utc::now();
        // Period start doubles as the observation timestamp; age feeds the
        // aggregator's freshness penalty.
        let timestamp = period
            .get("from")
            .and_then(|v| v.as_str())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or(now);
        let age_seconds = (now - timestamp).num_seconds().max(0) as u64;

        Ok(ProviderResponse::Reading(CarbonReading {
            gco2_per_kwh: actual.max(0.0),
            timestamp,
            source: "ESO".to_string(),
            measurement: Measurement::Average,
            age_seconds,
        }))
    }
}
