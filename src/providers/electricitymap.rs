use crate::config::AppConfig;
use crate::domain::reading::{CarbonReading, Measurement};
use crate::providers::{CarbonProvider, ProviderError, ProviderResponse};
use std::time::Duration;

/// Legacy continental aggregator. Broad coverage (every zone), slow update
/// cadence; sits last in the chain and its readings are labeled stale.
pub struct ElectricityMapProvider {
    pub base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    client: reqwest::Client,
}

impl ElectricityMapProvider {
    pub fn new(cfg: &AppConfig, client: reqwest::Client) -> Self {
        Self {
            base_url: cfg.electricity_maps_base_url.clone(),
            api_key: cfg.electricity_maps_api_key.clone(),
            timeout: Duration::from_millis(cfg.provider_timeout_ms),
            client,
        }
    }
}

#[async_trait::async_trait]
impl CarbonProvider for ElectricityMapProvider {
    fn id(&self) -> &'static str {
        "EM"
    }

    fn cache_ttl(&self) -> Duration {
        Duration::from_secs(3600)
    }

    async fn fetch(&self, zone: &str) -> Result<ProviderResponse, ProviderError> {
        let Some(api_key) = &self.api_key else {
            return Err(ProviderError::Credentials);
        };

        let resp = self
            .client
            .get(format!(
                "{}/carbon-intensity/latest?zone={}",
                self.base_url, zone
            ))
            .header("auth-token", api_key)
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
        let intensity = body
            .get("carbonIntensity")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| {
                ProviderError::Malformed("response missing carbonIntensity".to_string())
            })?;

        Ok(ProviderResponse::Reading(CarbonReading {
            gco2_per_kwh: intensity.max(0.0),
            timestamp: chrono::Utc::now(),
            source: "EM-stale".to_string(),
            measurement: Measurement::Average,
            age_seconds: 0,
        }))
    }
}
