use crate::config::AppConfig;
use crate::domain::reading::{CarbonReading, Measurement};
use crate::providers::{CarbonProvider, ProviderError, ProviderResponse};
use std::collections::BTreeMap;
use std::time::Duration;

/// Intensity reported when the fuel mix is empty or totals zero.
const FALLBACK_INTENSITY: f64 = 500.0;

/// Per-fuel emission factors in kg CO2/MWh, numerically equal to g CO2/kWh.
pub fn fuel_co2_factor(fuel: &str) -> f64 {
    match fuel {
        "Nuclear" | "Hydro" | "Wind" | "Solar" | "Geothermal" => 0.0,
        "Biomass" => 230.0,
        "Coal" => 1000.0,
        "Natural Gas" => 450.0,
        "Oil" => 650.0,
        _ => 500.0,
    }
}

/// Generation-weighted average intensity of a fuel mix. Zero or missing
/// generation falls back to a fixed default rather than dividing by zero.
pub fn intensity_from_fuel_mix(mix: &BTreeMap<String, f64>) -> f64 {
    let mut total_mwh = 0.0;
    let mut total_co2 = 0.0;
    for (fuel, mwh) in mix {
        if *mwh > 0.0 {
            total_mwh += mwh;
            total_co2 += mwh * fuel_co2_factor(fuel);
        }
    }

    if total_mwh > 0.0 {
        total_co2 / total_mwh
    } else {
        FALLBACK_INTENSITY
    }
}

/// US-East grid data comes through a serverless wrapper around the grid
/// operator feeds; the wrapper returns the raw fuel mix and intensity is
/// computed here.
pub struct GridStatusProvider {
    lambda_url: Option<String>,
    timeout: Duration,
    client: reqwest::Client,
}

impl GridStatusProvider {
    pub fn new(cfg: &AppConfig, client: reqwest::Client) -> Self {
        Self {
            lambda_url: cfg.gridstatus_lambda_url.clone(),
            timeout: Duration::from_millis(cfg.provider_timeout_ms),
            client,
        }
    }
}

#[async_trait::async_trait]
impl CarbonProvider for GridStatusProvider {
    fn id(&self) -> &'static str {
        "GS"
    }

    fn cache_ttl(&self) -> Duration {
        Duration::from_secs(900)
    }

    async fn fetch(&self, zone: &str) -> Result<ProviderResponse, ProviderError> {
        if zone != "NYISO" && zone != "PJM" {
            return Ok(ProviderResponse::NotApplicable);
        }

        let Some(lambda_url) = &self.lambda_url else {
            return Err(ProviderError::Credentials);
        };

        let resp = self
            .client
            .get(format!("{}/fuel-mix?iso={}", lambda_url, zone))
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
        let mix: BTreeMap<String, f64> = body
            .get("fuel_mix")
            .and_then(|m| m.as_object())
            .map(|obj| {
                obj.iter()
                    .filter_map(|(fuel, mwh)| mwh.as_f64().map(|v| (fuel.clone(), v)))
                    .collect()
            })
            .unwrap_or_default();

        Ok(ProviderResponse::Reading(CarbonReading {
            gco2_per_kwh: intensity_from_fuel_mix(&mix),
            timestamp: chrono::Utc::now(),
            source: "GridStatus".to_string(),
            measurement: Measurement::Average,
            age_seconds: 0,
        }))
    }
}
