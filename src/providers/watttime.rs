use crate::config::AppConfig;
use crate::domain::reading::{CarbonReading, Measurement};
use crate::providers::{CarbonProvider, ProviderError, ProviderResponse};
use reqwest::StatusCode;
use serde_json::json;
use std::time::Duration;
use tokio::sync::RwLock;

const LBS_PER_MWH_TO_G_PER_KWH: f64 = 453.59 / 1000.0;

fn is_auth_rejection(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

/// Real-time marginal-emissions provider. Login yields a bearer token that
/// is cached in memory; an expired token gets exactly one re-login before
/// the call surfaces as an auth failure. Concurrent logins are not guarded
/// against: the outcome is idempotent, the cost is one wasted request.
pub struct WattTimeProvider {
    pub base_url: String,
    username: Option<String>,
    password: Option<String>,
    timeout: Duration,
    client: reqwest::Client,
    token: RwLock<Option<String>>,
}

impl WattTimeProvider {
    pub fn new(cfg: &AppConfig, client: reqwest::Client) -> Self {
        Self {
            base_url: cfg.watttime_base_url.clone(),
            username: cfg.watttime_username.clone(),
            password: cfg.watttime_password.clone(),
            timeout: Duration::from_millis(cfg.provider_timeout_ms),
            client,
            token: RwLock::new(None),
        }
    }

    async fn login(&self) -> Result<String, ProviderError> {
        let (Some(username), Some(password)) = (&self.username, &self.password) else {
            return Err(ProviderError::Credentials);
        };

        let resp = self
            .client
            .post(format!("{}/login", self.base_url))
            .json(&json!({ "username": username, "password": password }))
            .timeout(self.timeout)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ProviderError::Auth(format!(
                "login returned {}",
                resp.status()
            )));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        let token = body
            .get("token")
            .and_then(|t| t.as_str())
            .ok_or_else(|| ProviderError::Malformed("login response missing token".to_string()))?
            .to_string();

        *self.token.write().await = Some(token.clone());
        tracing::info!("watttime login successful");
        Ok(token)
    }

    async fn marginal_request(
        &self,
        zone: &str,
        token: &str,
    ) -> Result<reqwest::Response, ProviderError> {
        Ok(self
            .client
            .get(format!("{}/marginal?ba={}", self.base_url, zone))
            .bearer_auth(token)
            .timeout(self.timeout)
            .send()
            .await?)
    }
}

#[async_trait::async_trait]
impl CarbonProvider for WattTimeProvider {
    fn id(&self) -> &'static str {
        "WT"
    }

    fn cache_ttl(&self) -> Duration {
        Duration::from_secs(300)
    }

    async fn fetch(&self, zone: &str) -> Result<ProviderResponse, ProviderError> {
        if zone != "CAISO_NORTH" {
            return Ok(ProviderResponse::NotApplicable);
        }

        let token = match self.token.read().await.clone() {
            Some(t) => t,
            None => self.login().await?,
        };

        let mut resp = self.marginal_request(zone, &token).await?;
        if is_auth_rejection(resp.status()) {
            // Token expired: one re-login, one retry.
            let token = self.login().await?;
            resp = self.marginal_request(zone, &token).await?;
            if is_auth_rejection(resp.status()) {
                return Err(ProviderError::Auth(format!(
                    "marginal request rejected after re-login: {}",
                    resp.status()
                )));
            }
        }

        if !resp.status().is_success() {
            return Err(ProviderError::Status(resp.status().as_u16()));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        let lbs_per_mwh = body
            .get("marginal_carbon_intensity")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| {
                ProviderError::Malformed("response missing marginal_carbon_intensity".to_string())
            })?;

        Ok(ProviderResponse::Reading(CarbonReading {
            gco2_per_kwh: (lbs_per_mwh * LBS_PER_MWH_TO_G_PER_KWH).max(0.0),
            timestamp: chrono::Utc::now(),
            source: "WattTime".to_string(),
            measurement: Measurement::Marginal,
            age_seconds: 0,
        }))
    }
}
