use crate::carbon::cache::ReadingCache;
use crate::domain::reading::{CarbonReading, Measurement, ZoneIntensity};
use crate::providers::{CarbonProvider, ProviderResponse};
use chrono::Utc;
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Staleness stamped on fallback readings, 24 hours.
const FALLBACK_AGE_SECONDS: u64 = 86_400;

/// Maps an external zone or POP name to the zone code a provider
/// understands. Unmapped names pass through verbatim.
pub fn provider_zone(external: &str) -> &str {
    match external {
        "sfo" | "lax" | "sea" => "CAISO_NORTH",
        "iad" | "nyc" => "NYISO",
        "atl" | "chi" => "PJM",
        "lon" | "man" => "GBR-13",
        "ams" => "ENTSOE_NL",
        "fra" | "par" => "ENTSOE_FR",
        "ber" => "ENTSOE_DE",
        "us-east" => "US-NY-NYIS",
        "eu-west" => "EM-EU",
        "ap-southeast" => "EM-AP",
        other => other,
    }
}

/// Every external zone name with a provider mapping; the population of
/// `/carbon/all`.
pub fn mapped_zones() -> &'static [&'static str] {
    &[
        "sfo",
        "lax",
        "sea",
        "iad",
        "nyc",
        "atl",
        "chi",
        "lon",
        "man",
        "ams",
        "fra",
        "ber",
        "par",
        "us-east",
        "eu-west",
        "ap-southeast",
    ]
}

/// Static intensities used when every provider is exhausted.
pub fn fallback_intensity(zone: &str) -> f64 {
    match zone {
        "eu-west" => 300.0,
        "ap-southeast" => 450.0,
        "us-west" => 350.0,
        "us-central" => 400.0,
        _ => 500.0,
    }
}

/// One extra gram per minute of staleness beyond a 10-minute grace window.
pub fn freshness_penalty(age_seconds: u64) -> f64 {
    age_seconds.saturating_sub(600) as f64 / 60.0
}

/// What the routing engine consumes: an adjusted intensity per zone,
/// always produced, never an error.
#[async_trait::async_trait]
pub trait CarbonSource: Send + Sync {
    async fn zone_intensity(&self, zone: &str) -> ZoneIntensity;
}

/// Walks the provider priority chain per zone. The chain is a fallback
/// ladder, not a race: the first usable reading wins and later providers
/// are never consulted for that call.
pub struct CarbonAggregator {
    pub providers: Vec<Arc<dyn CarbonProvider>>,
    pub cache: Arc<dyn ReadingCache>,
}

impl CarbonAggregator {
    pub fn new(providers: Vec<Arc<dyn CarbonProvider>>, cache: Arc<dyn ReadingCache>) -> Self {
        Self { providers, cache }
    }

    pub async fn all_intensities(&self) -> BTreeMap<String, ZoneIntensity> {
        let walks = mapped_zones()
            .iter()
            .map(|zone| async move { (zone.to_string(), self.resolve(zone).await) });
        join_all(walks).await.into_iter().collect()
    }

    async fn resolve(&self, zone: &str) -> ZoneIntensity {
        let pzone = provider_zone(zone);

        for provider in &self.providers {
            let key = format!("{}:{}", provider.id(), pzone);

            if let Some(mut cached) = self.cache.get(&key).await {
                cached.age_seconds = (Utc::now() - cached.timestamp).num_seconds().max(0) as u64;
                return to_intensity(zone, cached);
            }

            match provider.fetch(pzone).await {
                Ok(ProviderResponse::Reading(reading)) => {
                    self.cache.put(&key, &reading, provider.cache_ttl()).await;
                    return to_intensity(zone, reading);
                }
                Ok(ProviderResponse::NotApplicable) => {}
                Err(e) => {
                    tracing::warn!(
                        provider = provider.id(),
                        zone = pzone,
                        error = %e,
                        "carbon provider failed"
                    );
                }
            }
        }

        let intensity = fallback_intensity(zone);
        tracing::warn!(zone, intensity, "all carbon providers exhausted, using static fallback");
        to_intensity(
            zone,
            CarbonReading {
                gco2_per_kwh: intensity,
                timestamp: Utc::now(),
                source: "fallback".to_string(),
                measurement: Measurement::Average,
                age_seconds: FALLBACK_AGE_SECONDS,
            },
        )
    }
}

fn to_intensity(zone: &str, reading: CarbonReading) -> ZoneIntensity {
    ZoneIntensity {
        zone: zone.to_string(),
        carbon_intensity: reading.gco2_per_kwh + freshness_penalty(reading.age_seconds),
        raw_carbon: reading.gco2_per_kwh,
        source: reading.source,
        measurement: reading.measurement,
        fresh_seconds: reading.age_seconds,
        timestamp: reading.timestamp,
    }
}

#[async_trait::async_trait]
impl CarbonSource for CarbonAggregator {
    async fn zone_intensity(&self, zone: &str) -> ZoneIntensity {
        self.resolve(zone).await
    }
}
