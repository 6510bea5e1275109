use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Measurement {
    Marginal,
    Average,
}

/// One carbon-intensity observation from a single provider. Immutable once
/// produced; `age_seconds` is recomputed when a reading comes back out of the
/// cache so the freshness penalty reflects true age.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarbonReading {
    pub gco2_per_kwh: f64,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub measurement: Measurement,
    pub age_seconds: u64,
}

/// Aggregator output for one zone: the raw reading plus the
/// staleness-adjusted intensity actually used for scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneIntensity {
    pub zone: String,
    pub carbon_intensity: f64,
    pub raw_carbon: f64,
    pub source: String,
    pub measurement: Measurement,
    pub fresh_seconds: u64,
    pub timestamp: DateTime<Utc>,
}
