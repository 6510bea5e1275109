use crate::router::weights::Weights;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    Weighted,
    Latency,
    Carbon,
}

impl Policy {
    pub fn parse(s: &str) -> Option<Policy> {
        match s {
            "weighted" => Some(Policy::Weighted),
            "latency" => Some(Policy::Latency),
            "carbon" => Some(Policy::Carbon),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Policy::Weighted => "weighted",
            Policy::Latency => "latency",
            Policy::Carbon => "carbon",
        }
    }
}

/// One routing decision. Appended as a single JSONL line to the dated
/// partition and never mutated after write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub decision_id: Uuid,
    pub video_id: String,
    pub selected_pop: String,
    pub baseline_pop: String,
    pub carbon_by_pop: BTreeMap<String, f64>,
    pub latency_by_pop: BTreeMap<String, f64>,
    pub weights: Weights,
    pub policy_used: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    pub carbon_saved: f64,
    pub selected_carbon: f64,
    pub selected_latency: f64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_parses_known_values_only() {
        assert_eq!(Policy::parse("weighted"), Some(Policy::Weighted));
        assert_eq!(Policy::parse("latency"), Some(Policy::Latency));
        assert_eq!(Policy::parse("carbon"), Some(Policy::Carbon));
        assert_eq!(Policy::parse("fastest"), None);
        assert_eq!(Policy::parse("Weighted"), None);
    }
}
