use serde::{Deserialize, Serialize};

/// Static edge location configuration. The order POPs are declared in is the
/// deterministic tie-break order used by the routing engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopConfig {
    pub id: String,
    pub endpoint_url: String,
}

impl PopConfig {
    pub fn new(id: &str, endpoint_url: &str) -> Self {
        Self {
            id: id.to_string(),
            endpoint_url: endpoint_url.to_string(),
        }
    }
}
