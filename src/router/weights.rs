use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Carbon/latency trade-off weights. `alpha` scales the normalized carbon
/// term and `beta` the normalized latency term in the weighted policy;
/// alpha + beta is expected to stay close to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub alpha: f64,
    pub beta: f64,
}

impl Weights {
    /// Loads a previously tuned artifact if one exists, otherwise falls back
    /// to the configured defaults. Called once at engine construction; there
    /// is no hot reload.
    pub fn load(path: &Path, default_alpha: f64, default_beta: f64) -> Weights {
        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<Weights>(&raw) {
                Ok(weights) => {
                    tracing::info!(
                        path = %path.display(),
                        alpha = weights.alpha,
                        beta = weights.beta,
                        "loaded tuned routing weights"
                    );
                    weights
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "tuned weights unreadable, using defaults"
                    );
                    Weights {
                        alpha: default_alpha,
                        beta: default_beta,
                    }
                }
            },
            Err(_) => Weights {
                alpha: default_alpha,
                beta: default_beta,
            },
        }
    }

    pub fn store(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }
}
