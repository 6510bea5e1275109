use crate::domain::pop::PopConfig;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Sentinel reported when every probe attempt against a POP fails. Finite
/// so decision records stay serializable, large enough that no SLO ever
/// admits it; the POP stays in the result map rather than being dropped.
pub const UNREACHABLE_LATENCY_MS: f64 = 99_999.0;

#[async_trait::async_trait]
pub trait LatencySource: Send + Sync {
    /// Complete `pop -> latency_ms` map over every configured POP.
    async fn probe_all(&self) -> BTreeMap<String, f64>;
}

pub struct LatencyProbe {
    pub pops: Vec<PopConfig>,
    timeout: Duration,
    max_retries: u32,
    client: reqwest::Client,
    last_probe: RwLock<Option<(DateTime<Utc>, BTreeMap<String, f64>)>>,
}

impl LatencyProbe {
    pub fn new(
        pops: Vec<PopConfig>,
        timeout: Duration,
        max_retries: u32,
        client: reqwest::Client,
    ) -> Self {
        Self {
            pops,
            timeout,
            max_retries: max_retries.max(1),
            client,
            last_probe: RwLock::new(None),
        }
    }

    pub fn knows_pop(&self, pop: &str) -> bool {
        self.pops.iter().any(|p| p.id == pop)
    }

    /// Most recent full probe result, if any.
    pub async fn snapshot(&self) -> Option<(DateTime<Utc>, BTreeMap<String, f64>)> {
        self.last_probe.read().await.clone()
    }

    async fn probe_pop(&self, pop: &str, url: &str) -> f64 {
        for attempt in 1..=self.max_retries {
            let start = Instant::now();
            match self
                .client
                .head(url)
                .timeout(self.timeout)
                .send()
                .await
            {
                Ok(resp) if resp.status().is_success() => {
                    return start.elapsed().as_secs_f64() * 1000.0;
                }
                Ok(resp) => {
                    tracing::warn!(
                        pop,
                        status = resp.status().as_u16(),
                        attempt,
                        "probe returned non-success status"
                    );
                }
                Err(e) => {
                    tracing::warn!(pop, error = %e, attempt, "probe failed");
                }
            }

            if attempt < self.max_retries {
                let jitter = rand::random::<u64>() % 50;
                tokio::time::sleep(Duration::from_millis(100 * attempt as u64 + jitter)).await;
            }
        }

        tracing::error!(pop, "all probe attempts failed");
        UNREACHABLE_LATENCY_MS
    }
}

#[async_trait::async_trait]
impl LatencySource for LatencyProbe {
    async fn probe_all(&self) -> BTreeMap<String, f64> {
        let probes = self
            .pops
            .iter()
            .map(|p| async move { (p.id.clone(), self.probe_pop(&p.id, &p.endpoint_url).await) });
        let latencies: BTreeMap<String, f64> = join_all(probes).await.into_iter().collect();

        *self.last_probe.write().await = Some((Utc::now(), latencies.clone()));
        latencies
    }
}
