use crate::carbon::aggregator::CarbonSource;
use crate::domain::decision::{Policy, RoutingDecision};
use crate::domain::pop::PopConfig;
use crate::latency::prober::{LatencySource, UNREACHABLE_LATENCY_MS};
use crate::router::decision_log::DecisionLog;
use crate::router::weights::Weights;
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

pub struct RoutingEngine {
    pub carbon: Arc<dyn CarbonSource>,
    pub latency: Arc<dyn LatencySource>,
    pub pops: Vec<PopConfig>,
    pub default_pop: String,
    pub slo_ms: f64,
    pub weights: Weights,
    pub log: DecisionLog,
}

/// Min–max normalization over one metric of the candidate set. All members
/// normalize to 0 when the metric is flat, which collapses the weighted
/// score to 0 for everyone and leaves the tie-break to configured order.
pub fn min_max_normalize(pops: &[&str], values: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    let vals: Vec<f64> = pops
        .iter()
        .map(|p| values.get(*p).copied().unwrap_or(UNREACHABLE_LATENCY_MS))
        .collect();
    let min = vals.iter().copied().fold(f64::INFINITY, f64::min);
    let max = vals.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    pops.iter()
        .zip(vals)
        .map(|(pop, v)| {
            let norm = if max > min { (v - min) / (max - min) } else { 0.0 };
            (pop.to_string(), norm)
        })
        .collect()
}

/// Picks the candidate minimizing `value`, with strict less-than so the
/// first POP in configured order wins ties.
fn min_pop<'a>(pops: &[&'a str], value: impl Fn(&str) -> f64) -> &'a str {
    let mut best = pops[0];
    let mut best_value = value(best);
    for pop in &pops[1..] {
        let v = value(pop);
        if v < best_value {
            best = pop;
            best_value = v;
        }
    }
    best
}

impl RoutingEngine {
    pub async fn route(
        &self,
        video_id: &str,
        policy: Policy,
        log_suffix: Option<&str>,
    ) -> RoutingDecision {
        let (carbon_by_pop, latency_by_pop) =
            tokio::join!(self.carbon_by_pop(), self.latency.probe_all());

        let acceptable: Vec<&str> = self
            .pops
            .iter()
            .map(|p| p.id.as_str())
            .filter(|id| {
                latency_by_pop
                    .get(*id)
                    .is_some_and(|l| *l <= self.slo_ms)
            })
            .collect();

        let (selected_pop, fallback_reason) = if acceptable.is_empty() {
            tracing::warn!(
                video_id,
                default_pop = %self.default_pop,
                "no POP meets the latency SLO"
            );
            (
                self.default_pop.clone(),
                Some("no_acceptable_latency".to_string()),
            )
        } else {
            let selected = match policy {
                Policy::Latency => min_pop(&acceptable, |pop| {
                    latency_by_pop
                        .get(pop)
                        .copied()
                        .unwrap_or(UNREACHABLE_LATENCY_MS)
                }),
                Policy::Carbon => min_pop(&acceptable, |pop| {
                    carbon_by_pop.get(pop).copied().unwrap_or(f64::MAX)
                }),
                Policy::Weighted => {
                    let norm_carbon = min_max_normalize(&acceptable, &carbon_by_pop);
                    let norm_latency = min_max_normalize(&acceptable, &latency_by_pop);
                    min_pop(&acceptable, |pop| {
                        self.weights.alpha * norm_carbon[pop] + self.weights.beta * norm_latency[pop]
                    })
                }
            };
            (selected.to_string(), None)
        };

        // Baseline is the raw-latency winner over every configured POP,
        // independent of the SLO cut and the policy in play.
        let all_pops: Vec<&str> = self.pops.iter().map(|p| p.id.as_str()).collect();
        let baseline_pop = min_pop(&all_pops, |pop| {
            latency_by_pop
                .get(pop)
                .copied()
                .unwrap_or(UNREACHABLE_LATENCY_MS)
        })
        .to_string();

        let carbon_of = |pop: &str| carbon_by_pop.get(pop).copied().unwrap_or(0.0);
        let decision = RoutingDecision {
            decision_id: Uuid::new_v4(),
            video_id: video_id.to_string(),
            carbon_saved: carbon_of(&baseline_pop) - carbon_of(&selected_pop),
            selected_carbon: carbon_of(&selected_pop),
            selected_latency: latency_by_pop
                .get(&selected_pop)
                .copied()
                .unwrap_or(UNREACHABLE_LATENCY_MS),
            selected_pop,
            baseline_pop,
            carbon_by_pop,
            latency_by_pop,
            weights: self.weights,
            policy_used: policy.as_str().to_string(),
            fallback_reason,
            timestamp: chrono::Utc::now(),
        };

        if let Err(e) = self.log.append(&decision, log_suffix) {
            tracing::error!(
                video_id,
                error = %e,
                "failed to persist routing decision"
            );
        }

        decision
    }

    async fn carbon_by_pop(&self) -> BTreeMap<String, f64> {
        let walks = self.pops.iter().map(|p| async move {
            let intensity = self.carbon.zone_intensity(&p.id).await;
            (p.id.clone(), intensity.carbon_intensity)
        });
        join_all(walks).await.into_iter().collect()
    }
}
