use crate::domain::decision::RoutingDecision;
use crate::replay::analyzer::{carbon_savings_percent, mean_reward};
use crate::router::weights::Weights;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TuningOutcome {
    pub weights: Weights,
    pub num_decisions: usize,
    pub average_reward: f64,
    pub carbon_savings_percent: f64,
}

/// Grid search over the alpha axis with beta constrained to 1 - alpha.
/// Off-diagonal pairs are deliberately not explored; ties keep the lowest
/// alpha encountered first.
pub fn grid_search(decisions: &[RoutingDecision]) -> Weights {
    let mut best = Weights { alpha: 0.5, beta: 0.5 };
    let mut best_reward = f64::NEG_INFINITY;

    for step in 1..=9 {
        let alpha = step as f64 / 10.0;
        let beta = 1.0 - alpha;
        let reward = mean_reward(decisions, alpha, beta);
        if reward > best_reward {
            best_reward = reward;
            best = Weights { alpha, beta };
        }
    }

    best
}

pub fn tune(decisions: &[RoutingDecision]) -> Option<TuningOutcome> {
    if decisions.is_empty() {
        return None;
    }

    let weights = grid_search(decisions);
    Some(TuningOutcome {
        weights,
        num_decisions: decisions.len(),
        average_reward: mean_reward(decisions, weights.alpha, weights.beta),
        carbon_savings_percent: carbon_savings_percent(decisions),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn decision(carbon: &[(&str, f64)], latency: &[(&str, f64)], selected: &str) -> RoutingDecision {
        let carbon_by_pop: BTreeMap<String, f64> =
            carbon.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        let latency_by_pop: BTreeMap<String, f64> =
            latency.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        RoutingDecision {
            decision_id: Uuid::new_v4(),
            video_id: "v".to_string(),
            selected_pop: selected.to_string(),
            baseline_pop: selected.to_string(),
            carbon_saved: 0.0,
            selected_carbon: carbon_by_pop[selected],
            selected_latency: latency_by_pop[selected],
            carbon_by_pop,
            latency_by_pop,
            weights: Weights { alpha: 0.5, beta: 0.5 },
            policy_used: "weighted".to_string(),
            fallback_reason: None,
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn empty_logs_produce_no_outcome() {
        assert!(tune(&[]).is_none());
    }

    #[test]
    fn flat_latency_drives_weight_onto_the_carbon_term() {
        // Latency identical everywhere, carbon spread wide: the normalized
        // latency term is pinned at 1 while the carbon term stays low, so
        // the search walks to the grid end that discounts latency.
        let decisions: Vec<RoutingDecision> = (0..20)
            .map(|_| {
                decision(
                    &[("a", 100.0), ("b", 400.0)],
                    &[("a", 50.0), ("b", 50.0)],
                    "a",
                )
            })
            .collect();

        let best = grid_search(&decisions);
        assert!((best.alpha - 0.1).abs() < 1e-9);
        assert!((best.beta - 0.9).abs() < 1e-9);
    }
}
