use crate::domain::decision::RoutingDecision;
use crate::router::weights::Weights;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct LatencyImpact {
    pub mean_increase_ms: f64,
    pub max_increase_ms: f64,
    pub p95_increase_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PopStats {
    pub count: usize,
    pub percentage: f64,
    pub avg_latency_ms: f64,
    pub avg_carbon: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub num_decisions: usize,
    pub carbon_savings_percent: f64,
    pub latency_impact: LatencyImpact,
    pub average_reward: f64,
    pub pop_stats: BTreeMap<String, PopStats>,
}

/// Percent of carbon saved against the always-lowest-latency baseline.
pub fn carbon_savings_percent(decisions: &[RoutingDecision]) -> f64 {
    let mut selected_total = 0.0;
    let mut baseline_total = 0.0;
    for d in decisions {
        selected_total += d.carbon_by_pop.get(&d.selected_pop).copied().unwrap_or(0.0);
        baseline_total += d.carbon_by_pop.get(&d.baseline_pop).copied().unwrap_or(0.0);
    }

    if baseline_total == 0.0 {
        return 0.0;
    }
    (1.0 - selected_total / baseline_total) * 100.0
}

pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() - 1) as f64 * p).round() as usize;
    sorted[idx]
}

pub fn latency_impact(decisions: &[RoutingDecision]) -> LatencyImpact {
    if decisions.is_empty() {
        return LatencyImpact {
            mean_increase_ms: 0.0,
            max_increase_ms: 0.0,
            p95_increase_ms: 0.0,
        };
    }

    let mut diffs: Vec<f64> = decisions
        .iter()
        .map(|d| {
            let selected = d.latency_by_pop.get(&d.selected_pop).copied().unwrap_or(0.0);
            let baseline = d.latency_by_pop.get(&d.baseline_pop).copied().unwrap_or(0.0);
            selected - baseline
        })
        .collect();
    diffs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    LatencyImpact {
        mean_increase_ms: diffs.iter().sum::<f64>() / diffs.len() as f64,
        max_increase_ms: *diffs.last().unwrap(),
        p95_increase_ms: percentile(&diffs, 0.95),
    }
}

pub fn pop_stats(decisions: &[RoutingDecision]) -> BTreeMap<String, PopStats> {
    let mut pops: Vec<String> = Vec::new();
    for d in decisions {
        for pop in d.latency_by_pop.keys() {
            if !pops.contains(pop) {
                pops.push(pop.clone());
            }
        }
    }

    let mut stats = BTreeMap::new();
    for pop in pops {
        let selected: Vec<&RoutingDecision> = decisions
            .iter()
            .filter(|d| d.selected_pop == pop)
            .collect();
        if selected.is_empty() {
            continue;
        }

        let count = selected.len();
        let latency_sum: f64 = selected
            .iter()
            .map(|d| d.latency_by_pop.get(&pop).copied().unwrap_or(0.0))
            .sum();
        let carbon_sum: f64 = selected
            .iter()
            .map(|d| d.carbon_by_pop.get(&pop).copied().unwrap_or(0.0))
            .sum();

        stats.insert(
            pop,
            PopStats {
                count,
                percentage: count as f64 / decisions.len() as f64 * 100.0,
                avg_latency_ms: latency_sum / count as f64,
                avg_carbon: carbon_sum / count as f64,
            },
        );
    }
    stats
}

/// Reward of a single decision under arbitrary weights, higher is better.
/// Latency and carbon are each normalized by the maximum observed within
/// that decision's own POP set, so decisions with different POP universes
/// remain comparable.
pub fn reward(decision: &RoutingDecision, alpha: f64, beta: f64) -> f64 {
    let latency = decision
        .latency_by_pop
        .get(&decision.selected_pop)
        .copied()
        .unwrap_or(0.0);
    let carbon = decision
        .carbon_by_pop
        .get(&decision.selected_pop)
        .copied()
        .unwrap_or(0.0);

    let max_latency = decision
        .latency_by_pop
        .values()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let max_carbon = decision
        .carbon_by_pop
        .values()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    let norm_latency = if max_latency > 0.0 { latency / max_latency } else { 0.0 };
    let norm_carbon = if max_carbon > 0.0 { carbon / max_carbon } else { 0.0 };

    -(alpha * norm_latency + beta * norm_carbon)
}

pub fn mean_reward(decisions: &[RoutingDecision], alpha: f64, beta: f64) -> f64 {
    if decisions.is_empty() {
        return 0.0;
    }
    decisions.iter().map(|d| reward(d, alpha, beta)).sum::<f64>() / decisions.len() as f64
}

pub fn analyze(decisions: &[RoutingDecision], default_weights: Weights) -> ReplayReport {
    ReplayReport {
        num_decisions: decisions.len(),
        carbon_savings_percent: carbon_savings_percent(decisions),
        latency_impact: latency_impact(decisions),
        average_reward: mean_reward(decisions, default_weights.alpha, default_weights.beta),
        pop_stats: pop_stats(decisions),
    }
}
