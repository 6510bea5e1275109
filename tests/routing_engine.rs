use async_trait::async_trait;
use greenstream_router::carbon::aggregator::CarbonSource;
use greenstream_router::domain::decision::Policy;
use greenstream_router::domain::pop::PopConfig;
use greenstream_router::domain::reading::{Measurement, ZoneIntensity};
use greenstream_router::latency::prober::LatencySource;
use greenstream_router::router::decision_log::DecisionLog;
use greenstream_router::router::engine::RoutingEngine;
use greenstream_router::router::weights::Weights;
use std::collections::BTreeMap;
use std::sync::Arc;

struct FixedCarbon(BTreeMap<String, f64>);

#[async_trait]
impl CarbonSource for FixedCarbon {
    async fn zone_intensity(&self, zone: &str) -> ZoneIntensity {
        let value = self.0.get(zone).copied().unwrap_or(500.0);
        ZoneIntensity {
            zone: zone.to_string(),
            carbon_intensity: value,
            raw_carbon: value,
            source: "test".to_string(),
            measurement: Measurement::Average,
            fresh_seconds: 0,
            timestamp: chrono::Utc::now(),
        }
    }
}

struct FixedLatency(BTreeMap<String, f64>);

#[async_trait]
impl LatencySource for FixedLatency {
    async fn probe_all(&self) -> BTreeMap<String, f64> {
        self.0.clone()
    }
}

fn map(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn engine(
    pops: &[&str],
    carbon: &[(&str, f64)],
    latency: &[(&str, f64)],
    slo_ms: f64,
    weights: Weights,
    log_dir: &std::path::Path,
) -> RoutingEngine {
    RoutingEngine {
        carbon: Arc::new(FixedCarbon(map(carbon))),
        latency: Arc::new(FixedLatency(map(latency))),
        pops: pops
            .iter()
            .map(|id| PopConfig::new(id, &format!("http://{}.test", id)))
            .collect(),
        default_pop: "eu-west".to_string(),
        slo_ms,
        weights,
        log: DecisionLog::new(log_dir),
    }
}

#[tokio::test]
async fn weighted_tie_selects_first_configured_pop() {
    let dir = tempfile::tempdir().unwrap();
    // Carbon favors X, latency favors Y; at 0.5/0.5 both score 0.5 and
    // the declared order breaks the tie.
    let e = engine(
        &["x", "y"],
        &[("x", 100.0), ("y", 200.0)],
        &[("x", 90.0), ("y", 50.0)],
        100.0,
        Weights { alpha: 0.5, beta: 0.5 },
        dir.path(),
    );

    let decision = e.route("vid-1", Policy::Weighted, None).await;
    assert_eq!(decision.selected_pop, "x");
    assert_eq!(decision.baseline_pop, "y");
    assert_eq!(decision.policy_used, "weighted");
    assert!(decision.fallback_reason.is_none());
    assert!((decision.carbon_saved - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn weighted_prefers_dominating_pop() {
    let dir = tempfile::tempdir().unwrap();
    let e = engine(
        &["x", "y"],
        &[("x", 100.0), ("y", 200.0)],
        &[("x", 50.0), ("y", 90.0)],
        100.0,
        Weights { alpha: 0.5, beta: 0.5 },
        dir.path(),
    );

    let decision = e.route("vid-2", Policy::Weighted, None).await;
    assert_eq!(decision.selected_pop, "x");
}

#[tokio::test]
async fn empty_acceptable_set_uses_default_pop() {
    let dir = tempfile::tempdir().unwrap();
    let e = engine(
        &["us-east", "eu-west"],
        &[("us-east", 400.0), ("eu-west", 300.0)],
        &[("us-east", 150.0), ("eu-west", 120.0)],
        80.0,
        Weights { alpha: 0.5, beta: 0.5 },
        dir.path(),
    );

    let decision = e.route("vid-3", Policy::Weighted, None).await;
    assert_eq!(decision.selected_pop, "eu-west");
    assert_eq!(
        decision.fallback_reason.as_deref(),
        Some("no_acceptable_latency")
    );
    // Baseline is still the raw-latency winner over all POPs.
    assert_eq!(decision.baseline_pop, "eu-west");
}

#[tokio::test]
async fn latency_policy_ignores_carbon() {
    let dir = tempfile::tempdir().unwrap();
    let e = engine(
        &["green", "fast"],
        &[("green", 50.0), ("fast", 900.0)],
        &[("green", 70.0), ("fast", 30.0)],
        100.0,
        Weights { alpha: 0.5, beta: 0.5 },
        dir.path(),
    );

    let decision = e.route("vid-4", Policy::Latency, None).await;
    assert_eq!(decision.selected_pop, "fast");
    assert_eq!(decision.policy_used, "latency");
}

#[tokio::test]
async fn carbon_policy_accepts_latency_cost_within_slo() {
    let dir = tempfile::tempdir().unwrap();
    let e = engine(
        &["green", "fast"],
        &[("green", 50.0), ("fast", 900.0)],
        &[("green", 70.0), ("fast", 30.0)],
        100.0,
        Weights { alpha: 0.5, beta: 0.5 },
        dir.path(),
    );

    let decision = e.route("vid-5", Policy::Carbon, None).await;
    assert_eq!(decision.selected_pop, "green");
    assert_eq!(decision.baseline_pop, "fast");
    assert!((decision.carbon_saved - 850.0).abs() < 1e-9);
    assert!((decision.selected_latency - 70.0).abs() < 1e-9);
}

#[tokio::test]
async fn slo_cut_excludes_slow_pops_from_selection() {
    let dir = tempfile::tempdir().unwrap();
    // The greenest POP misses the SLO; selection must come from the
    // acceptable set only.
    let e = engine(
        &["green", "fast"],
        &[("green", 50.0), ("fast", 900.0)],
        &[("green", 140.0), ("fast", 30.0)],
        100.0,
        Weights { alpha: 0.5, beta: 0.5 },
        dir.path(),
    );

    let decision = e.route("vid-6", Policy::Carbon, None).await;
    assert_eq!(decision.selected_pop, "fast");
    assert!(decision.fallback_reason.is_none());
}

#[tokio::test]
async fn decision_is_persisted_to_the_dated_partition() {
    let dir = tempfile::tempdir().unwrap();
    let e = engine(
        &["x", "y"],
        &[("x", 100.0), ("y", 200.0)],
        &[("x", 40.0), ("y", 50.0)],
        100.0,
        Weights { alpha: 0.5, beta: 0.5 },
        dir.path(),
    );

    let decision = e.route("vid-7", Policy::Weighted, Some("batch1")).await;
    let date = decision.timestamp.format("%Y%m%d").to_string();
    let path = dir.path().join(format!("routing_{}_batch1.jsonl", date));
    let contents = std::fs::read_to_string(path).unwrap();
    assert_eq!(contents.lines().count(), 1);
    assert!(contents.contains("vid-7"));
}

#[tokio::test]
async fn log_write_failure_does_not_fail_the_decision() {
    // Pointing the log at a plain file makes every append fail.
    let bogus = tempfile::NamedTempFile::new().unwrap();
    let e = engine(
        &["x", "y"],
        &[("x", 100.0), ("y", 200.0)],
        &[("x", 40.0), ("y", 50.0)],
        100.0,
        Weights { alpha: 0.5, beta: 0.5 },
        bogus.path(),
    );

    let decision = e.route("vid-8", Policy::Weighted, None).await;
    assert_eq!(decision.selected_pop, "x");
}
