use greenstream_router::domain::decision::RoutingDecision;
use greenstream_router::replay::analyzer::analyze;
use greenstream_router::replay::loader::{LogReplayer, LogSelection};
use greenstream_router::replay::tuner::tune;
use greenstream_router::router::decision_log::DecisionLog;
use greenstream_router::router::weights::Weights;
use std::collections::BTreeMap;
use std::path::Path;
use uuid::Uuid;

fn map(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn decision(
    video_id: &str,
    selected: &str,
    baseline: &str,
    carbon: &[(&str, f64)],
    latency: &[(&str, f64)],
) -> RoutingDecision {
    let carbon_by_pop = map(carbon);
    let latency_by_pop = map(latency);
    RoutingDecision {
        decision_id: Uuid::new_v4(),
        video_id: video_id.to_string(),
        selected_pop: selected.to_string(),
        baseline_pop: baseline.to_string(),
        carbon_saved: carbon_by_pop[baseline] - carbon_by_pop[selected],
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
fn logged_decision_round_trips_field_for_field() {
    let dir = tempfile::tempdir().unwrap();
    let log = DecisionLog::new(dir.path());

    let original = decision(
        "vid-1",
        "eu-west",
        "us-east",
        &[("us-east", 420.5), ("eu-west", 120.25)],
        &[("us-east", 35.75), ("eu-west", 61.5)],
    );
    log.append(&original, None).unwrap();

    let date = original.timestamp.format("%Y%m%d").to_string();
    let replayer = LogReplayer::new(dir.path());
    let loaded = replayer.load(&LogSelection::Date(date)).unwrap();

    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0], original);
}

#[test]
fn selection_filters_partitions() {
    let dir = tempfile::tempdir().unwrap();
    let log = DecisionLog::new(dir.path());

    let plain = decision(
        "plain",
        "a",
        "a",
        &[("a", 100.0), ("b", 200.0)],
        &[("a", 40.0), ("b", 60.0)],
    );
    let suffixed = decision(
        "suffixed",
        "b",
        "a",
        &[("a", 100.0), ("b", 200.0)],
        &[("a", 40.0), ("b", 60.0)],
    );
    log.append(&plain, None).unwrap();
    log.append(&suffixed, Some("batch1")).unwrap();

    let date = plain.timestamp.format("%Y%m%d").to_string();
    let replayer = LogReplayer::new(dir.path());

    let all = replayer.load(&LogSelection::All).unwrap();
    assert_eq!(all.len(), 2);

    let by_date = replayer.load(&LogSelection::Date(date.clone())).unwrap();
    assert_eq!(by_date.len(), 2);

    let exact = replayer
        .load(&LogSelection::DateSuffix(date, "batch1".to_string()))
        .unwrap();
    assert_eq!(exact.len(), 1);
    assert_eq!(exact[0].video_id, "suffixed");
}

#[test]
fn malformed_lines_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let log = DecisionLog::new(dir.path());

    let d = decision(
        "good",
        "a",
        "a",
        &[("a", 100.0), ("b", 200.0)],
        &[("a", 40.0), ("b", 60.0)],
    );
    log.append(&d, None).unwrap();

    let date = d.timestamp.format("%Y%m%d").to_string();
    let path = dir.path().join(format!("routing_{}.jsonl", date));
    let mut contents = std::fs::read_to_string(&path).unwrap();
    contents.push_str("{not json at all\n");
    std::fs::write(&path, contents).unwrap();

    let replayer = LogReplayer::new(dir.path());
    let loaded = replayer.load(&LogSelection::All).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].video_id, "good");
}

#[test]
fn missing_log_dir_yields_no_decisions() {
    let replayer = LogReplayer::new("/nonexistent/decision-logs");
    let loaded = replayer.load(&LogSelection::All).unwrap();
    assert!(loaded.is_empty());
}

#[test]
fn replay_report_aggregates_loaded_decisions() {
    let dir = tempfile::tempdir().unwrap();
    let log = DecisionLog::new(dir.path());

    // Two decisions trading 30ms of latency for half the carbon.
    for i in 0..2 {
        let d = decision(
            &format!("vid-{}", i),
            "green",
            "fast",
            &[("green", 100.0), ("fast", 200.0)],
            &[("green", 70.0), ("fast", 40.0)],
        );
        log.append(&d, None).unwrap();
    }

    let replayer = LogReplayer::new(dir.path());
    let decisions = replayer.load(&LogSelection::All).unwrap();
    let report = analyze(&decisions, Weights { alpha: 0.5, beta: 0.5 });

    assert_eq!(report.num_decisions, 2);
    assert!((report.carbon_savings_percent - 50.0).abs() < 1e-9);
    assert!((report.latency_impact.mean_increase_ms - 30.0).abs() < 1e-9);
    assert!((report.latency_impact.max_increase_ms - 30.0).abs() < 1e-9);
    let green = &report.pop_stats["green"];
    assert_eq!(green.count, 2);
    assert!((green.percentage - 100.0).abs() < 1e-9);
}

#[test]
fn tuning_on_flat_latency_logs_writes_carbon_heavy_weights() {
    let dir = tempfile::tempdir().unwrap();
    let log = DecisionLog::new(dir.path());

    // Carbon spread wide, latency identical: the reward's latency term is
    // saturated, so the search lands on the carbon-heavy corner of the grid.
    for i in 0..20 {
        let d = decision(
            &format!("vid-{}", i),
            "a",
            "a",
            &[("a", 100.0), ("b", 400.0)],
            &[("a", 50.0), ("b", 50.0)],
        );
        log.append(&d, None).unwrap();
    }

    let replayer = LogReplayer::new(dir.path());
    let decisions = replayer.load(&LogSelection::All).unwrap();
    let outcome = tune(&decisions).unwrap();
    assert_eq!(outcome.num_decisions, 20);
    assert!((outcome.weights.alpha - 0.1).abs() < 1e-9);
    assert!((outcome.weights.beta - 0.9).abs() < 1e-9);

    // The artifact the engine will pick up on its next construction.
    let artifact = dir.path().join("optimized_weights.json");
    outcome.weights.store(&artifact).unwrap();
    let loaded = Weights::load(Path::new(&artifact), 0.5, 0.5);
    assert_eq!(loaded, outcome.weights);
}
