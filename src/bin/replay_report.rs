use anyhow::Result;
use greenstream_router::replay::analyzer::analyze;
use greenstream_router::replay::loader::{LogReplayer, LogSelection};
use greenstream_router::router::weights::Weights;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let log_dir = std::env::var("ROUTING_LOG_DIR").unwrap_or_else(|_| "logs".to_string());
    let selection = match (std::env::var("REPLAY_DATE"), std::env::var("REPLAY_SUFFIX")) {
        (Ok(date), Ok(suffix)) => LogSelection::DateSuffix(date, suffix),
        (Ok(date), Err(_)) => LogSelection::Date(date),
        _ => LogSelection::All,
    };

    let weights = Weights {
        alpha: std::env::var("ROUTING_ALPHA")
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.5),
        beta: std::env::var("ROUTING_BETA")
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.5),
    };

    let replayer = LogReplayer::new(&log_dir);
    let decisions = replayer.load(&selection)?;
    if decisions.is_empty() {
        println!("No decisions found in {}", log_dir);
        return Ok(());
    }

    let report = analyze(&decisions, weights);

    println!("Routing Analysis Report");
    println!("{}", "=".repeat(50));
    println!("Number of decisions: {}", report.num_decisions);

    println!("\nCarbon Impact");
    println!("{}", "-".repeat(20));
    println!(
        "Carbon savings vs baseline: {:.2}%",
        report.carbon_savings_percent
    );

    println!("\nLatency Impact");
    println!("{}", "-".repeat(20));
    println!("Mean increase: {:.2}ms", report.latency_impact.mean_increase_ms);
    println!("Max increase: {:.2}ms", report.latency_impact.max_increase_ms);
    println!(
        "95th percentile increase: {:.2}ms",
        report.latency_impact.p95_increase_ms
    );

    println!("\nPOP Statistics");
    println!("{}", "-".repeat(20));
    for (pop, stats) in &report.pop_stats {
        println!("{}:", pop);
        println!(
            "  Selected: {} times ({:.1}%)",
            stats.count, stats.percentage
        );
        println!("  Average latency: {:.2}ms", stats.avg_latency_ms);
        println!("  Average carbon: {:.2} gCO2eq/kWh", stats.avg_carbon);
    }

    println!("\nOverall Performance");
    println!("{}", "-".repeat(20));
    println!("Average reward: {:.4}", report.average_reward);
    Ok(())
}
