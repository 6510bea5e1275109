use anyhow::Result;
use greenstream_router::replay::loader::{LogReplayer, LogSelection};
use greenstream_router::replay::tuner::tune;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let log_dir = std::env::var("ROUTING_LOG_DIR").unwrap_or_else(|_| "logs".to_string());
    let output = std::env::var("OPTIMIZED_WEIGHTS_PATH")
        .unwrap_or_else(|_| "ml/optimized_weights.json".to_string());
    let selection = match std::env::var("TUNE_DATE") {
        Ok(date) => LogSelection::Date(date),
        Err(_) => LogSelection::All,
    };

    let replayer = LogReplayer::new(&log_dir);
    let decisions = replayer.load(&selection)?;

    let Some(outcome) = tune(&decisions) else {
        tracing::warn!(log_dir = %log_dir, "no decisions to tune against");
        return Ok(());
    };

    println!("Weight Tuning Results");
    println!("{}", "=".repeat(50));
    println!("Number of decisions: {}", outcome.num_decisions);
    println!("Optimal alpha: {:.3}", outcome.weights.alpha);
    println!("Optimal beta: {:.3}", outcome.weights.beta);
    println!("Carbon savings: {:.2}%", outcome.carbon_savings_percent);
    println!("Average reward: {:.4}", outcome.average_reward);

    outcome.weights.store(Path::new(&output))?;
    println!("\nOptimal weights written to {}", output);
    Ok(())
}
