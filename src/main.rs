use axum::routing::get;
use axum::Router;
use greenstream_router::carbon::aggregator::CarbonAggregator;
use greenstream_router::carbon::cache::RedisReadingCache;
use greenstream_router::config::AppConfig;
use greenstream_router::latency::prober::LatencyProbe;
use greenstream_router::providers::electricitymap::ElectricityMapProvider;
use greenstream_router::providers::eso::EsoProvider;
use greenstream_router::providers::gridstatus::GridStatusProvider;
use greenstream_router::providers::watttime::WattTimeProvider;
use greenstream_router::providers::CarbonProvider;
use greenstream_router::router::decision_log::DecisionLog;
use greenstream_router::router::engine::RoutingEngine;
use greenstream_router::router::weights::Weights;
use greenstream_router::AppState;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();
    let client = reqwest::Client::new();

    let cache = Arc::new(RedisReadingCache::new(&cfg.redis_url)?);
    let providers: Vec<Arc<dyn CarbonProvider>> = vec![
        Arc::new(WattTimeProvider::new(&cfg, client.clone())),
        Arc::new(EsoProvider::new(&cfg, client.clone())),
        Arc::new(GridStatusProvider::new(&cfg, client.clone())),
        Arc::new(ElectricityMapProvider::new(&cfg, client.clone())),
    ];
    let aggregator = Arc::new(CarbonAggregator::new(providers, cache));

    let prober = Arc::new(LatencyProbe::new(
        cfg.pops.clone(),
        Duration::from_millis(cfg.probe_timeout_ms),
        cfg.probe_max_retries,
        client,
    ));

    let weights = Weights::load(
        Path::new(&cfg.optimized_weights_path),
        cfg.routing_alpha,
        cfg.routing_beta,
    );
    tracing::info!(
        alpha = weights.alpha,
        beta = weights.beta,
        slo_ms = cfg.latency_slo_ms,
        "initialized routing engine"
    );

    let engine = Arc::new(RoutingEngine {
        carbon: aggregator.clone(),
        latency: prober.clone(),
        pops: cfg.pops.clone(),
        default_pop: cfg.default_pop.clone(),
        slo_ms: cfg.latency_slo_ms,
        weights,
        log: DecisionLog::new(&cfg.log_dir),
    });

    let state = AppState {
        aggregator,
        prober,
        engine,
    };

    let app = Router::new()
        .route(
            "/video/:video_id",
            get(greenstream_router::http::handlers::routing::route_video),
        )
        .route(
            "/carbon",
            get(greenstream_router::http::handlers::carbon::get_carbon),
        )
        .route(
            "/carbon/all",
            get(greenstream_router::http::handlers::carbon::get_all_carbon),
        )
        .route(
            "/latency",
            get(greenstream_router::http::handlers::latency::get_latency),
        )
        .route(
            "/metrics",
            get(greenstream_router::http::handlers::ops::metrics),
        )
        .route("/health", get(greenstream_router::http::handlers::ops::health))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
