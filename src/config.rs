use crate::domain::pop::PopConfig;

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub redis_url: String,
    pub watttime_username: Option<String>,
    pub watttime_password: Option<String>,
    pub watttime_base_url: String,
    pub eso_base_url: String,
    pub gridstatus_lambda_url: Option<String>,
    pub electricity_maps_api_key: Option<String>,
    pub electricity_maps_base_url: String,
    pub provider_timeout_ms: u64,
    pub pops: Vec<PopConfig>,
    pub default_pop: String,
    pub latency_slo_ms: f64,
    pub probe_timeout_ms: u64,
    pub probe_max_retries: u32,
    pub routing_alpha: f64,
    pub routing_beta: f64,
    pub log_dir: String,
    pub optimized_weights_path: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379/".to_string()),
            watttime_username: std::env::var("WATTTIME_USERNAME").ok(),
            watttime_password: std::env::var("WATTTIME_PASSWORD").ok(),
            watttime_base_url: std::env::var("WATTTIME_BASE_URL")
                .unwrap_or_else(|_| "https://api2.watttime.org/v3".to_string()),
            eso_base_url: std::env::var("ESO_BASE_URL")
                .unwrap_or_else(|_| "https://api.carbonintensity.org.uk".to_string()),
            gridstatus_lambda_url: std::env::var("GRIDSTATUS_LAMBDA_URL").ok(),
            electricity_maps_api_key: std::env::var("ELECTRICITY_MAPS_API_KEY").ok(),
            electricity_maps_base_url: std::env::var("ELECTRICITY_MAPS_BASE_URL")
                .unwrap_or_else(|_| "https://api.electricitymap.org/v3".to_string()),
            provider_timeout_ms: std::env::var("PROVIDER_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(5000),
            pops: vec![
                PopConfig::new(
                    "us-east",
                    &std::env::var("CDN_POP_US_EAST")
                        .unwrap_or_else(|_| "http://localhost:8001".to_string()),
                ),
                PopConfig::new(
                    "eu-west",
                    &std::env::var("CDN_POP_EU_WEST")
                        .unwrap_or_else(|_| "http://localhost:8002".to_string()),
                ),
                PopConfig::new(
                    "ap-southeast",
                    &std::env::var("CDN_POP_AP_SOUTHEAST")
                        .unwrap_or_else(|_| "http://localhost:8003".to_string()),
                ),
            ],
            default_pop: std::env::var("DEFAULT_POP").unwrap_or_else(|_| "eu-west".to_string()),
            latency_slo_ms: std::env::var("LATENCY_SLO_MS")
                .ok()
                .and_then(|s| s.parse::<f64>().ok())
                .unwrap_or(80.0),
            probe_timeout_ms: std::env::var("PROBE_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1000),
            probe_max_retries: std::env::var("PROBE_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or(3),
            routing_alpha: std::env::var("ROUTING_ALPHA")
                .ok()
                .and_then(|s| s.parse::<f64>().ok())
                .unwrap_or(0.5),
            routing_beta: std::env::var("ROUTING_BETA")
                .ok()
                .and_then(|s| s.parse::<f64>().ok())
                .unwrap_or(0.5),
            log_dir: std::env::var("ROUTING_LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            optimized_weights_path: std::env::var("OPTIMIZED_WEIGHTS_PATH")
                .unwrap_or_else(|_| "ml/optimized_weights.json".to_string()),
        }
    }
}
