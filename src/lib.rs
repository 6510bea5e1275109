pub mod config;
pub mod domain {
    pub mod decision;
    pub mod pop;
    pub mod reading;
}
pub mod providers;
pub mod carbon {
    pub mod aggregator;
    pub mod cache;
}
pub mod latency {
    pub mod prober;
}
pub mod router {
    pub mod decision_log;
    pub mod engine;
    pub mod weights;
}
pub mod replay {
    pub mod analyzer;
    pub mod loader;
    pub mod tuner;
}
pub mod http {
    pub mod handlers {
        pub mod carbon;
        pub mod latency;
        pub mod ops;
        pub mod routing;
    }
}

use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<carbon::aggregator::CarbonAggregator>,
    pub prober: Arc<latency::prober::LatencyProbe>,
    pub engine: Arc<router::engine::RoutingEngine>,
}
