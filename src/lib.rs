pub mod config;
pub mod probe;
pub mod render;
pub mod server;
pub mod status;

use std::sync::Arc;

use config::ServiceConfig;
use status::StatusAggregator;

/// Shared application state passed to every route handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServiceConfig>,
    /// The fixed probe set, built once at startup from config.
    pub aggregator: Arc<StatusAggregator>,
}

impl AppContext {
    pub fn new(config: ServiceConfig) -> Self {
        let aggregator = StatusAggregator::from_config(&config);
        Self {
            config: Arc::new(config),
            aggregator: Arc::new(aggregator),
        }
    }
}
