use std::sync::Arc;

use crate::config::Config;
use crate::services::ScanService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub scanner: ScanService,
}

impl AppState {
    pub fn new(config: Config, scanner: ScanService) -> Self {
        Self {
            config: Arc::new(config),
            scanner,
        }
    }

    /// Build the scan service from `config` and wrap both.
    pub fn from_config(config: Config) -> Self {
        let scanner = ScanService::from_config(&config);
        Self::new(config, scanner)
    }
}
