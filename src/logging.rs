//! Logger setup: log4rs when its YAML file is present, env_logger otherwise

use std::path::Path;

use log::{info, warn};

use crate::config::LoggingConfig;

pub fn init_logging(config: &LoggingConfig) {
    let config_file = Path::new(&config.config_file);
    if config_file.exists() {
        match log4rs::init_file(config_file, Default::default()) {
            Ok(()) => {
                info!("Logging configured from {}", config_file.display());
                return;
            }
            Err(e) => eprintln!("Failed to load {}: {}, falling back to env_logger", config_file.display(), e),
        }
    }

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();
    if !config_file.exists() {
        warn!("Log config {} not found, logging to stderr", config_file.display());
    }
}
