//! Application State Management
//!
//! This module provides the application state shared by all handlers,
//! built once at startup from the loaded configuration.

use std::sync::Arc;
use log::info;

use crate::config::AppConfig;
use crate::storage::VideoStore;

/// Application state containing the video store and the configuration it came from
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<VideoStore>,
    pub config: AppConfig,
}

impl AppState {
    /// Create application state from configuration, creating the upload directory if needed
    pub fn from_config(config: AppConfig) -> std::io::Result<Self> {
        info!("Initializing application state with upload_dir: {}, max_payload_size: {}",
              config.storage.upload_dir, config.server.max_payload_size);

        let store = Arc::new(VideoStore::open(&config)?);

        info!("Application state initialized successfully");
        Ok(Self { store, config })
    }
}
