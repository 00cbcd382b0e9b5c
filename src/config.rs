//! Application Configuration
//!
//! This module provides configuration management for the application,
//! supporting YAML configuration files with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use log::{info, warn};

/// Environment variable naming an alternative configuration file
pub const CONFIG_PATH_ENV: &str = "VIDEO_VAULT_CONFIG";

/// Configuration file used when no override is given
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Storage configuration
    pub storage: StorageConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Number of worker threads
    pub workers: usize,
    /// Maximum upload size in bytes
    pub max_payload_size: u64,
}

/// Video storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the uploaded videos
    pub upload_dir: String,
    /// File name suffixes that count as videos when listing
    pub video_extensions: Vec<String>,
    /// Reject file names that could escape the upload directory
    pub validate_filenames: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Path to log4rs configuration file
    pub config_file: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            workers: 4,
            max_payload_size: 100 * 1024 * 1024, // 100MiB
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: "uploads".to_string(),
            video_extensions: vec![".mp4".to_string(), ".webm".to_string()],
            validate_filenames: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            config_file: "server_log.yaml".to_string(),
        }
    }
}

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults(PathBuf),
}

impl ConfigSource {
    /// Report the source; call once the logger is up
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded configuration from {}", path.display()),
            ConfigSource::Defaults(path) => warn!("Config file {} not found, using defaults", path.display()),
        }
    }
}

impl AppConfig {
    /// Load configuration from `$VIDEO_VAULT_CONFIG` or `config.yaml`, use defaults if not found
    pub fn load() -> Result<(Self, ConfigSource), Box<dyn std::error::Error>> {
        let config_path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific file, use defaults if it does not exist
    pub fn load_from<P: AsRef<Path>>(config_path: P) -> Result<(Self, ConfigSource), Box<dyn std::error::Error>> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok((Self::default(), ConfigSource::Defaults(config_path.to_path_buf())));
        }
        let content = fs::read_to_string(config_path)?;
        let config: AppConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok((config, ConfigSource::File(config_path.to_path_buf())))
    }

    /// Reject values the server cannot start with
    pub fn validate(&self) -> Result<(), String> {
        if self.server.workers == 0 {
            return Err("server.workers must be at least 1".to_string());
        }
        Ok(())
    }

    /// Configuration rooted at a specific upload directory, everything else default
    pub fn with_upload_dir<P: AsRef<Path>>(upload_dir: P) -> Self {
        let mut config = Self::default();
        config.storage.upload_dir = upload_dir.as_ref().to_string_lossy().into_owned();
        config
    }
}
