//! JSON bodies returned by the HTTP handlers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::VideoFile;

/// Returned after a video has been stored
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub filename: String,
    pub size: u64,
    /// Metadata fields are echoed back only when the client sent them
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sentence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub index: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoListResponse {
    pub success: bool,
    pub count: usize,
    pub videos: Vec<VideoFile>,
}

impl VideoListResponse {
    pub fn new(videos: Vec<VideoFile>) -> Self {
        Self {
            success: true,
            count: videos.len(),
            videos,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub uploads_dir: String,
}
