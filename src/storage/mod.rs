//! Video Storage Layer
//!
//! A directory on local disk is the only source of truth: every call goes back
//! to the filesystem, nothing is indexed or cached in memory.

pub mod filename;
pub mod staged_upload;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;
use tokio::fs::{self, File};

use crate::config::{AppConfig, StorageConfig};
use crate::error::ApiError;
use self::filename::{has_video_extension, is_safe_filename};
pub use self::staged_upload::StagedUpload;

/// A video file as found on disk
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VideoFile {
    pub filename: String,
    pub size: u64,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Directory-backed video store
#[derive(Debug)]
pub struct VideoStore {
    root: PathBuf,
    video_extensions: Vec<String>,
    validate_filenames: bool,
    max_upload_size: u64,
}

impl VideoStore {
    /// Ensure the upload directory exists and open a store over it
    pub fn open(config: &AppConfig) -> std::io::Result<Self> {
        Self::open_with(&config.storage, config.server.max_payload_size)
    }

    pub fn open_with(config: &StorageConfig, max_upload_size: u64) -> std::io::Result<Self> {
        let path = PathBuf::from(&config.upload_dir);
        if !path.exists() {
            std::fs::create_dir_all(&path)?;
            info!("Created upload directory: {}", path.display());
        }
        let root = path.canonicalize()?;
        info!("Using upload directory: {}", root.display());
        if !config.validate_filenames {
            warn!("Filename validation disabled; client file names are used as given");
        }

        Ok(Self {
            root,
            video_extensions: config.video_extensions.clone(),
            validate_filenames: config.validate_filenames,
            max_upload_size,
        })
    }

    /// Absolute path of the upload directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_upload_size(&self) -> u64 {
        self.max_upload_size
    }

    /// Map a client supplied name to a path inside the upload directory
    pub fn resolve(&self, filename: &str) -> Result<PathBuf, ApiError> {
        if self.validate_filenames && !is_safe_filename(filename) {
            warn!("Rejected file name {:?}", filename);
            return Err(ApiError::BadRequest("Invalid filename".to_string()));
        }
        Ok(self.root.join(filename))
    }

    /// All videos in the upload directory, most recently created first
    pub async fn list(&self) -> std::io::Result<Vec<VideoFile>> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut videos = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let filename = entry.file_name().to_string_lossy().into_owned();
            if !has_video_extension(&filename, &self.video_extensions) {
                continue;
            }
            let metadata = fs::metadata(entry.path()).await?;
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified()?;
            let created = metadata.created().unwrap_or(modified);
            videos.push(VideoFile {
                filename,
                size: metadata.len(),
                created: to_utc(created),
                modified: to_utc(modified),
            });
        }

        videos.sort_by(|a, b| b.created.cmp(&a.created));
        debug!("Listed {} videos in {}", videos.len(), self.root.display());
        Ok(videos)
    }

    /// Start receiving an upload; nothing is visible until it is committed
    pub async fn begin_upload(&self) -> Result<StagedUpload, ApiError> {
        StagedUpload::create(&self.root, self.max_upload_size).await
    }

    /// Publish a staged upload under `filename`, returning its size in bytes
    pub async fn commit_upload(&self, upload: StagedUpload, filename: &str) -> Result<(u64, PathBuf), ApiError> {
        let destination = self.resolve(filename)?;
        let size = upload.commit(destination.clone()).await?;
        Ok((size, destination))
    }

    /// Open a stored video for reading, returning the handle and its size
    pub async fn open_video(&self, filename: &str) -> Result<(File, u64), ApiError> {
        let path = self.resolve(filename)?;
        let file = match File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ApiError::NotFound("File not found".to_string()))
            }
            Err(e) => return Err(ApiError::internal("Failed to download video", e)),
        };
        let metadata = file
            .metadata()
            .await
            .map_err(|e| ApiError::internal("Failed to download video", e))?;
        if !metadata.is_file() {
            return Err(ApiError::NotFound("File not found".to_string()));
        }
        Ok((file, metadata.len()))
    }

    /// Remove a stored video
    pub async fn delete(&self, filename: &str) -> Result<(), ApiError> {
        let path = self.resolve(filename)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ApiError::NotFound("File not found".to_string()))
            }
            Err(e) => Err(ApiError::internal("Failed to delete video", e)),
        }
    }
}

fn to_utc(time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time)
}
