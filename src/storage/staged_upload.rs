//! Uploads are written to a hidden staging file next to the videos and only
//! renamed to their final name once the whole body has arrived.

use std::path::{Path, PathBuf};

use log::debug;
use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::error::ApiError;

const STAGING_PREFIX: &str = ".upload-";
const STAGING_SUFFIX: &str = ".part";

pub struct StagedUpload {
    file: File,
    path: TempPath,
    size: u64,
    limit: u64,
}

impl StagedUpload {
    pub(crate) async fn create(dir: &Path, limit: u64) -> Result<Self, ApiError> {
        let dir = dir.to_path_buf();
        let staged = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(STAGING_PREFIX)
                .suffix(STAGING_SUFFIX)
                .tempfile_in(dir)
        })
        .await
        .map_err(|e| ApiError::internal("Failed to upload video", e))?
        .map_err(|e| ApiError::internal("Failed to upload video", e))?;

        let (file, path) = staged.into_parts();
        debug!("Staging upload at {}", path.display());
        Ok(Self {
            file: File::from_std(file),
            path,
            size: 0,
            limit,
        })
    }

    /// Append a chunk, failing once the running total passes the limit
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), ApiError> {
        let size = self.size + chunk.len() as u64;
        if size > self.limit {
            return Err(ApiError::PayloadTooLarge { limit: self.limit });
        }
        self.file
            .write_all(chunk)
            .await
            .map_err(|e| ApiError::internal("Failed to upload video", e))?;
        self.size = size;
        Ok(())
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn staging_path(&self) -> &Path {
        &self.path
    }

    /// Move the staged bytes to `destination`, replacing any existing file
    pub(crate) async fn commit(mut self, destination: PathBuf) -> Result<u64, ApiError> {
        self.file
            .flush()
            .await
            .map_err(|e| ApiError::internal("Failed to upload video", e))?;
        let Self { file, path, size, .. } = self;
        drop(file);

        tokio::task::spawn_blocking(move || path.persist(&destination))
            .await
            .map_err(|e| ApiError::internal("Failed to upload video", e))?
            .map_err(|e| ApiError::internal("Failed to upload video", e.error))?;
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir_entries(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[tokio::test]
    async fn test_staging_file_is_hidden_and_not_a_video() {
        let dir = tempfile::tempdir().unwrap();
        let upload = StagedUpload::create(dir.path(), 1024).await.unwrap();
        let name = upload.staging_path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(STAGING_PREFIX));
        assert!(name.ends_with(STAGING_SUFFIX));
    }

    #[tokio::test]
    async fn test_commit_moves_bytes_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let mut upload = StagedUpload::create(dir.path(), 1024).await.unwrap();
        upload.write_chunk(b"hello ").await.unwrap();
        upload.write_chunk(b"world").await.unwrap();
        assert_eq!(upload.size(), 11);

        let dest = dir.path().join("greeting.mp4");
        let size = upload.commit(dest.clone()).await.unwrap();

        assert_eq!(size, 11);
        assert_eq!(std::fs::read(&dest).unwrap(), b"hello world");
        assert_eq!(dir_entries(dir.path()), vec!["greeting.mp4".to_string()]);
    }

    #[tokio::test]
    async fn test_commit_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("clip.mp4");
        std::fs::write(&dest, b"old contents").unwrap();

        let mut upload = StagedUpload::create(dir.path(), 1024).await.unwrap();
        upload.write_chunk(b"new").await.unwrap();
        upload.commit(dest.clone()).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_limit_exceeded_and_dropped_upload_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut upload = StagedUpload::create(dir.path(), 4).await.unwrap();
        upload.write_chunk(b"1234").await.unwrap();

        let err = upload.write_chunk(b"5").await.unwrap_err();
        assert!(matches!(err, ApiError::PayloadTooLarge { limit: 4 }));

        drop(upload);
        assert!(dir_entries(dir.path()).is_empty());
    }
}
