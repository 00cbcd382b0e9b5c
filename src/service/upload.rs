//! Multipart form handling for `POST /upload`

use actix_multipart::{Field, Multipart, MultipartError};
use futures::TryStreamExt;
use log::{debug, warn};

use crate::error::ApiError;
use crate::storage::filename::fallback_filename;
use crate::storage::{StagedUpload, VideoStore};

/// Form field carrying the video bytes
pub const VIDEO_FIELD: &str = "video";

const OCTET_STREAM: &str = "application/octet-stream";

/// Text fields are small; anything larger is a client error
const MAX_TEXT_FIELD_SIZE: usize = 64 * 1024;

/// A fully received upload form, video still in staging
pub struct UploadForm {
    pub video: Option<(String, StagedUpload)>,
    pub sentence: Option<String>,
    pub timestamp: Option<String>,
    pub index: Option<String>,
}

fn malformed(e: MultipartError) -> ApiError {
    warn!("Malformed multipart body: {}", e);
    ApiError::BadRequest(format!("Malformed upload: {}", e))
}

/// Read every part of the form, streaming the video field into `store`
pub async fn read_upload_form(mut payload: Multipart, store: &VideoStore) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm {
        video: None,
        sentence: None,
        timestamp: None,
        index: None,
    };

    while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            VIDEO_FIELD => {
                let Some(filename) = file_part_name(&field) else {
                    debug!("Ignoring video field sent as plain form value");
                    while field.try_next().await.map_err(malformed)?.is_some() {}
                    continue;
                };
                if form.video.is_some() {
                    return Err(ApiError::BadRequest("Only one video file may be uploaded per request".to_string()));
                }
                // fail before reading the body if the name is unusable
                store.resolve(&filename)?;

                let mut staged = store.begin_upload().await?;
                while let Some(chunk) = field.try_next().await.map_err(malformed)? {
                    staged.write_chunk(&chunk).await?;
                }
                debug!("Received video part {} ({} bytes)", filename, staged.size());
                form.video = Some((filename, staged));
            }
            "sentence" => form.sentence = Some(read_text(&mut field).await?),
            "timestamp" => form.timestamp = Some(read_text(&mut field).await?),
            "index" => form.index = Some(read_text(&mut field).await?),
            other => {
                debug!("Ignoring unexpected form field {:?}", other);
                while field.try_next().await.map_err(malformed)?.is_some() {}
            }
        }
    }

    Ok(form)
}

/// Name to store a part under, or `None` when the part is a plain form value.
/// A part is a file when it declares a `filename` or is sent as octet-stream;
/// an empty or missing name on such a part gets a generated one.
fn file_part_name(field: &Field) -> Option<String> {
    let declared = field.content_disposition().and_then(|cd| cd.get_filename());
    let octet_stream = field
        .content_type()
        .is_some_and(|ct| ct.essence_str() == OCTET_STREAM);

    match declared {
        Some(name) if !name.is_empty() => Some(name.to_string()),
        Some(_) => Some(fallback_filename()),
        None if octet_stream => Some(fallback_filename()),
        None => None,
    }
}

async fn read_text(field: &mut Field) -> Result<String, ApiError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(malformed)? {
        if bytes.len() + chunk.len() > MAX_TEXT_FIELD_SIZE {
            return Err(ApiError::BadRequest("Form field too large".to_string()));
        }
        bytes.extend_from_slice(&chunk);
    }
    String::from_utf8(bytes).map_err(|_| ApiError::BadRequest("Form field is not valid UTF-8".to_string()))
}
