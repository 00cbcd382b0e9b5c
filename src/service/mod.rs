//service/mod.rs
pub mod models;
pub mod upload;

use actix_multipart::Multipart;
use actix_web::http::header::{
    Charset, ContentDisposition, DispositionParam, DispositionType, ExtendedValue, CONTENT_LENGTH,
};
use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::{debug, info, warn};
use tokio_util::io::ReaderStream;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::storage::filename::content_type_for;
use self::models::{HealthResponse, MessageResponse, UploadResponse, VideoListResponse};
use self::upload::read_upload_form;

/// Register every route on an actix `App` or scope
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(upload_video)
        .service(list_videos)
        .service(download_video)
        .service(delete_video)
        .service(health);
}

/// Run `f` with `filename` in the log MDC. The MDC is per worker thread and
/// requests interleave on it, so `f` must not span an `.await`.
fn with_filename_context<R>(filename: &str, f: impl FnOnce() -> R) -> R {
    let _mdc = log_mdc::insert_scoped("filename", filename);
    f()
}

fn declared_length(req: &HttpRequest) -> Option<u64> {
    req.headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

#[post("/upload")]
pub async fn upload_video(req: HttpRequest, payload: Multipart, app_state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let store = &app_state.store;
    let limit = store.max_upload_size();

    if let Some(length) = declared_length(&req) {
        if length > limit {
            warn!("Rejecting upload of {} bytes, limit is {}", length, limit);
            return Err(ApiError::PayloadTooLarge { limit });
        }
    }

    let form = read_upload_form(payload, store).await?;
    let (filename, staged) = form.video.ok_or_else(|| {
        warn!("Upload request without a video file");
        ApiError::BadRequest("No video file received".to_string())
    })?;

    let (size, path) = store.commit_upload(staged, &filename).await?;

    with_filename_context(&filename, || {
        info!(
            "Video uploaded: filename={}, size={}, sentence={:?}, timestamp={:?}, index={:?}, path={}",
            filename, size, form.sentence, form.timestamp, form.index, path.display()
        )
    });

    Ok(HttpResponse::Ok().json(UploadResponse {
        success: true,
        message: "Video uploaded successfully".to_string(),
        filename,
        size,
        sentence: form.sentence,
        timestamp: form.timestamp,
        index: form.index,
    }))
}

#[get("/videos")]
pub async fn list_videos(app_state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let videos = app_state
        .store
        .list()
        .await
        .map_err(|e| ApiError::internal("Failed to fetch videos", e))?;
    debug!("Returning {} videos", videos.len());
    Ok(HttpResponse::Ok().json(VideoListResponse::new(videos)))
}

#[get("/download/{filename}")]
pub async fn download_video(path: web::Path<String>, app_state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let filename = path.into_inner();

    let (file, size) = app_state.store.open_video(&filename).await?;
    with_filename_context(&filename, || info!("Downloading {} ({} bytes)", filename, size));

    Ok(HttpResponse::Ok()
        .content_type(content_type_for(&filename))
        .insert_header(attachment(&filename))
        .no_chunking(size)
        .streaming(ReaderStream::new(file)))
}

#[delete("/delete/{filename}")]
pub async fn delete_video(path: web::Path<String>, app_state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let filename = path.into_inner();

    app_state.store.delete(&filename).await?;
    with_filename_context(&filename, || info!("Video deleted: {}", filename));
    Ok(HttpResponse::Ok().json(MessageResponse {
        success: true,
        message: "Video deleted successfully".to_string(),
    }))
}

#[get("/health")]
pub async fn health(app_state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        uploads_dir: app_state.store.root().display().to_string(),
    })
}

fn attachment(filename: &str) -> ContentDisposition {
    let mut parameters = vec![DispositionParam::Filename(filename.to_string())];
    if !filename.is_ascii() {
        parameters.push(DispositionParam::FilenameExt(ExtendedValue {
            charset: Charset::Ext(String::from("UTF-8")),
            language_tag: None,
            value: filename.as_bytes().to_vec(),
        }));
    }
    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mdc_filename() -> Option<String> {
        log_mdc::get("filename", |v| v.map(str::to_string))
    }

    #[test]
    fn test_filename_context_is_scoped_to_the_call() {
        log_mdc::remove("filename");

        let seen = with_filename_context("clip1.mp4", mdc_filename);
        assert_eq!(seen.as_deref(), Some("clip1.mp4"));
        assert_eq!(mdc_filename(), None);
    }

    #[test]
    fn test_filename_context_nesting_restores_outer_value() {
        log_mdc::remove("filename");

        with_filename_context("a.mp4", || {
            let inner = with_filename_context("b.mp4", mdc_filename);
            assert_eq!(inner.as_deref(), Some("b.mp4"));
            assert_eq!(mdc_filename().as_deref(), Some("a.mp4"));
        });
        assert_eq!(mdc_filename(), None);
    }

    #[test]
    fn test_attachment_header_ascii() {
        let cd = attachment("clip1.mp4");
        assert!(cd.is_attachment());
        assert_eq!(cd.get_filename(), Some("clip1.mp4"));
        assert!(cd.get_filename_ext().is_none());
    }

    #[test]
    fn test_attachment_header_non_ascii_adds_extended_name() {
        let cd = attachment("vidéo.webm");
        assert_eq!(cd.get_filename(), Some("vidéo.webm"));
        assert_eq!(cd.get_filename_ext().unwrap().value, "vidéo.webm".as_bytes());
    }
}
