//! API error type and its JSON rendering

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Upload exceeds the maximum size of {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    /// `public` is shown to the client, `cause` only goes to the log
    #[error("{public}: {cause}")]
    Internal { public: &'static str, cause: String },
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
}

impl ApiError {
    pub fn internal(public: &'static str, cause: impl std::fmt::Display) -> Self {
        ApiError::Internal { public, cause: cause.to_string() }
    }

    /// Message rendered in the response body
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Internal { public, .. } => (*public).to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Internal { public, cause } = self {
            error!("{}: {}", public, cause);
        }
        let message = self.public_message();
        HttpResponse::build(self.status_code()).json(ErrorBody {
            success: false,
            error: &message,
        })
    }
}
