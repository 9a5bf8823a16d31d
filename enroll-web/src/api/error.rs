//! HTTP error mapping
//!
//! User-visible failures are short HTML fragments, not JSON payloads.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use enroll_common::upload::UploadRejection;
use thiserror::Error;
use tracing::{error, info, warn};

use super::ui::escape_html;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Uploaded document refused (400)
    #[error(transparent)]
    Upload(#[from] UploadRejection),

    /// Multipart body could not be read (status chosen by axum, e.g. 413)
    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// enroll-common error
    #[error(transparent)]
    Common(#[from] enroll_common::Error),
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Common(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Upload(rejection) => {
                warn!("Upload rejected: {}", rejection);
                (StatusCode::BAD_REQUEST, rejection.to_string())
            }
            ApiError::Multipart(err) => {
                warn!("Malformed upload: {}", err);
                (err.status(), err.body_text())
            }
            ApiError::Common(enroll_common::Error::MissingPrerequisite(stage)) => {
                info!("Missing {} stage; redirecting home", stage);
                return Redirect::to("/").into_response();
            }
            ApiError::Common(enroll_common::Error::Database(err)) => {
                error!("Database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Your enrollment could not be saved. Please try again.".to_string(),
                )
            }
            ApiError::Common(err) => {
                error!("{}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong. Please try again.".to_string(),
                )
            }
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong. Please try again.".to_string(),
                )
            }
        };

        (status, Html(format!("<p>{}</p>", escape_html(&message)))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
