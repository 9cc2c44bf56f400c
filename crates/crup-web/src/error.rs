//! Error type for handlers: maps domain errors onto HTTP status codes.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crup_common::CrupError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Crup(#[from] CrupError),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Malformed upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Invalid JSON body: {}", .0.body_text())]
    Json(#[from] JsonRejection),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Crup(e) => match e {
                CrupError::InvalidDomainName(_)
                | CrupError::EmptyFileSelection
                | CrupError::UnknownMetadataField(_)
                | CrupError::InvalidQueryDepth { .. } => StatusCode::BAD_REQUEST,
                CrupError::DuplicateDomainId(_) => StatusCode::CONFLICT,
                CrupError::DomainNotFound(_) | CrupError::FileNotFound(_) => StatusCode::NOT_FOUND,
                CrupError::UnsupportedFileType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                CrupError::Serialization(_) | CrupError::Config(_) | CrupError::Io(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Multipart(_) | ApiError::Json(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// `Json` extractor whose rejections answer with the `{"error": ...}` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CrupError::InvalidDomainName(String::new()), StatusCode::BAD_REQUEST),
            (CrupError::DuplicateDomainId("physics".into()), StatusCode::CONFLICT),
            (CrupError::DomainNotFound("x".into()), StatusCode::NOT_FOUND),
            (
                CrupError::UnsupportedFileType { name: "a.png".into(), mime_type: "image/png".into() },
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (CrupError::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }
}
