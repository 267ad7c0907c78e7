use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File is not an image")]
    NotAnImage,
    #[error("Failed to upload image: {0}")]
    Write(#[from] std::io::Error),
    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),
    #[error("{}", .0.body_text())]
    MultipartRejection(#[from] MultipartRejection),
    #[error("Missing form field: {0}")]
    MissingField(&'static str),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let code = match &self {
            Error::NotAnImage => StatusCode::BAD_REQUEST,
            Error::Write(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Multipart(_) => StatusCode::BAD_REQUEST,
            Error::MultipartRejection(rejection) => rejection.status(),
            Error::MissingField(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };

        if code.is_server_error() {
            error!("{self}");
        }

        (code, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
