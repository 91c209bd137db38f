use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::COPYGUARD_STATUS_HEADER;
use crate::verdict::DecisionError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("No image uploaded")]
    NoImage,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Decision(#[from] DecisionError),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl GatewayError {
    /// HTTP status plus the short machine-readable kind sent in the status header.
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            GatewayError::NoImage => (StatusCode::BAD_REQUEST, "no_image"),
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            GatewayError::Decision(err) => match err {
                DecisionError::MissingImage => (StatusCode::BAD_REQUEST, "no_image"),
                DecisionError::ImageDecode { path: None, .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "image_decode_error")
                }
                DecisionError::ImageDecode { path: Some(_), .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "reference_decode_error")
                }
                DecisionError::ModelInference { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "inference_error")
                }
                DecisionError::CorpusUnavailable { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "corpus_error")
                }
                DecisionError::StartupModelLoad { .. } => {
                    (StatusCode::SERVICE_UNAVAILABLE, "model_load_error")
                }
            },
            GatewayError::StorageError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            GatewayError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status();

        let mut headers = HeaderMap::new();
        headers.insert(COPYGUARD_STATUS_HEADER, HeaderValue::from_static(kind));

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
