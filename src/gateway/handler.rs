use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, error, instrument};

use super::COPYGUARD_STATUS_HEADER;
use crate::config::EngineMode;
use crate::gateway::error::GatewayError;
use crate::gateway::state::AppState;
use crate::imaging::ImageSource;
use crate::verdict::{ConfidenceScore, Verdict};

/// Multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

const FALLBACK_FILENAME: &str = "upload";

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub file_id: String,
    pub verdict: Verdict,
    pub confidence: ConfidenceScore,
    pub engine: EngineMode,
}

struct Upload {
    filename: String,
    bytes: Vec<u8>,
}

#[instrument(skip(state, multipart), fields(file_id = tracing::field::Empty))]
pub async fn check_copyright_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, GatewayError> {
    // Anything that is not a multipart form has no image field either.
    let mut multipart = multipart.map_err(|_| GatewayError::NoImage)?;
    let upload = read_image_field(&mut multipart)
        .await?
        .ok_or(GatewayError::NoImage)?;

    let file_id = make_file_id(&upload.filename);
    tracing::Span::current().record("file_id", tracing::field::display(&file_id));

    tokio::fs::create_dir_all(&state.upload_dir)
        .await
        .map_err(|e| GatewayError::StorageError(format!("cannot create upload dir: {}", e)))?;
    let path = state.upload_dir.join(&file_id);
    tokio::fs::write(&path, &upload.bytes)
        .await
        .map_err(|e| GatewayError::StorageError(format!("cannot store upload: {}", e)))?;

    debug!(path = %path.display(), bytes = upload.bytes.len(), "Upload stored");

    let engine = state.engine.clone();
    let source = ImageSource::Path(path);
    let decision = tokio::task::spawn_blocking(move || engine.decide(Some(&source)))
        .await
        .map_err(|e| {
            error!("Decision task failed: {}", e);
            GatewayError::InternalError(format!("decision task failed: {}", e))
        })??;

    let mut headers = HeaderMap::new();
    headers.insert(
        COPYGUARD_STATUS_HEADER,
        HeaderValue::from_static(decision.engine.as_str()),
    );

    Ok((
        StatusCode::OK,
        headers,
        Json(CheckResponse {
            file_id,
            verdict: decision.verdict,
            confidence: decision.confidence,
            engine: decision.engine,
        }),
    )
        .into_response())
}

async fn read_image_field(multipart: &mut Multipart) -> Result<Option<Upload>, GatewayError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| GatewayError::InvalidRequest(format!("malformed multipart body: {}", e)))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or(FALLBACK_FILENAME).to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| GatewayError::InvalidRequest(format!("cannot read image field: {}", e)))?;

        return Ok(Some(Upload {
            filename,
            bytes: bytes.to_vec(),
        }));
    }

    Ok(None)
}

/// `"<1000..=9999>_<sanitized filename>"`.
pub fn make_file_id(filename: &str) -> String {
    let prefix: u16 = rand::thread_rng().gen_range(1000..=9999);
    format!("{}_{}", prefix, sanitize_filename(filename))
}

/// Reduces a client-supplied filename to a single safe path component.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        cleaned.to_string()
    }
}
