use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::core::transcription::{TranscribeBody, TranscribeResponse, TranscriptionRequest};
use crate::errors::{ProxyError, ProxyResult};
use crate::state::AppState;

/// Transcribe a base64 encoded audio clip.
///
/// Request body:
/// ```json
/// { "audio_data": "<base64>", "session_id": "abc", "language_code": "en-US" }
/// ```
///
/// Responds with `{ "transcript", "job_name", "confidence" }`, or
/// `{ "error": "<message>" }` with 400, 413, 500 or 504.
///
/// The job runs on its own task so a client disconnect does not cancel it
/// halfway; the temp object is still released when polling ends.
pub async fn transcribe(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> ProxyResult<Json<TranscribeResponse>> {
    let body = body.map_err(reject_body)?;
    debug!("Transcribe request payload: {} bytes", body.len());

    let body: TranscribeBody = serde_json::from_slice(&body).map_err(|e| {
        error!("Rejected transcribe request body: {}", e);
        ProxyError::Input(format!("malformed request body: {e}"))
    })?;

    let request =
        TranscriptionRequest::from_body(body, &state.service.settings().default_language_code)
            .inspect_err(|e| error!("Rejected transcribe request: {}", e))?;

    let service = state.service.clone();
    let response = tokio::spawn(async move { service.transcribe(request).await })
        .await
        .map_err(|e| {
            error!("Transcription task did not complete: {}", e);
            ProxyError::Internal(e.to_string())
        })??;

    Ok(Json(response))
}

fn reject_body(rejection: BytesRejection) -> ProxyError {
    let message = rejection.body_text();
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Rejected oversized transcribe request: {}", message);
        ProxyError::PayloadTooLarge(message)
    } else {
        error!("Failed to read transcribe request body: {}", message);
        ProxyError::Input(message)
    }
}
