//! # Audio Intake REST API Handlers
//!
//! HTTP front for the audio core. Upload and recording collaborators post the
//! complete audio buffer; these handlers classify it and describe how it
//! should be sent on to the transcription service.
//!
//! ## Available Endpoints:
//! - `POST /audio/detect` - Container classification only
//! - `POST /audio/wav` - Full WAV header extraction (415 on failure)
//! - `POST /audio/inspect` - Classification, WAV header and recognition plan
//! - `POST /audio/upload` - Same as inspect, for multipart form uploads
//!
//! Raw-body endpoints take the audio as the request body; any Content-Type is
//! accepted and ignored, since the format is read from the bytes.

use crate::audio::{self, AudioInspection, ContainerFormat};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::transcription::{RecognitionPlan, SpeechEncoding};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct InspectQuery {
    /// Sample rate reported by the capture device, if known.
    pub sample_rate_hz: Option<u32>,
}

/// Response body of `/audio/inspect` and `/audio/upload`.
#[derive(Debug, Serialize)]
pub struct InspectionReport {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(flatten)]
    pub inspection: AudioInspection,
    pub encoding_hint: SpeechEncoding,
    pub recognition: RecognitionPlan,
}

fn build_report(
    state: &AppState,
    bytes: &[u8],
    sample_rate_hint: Option<u32>,
    filename: Option<String>,
) -> InspectionReport {
    let config = state.get_config();
    let inspection = audio::inspect(bytes, config.audio.wav_parse_options());

    state.record_format(inspection.format);
    if let Some(failure) = &inspection.wav_error {
        state.record_parse_failure(failure.kind);
    }

    let recognition =
        RecognitionPlan::from_inspection(&inspection, &config.transcription, sample_rate_hint);
    let report = InspectionReport {
        id: Uuid::new_v4(),
        timestamp: Utc::now(),
        filename,
        encoding_hint: SpeechEncoding::for_format(inspection.format),
        inspection,
        recognition,
    };

    info!(
        inspection_id = %report.id,
        format = %report.inspection.format,
        size_bytes = report.inspection.size_bytes,
        usable = report.inspection.is_usable(),
        attempts = report.recognition.attempts.len(),
        "Audio inspected"
    );
    report
}

/// Reject buffers over the current `audio.max_upload_bytes`.
///
/// Read per request so a `PUT /config` takes effect without a restart.
fn ensure_within_limit(state: &AppState, len: usize) -> AppResult<()> {
    let limit = state.get_config().audio.max_upload_bytes;
    if len > limit {
        return Err(AppError::PayloadTooLarge(limit));
    }
    Ok(())
}

pub async fn detect(state: web::Data<AppState>, body: web::Bytes) -> AppResult<HttpResponse> {
    ensure_within_limit(&state, body.len())?;
    let format = audio::detect_format(&body);
    state.record_format(format);

    let sample_rate_hz = match format {
        ContainerFormat::Wav => audio::wav_sample_rate(&body),
        _ => None,
    };

    debug!(format = %format, size_bytes = body.len(), "Format detected");

    Ok(HttpResponse::Ok().json(json!({
        "format": format,
        "mime_type": format.mime_type(),
        "encoding_hint": SpeechEncoding::for_format(format),
        "size_bytes": body.len(),
        "sample_rate_hz": sample_rate_hz
    })))
}

pub async fn parse_wav(state: web::Data<AppState>, body: web::Bytes) -> AppResult<HttpResponse> {
    ensure_within_limit(&state, body.len())?;
    let options = state.get_config().audio.wav_parse_options();

    let info = audio::parse_wav_header_with(&body, options).map_err(|e| {
        state.record_parse_failure(e.kind());
        AppError::from(e)
    })?;
    state.record_format(ContainerFormat::Wav);

    Ok(HttpResponse::Ok().json(json!({
        "timestamp": Utc::now().to_rfc3339(),
        "wav": info,
        "playback": info.playback_hint(),
        "duration_seconds": info.duration_seconds()
    })))
}

pub async fn inspect(
    state: web::Data<AppState>,
    query: web::Query<InspectQuery>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    ensure_within_limit(&state, body.len())?;
    let report = build_report(&state, &body, query.sample_rate_hz, None);
    Ok(HttpResponse::Ok().json(report))
}

/// Inspect the first file field of a multipart upload.
///
/// The filename is echoed back but never used for classification. Uploads
/// that match no known container are rejected.
pub async fn upload(
    state: web::Data<AppState>,
    query: web::Query<InspectQuery>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    while let Some(field) = payload.next().await {
        let mut field = field?;
        let filename = match field.content_disposition().and_then(|cd| cd.get_filename()) {
            Some(name) => name.to_string(),
            None => continue,
        };

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            ensure_within_limit(&state, bytes.len() + chunk.len())?;
            bytes.extend_from_slice(&chunk);
        }

        let report = build_report(&state, &bytes, query.sample_rate_hz, Some(filename));
        if let Err(e) = report.inspection.format.require_known() {
            state.record_parse_failure(e.kind());
            return Err(e.into());
        }
        return Ok(HttpResponse::Ok().json(report));
    }

    Err(AppError::BadRequest("No file field in multipart upload".to_string()))
}
