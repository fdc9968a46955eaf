//! Audio convenience endpoints (multipart uploads).

use axum::Json;
use axum::extract::State;
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::http::StatusCode;
use ingate_core::GatewayError;
use serde::Serialize;
use tracing::debug;

use crate::error::HttpError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub transcript: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub result: String,
}

/// Fields of an audio upload form. Unknown fields are ignored.
#[derive(Debug, Default)]
struct AudioForm {
    file: Option<Vec<u8>>,
    instruction: Option<String>,
}

impl AudioForm {
    fn take_file(&mut self) -> Result<Vec<u8>, HttpError> {
        self.file.take().ok_or_else(|| missing_field("file"))
    }
}

/// `POST /v1/transcribe` with a multipart `file`.
pub async fn transcribe(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TranscribeResponse>, HttpError> {
    let mut form = read_form(&state, multipart).await?;
    let audio = form.take_file()?;

    let transcript = state.gateway.transcribe_audio(audio, None).await?;
    Ok(Json(TranscribeResponse { transcript }))
}

/// `POST /v1/analyze` with a multipart `file` and `instruction`.
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalyzeResponse>, HttpError> {
    let mut form = read_form(&state, multipart).await?;
    let audio = form.take_file()?;
    let instruction = form
        .instruction
        .take()
        .ok_or_else(|| missing_field("instruction"))?;

    let result = state
        .gateway
        .analyze_audio(audio, &instruction, None)
        .await?;
    Ok(Json(AnalyzeResponse { result }))
}

async fn read_form(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<AudioForm, HttpError> {
    let mut multipart = multipart.map_err(|rejection| {
        GatewayError::InvalidRequest(format!(
            "Expected a multipart form: {}",
            rejection.body_text()
        ))
    })?;

    let mut form = AudioForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(state, &e))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(state, &e))?;
                debug!(bytes = bytes.len(), "Received audio upload");
                form.file = Some(bytes.to_vec());
            }
            "instruction" => {
                let text = field.text().await.map_err(|e| multipart_error(state, &e))?;
                form.instruction = Some(text);
            }
            _ => {}
        }
    }
    Ok(form)
}

fn multipart_error(state: &AppState, err: &MultipartError) -> HttpError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        HttpError::RequestTooLarge {
            limit: state.request_ceiling,
        }
    } else {
        GatewayError::InvalidRequest(format!("Invalid multipart body: {}", err.body_text()))
            .into()
    }
}

fn missing_field(name: &str) -> HttpError {
    GatewayError::InvalidRequest(format!("Missing required form field '{name}'")).into()
}
