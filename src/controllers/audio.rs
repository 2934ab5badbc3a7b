use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    infrastructure::{
        config::AudioFormat,
        repositories::{AudioFile, AudioRepository, AudioStorageError},
    },
};

pub struct AudioController {
    audio_repo: Arc<dyn AudioRepository>,
    format: AudioFormat,
}

impl AudioController {
    pub fn new(audio_repo: Arc<dyn AudioRepository>, format: AudioFormat) -> Self {
        Self { audio_repo, format }
    }

    /// GET /api/audio/:filename - Stream stored audio for in-page playback
    pub async fn serve(
        State(controller): State<Arc<AudioController>>,
        Path(filename): Path<String>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let file = controller.load(&filename).await?;

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(controller.format.mime_type()),
        );

        Ok((StatusCode::OK, headers, Body::from(file.data)))
    }

    /// GET /api/download/:filename - Serve stored audio as an attachment under its display name
    pub async fn download(
        State(controller): State<Arc<AudioController>>,
        Path(filename): Path<String>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let file = controller.load(&filename).await?;

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(controller.format.mime_type()),
        );
        let disposition = content_disposition(&file.display_filename);
        headers.insert(
            header::CONTENT_DISPOSITION,
            HeaderValue::from_str(&disposition)
                .map_err(|e| AppError::Internal(format!("Invalid download header: {}", e)))?,
        );

        Ok((StatusCode::OK, headers, Body::from(file.data)))
    }

    async fn load(&self, filename: &str) -> AppResult<AudioFile> {
        self.audio_repo.load(filename).await.map_err(|e| match e {
            AudioStorageError::NotFound(_) => AppError::NotFound("File not found".to_string()),
            other => AppError::Internal(other.to_string()),
        })
    }
}

/// `attachment` header with an ASCII fallback and the RFC 5987 UTF-8 name
fn content_disposition(display_filename: &str) -> String {
    let fallback: String = display_filename
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' && c != '\\' { c } else { '_' })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(display_filename)
    )
}
