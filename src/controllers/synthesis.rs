use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::{
    domain::synthesis::{
        naming::secure_filename, BatchRequest, Source, SourceSubmission, SynthesisService,
        SynthesisServiceApi, SynthesizeRequest, SynthesizeResponse, UploadResponse,
        VoiceSelection,
    },
    error::{AppError, AppResult},
    infrastructure::config::Config,
};

pub const UPLOAD_FIELD: &str = "file";
pub const UPLOAD_MULTIPLE_FIELD: &str = "files[]";

pub struct SynthesisController {
    synthesis_service: Arc<SynthesisService>,
    config: Arc<Config>,
}

impl SynthesisController {
    pub fn new(synthesis_service: Arc<SynthesisService>, config: Arc<Config>) -> Self {
        Self {
            synthesis_service,
            config,
        }
    }

    /// POST /api/synthesize - Convert text box content to speech
    pub async fn synthesize(
        State(controller): State<Arc<SynthesisController>>,
        Json(request): Json<SynthesizeRequest>,
    ) -> AppResult<(StatusCode, Json<SynthesizeResponse>)> {
        if request.text.is_empty() {
            return Err(AppError::BadRequest("No text provided".to_string()));
        }

        let voice = controller.resolve_voice(request.voice_id, request.language_code)?;
        let batch = controller
            .synthesis_service
            .synthesize_and_store(BatchRequest {
                submissions: vec![SourceSubmission::Accepted(Source::inline(request.text))],
                voice,
            })
            .await?;

        Ok((StatusCode::OK, Json(SynthesizeResponse::from(batch))))
    }

    /// POST /api/upload - Convert one or more `file` fields to speech
    pub async fn upload(
        State(controller): State<Arc<SynthesisController>>,
        multipart: Multipart,
    ) -> AppResult<Json<UploadResponse>> {
        controller.handle_upload(multipart, UPLOAD_FIELD).await
    }

    /// POST /api/upload-multiple - Convert every `files[]` field to speech
    pub async fn upload_multiple(
        State(controller): State<Arc<SynthesisController>>,
        multipart: Multipart,
    ) -> AppResult<Json<UploadResponse>> {
        controller.handle_upload(multipart, UPLOAD_MULTIPLE_FIELD).await
    }

    async fn handle_upload(&self, multipart: Multipart, file_field: &str) -> AppResult<Json<UploadResponse>> {
        let form = read_upload_form(multipart, file_field).await?;

        if !form.saw_file_field {
            return Err(AppError::BadRequest("No file part".to_string()));
        }
        let files: Vec<UploadedFile> = form
            .files
            .into_iter()
            .filter(|f| !f.filename.is_empty())
            .collect();
        if files.is_empty() {
            return Err(AppError::BadRequest("No selected file".to_string()));
        }

        let voice = self.resolve_voice(form.voice_id, form.language_code)?;
        let submissions = files.into_iter().map(|f| self.to_submission(f)).collect();

        let batch = self
            .synthesis_service
            .synthesize_and_store(BatchRequest { submissions, voice })
            .await?;

        Ok(Json(UploadResponse::from(batch)))
    }

    fn resolve_voice(
        &self,
        voice_id: Option<String>,
        language_code: Option<String>,
    ) -> AppResult<VoiceSelection> {
        let voice_id = non_empty(voice_id).unwrap_or_else(|| self.config.default_voice_id.clone());
        let language_code = non_empty(language_code)
            .unwrap_or_else(|| self.config.default_language_code.clone());

        Ok(VoiceSelection::new(&voice_id, &language_code)?)
    }

    fn to_submission(&self, file: UploadedFile) -> SourceSubmission {
        let display_name = match secure_filename(&file.filename) {
            secured if secured.is_empty() => file.filename.clone(),
            secured => secured,
        };

        if !self.config.is_allowed_file(&file.filename) {
            tracing::warn!(filename = %display_name, "Rejected upload with disallowed extension");
            return SourceSubmission::Rejected {
                display_name,
                reason: "File type not allowed".to_string(),
            };
        }

        match String::from_utf8(file.bytes.to_vec()) {
            Ok(text) => SourceSubmission::Accepted(Source::file(display_name, text)),
            Err(_) => SourceSubmission::Rejected {
                display_name,
                reason: "File is not valid UTF-8 text".to_string(),
            },
        }
    }
}

struct UploadedFile {
    filename: String,
    bytes: Bytes,
}

#[derive(Default)]
struct UploadForm {
    saw_file_field: bool,
    files: Vec<UploadedFile>,
    voice_id: Option<String>,
    language_code: Option<String>,
}

async fn read_upload_form(mut multipart: Multipart, file_field: &str) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == file_field {
            form.saw_file_field = true;
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(multipart_error)?;
            form.files.push(UploadedFile { filename, bytes });
        } else if name == "voiceId" {
            form.voice_id = Some(field.text().await.map_err(multipart_error)?);
        } else if name == "languageCode" {
            form.language_code = Some(field.text().await.map_err(multipart_error)?);
        }
    }

    Ok(form)
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Upload exceeds the maximum allowed size".to_string())
    } else {
        AppError::BadRequest(format!("Failed to read multipart field: {}", err))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
