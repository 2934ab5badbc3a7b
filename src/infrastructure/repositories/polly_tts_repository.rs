use super::tts_repository::{TtsProviderError, TtsRepository};
use crate::domain::voice::Voice;
use crate::infrastructure::config::{AudioFormat, PollyEngine};
use async_trait::async_trait;
use aws_sdk_polly::{
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    types::{Engine, LanguageCode, OutputFormat, VoiceId},
    Client as PollyClient,
};
use std::sync::Arc;

/// AWS Polly implementation of TTS repository
pub struct PollyTtsRepository {
    polly_client: Arc<PollyClient>,
    output_format: AudioFormat,
    engine: PollyEngine,
}

impl PollyTtsRepository {
    pub fn new(polly_client: Arc<PollyClient>, output_format: AudioFormat, engine: PollyEngine) -> Self {
        Self {
            polly_client,
            output_format,
            engine,
        }
    }
}

/// Map an SDK failure onto the provider error taxonomy
fn classify_error<E, R>(err: SdkError<E, R>) -> TtsProviderError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    if let Some(service_err) = err.as_service_error() {
        let code = service_err.code().unwrap_or("Unknown").to_string();
        let message = service_err
            .message()
            .map(str::to_string)
            .unwrap_or_else(|| code.clone());

        return match code.as_str() {
            "ThrottlingException" | "TooManyRequestsException" => TtsProviderError::Throttled(message),
            "LanguageNotSupportedException"
            | "EngineNotSupportedException"
            | "TextLengthExceededException"
            | "InvalidSsmlException"
            | "ValidationException" => TtsProviderError::InvalidRequest(message),
            _ => TtsProviderError::Service(format!("{}: {}", code, message)),
        };
    }

    match err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => {
            TtsProviderError::Transport(DisplayErrorContext(&err).to_string())
        }
        _ => TtsProviderError::InvalidResponse(DisplayErrorContext(&err).to_string()),
    }
}

#[async_trait]
impl TtsRepository for PollyTtsRepository {
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        language_code: &str,
    ) -> Result<Vec<u8>, TtsProviderError> {
        let start_time = std::time::Instant::now();

        tracing::debug!(
            voice_id = voice_id,
            language_code = language_code,
            engine = self.engine.as_str(),
            output_format = self.output_format.as_polly_str(),
            text_length = text.chars().count(),
            "Calling AWS Polly synthesize_speech"
        );

        let result = self
            .polly_client
            .synthesize_speech()
            .text(text)
            .voice_id(VoiceId::from(voice_id))
            .language_code(LanguageCode::from(language_code))
            .output_format(OutputFormat::from(self.output_format.as_polly_str()))
            .engine(Engine::from(self.engine.as_str()))
            .send()
            .await
            .map_err(|e| {
                let err = classify_error(e);
                tracing::warn!(
                    error = %err,
                    voice_id = voice_id,
                    language_code = language_code,
                    "AWS Polly synthesize_speech failed"
                );
                err
            })?;

        let audio_stream = result.audio_stream.collect().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to collect audio stream from Polly response");
            TtsProviderError::InvalidResponse(format!("Failed to read audio stream: {}", e))
        })?;

        let audio_bytes = audio_stream.into_bytes().to_vec();

        tracing::debug!(
            provider = "polly",
            latency_ms = start_time.elapsed().as_millis() as u64,
            audio_size_bytes = audio_bytes.len(),
            "Chunk synthesized"
        );

        Ok(audio_bytes)
    }

    async fn list_voices(&self) -> Result<Vec<Voice>, TtsProviderError> {
        let mut voices = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .polly_client
                .describe_voices()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(classify_error)?;

            voices.extend(output.voices().iter().map(|voice| Voice {
                id: voice.id().map(|id| id.as_str().to_string()).unwrap_or_default(),
                name: voice.name().unwrap_or_default().to_string(),
                language: voice
                    .language_code()
                    .map(|code| code.as_str().to_string())
                    .unwrap_or_default(),
                gender: voice
                    .gender()
                    .map(|gender| gender.as_str().to_string())
                    .unwrap_or_default(),
            }));

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        tracing::info!(voice_count = voices.len(), "Retrieved voices from AWS Polly");

        Ok(voices)
    }
}
