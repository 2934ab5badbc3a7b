use crate::domain::voice::Voice;
use async_trait::async_trait;

/// Failure of a single provider call. The message is shown to users as-is.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TtsProviderError {
    #[error("Provider throttled the request: {0}")]
    Throttled(String),

    #[error("Invalid synthesis request: {0}")]
    InvalidRequest(String),

    #[error("Provider service error: {0}")]
    Service(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Repository for TTS synthesis operations.
/// Abstracts the underlying TTS provider (AWS Polly).
///
/// Implementations must be safe to call from many concurrent tasks.
/// Callers guarantee `text` already fits the provider's per-request limit;
/// implementations do not split or retry on their own.
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Synthesize one chunk of text and return the encoded audio bytes
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        language_code: &str,
    ) -> Result<Vec<u8>, TtsProviderError>;

    /// Fetch the provider's voice catalog
    async fn list_voices(&self) -> Result<Vec<Voice>, TtsProviderError>;
}
