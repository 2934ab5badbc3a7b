use crate::error::AppError;
use crate::infrastructure::repositories::TtsProviderError;

pub const VOICES_UNAVAILABLE: &str = "Failed to retrieve voices. Check AWS credentials.";

#[derive(Debug, thiserror::Error)]
pub enum VoiceServiceError {
    #[error("{}", VOICES_UNAVAILABLE)]
    Provider(#[from] TtsProviderError),
}

impl From<VoiceServiceError> for AppError {
    fn from(err: VoiceServiceError) -> Self {
        match err {
            VoiceServiceError::Provider(e) => AppError::Upstream {
                error: e.to_string(),
                message: VOICES_UNAVAILABLE.to_string(),
            },
        }
    }
}
