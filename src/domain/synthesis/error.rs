use crate::error::AppError;

use super::manifest::ManifestError;

#[derive(Debug, thiserror::Error)]
pub enum SynthesisServiceError {
    #[error("invalid input: {0}")]
    Invalid(String),

    #[error("No text to convert")]
    NothingToConvert,

    /// No section of the batch produced audio
    #[error("{message}")]
    AllFailed {
        message: String,
        errors: Vec<ManifestError>,
    },
}

impl From<SynthesisServiceError> for AppError {
    fn from(err: SynthesisServiceError) -> Self {
        match err {
            SynthesisServiceError::Invalid(msg) => AppError::BadRequest(msg),
            SynthesisServiceError::NothingToConvert => AppError::BadRequest(err.to_string()),
            SynthesisServiceError::AllFailed { message, errors } => AppError::BatchFailed {
                message,
                details: serde_json::Value::Array(
                    errors
                        .iter()
                        .map(|e| {
                            let mut detail = serde_json::Map::new();
                            if let Some(source) = &e.source_name {
                                detail.insert("filename".into(), source.clone().into());
                            }
                            if let Some(section) = &e.section_name {
                                detail.insert("name".into(), section.clone().into());
                            }
                            detail.insert("error".into(), e.detail.clone().into());
                            serde_json::Value::Object(detail)
                        })
                        .collect(),
                ),
            },
        }
    }
}
