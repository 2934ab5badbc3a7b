pub mod chunker;
pub mod coordinator;
pub mod dto;
pub mod error;
pub mod manifest;
pub mod model;
pub mod naming;
pub mod segmenter;
pub mod service;

pub use coordinator::{CoordinatorError, SynthesisBudget, SynthesisCoordinator};
pub use dto::{SynthesizeRequest, SynthesizeResponse, UploadResponse};
pub use error::SynthesisServiceError;
pub use manifest::{Manifest, ManifestEntry, ManifestError};
pub use model::{Source, SourceOrigin, SourceSubmission, VoiceSelection};
pub use service::{
    BatchRequest, PublishedAudio, PublishedBatch, SynthesisService, SynthesisServiceApi,
    SynthesisSettings,
};
