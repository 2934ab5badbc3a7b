use super::coordinator::{SynthesisBudget, SynthesisCoordinator};
use super::error::SynthesisServiceError;
use super::manifest::{self, Manifest, ManifestError, SourceReport, SourceSummary};
use super::model::{Section, Source, SourceOrigin, SourceSubmission, VoiceSelection};
use super::segmenter::segment;
use crate::infrastructure::repositories::AudioRepository;
use async_trait::async_trait;
use futures::future::join_all;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const NO_TEXT: &str = "No text to convert";

#[derive(Debug, Clone)]
pub struct SynthesisSettings {
    pub max_chunk_chars: NonZeroUsize,
    pub request_timeout: Duration,
    /// Extension appended to generated download names
    pub file_extension: &'static str,
}

/// One text box submission or one upload batch
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub submissions: Vec<SourceSubmission>,
    pub voice: VoiceSelection,
}

/// A stored artifact, ready to be listed to the client
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedAudio {
    pub source_index: usize,
    pub source_name: Option<String>,
    pub section_name: String,
    pub part_name: Option<String>,
    pub filename: String,
    pub url: String,
    pub download_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublishedBatch {
    pub sources: Vec<SourceSummary>,
    pub results: Vec<PublishedAudio>,
    pub errors: Vec<ManifestError>,
    pub is_multipart: bool,
    pub is_sectioned: bool,
}

pub struct SynthesisService {
    coordinator: Arc<SynthesisCoordinator>,
    audio_repo: Arc<dyn AudioRepository>,
    settings: SynthesisSettings,
    shutdown: CancellationToken,
}

impl SynthesisService {
    pub fn new(
        coordinator: Arc<SynthesisCoordinator>,
        audio_repo: Arc<dyn AudioRepository>,
        settings: SynthesisSettings,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            coordinator,
            audio_repo,
            settings,
            shutdown,
        }
    }
}

#[async_trait]
pub trait SynthesisServiceApi: Send + Sync {
    /// Segment, chunk and synthesize every source of the request
    ///
    /// Sources run concurrently and never affect each other. Partial failure
    /// is returned as a manifest with both successes and errors; only an
    /// empty submission or a batch with no success at all is an error.
    async fn synthesize_batch(&self, request: BatchRequest) -> Result<Manifest, SynthesisServiceError>;

    /// `synthesize_batch`, then store every artifact
    async fn synthesize_and_store(
        &self,
        request: BatchRequest,
    ) -> Result<PublishedBatch, SynthesisServiceError>;
}

#[async_trait]
impl SynthesisServiceApi for SynthesisService {
    async fn synthesize_batch(&self, request: BatchRequest) -> Result<Manifest, SynthesisServiceError> {
        if request.submissions.is_empty() {
            return Err(SynthesisServiceError::Invalid("No text provided".to_string()));
        }

        let start_time = std::time::Instant::now();
        let budget = SynthesisBudget::new(
            tokio::time::Instant::now() + self.settings.request_timeout,
            self.shutdown.child_token(),
        );

        let prepared = prepare(request.submissions)?;
        let has_files = prepared.iter().any(|p| p.origin() == SourceOrigin::File);

        tracing::info!(
            source_count = prepared.len(),
            voice_id = %request.voice.voice_id,
            language_code = %request.voice.language_code,
            "Batch synthesis request"
        );

        let reports = join_all(
            prepared
                .into_iter()
                .map(|source| self.run_source(source, &request.voice, &budget)),
        )
        .await;

        let manifest = manifest::build(reports);

        tracing::info!(
            latency_ms = start_time.elapsed().as_millis() as u64,
            success_count = manifest.successes.len(),
            error_count = manifest.errors.len(),
            is_multipart = manifest.is_multipart,
            partial_failure = manifest.is_partial_failure(),
            "Batch synthesis completed"
        );

        check_outcome(manifest, has_files)
    }

    async fn synthesize_and_store(
        &self,
        request: BatchRequest,
    ) -> Result<PublishedBatch, SynthesisServiceError> {
        let mut manifest = self.synthesize_batch(request).await?;
        let has_files = manifest.sources.iter().any(|s| s.origin == SourceOrigin::File);

        let stored = join_all(manifest.successes.iter().map(|entry| {
            let display_filename = format!("{}.{}", entry.file_stem, self.settings.file_extension);
            async move {
                self.audio_repo
                    .store(entry.artifact.as_bytes(), &display_filename)
                    .await
            }
        }))
        .await;

        let mut published = Vec::with_capacity(stored.len());
        let mut failed = Vec::new();
        for (index, (entry, result)) in manifest.successes.iter().zip(stored).enumerate() {
            match result {
                Ok(audio) => published.push(PublishedAudio {
                    source_index: entry.source_index,
                    source_name: entry.source_name.clone(),
                    section_name: entry.section_name.clone(),
                    part_name: entry.part_name.clone(),
                    filename: audio.display_filename,
                    url: audio.url,
                    download_url: audio.download_url,
                }),
                Err(e) => {
                    tracing::error!(
                        section = %entry.section_name,
                        error = %e,
                        "Failed to store synthesized audio"
                    );
                    failed.push((index, format!("Failed to save audio: {}", e)));
                }
            }
        }

        // Back to front so earlier indices stay valid
        for (index, detail) in failed.into_iter().rev() {
            manifest.demote(index, detail);
        }
        let manifest = check_outcome(manifest, has_files)?;

        Ok(PublishedBatch {
            sources: manifest.sources,
            results: published,
            errors: manifest.errors,
            is_multipart: manifest.is_multipart,
            is_sectioned: manifest.is_sectioned,
        })
    }
}

impl SynthesisService {
    async fn run_source(
        &self,
        prepared: PreparedSource,
        voice: &VoiceSelection,
        budget: &SynthesisBudget,
    ) -> SourceReport {
        match prepared {
            PreparedSource::Ready { source, sections } => {
                match self
                    .coordinator
                    .synthesize(&sections, voice, self.settings.max_chunk_chars, budget)
                    .await
                {
                    Ok(results) => SourceReport::synthesized(&source, results),
                    Err(e) => SourceReport::rejected(source.display_name, source.origin, e.to_string()),
                }
            }
            PreparedSource::Rejected {
                display_name,
                origin,
                reason,
            } => SourceReport::rejected(display_name, origin, reason),
        }
    }
}

enum PreparedSource {
    Ready { source: Source, sections: Vec<Section> },
    Rejected { display_name: String, origin: SourceOrigin, reason: String },
}

impl PreparedSource {
    fn origin(&self) -> SourceOrigin {
        match self {
            PreparedSource::Ready { source, .. } => source.origin,
            PreparedSource::Rejected { origin, .. } => *origin,
        }
    }
}

/// Segment every source up front; an empty text box is a validation error,
/// an empty file only fails that file
fn prepare(submissions: Vec<SourceSubmission>) -> Result<Vec<PreparedSource>, SynthesisServiceError> {
    submissions
        .into_iter()
        .map(|submission| match submission {
            SourceSubmission::Accepted(source) => {
                let sections = segment(&source);
                tracing::debug!(
                    source = %source.display_name,
                    section_count = sections.len(),
                    "Source segmented"
                );
                match (sections.is_empty(), source.origin) {
                    (true, SourceOrigin::Inline) => Err(SynthesisServiceError::NothingToConvert),
                    (true, SourceOrigin::File) => Ok(PreparedSource::Rejected {
                        display_name: source.display_name,
                        origin: SourceOrigin::File,
                        reason: NO_TEXT.to_string(),
                    }),
                    (false, _) => Ok(PreparedSource::Ready { source, sections }),
                }
            }
            SourceSubmission::Rejected { display_name, reason } => Ok(PreparedSource::Rejected {
                display_name,
                origin: SourceOrigin::File,
                reason,
            }),
        })
        .collect()
}

fn check_outcome(manifest: Manifest, has_files: bool) -> Result<Manifest, SynthesisServiceError> {
    if manifest.is_empty() {
        return Err(SynthesisServiceError::NothingToConvert);
    }

    if manifest.successes.is_empty() {
        let message = if has_files {
            "All files failed to process"
        } else {
            "All sections failed to synthesize"
        };
        return Err(SynthesisServiceError::AllFailed {
            message: message.to_string(),
            errors: manifest.errors,
        });
    }

    Ok(manifest)
}
