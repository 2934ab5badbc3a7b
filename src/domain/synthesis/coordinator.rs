use futures::future::join_all;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::chunker::chunk_section;
use super::model::{AudioArtifact, Chunk, Section, SectionResult, SynthesisOutcome, VoiceSelection};
use crate::infrastructure::repositories::TtsRepository;

pub const TIMEOUT_DETAIL: &str = "timeout";
pub const CANCELLED_DETAIL: &str = "cancelled";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CoordinatorError {
    #[error("no sections to synthesize")]
    EmptyInput,
}

/// Time and cancellation limits of one request
#[derive(Debug, Clone)]
pub struct SynthesisBudget {
    pub deadline: Instant,
    pub cancel: CancellationToken,
}

impl SynthesisBudget {
    pub fn new(deadline: Instant, cancel: CancellationToken) -> Self {
        Self { deadline, cancel }
    }
}

/// Fans chunks out to the provider and folds the outcomes back into
/// per-section results.
///
/// The permit pool is shared by every request that goes through this
/// coordinator, so the number of provider calls in flight never exceeds
/// `max_in_flight` process-wide.
pub struct SynthesisCoordinator {
    tts_repo: Arc<dyn TtsRepository>,
    permits: Arc<Semaphore>,
}

impl SynthesisCoordinator {
    pub fn new(tts_repo: Arc<dyn TtsRepository>, max_in_flight: NonZeroUsize) -> Self {
        Self {
            tts_repo,
            permits: Arc::new(Semaphore::new(max_in_flight.get())),
        }
    }

    /// Synthesize every section. Returns one result per section, in section order.
    pub async fn synthesize(
        &self,
        sections: &[Section],
        voice: &VoiceSelection,
        max_len: NonZeroUsize,
        budget: &SynthesisBudget,
    ) -> Result<Vec<SectionResult>, CoordinatorError> {
        if sections.is_empty() {
            return Err(CoordinatorError::EmptyInput);
        }

        let chunks: Vec<Chunk> = sections
            .iter()
            .flat_map(|section| chunk_section(section, max_len))
            .collect();

        tracing::info!(
            section_count = sections.len(),
            chunk_count = chunks.len(),
            voice_id = %voice.voice_id,
            language_code = %voice.language_code,
            "Dispatching chunks"
        );

        // join_all keeps input order, so each outcome lands in its chunk's slot
        let outcomes = join_all(chunks.iter().map(|chunk| self.run_chunk(chunk, voice, budget))).await;

        Ok(assemble(sections, outcomes))
    }

    async fn run_chunk(
        &self,
        chunk: &Chunk,
        voice: &VoiceSelection,
        budget: &SynthesisBudget,
    ) -> SynthesisOutcome {
        // Blank runs left by the chunker carry no speech
        if chunk.text.trim().is_empty() {
            tracing::debug!(
                section_ordinal = chunk.section_ordinal,
                chunk_ordinal = chunk.ordinal,
                "Skipping blank chunk"
            );
            return SynthesisOutcome {
                section_ordinal: chunk.section_ordinal,
                chunk_ordinal: chunk.ordinal,
                result: Ok(AudioArtifact::default()),
            };
        }

        let call = async {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|_| "synthesis pool closed".to_string())?;

            self.tts_repo
                .synthesize(&chunk.text, &voice.voice_id, &voice.language_code)
                .await
                .map(AudioArtifact::new)
                .map_err(|e| e.to_string())
        };

        let result = tokio::select! {
            biased;
            _ = budget.cancel.cancelled() => Err(CANCELLED_DETAIL.to_string()),
            _ = tokio::time::sleep_until(budget.deadline) => Err(TIMEOUT_DETAIL.to_string()),
            result = call => result,
        };

        if let Err(detail) = &result {
            tracing::warn!(
                section_ordinal = chunk.section_ordinal,
                chunk_ordinal = chunk.ordinal,
                error = %detail,
                "Chunk synthesis failed"
            );
        }

        SynthesisOutcome {
            section_ordinal: chunk.section_ordinal,
            chunk_ordinal: chunk.ordinal,
            result,
        }
    }
}

/// Fold chunk outcomes (in section, then chunk order) into section results.
/// A section succeeds only if all of its chunks did.
fn assemble(sections: &[Section], outcomes: Vec<SynthesisOutcome>) -> Vec<SectionResult> {
    let mut outcomes = outcomes.into_iter().peekable();

    sections
        .iter()
        .map(|section| {
            let mut artifact = AudioArtifact::default();
            let mut failure: Option<String> = None;

            while let Some(outcome) = outcomes.next_if(|o| o.section_ordinal == section.ordinal) {
                match outcome.result {
                    Ok(audio) if failure.is_none() => artifact.append(audio),
                    Ok(_) => {}
                    Err(detail) => {
                        failure.get_or_insert(detail);
                    }
                }
            }

            let outcome = match failure {
                Some(detail) => Err(detail),
                None => Ok(artifact),
            };

            tracing::debug!(
                section = %section.name,
                success = outcome.is_ok(),
                "Section assembled"
            );

            SectionResult {
                section_name: section.name.clone(),
                ordinal: section.ordinal,
                implicit: section.implicit,
                outcome,
            }
        })
        .collect()
}
