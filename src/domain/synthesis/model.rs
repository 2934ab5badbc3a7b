use serde::{Deserialize, Serialize};

use super::error::SynthesisServiceError;

/// Display name of the text box submission
pub const INLINE_DISPLAY_NAME: &str = "Audio";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceOrigin {
    Inline,
    File,
}

/// One logical text input: the text box, or one uploaded file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub origin: SourceOrigin,
    pub raw_text: String,
    pub display_name: String,
}

impl Source {
    pub fn inline(raw_text: impl Into<String>) -> Self {
        Self {
            origin: SourceOrigin::Inline,
            raw_text: raw_text.into(),
            display_name: INLINE_DISPLAY_NAME.to_string(),
        }
    }

    pub fn file(display_name: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            origin: SourceOrigin::File,
            raw_text: raw_text.into(),
            display_name: display_name.into(),
        }
    }
}

/// A submitted source, or a file that was refused before reaching the pipeline
#[derive(Debug, Clone)]
pub enum SourceSubmission {
    Accepted(Source),
    Rejected { display_name: String, reason: String },
}

/// A named slice of a source's text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub text: String,
    pub ordinal: usize,
    /// Named after the source rather than a separator label
    pub implicit: bool,
}

/// A provider-length-bounded slice of a section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub section_ordinal: usize,
    pub ordinal: usize,
    pub text: String,
}

/// Encoded audio returned by the provider; artifacts of one section are
/// concatenated in chunk order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioArtifact(Vec<u8>);

impl AudioArtifact {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn append(&mut self, other: AudioArtifact) {
        self.0.extend(other.0);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Result of one provider call
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisOutcome {
    pub section_ordinal: usize,
    pub chunk_ordinal: usize,
    pub result: Result<AudioArtifact, String>,
}

/// All-or-nothing result of one section: the whole artifact, or the first
/// chunk failure in chunk order
#[derive(Debug, Clone, PartialEq)]
pub struct SectionResult {
    pub section_name: String,
    pub ordinal: usize,
    pub implicit: bool,
    pub outcome: Result<AudioArtifact, String>,
}

impl SectionResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Validated voice/language pair every provider call of a batch uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSelection {
    pub voice_id: String,
    pub language_code: String,
}

impl VoiceSelection {
    pub fn new(voice_id: &str, language_code: &str) -> Result<Self, SynthesisServiceError> {
        let voice_id = voice_id.trim();
        let language_code = language_code.trim();

        if voice_id.is_empty() || !voice_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(SynthesisServiceError::Invalid(format!(
                "Invalid voice id: '{}'",
                voice_id
            )));
        }

        // Polly codes look like `en-US`, `cmn-CN` or `arb`
        let mut parts = language_code.split('-');
        let primary_ok = parts
            .next()
            .is_some_and(|p| (2..=3).contains(&p.len()) && p.chars().all(|c| c.is_ascii_lowercase()));
        let region_ok = parts.all(|p| (2..=4).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphanumeric()));
        if !primary_ok || !region_ok {
            return Err(SynthesisServiceError::Invalid(format!(
                "Invalid language code: '{}'",
                language_code
            )));
        }

        Ok(Self {
            voice_id: voice_id.to_string(),
            language_code: language_code.to_string(),
        })
    }
}
