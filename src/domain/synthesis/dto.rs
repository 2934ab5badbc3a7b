use serde::{Deserialize, Serialize};

use super::manifest::ManifestError;
use super::model::INLINE_DISPLAY_NAME;
use super::service::{PublishedAudio, PublishedBatch};

/// Request for POST /api/synthesize
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizeRequest {
    #[serde(default)]
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

/// Response for POST /api/synthesize
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SynthesizeResponse {
    Multipart(MultipartSynthesizeResponse),
    Single(SingleSynthesizeResponse),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleSynthesizeResponse {
    pub success: bool,
    pub filename: String,
    pub url: String,
    pub download_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipartSynthesizeResponse {
    pub success: bool,
    pub multipart: bool,
    pub results: Vec<SectionAudioDto>,
    pub errors: Vec<SectionErrorDto>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionAudioDto {
    pub name: String,
    pub filename: String,
    pub url: String,
    pub download_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SectionErrorDto {
    pub name: String,
    pub error: String,
}

/// Response for POST /api/upload and POST /api/upload-multiple
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub multipart: bool,
    pub results: Vec<UploadResultDto>,
    pub errors: Vec<UploadErrorDto>,
}

/// One uploaded file; split into parts when the file carried separators
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadResultDto {
    Parts {
        #[serde(rename = "originalFilename")]
        original_filename: String,
        #[serde(rename = "hasParts")]
        has_parts: bool,
        parts: Vec<UploadPartDto>,
    },
    Whole {
        #[serde(rename = "originalFilename")]
        original_filename: String,
        #[serde(rename = "audioFilename")]
        audio_filename: String,
        url: String,
        #[serde(rename = "downloadUrl")]
        download_url: String,
        #[serde(rename = "hasParts")]
        has_parts: bool,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPartDto {
    pub part_name: String,
    pub audio_filename: String,
    pub url: String,
    pub download_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadErrorDto {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_name: Option<String>,
    pub error: String,
}

impl From<PublishedBatch> for SynthesizeResponse {
    fn from(batch: PublishedBatch) -> Self {
        let mut results = batch.results;
        // Unsectioned text has one section, so a success leaves no errors behind
        if !batch.is_sectioned && results.len() == 1 {
            let audio = results.remove(0);
            return SynthesizeResponse::Single(SingleSynthesizeResponse {
                success: true,
                filename: audio.filename,
                url: audio.url,
                download_url: audio.download_url,
            });
        }

        let errors = batch
            .errors
            .into_iter()
            .map(|e| SectionErrorDto {
                name: e.section_name.unwrap_or_else(|| INLINE_DISPLAY_NAME.to_string()),
                error: e.detail,
            })
            .collect();

        SynthesizeResponse::Multipart(MultipartSynthesizeResponse {
            success: true,
            multipart: true,
            results: results
                .into_iter()
                .map(|audio| SectionAudioDto {
                    name: audio.section_name,
                    filename: audio.filename,
                    url: audio.url,
                    download_url: audio.download_url,
                })
                .collect(),
            errors,
        })
    }
}

impl From<PublishedBatch> for UploadResponse {
    fn from(batch: PublishedBatch) -> Self {
        let mut results = Vec::new();
        let mut remaining = batch.results.into_iter().peekable();

        for (index, source) in batch.sources.iter().enumerate() {
            let mut audio: Vec<PublishedAudio> = Vec::new();
            while let Some(next) = remaining.next_if(|a| a.source_index == index) {
                audio.push(next);
            }
            if audio.is_empty() {
                continue;
            }

            let original_filename = source.display_name.clone();
            let has_parts = audio.iter().any(|a| a.part_name.is_some());
            if has_parts {
                results.push(UploadResultDto::Parts {
                    original_filename,
                    has_parts: true,
                    parts: audio
                        .into_iter()
                        .map(|a| UploadPartDto {
                            part_name: a.part_name.unwrap_or(a.section_name),
                            audio_filename: a.filename,
                            url: a.url,
                            download_url: a.download_url,
                        })
                        .collect(),
                });
            } else {
                for a in audio {
                    results.push(UploadResultDto::Whole {
                        original_filename: original_filename.clone(),
                        audio_filename: a.filename,
                        url: a.url,
                        download_url: a.download_url,
                        has_parts: false,
                    });
                }
            }
        }

        let errors = batch
            .errors
            .into_iter()
            .map(|e| upload_error(&batch.sources, e))
            .collect();

        UploadResponse {
            success: true,
            multipart: batch.is_multipart,
            results,
            errors,
        }
    }
}

fn upload_error(sources: &[super::manifest::SourceSummary], error: ManifestError) -> UploadErrorDto {
    let filename = error
        .source_name
        .or_else(|| sources.get(error.source_index).map(|s| s.display_name.clone()))
        .unwrap_or_default();
    // A whole-file section carries the file's own name, not a part label
    let part_name = error.section_name.filter(|name| *name != filename);

    UploadErrorDto {
        filename,
        part_name,
        error: error.detail,
    }
}
