use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::infrastructure::config::AudioFormat;

const MAPPING_FILE: &str = "file_mapping.json";

#[derive(Debug, thiserror::Error)]
pub enum AudioStorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid mapping file: {0}")]
    Mapping(#[from] serde_json::Error),
}

/// Where a stored artifact can be played back and downloaded from
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAudio {
    pub stored_filename: String,
    pub display_filename: String,
    pub url: String,
    pub download_url: String,
}

/// Audio bytes plus the name it should be downloaded under
#[derive(Debug, Clone)]
pub struct AudioFile {
    pub data: Vec<u8>,
    pub display_filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MappingEntry {
    display_filename: String,
    created_at: DateTime<Utc>,
}

/// Persistence and lookup of synthesized audio
#[async_trait]
pub trait AudioRepository: Send + Sync {
    /// Persist one artifact under a fresh internal name
    async fn store(&self, data: &[u8], display_filename: &str) -> Result<StoredAudio, AudioStorageError>;

    /// Resolve a stored (or legacy) filename to its bytes and display name
    async fn load(&self, filename: &str) -> Result<AudioFile, AudioStorageError>;

    /// Whether the backing storage is usable
    async fn is_available(&self) -> bool;
}

/// Stores artifacts as `<uuid>.<ext>` under one directory, with the display
/// names kept in a JSON mapping file next to them
pub struct FileAudioRepository {
    base_dir: PathBuf,
    format: AudioFormat,
    mapping: Mutex<HashMap<String, MappingEntry>>,
}

impl FileAudioRepository {
    pub async fn new(base_dir: impl AsRef<Path>, format: AudioFormat) -> Result<Self, AudioStorageError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&base_dir).await?;

        let mapping_path = base_dir.join(MAPPING_FILE);
        let mapping = match tokio::fs::read(&mapping_path).await {
            Ok(raw) => serde_json::from_slice(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring unreadable file mapping");
                HashMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            dir = %base_dir.display(),
            mapped_files = mapping.len(),
            "File audio repository ready"
        );

        Ok(Self {
            base_dir,
            format,
            mapping: Mutex::new(mapping),
        })
    }

    /// Reject anything that could escape the storage directory
    fn is_safe_name(filename: &str) -> bool {
        !filename.is_empty()
            && !filename.starts_with('.')
            && filename
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    }

    async fn persist_mapping(&self, mapping: &HashMap<String, MappingEntry>) -> Result<(), AudioStorageError> {
        let raw = serde_json::to_vec_pretty(mapping)?;
        let tmp_path = self.base_dir.join(format!("{}.tmp", MAPPING_FILE));
        tokio::fs::write(&tmp_path, raw).await?;
        tokio::fs::rename(&tmp_path, self.base_dir.join(MAPPING_FILE)).await?;
        Ok(())
    }

    fn stem(filename: &str) -> &str {
        filename.split('.').next().unwrap_or(filename)
    }
}

#[async_trait]
impl AudioRepository for FileAudioRepository {
    async fn store(&self, data: &[u8], display_filename: &str) -> Result<StoredAudio, AudioStorageError> {
        let stored_filename = format!("{}.{}", Uuid::new_v4(), self.format.extension());
        tokio::fs::write(self.base_dir.join(&stored_filename), data).await?;

        {
            let mut mapping = self.mapping.lock().await;
            mapping.insert(
                stored_filename.clone(),
                MappingEntry {
                    display_filename: display_filename.to_string(),
                    created_at: Utc::now(),
                },
            );
            self.persist_mapping(&mapping).await?;
        }

        tracing::debug!(
            stored_filename = %stored_filename,
            display_filename = display_filename,
            size = data.len(),
            "Stored audio"
        );

        Ok(StoredAudio {
            url: format!("/api/audio/{}", stored_filename),
            download_url: format!("/api/download/{}", stored_filename),
            display_filename: display_filename.to_string(),
            stored_filename,
        })
    }

    async fn load(&self, filename: &str) -> Result<AudioFile, AudioStorageError> {
        if !Self::is_safe_name(filename) {
            return Err(AudioStorageError::NotFound(filename.to_string()));
        }

        let (stored_filename, display_filename) = {
            let mapping = self.mapping.lock().await;
            if let Some(entry) = mapping.get(filename) {
                (filename.to_string(), entry.display_filename.clone())
            } else {
                let wanted = Self::stem(filename);
                match mapping.iter().find(|(stored, _)| Self::stem(stored) == wanted) {
                    Some((stored, entry)) => (stored.clone(), entry.display_filename.clone()),
                    None => {
                        // Unmapped file on disk: serve it under its own name
                        let fallback = format!("{}.{}", wanted, self.format.extension());
                        (fallback.clone(), fallback)
                    }
                }
            }
        };

        match tokio::fs::read(self.base_dir.join(&stored_filename)).await {
            Ok(data) => Ok(AudioFile {
                data,
                display_filename,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AudioStorageError::NotFound(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn is_available(&self) -> bool {
        tokio::fs::metadata(&self.base_dir)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }
}
