use super::error::VoiceServiceError;
use super::model::Voice;
use crate::infrastructure::repositories::TtsRepository;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

const CATALOG_KEY: &str = "voices";

pub struct VoiceService {
    tts_repo: Arc<dyn TtsRepository>,
    cache: Option<Cache<&'static str, Arc<Vec<Voice>>>>,
}

impl VoiceService {
    pub fn new(tts_repo: Arc<dyn TtsRepository>, cache_enabled: bool) -> Self {
        // The catalog changes rarely; one entry refreshed hourly is enough
        let cache = if cache_enabled {
            Some(
                Cache::builder()
                    .max_capacity(1)
                    .time_to_live(Duration::from_secs(60 * 60))
                    .build(),
            )
        } else {
            None
        };

        Self { tts_repo, cache }
    }
}

#[async_trait]
pub trait VoiceServiceApi: Send + Sync {
    /// List the voices the provider can synthesize with, in provider order
    async fn list_voices(&self) -> Result<Arc<Vec<Voice>>, VoiceServiceError>;
}

#[async_trait]
impl VoiceServiceApi for VoiceService {
    async fn list_voices(&self) -> Result<Arc<Vec<Voice>>, VoiceServiceError> {
        if let Some(cache) = &self.cache {
            if let Some(voices) = cache.get(CATALOG_KEY).await {
                tracing::debug!(voice_count = voices.len(), "Voice catalog cache hit");
                return Ok(voices);
            }
        }

        let voices = Arc::new(self.tts_repo.list_voices().await?);

        if let Some(cache) = &self.cache {
            cache.insert(CATALOG_KEY, voices.clone()).await;
        }

        Ok(voices)
    }
}
