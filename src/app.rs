use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::{
    controllers::{
        audio::AudioController, synthesis::SynthesisController, voices::VoiceController,
    },
    domain::{
        synthesis::{SynthesisCoordinator, SynthesisService, SynthesisSettings},
        voice::VoiceService,
    },
    infrastructure::{
        config::Config,
        http::AppControllers,
        repositories::{AudioRepository, AudioStorageError, FileAudioRepository, TtsRepository},
    },
};

/// Wire repositories, services and controllers around a TTS provider.
///
/// `shutdown` is the server-wide token; every batch derives its own child
/// token from it, so cancelling it stops in-flight synthesis.
pub async fn build_controllers(
    config: Arc<Config>,
    tts_repo: Arc<dyn TtsRepository>,
    shutdown: CancellationToken,
) -> Result<AppControllers, AudioStorageError> {
    // 1. Repositories
    tracing::info!("Instantiating repositories...");
    let audio_repo: Arc<dyn AudioRepository> =
        Arc::new(FileAudioRepository::new(&config.output_dir, config.output_format).await?);

    // 2. Services
    tracing::info!("Instantiating services...");
    let coordinator = Arc::new(SynthesisCoordinator::new(
        tts_repo.clone(),
        config.max_concurrent_synthesis,
    ));
    let synthesis_service = Arc::new(SynthesisService::new(
        coordinator,
        audio_repo.clone(),
        SynthesisSettings {
            max_chunk_chars: config.max_chunk_chars,
            request_timeout: config.request_timeout(),
            file_extension: config.output_format.extension(),
        },
        shutdown,
    ));
    let voice_service = Arc::new(VoiceService::new(tts_repo, config.voice_cache_enabled));

    // 3. Controllers
    tracing::info!("Instantiating controllers...");
    Ok(AppControllers {
        synthesis: Arc::new(SynthesisController::new(synthesis_service, config.clone())),
        audio: Arc::new(AudioController::new(audio_repo.clone(), config.output_format)),
        voices: Arc::new(VoiceController::new(voice_service)),
        audio_repo,
    })
}
