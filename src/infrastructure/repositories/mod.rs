pub mod audio_repository;
pub mod polly_tts_repository;
pub mod tts_repository;

pub use audio_repository::{
    AudioFile, AudioRepository, AudioStorageError, FileAudioRepository, StoredAudio,
};
pub use polly_tts_repository::PollyTtsRepository;
pub use tts_repository::{TtsProviderError, TtsRepository};
