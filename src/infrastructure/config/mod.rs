use serde::Deserialize;
use std::env;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub aws_region: String,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Audio output
    pub output_dir: PathBuf,
    pub output_format: AudioFormat,
    pub polly_engine: PollyEngine,
    // Voice defaults used when a request omits them
    pub default_voice_id: String,
    pub default_language_code: String,
    // Batch synthesis
    pub max_chunk_chars: NonZeroUsize,
    pub max_concurrent_synthesis: NonZeroUsize,
    pub request_timeout_secs: u64,
    // Uploads
    pub allowed_extensions: Vec<String>,
    pub max_upload_bytes: usize,
    // Voice catalog cache
    pub voice_cache_enabled: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Audio container requested from the provider
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AudioFormat {
    Mp3,
    OggVorbis,
    Pcm,
}

impl AudioFormat {
    /// Value expected by Polly's `OutputFormat`
    pub fn as_polly_str(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::OggVorbis => "ogg_vorbis",
            AudioFormat::Pcm => "pcm",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::OggVorbis => "ogg",
            AudioFormat::Pcm => "pcm",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::OggVorbis => "audio/ogg",
            AudioFormat::Pcm => "audio/L16",
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PollyEngine {
    Standard,
    Neural,
}

impl PollyEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollyEngine::Standard => "standard",
            PollyEngine::Neural => "neural",
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "eu-west-1".to_string()),
            environment: match env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .as_str()
            {
                "production" => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            output_dir: env::var("OUTPUT_DIR")
                .unwrap_or_else(|_| "output".to_string())
                .into(),
            output_format: parse_audio_format(
                &env::var("OUTPUT_FORMAT").unwrap_or_else(|_| "mp3".to_string()),
            )?,
            polly_engine: match env::var("POLLY_ENGINE")
                .unwrap_or_else(|_| "standard".to_string())
                .to_lowercase()
                .as_str()
            {
                "neural" => PollyEngine::Neural,
                _ => PollyEngine::Standard,
            },
            default_voice_id: env::var("DEFAULT_VOICE_ID").unwrap_or_else(|_| "Joanna".to_string()),
            default_language_code: env::var("DEFAULT_LANGUAGE_CODE")
                .unwrap_or_else(|_| "en-US".to_string()),
            // Polly rejects plain-text requests above 3000 characters
            max_chunk_chars: env::var("MAX_CHUNK_CHARS")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            max_concurrent_synthesis: env::var("MAX_CONCURRENT_SYNTHESIS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()?,
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()?,
            allowed_extensions: parse_extensions(
                &env::var("ALLOWED_EXTENSIONS").unwrap_or_else(|_| "txt".to_string()),
            ),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| (10 * 1024 * 1024).to_string())
                .parse()?,
            voice_cache_enabled: env::var("VOICE_CACHE_ENABLED")
                .map(|s| s.to_lowercase() == "true")
                .unwrap_or(true),
        };

        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Whether an uploaded filename carries one of the allowed extensions
    pub fn is_allowed_file(&self, filename: &str) -> bool {
        match filename.rsplit_once('.') {
            Some((_, ext)) => {
                let ext = ext.to_lowercase();
                self.allowed_extensions.iter().any(|allowed| *allowed == ext)
            }
            None => false,
        }
    }
}

fn parse_audio_format(value: &str) -> Result<AudioFormat, String> {
    match value.to_lowercase().as_str() {
        "mp3" => Ok(AudioFormat::Mp3),
        "ogg" | "ogg_vorbis" => Ok(AudioFormat::OggVorbis),
        "pcm" => Ok(AudioFormat::Pcm),
        other => Err(format!("Unsupported OUTPUT_FORMAT: {}", other)),
    }
}

fn parse_extensions(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

#[cfg(test)]
pub(crate) fn test_config(output_dir: PathBuf) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        aws_region: "us-east-1".to_string(),
        environment: Environment::Development,
        log_format: LogFormat::Pretty,
        output_dir,
        output_format: AudioFormat::Mp3,
        polly_engine: PollyEngine::Standard,
        default_voice_id: "Joanna".to_string(),
        default_language_code: "en-US".to_string(),
        max_chunk_chars: NonZeroUsize::new(3000).unwrap(),
        max_concurrent_synthesis: NonZeroUsize::new(4).unwrap(),
        request_timeout_secs: 120,
        allowed_extensions: vec!["txt".to_string()],
        max_upload_bytes: 1024 * 1024,
        voice_cache_enabled: false,
    }
}
