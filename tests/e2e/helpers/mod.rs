use narrator_backend::app::build_controllers;
use narrator_backend::infrastructure::config::{
    AudioFormat, Config, Environment, LogFormat, PollyEngine,
};
use narrator_backend::infrastructure::http::create_router;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tempfile::TempDir;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub mod api_client;

use api_client::TestClient;
use fake_provider::FakeTtsProvider;

/// Chunk limit small enough that ordinary test sentences span several chunks
pub const TEST_MAX_CHUNK_CHARS: usize = 40;
pub const TEST_MAX_CONCURRENT_SYNTHESIS: usize = 2;

pub struct TestContext {
    pub client: TestClient,
    pub config: Arc<Config>,
    pub provider: Arc<FakeTtsProvider>,
    pub shutdown: CancellationToken,
    _output_dir: TempDir,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let output_dir = tempfile::tempdir().expect("Failed to create output dir");
            let config = Arc::new(test_config(&output_dir));
            let provider = Arc::new(FakeTtsProvider::default());
            let shutdown = CancellationToken::new();

            let controllers = build_controllers(config.clone(), provider.clone(), shutdown.clone())
                .await
                .expect("Failed to create app");
            let app = create_router(&config, controllers);

            // Start server
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind listener");
            let addr = listener.local_addr().expect("Failed to get local addr");
            let base_url = format!("http://{}", addr);

            let server_shutdown = shutdown.clone();
            tokio::spawn(async move {
                axum::serve(listener, app)
                    .with_graceful_shutdown(server_shutdown.cancelled_owned())
                    .await
                    .unwrap();
            });

            Self {
                client: TestClient::new(&base_url),
                config,
                provider,
                shutdown,
                _output_dir: output_dir,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async move {
            self.shutdown.cancel();
        }
    }
}

fn test_config(output_dir: &TempDir) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0, // Will be assigned by the OS
        aws_region: "us-east-1".to_string(),
        environment: Environment::Development,
        log_format: LogFormat::Pretty,
        output_dir: output_dir.path().to_path_buf(),
        output_format: AudioFormat::Mp3,
        polly_engine: PollyEngine::Standard,
        default_voice_id: "Joanna".to_string(),
        default_language_code: "en-US".to_string(),
        max_chunk_chars: NonZeroUsize::new(TEST_MAX_CHUNK_CHARS).unwrap(),
        max_concurrent_synthesis: NonZeroUsize::new(TEST_MAX_CONCURRENT_SYNTHESIS).unwrap(),
        request_timeout_secs: 30,
        allowed_extensions: vec!["txt".to_string()],
        max_upload_bytes: 1024 * 1024,
        voice_cache_enabled: false, // Keep tests independent of cached catalogs
    }
}
