pub mod request_id;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::controllers::{
    audio::AudioController, health, synthesis::SynthesisController, voices::VoiceController,
};
use crate::infrastructure::config::Config;
use crate::infrastructure::repositories::AudioRepository;

pub use request_id::{request_id_middleware, RequestId, X_REQUEST_ID};

/// Everything the router hands requests to
#[derive(Clone)]
pub struct AppControllers {
    pub synthesis: Arc<SynthesisController>,
    pub audio: Arc<AudioController>,
    pub voices: Arc<VoiceController>,
    pub audio_repo: Arc<dyn AudioRepository>,
}

/// Build the application router with all routes and layers
pub fn create_router(config: &Config, controllers: AppControllers) -> Router {
    let synthesis_routes = Router::new()
        .route("/api/synthesize", post(SynthesisController::synthesize))
        .route("/api/upload", post(SynthesisController::upload))
        .route("/api/upload-multiple", post(SynthesisController::upload_multiple))
        .with_state(controllers.synthesis);

    let audio_routes = Router::new()
        .route("/api/audio/:filename", get(AudioController::serve))
        .route("/api/download/:filename", get(AudioController::download))
        .with_state(controllers.audio);

    let voice_routes = Router::new()
        .route("/api/voices", get(VoiceController::list_voices))
        .with_state(controllers.voices);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(controllers.audio_repo)
        .merge(synthesis_routes)
        .merge(audio_routes)
        .merge(voice_routes)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        // Outermost last: CORS wraps trace, which wraps request-id. Applied
        // one at a time so each layer sees axum's `Body` (CORS needs `Default`)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serve `router` until `shutdown` is cancelled
pub async fn start_http_server(
    config: Arc<Config>,
    router: Router,
    shutdown: CancellationToken,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    tracing::info!("Server stopped");

    Ok(())
}
