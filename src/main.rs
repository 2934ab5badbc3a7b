use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use narrator_backend::app::build_controllers;
use narrator_backend::infrastructure::config::{Config, LogFormat};
use narrator_backend::infrastructure::http::{create_router, start_http_server};
use narrator_backend::infrastructure::repositories::PollyTtsRepository;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting Narrator Backend on {}:{}",
        config.host,
        config.port
    );
    tracing::info!(
        environment = ?config.environment,
        output_dir = %config.output_dir.display(),
        output_format = config.output_format.as_polly_str(),
        engine = config.polly_engine.as_str(),
        max_chunk_chars = config.max_chunk_chars.get(),
        max_concurrent_synthesis = config.max_concurrent_synthesis.get(),
        request_timeout_secs = config.request_timeout_secs,
        "Synthesis settings"
    );

    // Create AWS Polly client
    tracing::info!("Initializing AWS Polly client with region: {}", config.aws_region);

    let has_access_key = std::env::var("AWS_ACCESS_KEY_ID").is_ok();
    let has_secret_key = std::env::var("AWS_SECRET_ACCESS_KEY").is_ok();
    tracing::info!(
        has_access_key_id = has_access_key,
        has_secret_access_key = has_secret_key,
        "AWS credentials environment check"
    );

    if !has_access_key || !has_secret_key {
        tracing::warn!("AWS credentials not found in environment variables. Will attempt to use other credential providers (profile, instance metadata, etc.)");
    }

    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.aws_region.clone()))
        .load()
        .await;

    tracing::info!(
        region = ?aws_config.region(),
        "AWS configuration loaded"
    );

    let polly_client = Arc::new(aws_sdk_polly::Client::new(&aws_config));
    tracing::info!("AWS Polly client initialized successfully");

    let config = Arc::new(config);
    let tts_repo = Arc::new(PollyTtsRepository::new(
        polly_client,
        config.output_format,
        config.polly_engine,
    ));

    // Cancelled on Ctrl-C: stops accepting connections and cancels in-flight batches
    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    let controllers = build_controllers(config.clone(), tts_repo, shutdown.clone()).await?;
    let router = create_router(&config, controllers);

    start_http_server(config, router, shutdown).await?;

    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received, cancelling in-flight work"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signal"),
    }
    shutdown.cancel();
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "narrator_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "narrator_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
