use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::signal;

use mood_journal::analysis::{MoodAnalyzer, MoodModel};
use mood_journal::api::{self, AppState};
use mood_journal::cli::Cli;
use mood_journal::config::{AnalysisProvider, Config};
use mood_journal::error::AppError;
use mood_journal::logging::init_logging;
use mood_journal::metrics::AppMetrics;
use mood_journal::service::JournalService;
use mood_journal::services::gemini::GeminiClient;
use mood_journal::services::openai::OpenAiClient;
use mood_journal::store::MemStore;

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();
    let cli = Cli::parse();

    let config = Config::from_env_and_cli(&cli)
        .map_err(AppError::Config)
        .unwrap_or_else(|err| {
            tracing::error!("{}", err);
            std::process::exit(1);
        });

    if let Err(err) = run(config).await {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), AppError> {
    if config.api_key.is_none() {
        tracing::warn!(
            "No API key configured for {:?}; every mood analysis will use fallback values",
            config.provider
        );
    }

    let model: Arc<dyn MoodModel + Send + Sync> = match config.provider {
        AnalysisProvider::Gemini => Arc::new(GeminiClient::new(
            config.api_base_url.clone(),
            config.api_key.clone(),
            config.model.clone(),
        )),
        AnalysisProvider::OpenAi => Arc::new(OpenAiClient::new(
            config.api_base_url.clone(),
            config.api_key.clone(),
            config.model.clone(),
        )),
    };
    let analyzer = Arc::new(MoodAnalyzer::new(model).with_timeout(config.analysis_timeout));

    let metrics = Arc::new(AppMetrics::new().map_err(|err| AppError::Internal(err.to_string()))?);
    let store = Arc::new(MemStore::new());
    let service = JournalService::new(store, analyzer).with_metrics(metrics.clone());

    let app = api::create_router(Arc::new(AppState { service, metrics }));

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .map_err(|err| AppError::Network(format!("Failed to bind {}: {}", config.bind_addr, err)))?;

    tracing::info!(
        "Mood journal listening on {} (analysis: {:?}, model {}, timeout {}s)",
        config.bind_addr,
        config.provider,
        config.model,
        config.analysis_timeout.as_secs()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(err.to_string()))?;

    tracing::info!("Server stopped cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received. Stopping server.");
}
