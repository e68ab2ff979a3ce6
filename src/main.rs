// src/main.rs

use std::net::SocketAddr;
use std::sync::Arc;

use dotenvy::dotenv;
use quizgen::config::{self, Config};
use quizgen::llm::{OpenAiCompatibleClient, TextGenerator};
use quizgen::quiz::QuizGenerator;
use quizgen::routes;
use quizgen::sessions::SessionStore;
use quizgen::state::AppState;
use quizgen::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file (if present)
    dotenv().ok();

    // Initialize Tracing (Logging) before anything that may warn
    let _guard = telemetry::init_tracing(&config::log_filter());

    // Load configuration from environment
    let config = Config::from_env();

    // The inference backend is built once and shared by every request.
    let backend: Arc<dyn TextGenerator> = Arc::new(OpenAiCompatibleClient::from_config(&config)?);
    tracing::info!(
        "Inference backend: {} (model {})",
        config.llm_base_url,
        config.llm_model
    );

    let generator = QuizGenerator::from_config(backend, &config);

    let sessions = SessionStore::new(config.session_ttl);
    // Abandoned sessions are swept periodically, not only on create.
    sessions.spawn_sweeper(config.session_ttl / 4);

    let state = AppState {
        config: config.clone(),
        generator,
        sessions,
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Start the server
    axum::serve(listener, app).await?;

    Ok(())
}
