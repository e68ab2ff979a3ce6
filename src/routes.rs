// src/routes.rs

use axum::{
    Router,
    http::Method,
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{health, quiz, session},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (health, quiz, sessions).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (generator + session store).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().expect("static origin is valid"),
        "http://127.0.0.1:3000".parse().expect("static origin is valid"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let quiz_routes = Router::new().route("/generate", post(quiz::generate_quiz));

    let session_routes = Router::new()
        .route("/", post(session::create_session))
        .route("/{id}", delete(session::delete_session))
        .route("/{id}/topic", post(session::submit_topic))
        .route("/{id}/quiz", get(session::get_quiz))
        .route("/{id}/answers", post(session::submit_answers));

    Router::new()
        .route("/api/health", get(health::health))
        .nest("/api/quiz", quiz_routes)
        .nest("/api/sessions", session_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
