//! Router setup with all API routes and middleware.
//!
//! Configures the axum Router with CORS, tracing, compression, body limits,
//! and all endpoint handlers.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS: the configured frontend origin plus the server's own origin
    // (the embedded UI is served from the same port).
    let port = state.config.server.port;
    let mut origins: Vec<HeaderValue> = vec![
        format!("http://127.0.0.1:{}", port)
            .parse::<HeaderValue>()
            .unwrap(),
        format!("http://localhost:{}", port)
            .parse::<HeaderValue>()
            .unwrap(),
    ];
    match state.config.server.allow_origin.parse::<HeaderValue>() {
        Ok(origin) => origins.push(origin),
        Err(_) => tracing::warn!(
            origin = %state.config.server.allow_origin,
            "Invalid allow_origin value - skipping"
        ),
    }

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    // JSON chat routes: small bodies.
    let chat_routes = Router::new()
        .route("/chat", post(handlers::chat))
        .route("/chat/history/{session_id}", get(handlers::chat_history))
        .route("/voice/chat", post(handlers::voice_chat))
        .layer(DefaultBodyLimit::max(64 * 1024));

    // Raw audio upload gets a larger limit.
    let audio_routes = Router::new()
        .route("/voice/stt", post(handlers::voice_stt))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::ui))
        .route("/ui", get(handlers::ui))
        .merge(chat_routes)
        .merge(audio_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server on the configured address.
pub async fn start_server(state: AppState) -> Result<(), parley_core::ParleyError> {
    let port = state.config.server.port;
    let addr = format!("0.0.0.0:{}", port);

    let router = create_router(state);

    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| parley_core::ParleyError::Api(format!("Failed to bind: {}", e)))?;

    axum::serve(listener, router)
        .await
        .map_err(|e| parley_core::ParleyError::Api(format!("Server error: {}", e)))?;

    Ok(())
}
