use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use neonquiz::{api, config::ServerConfig, questions::QuestionBank, state::AppState, sweeper, ws};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "neonquiz=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting NeonQuiz...");

    let server_config = ServerConfig::from_env();

    // Load the question bank (falls back to the built-in set)
    let bank = match &server_config.question_bank_path {
        Some(path) => match QuestionBank::from_json_file(path) {
            Ok(bank) => bank,
            Err(e) => {
                tracing::warn!("Failed to load question bank: {}. Using built-in set.", e);
                QuestionBank::default()
            }
        },
        None => QuestionBank::default(),
    };
    tracing::info!("Question bank categories: {:?}", bank.categories());

    let state = Arc::new(AppState::new(bank));

    // Spawn background task that reclaims finished rooms
    sweeper::spawn_room_sweeper(state.clone());

    let app = Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/api/rooms", get(api::list_rooms))
        .fallback_service(ServeDir::new("static"))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], server_config.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
