//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`.
//! Middleware: CORS, tracing.
//!
//! In production, the built participant frontend is served from
//! `apps/web/dist/` (configurable via `COLLOQUY_WEB_DIR`). API routes
//! take priority; unknown paths fall through to the SPA's `index.html`
//! for client-side routing. If the directory does not exist, only the
//! API is served.

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Sessions
        .route("/sessions", post(handlers::session::create_session))
        .route("/sessions/{id}", get(handlers::session::get_session))
        .route(
            "/sessions/{id}/transcript",
            put(handlers::session::replace_transcript),
        )
        .route(
            "/sessions/{id}/analysis",
            post(handlers::analysis::request_analysis),
        )
        // Stateless conversation turn
        .route("/respond", post(handlers::respond::respond))
        // Staff dashboard (bearer token)
        .route("/staff/sessions", get(handlers::session::list_sessions))
        .route(
            "/staff/sessions/{id}",
            get(handlers::session::get_session_staff),
        )
        // Speech I/O
        .route(
            "/speech/transcriptions",
            post(handlers::speech::transcribe),
        )
        .route("/speech/synthesis", post(handlers::speech::synthesize))
        // Scenario catalog
        .route("/scenarios", get(handlers::scenario::list_scenarios))
        .route("/scenarios/{id}", get(handlers::scenario::get_scenario));

    let mut router = Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Serve the built frontend from disk if the directory exists.
    // API routes and /health take priority; unknown paths fall through
    // to index.html for client-side routing.
    let web_dir =
        std::env::var("COLLOQUY_WEB_DIR").unwrap_or_else(|_| "apps/web/dist".to_string());
    if std::path::Path::new(&web_dir).exists() {
        let index_path = format!("{web_dir}/index.html");
        let serve_dir = ServeDir::new(&web_dir).fallback(ServeFile::new(index_path));
        router = router.fallback_service(serve_dir);
        tracing::info!(path = %web_dir, "SPA static file serving enabled");
    }

    router
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
