//! HTTP front end: static pages plus the message form endpoint.

pub mod messages;
pub mod state;

use axum::{Router, routing::post};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub use state::{AppState, AppStateInner};

/// Path the message form posts to, and where a successful post redirects.
pub const MESSAGE_PAGE: &str = "/message.html";

/// Page served with a 404 for any unknown static path.
pub const ERROR_PAGE: &str = "error.html";

pub fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.static_dir)
        .not_found_service(ServeFile::new(state.static_dir.join(ERROR_PAGE)));

    Router::new()
        .route(
            MESSAGE_PAGE,
            post(messages::submit_message).fallback_service(static_files.clone()),
        )
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
