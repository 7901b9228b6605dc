//! Sneako mock server library.
//!
//! A development backend for the Sneako storefront: file-backed JSON
//! collections behind a small REST API with a handful of custom handlers
//! (login, registration, profile, cart) layered over generic CRUD.
//!
//! The binary in `main.rs` only wires configuration, logging and the
//! listener around [`app`]; everything else lives here so it can be driven
//! in-process by tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod store;

use axum::{Router, http::Request, middleware::from_fn, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use state::AppState;

/// Build the application router.
///
/// `GET /health` answers `ok`. Every other request goes to the API
/// dispatcher, which rejects paths outside the configured prefix with 404.
pub fn app(state: AppState) -> Router {
    let cors = state.config().cors;

    let router = Router::new()
        .route("/health", get(health))
        .fallback(routes::dispatch)
        .with_state(state)
        .layer(from_fn(middleware::request_id_middleware));

    let router = if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.layer(
        TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }),
    )
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
