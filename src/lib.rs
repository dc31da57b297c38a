pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod ingest;
pub mod middleware;
pub mod state;
pub mod views;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

use axum::{
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use state::AppState;

/// The complete HTTP application over `state`.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.server.max_request_size_bytes;

    Router::new()
        // Public
        .merge(public_routes())
        // Session-protected pages and JSON
        .merge(page_routes(state.clone()))
        .merge(api_routes(state.clone()))
        // Global middleware
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use handlers::public;

    Router::new()
        .route("/", get(public::index).post(public::index))
        .route("/health", get(public::health))
        .route("/register", get(public::register_get).post(public::register_post))
        .route("/login", get(public::login_get).post(public::login_post))
        .route("/logout", get(public::logout))
}

fn page_routes(state: AppState) -> Router<AppState> {
    use handlers::protected;

    Router::new()
        .route(
            "/dashboard",
            get(protected::dashboard_get).post(protected::dashboard_post),
        )
        .route("/search", get(protected::search_get).post(protected::search_post))
        .route_layer(from_fn_with_state(state, middleware::require_login))
}

fn api_routes(state: AppState) -> Router<AppState> {
    use handlers::protected;

    Router::new()
        .route("/api/spend/:dimension", get(protected::spend_get))
        .route(
            "/api/households/:hshd_num/transactions",
            get(protected::household_transactions_get),
        )
        .route_layer(from_fn_with_state(state, middleware::require_api_login))
}
