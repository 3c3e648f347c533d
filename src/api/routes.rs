//! REST API routes configuration

use crate::api::handlers::{self, ApiError, ApiState};
use crate::api::websocket::ws_handler;
use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Fallback handler for unknown routes
async fn fallback_handler() -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError {
            error: "Not Found".to_string(),
        }),
    )
}

/// Create the API router with all routes
pub fn create_router(state: ApiState) -> Router {
    // Configure CORS for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // WebSocket for real-time updates
        .route("/ws", get(ws_handler))
        // Wallets
        .route("/api/wallets", get(handlers::list_wallets))
        .route("/api/wallets", post(handlers::create_wallet))
        .route("/api/wallets/{address}", get(handlers::get_wallet))
        .route(
            "/api/wallets/{address}/balance",
            get(handlers::get_wallet_balance),
        )
        // Transactions
        .route(
            "/api/wallets/{address}/transactions",
            get(handlers::list_transactions),
        )
        .route(
            "/api/wallets/{address}/transactions",
            post(handlers::propose_transaction),
        )
        .route(
            "/api/wallets/{address}/transactions/{index}",
            get(handlers::get_transaction),
        )
        .route(
            "/api/wallets/{address}/transactions/{index}/approve",
            post(handlers::approve_transaction),
        )
        .route(
            "/api/wallets/{address}/transactions/{index}/revoke",
            post(handlers::revoke_transaction),
        )
        .route(
            "/api/wallets/{address}/transactions/{index}/execute",
            post(handlers::execute_transaction),
        )
        .route(
            "/api/wallets/{address}/transactions/{index}/approvals",
            get(handlers::get_approvals),
        )
        // Accounts
        .route("/api/accounts/{account}/fund", post(handlers::fund_account))
        .route(
            "/api/accounts/{account}/balance",
            get(handlers::get_balance),
        )
        .fallback(fallback_handler)
        // Add state and middleware
        .with_state(state)
        .layer(cors)
}
