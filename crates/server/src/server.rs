use std::{future::Future, sync::Arc};

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{ServerError, balance, transactions, types::Health};
use engine::{ArgumentError, Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

async fn health(State(state): State<ServerState>) -> Result<Json<Health>, ServerError> {
    state
        .engine
        .ping()
        .await
        .map_err(ServerError::context("Database unavailable"))?;
    Ok(Json(Health {
        status: "ok".to_string(),
    }))
}

/// `/balance/` and `/transactions/` with nothing after the slash.
async fn missing_wallet_id() -> ServerError {
    ServerError::from(EngineError::InvalidArgument(
        ArgumentError::WalletIdRequired,
    ))
}

/// Build the API router, mounted under `/api`.
pub fn router(engine: Arc<Engine>) -> Router {
    let state = ServerState { engine };

    let api = Router::new()
        .route("/transaction", post(transactions::transaction_new))
        .route("/transactions/{wallet_id}", get(transactions::list))
        .route("/transactions/", get(missing_wallet_id))
        .route("/balance/{wallet_id}", get(balance::get))
        .route("/balance/", get(missing_wallet_id))
        .route("/health", get(health));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the API on `listener` until `shutdown` resolves.
pub async fn run_with_listener(
    engine: Arc<Engine>,
    listener: tokio::net::TcpListener,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine))
        .with_graceful_shutdown(shutdown)
        .await
}
