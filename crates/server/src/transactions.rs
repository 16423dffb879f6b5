//! Transactions API endpoints

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use engine::ApplyCmd;

use crate::{
    ServerError,
    server::ServerState,
    types::{TransactionNew, TransactionView},
};

pub async fn transaction_new(
    State(state): State<ServerState>,
    payload: Result<Json<TransactionNew>, JsonRejection>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::debug!("rejected transaction body: {rejection}");
        ServerError::Generic("Invalid request body".to_string())
    })?;

    let cmd = ApplyCmd::parse(&payload.wallet_id, payload.amount, &payload.kind)?;
    let tx = state
        .engine
        .apply(cmd)
        .await
        .map_err(ServerError::context("Failed to record transaction"))?;

    Ok((StatusCode::CREATED, Json(tx.into())))
}

pub async fn list(
    State(state): State<ServerState>,
    Path(wallet_id): Path<String>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let txs = state
        .engine
        .list_transactions(&wallet_id)
        .await
        .map_err(ServerError::context("Failed to retrieve transactions"))?;

    Ok(Json(txs.into_iter().map(TransactionView::from).collect()))
}
