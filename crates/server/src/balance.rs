//! Balance API endpoint

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{ServerError, server::ServerState, types::BalanceView};

pub async fn get(
    State(state): State<ServerState>,
    Path(wallet_id): Path<String>,
) -> Result<Json<BalanceView>, ServerError> {
    let wallet = state
        .engine
        .balance(&wallet_id)
        .await
        .map_err(ServerError::context("Failed to retrieve balance"))?;

    Ok(Json(wallet.into()))
}
