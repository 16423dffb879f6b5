use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::{ArgumentError, EngineError};

use serde::Serialize;
pub use server::{ServerState, router, run_with_listener};

mod balance;
mod server;
mod transactions;

pub mod types;

pub enum ServerError {
    /// An engine failure; `context` is what the client sees if storage failed.
    Engine {
        err: EngineError,
        context: &'static str,
    },
    Generic(String),
}

impl ServerError {
    /// Wraps engine errors of one endpoint, naming the operation for storage
    /// faults.
    pub fn context(context: &'static str) -> impl FnOnce(EngineError) -> ServerError {
        move |err| ServerError::Engine { err, context }
    }
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::InvalidArgument(_) | EngineError::InsufficientBalance { .. } => {
            StatusCode::BAD_REQUEST
        }
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::StorageUnavailable(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_engine_error(err: EngineError, context: &'static str) -> String {
    match err {
        EngineError::InvalidArgument(reason) => match reason {
            ArgumentError::WalletIdRequired => "Wallet ID is required",
            ArgumentError::AmountNotPositive => "Amount must be positive",
            ArgumentError::InvalidKind => "Transaction type must be 'credit' or 'debit'",
            ArgumentError::AmountTooLarge => "Amount too large",
            ArgumentError::InvalidAmount(_) => "Invalid request body",
        }
        .to_string(),
        EngineError::InsufficientBalance { .. } => "Insufficient balance".to_string(),
        EngineError::NotFound(_) => "Wallet not found".to_string(),
        err @ (EngineError::StorageUnavailable(_) | EngineError::Database(_)) => {
            tracing::error!("{context}: {err}");
            context.to_string()
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine { err, context } => {
                (status_for_engine_error(&err), message_for_engine_error(err, context))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine {
            err: value,
            context: "internal server error",
        }
    }
}
