//! The module contains the errors the engine can return.
//!
//! The errors are:
//!
//! - [`InvalidArgument`] the caller sent a malformed request; fix and retry.
//! - [`InsufficientBalance`] a debit larger than the wallet balance.
//! - [`NotFound`] a read referenced a wallet that was never touched.
//! - [`StorageUnavailable`] and [`Database`] transactional or connectivity
//!   faults; never retried inside the engine.
//!
//!  [`InvalidArgument`]: EngineError::InvalidArgument
//!  [`InsufficientBalance`]: EngineError::InsufficientBalance
//!  [`NotFound`]: EngineError::NotFound
//!  [`StorageUnavailable`]: EngineError::StorageUnavailable
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

use crate::Money;

/// Reasons a caller-supplied value is rejected before any storage access.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("wallet id required")]
    WalletIdRequired,
    #[error("amount must be positive")]
    AmountNotPositive,
    #[error("amount too large")]
    AmountTooLarge,
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("invalid transaction type")]
    InvalidKind,
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentError),
    #[error("Insufficient balance on wallet \"{wallet_id}\": balance {balance}, requested {requested}")]
    InsufficientBalance {
        wallet_id: String,
        balance: Money,
        requested: Money,
    },
    #[error("\"{0}\" wallet not found!")]
    NotFound(String),
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Returns `true` for faults the caller may retry later, as opposed to
    /// errors that require a different request.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_) | Self::Database(_))
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidArgument(a), Self::InvalidArgument(b)) => a == b,
            (
                Self::InsufficientBalance {
                    wallet_id: a_id,
                    balance: a_balance,
                    requested: a_requested,
                },
                Self::InsufficientBalance {
                    wallet_id: b_id,
                    balance: b_balance,
                    requested: b_requested,
                },
            ) => a_id == b_id && a_balance == b_balance && a_requested == b_requested,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::StorageUnavailable(a), Self::StorageUnavailable(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
