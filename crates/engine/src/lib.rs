//! Wallet ledger engine.
//!
//! Keeps one balance per wallet and the append-only list of credits and
//! debits that produced it. [`Engine::apply`] is the only write path; it runs
//! each operation as one database transaction, so a wallet's balance always
//! equals the signed sum of its transactions and never drops below zero.

pub use commands::ApplyCmd;
pub use error::{ArgumentError, EngineError};
pub use money::Money;
pub use ops::{DEFAULT_LOCK_TIMEOUT, Engine, EngineBuilder, WalletAudit};
pub use transactions::{Transaction, TransactionKind};
pub use wallets::Wallet;

mod commands;
mod error;
mod locks;
mod money;
mod ops;
mod transactions;
mod wallets;

type ResultEngine<T> = Result<T, EngineError>;
