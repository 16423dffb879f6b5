//! Request and response bodies of the HTTP API.

use chrono::{DateTime, Utc};
use engine::{Money, Transaction, TransactionKind, Wallet};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/transaction`.
///
/// Missing fields default to empty values so the engine reports them with the
/// same messages as present-but-invalid ones.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TransactionNew {
    #[serde(default)]
    pub wallet_id: String,
    #[serde(default)]
    pub amount: Money,
    #[serde(default, rename = "type")]
    pub kind: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionView {
    pub id: i64,
    pub wallet_id: String,
    pub amount: Money,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub timestamp: DateTime<Utc>,
}

impl From<Transaction> for TransactionView {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            wallet_id: tx.wallet_id,
            amount: tx.amount,
            kind: tx.kind,
            timestamp: tx.timestamp,
        }
    }
}

/// Body of `GET /api/balance/{wallet_id}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceView {
    pub wallet_id: String,
    pub balance: Money,
}

impl From<Wallet> for BalanceView {
    fn from(wallet: Wallet) -> Self {
        Self {
            wallet_id: wallet.id,
            balance: wallet.balance,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
}
