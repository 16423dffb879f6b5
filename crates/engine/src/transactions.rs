//! Transaction primitives.
//!
//! A `Transaction` is an immutable record of one credit or debit applied to a
//! single wallet. Rows are only ever inserted.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{ArgumentError, EngineError, Money};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Credit,
    Debit,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }

    /// The amount with the sign this kind applies to a balance.
    pub fn signed(self, amount: Money) -> Money {
        match self {
            Self::Credit => amount,
            Self::Debit => -amount,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            _ => Err(EngineError::InvalidArgument(ArgumentError::InvalidKind)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Transaction {
    /// Storage-assigned, increasing in commit order.
    pub id: i64,
    pub wallet_id: String,
    /// Always positive; the direction is carried by `kind`.
    pub amount: Money,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Signed contribution of this transaction to its wallet balance.
    pub fn signed_amount(&self) -> Money {
        self.kind.signed(self.amount)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub wallet_id: String,
    pub amount: i64,
    #[sea_orm(column_name = "type")]
    pub kind: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Wallets,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let kind = TransactionKind::from_str(&model.kind).map_err(|_| {
            EngineError::StorageUnavailable(format!(
                "transaction {} has unknown type \"{}\"",
                model.id, model.kind
            ))
        })?;
        Ok(Self {
            id: model.id,
            wallet_id: model.wallet_id,
            amount: Money::new(model.amount),
            kind,
            timestamp: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn kind_round_trips_through_text() {
        for kind in [TransactionKind::Credit, TransactionKind::Debit] {
            assert_eq!(kind.as_str().parse::<TransactionKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_is_invalid_argument() {
        assert_eq!(
            "refund".parse::<TransactionKind>(),
            Err(EngineError::InvalidArgument(ArgumentError::InvalidKind))
        );
        assert!("Credit".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn corrupt_row_is_storage_fault() {
        let model = Model {
            id: 7,
            wallet_id: "w1".to_string(),
            amount: 100,
            kind: "bogus".to_string(),
            created_at: Utc.timestamp_opt(0, 0).unwrap(),
        };
        let err = Transaction::try_from(model).unwrap_err();
        assert!(err.is_storage_unavailable());
    }

    #[test]
    fn serializes_kind_as_type() {
        let tx = Transaction {
            id: 1,
            wallet_id: "w1".to_string(),
            amount: Money::new(10_000),
            kind: TransactionKind::Credit,
            timestamp: Utc.timestamp_opt(0, 0).unwrap(),
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "credit");
        assert_eq!(json["amount"], 100);
        assert_eq!(json["wallet_id"], "w1");
    }
}
