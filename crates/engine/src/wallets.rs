//! The module contains `Wallet` struct and its storage model.

use sea_orm::entity::{ActiveValue, prelude::*};

use crate::{ArgumentError, EngineError, Money, ResultEngine, TransactionKind};

/// A wallet.
///
/// A wallet holds a non-negative balance that always equals the signed sum of
/// its transactions. It is created implicitly, with a zero balance, by the
/// first transaction that references its id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wallet {
    /// Caller-supplied identifier.
    pub id: String,
    pub balance: Money,
}

impl Wallet {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            balance: Money::ZERO,
        }
    }

    /// Returns the balance that applying `amount` as `kind` would produce.
    ///
    /// A debit larger than the current balance is rejected with
    /// [`EngineError::InsufficientBalance`]; the wallet is left untouched in
    /// every case.
    pub fn preview(&self, kind: TransactionKind, amount: Money) -> ResultEngine<Money> {
        match kind {
            TransactionKind::Credit => self
                .balance
                .checked_add(amount)
                .ok_or(EngineError::InvalidArgument(ArgumentError::AmountTooLarge)),
            TransactionKind::Debit => {
                if self.balance < amount {
                    return Err(EngineError::InsufficientBalance {
                        wallet_id: self.id.clone(),
                        balance: self.balance,
                        requested: amount,
                    });
                }
                Ok(self.balance - amount)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub balance: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Wallet> for ActiveModel {
    fn from(value: &Wallet) -> Self {
        Self {
            id: ActiveValue::Set(value.id.clone()),
            balance: ActiveValue::Set(value.balance.minor()),
        }
    }
}

impl From<Model> for Wallet {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            balance: Money::new(model.balance),
        }
    }
}
