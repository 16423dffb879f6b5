use sea_orm::{
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
    sea_query::{Alias, Func, SimpleExpr},
};

use crate::{
    EngineError, Money, ResultEngine, Transaction, TransactionKind, Wallet,
    commands::validate_wallet_id, transactions, wallets,
};

use super::{Engine, with_tx};

/// Stored balance of a wallet next to the signed sum of its transactions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletAudit {
    pub wallet_id: String,
    pub recorded: Money,
    pub ledger: Money,
    pub transactions: u64,
}

impl WalletAudit {
    /// `true` when the balance equals the ledger sum and is not negative.
    pub fn is_consistent(&self) -> bool {
        self.recorded == self.ledger && !self.recorded.is_negative()
    }
}

impl Engine {
    /// Return the current balance of a wallet.
    ///
    /// Wallets that no transaction ever touched are [`EngineError::NotFound`].
    pub async fn balance(&self, wallet_id: &str) -> ResultEngine<Wallet> {
        validate_wallet_id(wallet_id)?;
        let model = wallets::Entity::find_by_id(wallet_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound(wallet_id.to_string()))?;
        Ok(Wallet::from(model))
    }

    /// Return every transaction of a wallet, most recent first.
    ///
    /// An unknown wallet has an empty history.
    pub async fn list_transactions(&self, wallet_id: &str) -> ResultEngine<Vec<Transaction>> {
        validate_wallet_id(wallet_id)?;
        let models = transactions::Entity::find()
            .filter(transactions::Column::WalletId.eq(wallet_id))
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .all(&self.database)
            .await?;

        models.into_iter().map(Transaction::try_from).collect()
    }

    /// Compare the stored balance with the sum of the wallet's transactions.
    ///
    /// The sum is computed by the database. Both reads run inside one DB
    /// transaction so they see the same state.
    pub async fn audit(&self, wallet_id: &str) -> ResultEngine<WalletAudit> {
        validate_wallet_id(wallet_id)?;
        with_tx!(self, |db_tx| {
            let wallet = wallets::Entity::find_by_id(wallet_id.to_string())
                .one(&db_tx)
                .await?
                .map(Wallet::from)
                .ok_or_else(|| EngineError::NotFound(wallet_id.to_string()))?;

            let (ledger, count): (i64, i64) = transactions::Entity::find()
                .select_only()
                .column_as(signed_sum(), "ledger")
                .column_as(Expr::col(transactions::Column::Id).count(), "count")
                .filter(transactions::Column::WalletId.eq(wallet_id))
                .into_tuple()
                .one(&db_tx)
                .await?
                .unwrap_or_default();
            let count = u64::try_from(count).map_err(|_| {
                EngineError::StorageUnavailable(format!("negative row count {count}"))
            })?;

            Ok::<_, EngineError>(WalletAudit {
                wallet_id: wallet.id,
                recorded: wallet.balance,
                ledger: Money::new(ledger),
                transactions: count,
            })
        })
    }

    /// Ids of all known wallets, sorted.
    pub async fn wallet_ids(&self) -> ResultEngine<Vec<String>> {
        let models = wallets::Entity::find()
            .order_by_asc(wallets::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(|m| m.id).collect())
    }
}

/// `CAST(COALESCE(SUM(CASE WHEN type = 'credit' THEN amount ELSE -amount END), 0) AS BIGINT)`
fn signed_sum() -> SimpleExpr {
    let amount = Expr::col(transactions::Column::Amount);
    let signed = Expr::case(
        transactions::Column::Kind.eq(TransactionKind::Credit.as_str()),
        amount.clone(),
    )
    .finally(amount.mul(-1));

    let sum = Func::coalesce([
        SimpleExpr::from(Func::sum(Into::<SimpleExpr>::into(signed))),
        Expr::val(0i64).into(),
    ]);
    Func::cast_as(sum, Alias::new("BIGINT")).into()
}
