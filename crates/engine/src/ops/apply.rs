use chrono::{DateTime, Duration, SubsecRound, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, DbBackend, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*, sea_query::OnConflict,
};

use crate::{ApplyCmd, EngineError, ResultEngine, Transaction, Wallet, transactions, wallets};

use super::{Engine, with_tx};

impl Engine {
    /// Applies one credit or debit as a single unit of work.
    ///
    /// The wallet is created with a zero balance if this is the first
    /// transaction that references it. A debit larger than the balance fails
    /// with [`EngineError::InsufficientBalance`]. On any error nothing is
    /// persisted, including the implicit wallet creation.
    ///
    /// Calls for the same wallet are serialized; the wait for a busy wallet is
    /// bounded by the configured lock timeout.
    pub async fn apply(&self, cmd: ApplyCmd) -> ResultEngine<Transaction> {
        cmd.validate()?;
        let _guard = self.locks.acquire(&cmd.wallet_id, self.lock_timeout).await?;

        let result = self.apply_locked(&cmd).await;
        match &result {
            Ok(tx) => tracing::info!(
                id = tx.id,
                wallet_id = %tx.wallet_id,
                kind = %tx.kind,
                amount = %tx.amount,
                "transaction applied"
            ),
            Err(EngineError::InsufficientBalance {
                wallet_id,
                balance,
                requested,
            }) => tracing::warn!(
                wallet_id = %wallet_id,
                %balance,
                %requested,
                "debit rejected: insufficient balance"
            ),
            Err(err) => tracing::error!(wallet_id = %cmd.wallet_id, "apply failed: {err}"),
        }
        result
    }

    async fn apply_locked(&self, cmd: &ApplyCmd) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| self.apply_in_tx(&db_tx, cmd).await)
    }

    async fn apply_in_tx(
        &self,
        db_tx: &DatabaseTransaction,
        cmd: &ApplyCmd,
    ) -> ResultEngine<Transaction> {
        let mut wallet = self.materialize_wallet(db_tx, &cmd.wallet_id).await?;
        let balance = wallet.preview(cmd.kind, cmd.amount)?;

        wallet.balance = balance;
        wallets::ActiveModel::from(&wallet).update(db_tx).await?;

        let timestamp = self.next_timestamp(db_tx, &cmd.wallet_id).await?;
        let model = transactions::ActiveModel {
            id: ActiveValue::NotSet,
            wallet_id: ActiveValue::Set(cmd.wallet_id.clone()),
            amount: ActiveValue::Set(cmd.amount.minor()),
            kind: ActiveValue::Set(cmd.kind.as_str().to_string()),
            created_at: ActiveValue::Set(timestamp),
        }
        .insert(db_tx)
        .await?;

        Transaction::try_from(model)
    }

    /// Inserts the wallet with a zero balance unless it exists, then reads it.
    ///
    /// Writing first makes the unit of work take the database write lock up
    /// front. Backends with row locks also lock the wallet row.
    async fn materialize_wallet(
        &self,
        db_tx: &DatabaseTransaction,
        wallet_id: &str,
    ) -> ResultEngine<Wallet> {
        let created = wallets::Entity::insert(wallets::ActiveModel::from(&Wallet::new(wallet_id)))
            .on_conflict(
                OnConflict::column(wallets::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db_tx)
            .await?;
        if created > 0 {
            tracing::debug!(wallet_id, "wallet created on first use");
        }

        let mut select = wallets::Entity::find_by_id(wallet_id.to_string());
        if db_tx.get_database_backend() != DbBackend::Sqlite {
            select = select.lock_exclusive();
        }
        let model = select.one(db_tx).await?.ok_or_else(|| {
            EngineError::StorageUnavailable(format!("wallet \"{wallet_id}\" vanished mid-transaction"))
        })?;

        Ok(Wallet::from(model))
    }

    /// `now`, truncated to microseconds and kept strictly after the wallet's
    /// latest transaction so timestamp order always matches id order.
    async fn next_timestamp(
        &self,
        db_tx: &DatabaseTransaction,
        wallet_id: &str,
    ) -> ResultEngine<DateTime<Utc>> {
        let latest: Option<DateTime<Utc>> = transactions::Entity::find()
            .select_only()
            .column(transactions::Column::CreatedAt)
            .filter(transactions::Column::WalletId.eq(wallet_id))
            .order_by_desc(transactions::Column::Id)
            .into_tuple()
            .one(db_tx)
            .await?;

        Ok(monotonic_after(Utc::now().trunc_subsecs(6), latest))
    }
}

fn monotonic_after(now: DateTime<Utc>, latest: Option<DateTime<Utc>>) -> DateTime<Utc> {
    match latest {
        Some(latest) if now <= latest => latest + Duration::microseconds(1),
        _ => now,
    }
}
