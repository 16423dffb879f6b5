use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::{ResultEngine, locks::WalletLocks};

mod apply;
mod queries;

pub use queries::WalletAudit;

/// Default bound on how long `apply` waits for a busy wallet.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// The rollback happens when the uncommitted `DatabaseTransaction` is dropped.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// The wallet ledger.
///
/// Holds the shared connection pool and the per-wallet lock registry; it
/// keeps no balances in memory. Share it between tasks behind an `Arc`.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    locks: WalletLocks,
    lock_timeout: Duration,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Round-trip to the database; used by health checks.
    pub async fn ping(&self) -> ResultEngine<()> {
        self.database.ping().await?;
        Ok(())
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    lock_timeout: Option<Duration>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// How long a write waits for another write on the same wallet.
    pub fn lock_timeout(mut self, timeout: Duration) -> EngineBuilder {
        self.lock_timeout = Some(timeout);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        self.database.ping().await?;
        Ok(Engine {
            database: self.database,
            locks: WalletLocks::default(),
            lock_timeout: self.lock_timeout.unwrap_or(DEFAULT_LOCK_TIMEOUT),
        })
    }
}
