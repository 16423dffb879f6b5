//! Per-wallet serialization of the write path.
//!
//! Every `apply` holds its wallet's lock from before the database
//! transaction begins until after it commits or rolls back. Different wallets
//! use different locks. Entries are dropped from the registry once nobody
//! holds or waits on them.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::{EngineError, ResultEngine};

type Slot = Arc<AsyncMutex<()>>;

#[derive(Debug, Default)]
pub(crate) struct WalletLocks {
    slots: Mutex<HashMap<String, Slot>>,
}

impl WalletLocks {
    /// Waits at most `timeout` for exclusive access to `wallet_id`.
    pub(crate) async fn acquire(
        &self,
        wallet_id: &str,
        timeout: Duration,
    ) -> ResultEngine<WalletGuard<'_>> {
        let slot = {
            let mut slots = self.slots()?;
            Arc::clone(slots.entry(wallet_id.to_string()).or_default())
        };

        match tokio::time::timeout(timeout, slot.lock_owned()).await {
            Ok(guard) => Ok(WalletGuard {
                locks: self,
                wallet_id: wallet_id.to_string(),
                guard: Some(guard),
            }),
            Err(_) => {
                self.release(wallet_id);
                tracing::warn!(wallet_id, ?timeout, "timed out waiting for wallet lock");
                Err(EngineError::StorageUnavailable(format!(
                    "timed out waiting for wallet \"{wallet_id}\""
                )))
            }
        }
    }

    fn slots(&self) -> ResultEngine<std::sync::MutexGuard<'_, HashMap<String, Slot>>> {
        self.slots
            .lock()
            .map_err(|_| EngineError::StorageUnavailable("wallet lock registry poisoned".to_string()))
    }

    /// Drops the registry entry when the map holds the only reference.
    fn release(&self, wallet_id: &str) {
        let Ok(mut slots) = self.slots() else {
            return;
        };
        if slots
            .get(wallet_id)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(wallet_id);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots.lock().map(|slots| slots.len()).unwrap_or(0)
    }
}

/// Exclusive access to one wallet; released on drop.
#[derive(Debug)]
pub(crate) struct WalletGuard<'a> {
    locks: &'a WalletLocks,
    wallet_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for WalletGuard<'_> {
    fn drop(&mut self) {
        // The owned guard keeps its own reference to the slot.
        drop(self.guard.take());
        self.locks.release(&self.wallet_id);
    }
}
