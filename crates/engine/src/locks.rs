//! Per-pair serialization.
//!
//! Every read-modify-write on the debts of one `(group, currency, pair)`
//! runs while holding that pair's async mutex, so concurrent expense postings
//! and settlement transitions on the same pair never interleave. Entries are
//! created on demand and dropped once no task holds or waits on them.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::Currency;

/// Identity of an unordered pair of users within a group and currency.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct PairKey {
    group_id: String,
    currency: Currency,
    lo: String,
    hi: String,
}

impl PairKey {
    pub(crate) fn new(group_id: &str, currency: Currency, a: &str, b: &str) -> Self {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Self {
            group_id: group_id.to_string(),
            currency,
            lo: lo.to_string(),
            hi: hi.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct PairLocks {
    slots: Mutex<HashMap<PairKey, Arc<AsyncMutex<()>>>>,
}

/// Held for the duration of one unit of work.
pub(crate) struct PairGuard<'a> {
    locks: &'a PairLocks,
    key: PairKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl PairLocks {
    pub(crate) async fn lock(&self, key: PairKey) -> PairGuard<'_> {
        let slot = {
            let mut slots = self
                .slots
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            Arc::clone(slots.entry(key.clone()).or_default())
        };
        let guard = slot.lock_owned().await;
        PairGuard {
            locks: self,
            key,
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}

impl Drop for PairGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut slots = self
            .locks
            .slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // Only the map itself still references the slot: nobody holds or
        // waits on it.
        if slots
            .get(&self.key)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(&self.key);
        }
    }
}
