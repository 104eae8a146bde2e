use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Per-user write serialization for the ledger.
///
/// Every grant/spend/unlock/claim for a given user must run under that
/// user's lock, so concurrent read-modify-write cycles cannot overwrite
/// each other. Repositories share one registry.
#[derive(Default)]
pub struct UserLocks {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    pub async fn acquire(&self, user_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}
