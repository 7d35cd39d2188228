use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async mutex per profile name.
///
/// Holding the guard serialises every lifecycle operation on that name within
/// this process, closing the gap between "container absent" and "create
/// container" for concurrent callers.
#[derive(Debug, Default)]
pub struct ProfileLocks {
    inner: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl ProfileLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, name: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut table = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            table.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(table.entry(name.to_string()).or_default())
        };
        lock.lock_owned().await
    }
}
