use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// Registry of per-gig async locks.
///
/// Transitions touching the same gig serialize on its lock; different gigs
/// never contend. The outer `std::sync::Mutex` only guards the map lookup
/// and is never held across an await point.
#[derive(Default)]
pub struct GigLocks {
    inner: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl GigLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for one gig, waiting if another transition on the
    /// same gig is in flight.
    pub async fn acquire(&self, gig_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().expect("gig lock registry poisoned");
            Arc::clone(map.entry(gig_id).or_default())
        };

        lock.lock_owned().await
    }
}
