//! In-memory conversation state store.
//!
//! Threads are created on first use and live for the process lifetime unless
//! idle eviction is enabled. Locking is per thread: the outer map lock is held
//! only long enough to find or insert an entry, and each thread's mutex is
//! held by the orchestrator for the duration of one question. Questions in
//! different threads never contend; questions in the same thread serialize in
//! arrival order.

use chrono::{Duration as ChronoDuration, Utc};
use datascout_core::message::{Thread, ThreadId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// Shared handle to one thread's state. Lock it to read or mutate history.
pub type ThreadHandle = Arc<Mutex<Thread>>;

/// The process-wide thread store.
pub struct ThreadStore {
    threads: RwLock<HashMap<ThreadId, ThreadHandle>>,

    /// Evict threads idle longer than this many seconds. 0 = never.
    idle_eviction_secs: u64,
}

impl ThreadStore {
    pub fn new() -> Self {
        Self {
            threads: RwLock::new(HashMap::new()),
            idle_eviction_secs: 0,
        }
    }

    pub fn with_idle_eviction(mut self, secs: u64) -> Self {
        self.idle_eviction_secs = secs;
        self
    }

    /// Get the handle for a thread, creating an empty one on first use.
    pub async fn entry(&self, id: &ThreadId) -> ThreadHandle {
        {
            let threads = self.threads.read().await;
            if let Some(handle) = threads.get(id) {
                return handle.clone();
            }
        }

        let mut threads = self.threads.write().await;
        // Double check: another task may have inserted between the locks.
        threads
            .entry(id.clone())
            .or_insert_with(|| {
                debug!(thread_id = %id, "Creating thread");
                Arc::new(Mutex::new(Thread::new(id.clone())))
            })
            .clone()
    }

    /// Empty a thread's history, preserving its identity. A no-op if the
    /// thread has never been seen.
    pub async fn clear(&self, id: &ThreadId) {
        let handle = {
            let threads = self.threads.read().await;
            threads.get(id).cloned()
        };
        if let Some(handle) = handle {
            handle.lock().await.clear();
            info!(thread_id = %id, "Thread history cleared");
        }
    }

    /// Drop threads idle beyond the configured TTL. No-op when eviction is
    /// disabled. Returns the number of threads removed.
    ///
    /// A thread whose mutex is currently held (a question in flight) counts
    /// as active and is kept.
    pub async fn evict_idle(&self) -> usize {
        if self.idle_eviction_secs == 0 {
            return 0;
        }
        let cutoff = Utc::now() - ChronoDuration::seconds(self.idle_eviction_secs as i64);

        let mut threads = self.threads.write().await;
        let before = threads.len();
        threads.retain(|_, handle| match handle.try_lock() {
            Ok(thread) => thread.last_activity >= cutoff,
            Err(_) => true,
        });
        let evicted = before - threads.len();
        if evicted > 0 {
            info!(evicted, "Evicted idle threads");
        }
        evicted
    }

    pub async fn thread_count(&self) -> usize {
        self.threads.read().await.len()
    }
}

impl Default for ThreadStore {
    fn default() -> Self {
        Self::new()
    }
}
