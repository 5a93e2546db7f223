//! TTL cache for the merged hazard event set.

use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use safar_types::HazardEvent;

/// Default freshness window. Short, so travellers see updates quickly.
pub const DEFAULT_TTL: Duration = Duration::from_secs(120);

struct CachedEvents {
    fetched_at: Instant,
    events: Vec<HazardEvent>,
}

/// Single-slot cache with two states: FRESH (age < ttl — serve the stored
/// set) and STALE (age >= ttl, or never populated — recompute).
///
/// The slot is an async mutex held across the recompute, so concurrent
/// requests hitting a stale cache coalesce into one upstream fan-out:
/// waiters acquire the lock after the winner stored its result, find the
/// slot fresh, and are served from it.
pub struct EventCache {
    ttl: Duration,
    slot: Mutex<Option<CachedEvents>>,
}

impl EventCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Returns the cached event set, invoking `refresh` first when the slot
    /// is stale. The result of `refresh` replaces the slot wholesale.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Vec<HazardEvent>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Vec<HazardEvent>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(cached) = slot.as_ref() {
            if cached.fetched_at.elapsed() < self.ttl {
                return cached.events.clone();
            }
        }

        let events = refresh().await;
        *slot = Some(CachedEvents {
            fetched_at: Instant::now(),
            events: events.clone(),
        });
        events
    }
}

impl Default for EventCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
