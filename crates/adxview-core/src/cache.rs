//! Keyed cache for report fetches.
//!
//! Each cache key owns one slot holding a watch channel of [`FetchState`].
//! The first caller to want a key becomes the fetch owner; concurrent
//! callers for the same key join the in-flight fetch by awaiting the
//! channel instead of issuing a duplicate request. Every owned fetch bumps
//! the slot's generation, so a result from a superseded fetch is discarded
//! instead of clobbering newer data.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::watch;
use tracing::trace;

use crate::error::CoreError;

/// Lifecycle of one cache slot.
#[derive(Debug)]
pub enum FetchState<T> {
    /// A fetch is in flight and no earlier result exists.
    Pending,
    /// The last fetch succeeded.
    Ready {
        value: Arc<T>,
        fetched_at: DateTime<Utc>,
    },
    /// The last fetch failed. The error fans out to every waiter.
    Failed(CoreError),
}

impl<T> Clone for FetchState<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Pending => Self::Pending,
            Self::Ready { value, fetched_at } => Self::Ready {
                value: Arc::clone(value),
                fetched_at: *fetched_at,
            },
            Self::Failed(e) => Self::Failed(e.clone()),
        }
    }
}

/// Outcome of [`QueryCache::begin`].
pub enum Begin<T> {
    /// A fresh-enough result already exists.
    Cached(Arc<T>),
    /// The caller owns the fetch for this generation and must call
    /// [`QueryCache::complete`] with the result.
    Owner(u64),
    /// Another fetch for the same key is in flight; await it via
    /// [`wait`].
    Join(watch::Receiver<FetchState<T>>),
}

#[derive(Debug)]
struct Slot<T> {
    generation: u64,
    tx: watch::Sender<FetchState<T>>,
}

/// Concurrent map from cache key to fetch slot.
#[derive(Debug)]
pub struct QueryCache<T> {
    slots: DashMap<String, Slot<T>>,
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> QueryCache<T> {
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }

    /// Start or join a fetch for `key`.
    ///
    /// With `force` set, a ready or failed slot is re-fetched under a new
    /// generation; an in-flight fetch is still joined rather than doubled.
    pub fn begin(&self, key: &str, force: bool) -> Begin<T> {
        match self.slots.entry(key.to_owned()) {
            Entry::Occupied(mut occupied) => {
                let slot = occupied.get_mut();
                let state = slot.tx.borrow().clone();
                match state {
                    FetchState::Pending => {
                        trace!(key, "joining in-flight fetch");
                        Begin::Join(slot.tx.subscribe())
                    }
                    FetchState::Ready { value, .. } if !force => Begin::Cached(value),
                    FetchState::Ready { .. } | FetchState::Failed(_) => {
                        slot.generation += 1;
                        slot.tx.send_replace(FetchState::Pending);
                        trace!(key, generation = slot.generation, "starting refetch");
                        Begin::Owner(slot.generation)
                    }
                }
            }
            Entry::Vacant(vacant) => {
                let (tx, _rx) = watch::channel(FetchState::Pending);
                vacant.insert(Slot { generation: 1, tx });
                trace!(key, generation = 1u64, "starting fetch");
                Begin::Owner(1)
            }
        }
    }

    /// Record the result of an owned fetch.
    ///
    /// Returns the state now visible to waiters, or `None` if the slot was
    /// superseded by a newer generation (or invalidated) while the fetch
    /// ran, in which case the result is discarded.
    pub fn complete(
        &self,
        key: &str,
        generation: u64,
        result: Result<T, CoreError>,
    ) -> Option<FetchState<T>> {
        let slot = self.slots.get_mut(key)?;
        if slot.generation != generation {
            trace!(
                key,
                generation,
                current = slot.generation,
                "discarding superseded fetch result"
            );
            return None;
        }
        let state = match result {
            Ok(value) => FetchState::Ready {
                value: Arc::new(value),
                fetched_at: Utc::now(),
            },
            Err(e) => FetchState::Failed(e),
        };
        slot.tx.send_replace(state.clone());
        Some(state)
    }

    /// The ready value for `key`, if any.
    pub fn ready(&self, key: &str) -> Option<(Arc<T>, DateTime<Utc>)> {
        let slot = self.slots.get(key)?;
        let state = slot.tx.borrow();
        match &*state {
            FetchState::Ready { value, fetched_at } => Some((Arc::clone(value), *fetched_at)),
            _ => None,
        }
    }

    /// Watch the slot for `key`, if one exists.
    pub fn subscribe(&self, key: &str) -> Option<watch::Receiver<FetchState<T>>> {
        self.slots.get(key).map(|slot| slot.tx.subscribe())
    }

    /// Keys of every slot, in-flight and settled alike.
    pub fn keys(&self) -> Vec<String> {
        self.slots.iter().map(|e| e.key().clone()).collect()
    }

    /// Drop one slot. An in-flight fetch for it will be discarded on
    /// completion.
    pub fn invalidate(&self, key: &str) {
        self.slots.remove(key);
    }

    /// Drop every slot.
    pub fn clear(&self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Await a joined fetch until it settles.
pub async fn wait<T>(mut rx: watch::Receiver<FetchState<T>>) -> Result<Arc<T>, CoreError> {
    let settled = rx
        .wait_for(|state| !matches!(state, FetchState::Pending))
        .await;
    match settled {
        Ok(state) => match &*state {
            FetchState::Ready { value, .. } => Ok(Arc::clone(value)),
            FetchState::Failed(e) => Err(e.clone()),
            FetchState::Pending => Err(CoreError::Internal(
                "fetch settled while still pending".to_owned(),
            )),
        },
        // Slot dropped mid-fetch, e.g. the cache was cleared on disconnect.
        Err(_) => Err(CoreError::Internal(
            "fetch abandoned before completion".to_owned(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_caller_owns_subsequent_callers_join() {
        let cache: QueryCache<Vec<i64>> = QueryCache::new();

        let Begin::Owner(generation) = cache.begin("k", false) else {
            panic!("first caller should own the fetch");
        };
        assert_eq!(generation, 1);

        let Begin::Join(rx) = cache.begin("k", false) else {
            panic!("second caller should join, not refetch");
        };

        let waiter = tokio::spawn(wait(rx));
        assert!(cache.complete("k", generation, Ok(vec![1, 2, 3])).is_some());

        let value = waiter.await.unwrap().unwrap();
        assert_eq!(*value, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn ready_slot_serves_from_cache() {
        let cache: QueryCache<i64> = QueryCache::new();
        let Begin::Owner(generation) = cache.begin("k", false) else {
            panic!("expected owner");
        };
        cache.complete("k", generation, Ok(7));

        match cache.begin("k", false) {
            Begin::Cached(value) => assert_eq!(*value, 7),
            _ => panic!("settled slot should serve from cache"),
        }
        assert!(cache.ready("k").is_some());
    }

    #[tokio::test]
    async fn forced_refetch_supersedes_stale_result() {
        let cache: QueryCache<i64> = QueryCache::new();
        let Begin::Owner(first) = cache.begin("k", false) else {
            panic!("expected owner");
        };
        cache.complete("k", first, Ok(1));

        // A forced refetch bumps the generation before the stale owner
        // (simulated below) reports back.
        let Begin::Owner(second) = cache.begin("k", true) else {
            panic!("forced begin on settled slot should own");
        };
        assert!(second > first);

        assert!(cache.complete("k", first, Ok(999)).is_none());
        assert!(cache.complete("k", second, Ok(2)).is_some());

        let (value, _) = cache.ready("k").unwrap();
        assert_eq!(*value, 2);
    }

    #[tokio::test]
    async fn failure_fans_out_to_waiters_and_allows_retry() {
        let cache: QueryCache<i64> = QueryCache::new();
        let Begin::Owner(generation) = cache.begin("k", false) else {
            panic!("expected owner");
        };
        let Begin::Join(rx) = cache.begin("k", false) else {
            panic!("expected join");
        };

        cache.complete(
            "k",
            generation,
            Err(CoreError::Timeout { timeout_secs: 30 }),
        );
        let err = wait(rx).await.unwrap_err();
        assert!(matches!(err, CoreError::Timeout { .. }));

        // A failed slot is owned again on the next begin, no force needed.
        assert!(matches!(cache.begin("k", false), Begin::Owner(_)));
    }

    #[tokio::test]
    async fn invalidated_slot_discards_inflight_result() {
        let cache: QueryCache<i64> = QueryCache::new();
        let Begin::Owner(generation) = cache.begin("k", false) else {
            panic!("expected owner");
        };
        cache.invalidate("k");
        assert!(cache.complete("k", generation, Ok(5)).is_none());
        assert!(cache.ready("k").is_none());
    }
}
