//! # Query Cache
//!
//! Keyed store for fetched results. Each key moves through
//! `idle → loading → success | error`:
//!
//! ```text
//!            get_or_fetch                 ok
//!   Idle ───────────────▶ Loading ───────────────▶ Ready (fresh for stale_time)
//!                           │  ▲                      │
//!                       err │  │ get_or_fetch         │ stale / invalidate
//!                           ▼  │ (manual retry)       ▼
//!                          Failed                   refetch
//! ```
//!
//! - A fresh `Ready` entry is returned without calling the fetch function.
//! - Callers asking for a key that is already loading join the in-flight
//!   request instead of starting another one.
//! - Nothing is retried automatically. A `Failed` key is fetched again only
//!   when someone asks for it.
//! - `invalidate` drops entries by key prefix. A request that completes after
//!   its entry was dropped still answers its callers but is not stored.
//! - Settled entries nobody has asked for within `gc_time` are dropped on the
//!   next lookup, so a long session does not keep every page it ever visited.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use log::debug;

use crate::api::FetchError;
use crate::core::query::QueryParameters;

/// Cache identity of a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    PostList(QueryParameters),
    PostDetail(String),
}

/// Selects a group of keys for invalidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPrefix {
    /// Every post list and every post detail.
    AllPosts,
    /// Every list page, whatever its parameters.
    PostLists,
    /// The detail entry of one post.
    PostDetail(String),
}

impl KeyPrefix {
    pub fn matches(&self, key: &QueryKey) -> bool {
        match (self, key) {
            (KeyPrefix::AllPosts, _) => true,
            (KeyPrefix::PostLists, QueryKey::PostList(_)) => true,
            (KeyPrefix::PostDetail(id), QueryKey::PostDetail(key_id)) => id == key_id,
            _ => false,
        }
    }
}

/// Externally visible state of one key.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryStatus {
    Idle,
    Loading,
    Success,
    Error(FetchError),
}

type SharedFetch<V> = Shared<BoxFuture<'static, Result<V, FetchError>>>;

enum Entry<V: Clone> {
    Loading {
        generation: u64,
        fetch: SharedFetch<V>,
    },
    Ready {
        value: V,
        fetched_at: Instant,
        last_used: Instant,
    },
    Failed {
        error: FetchError,
        failed_at: Instant,
    },
}

impl<V: Clone> Entry<V> {
    /// Time since the entry was last handed out. In-flight entries are
    /// always in use.
    fn idle_for(&self) -> Option<Duration> {
        match self {
            Entry::Loading { .. } => None,
            Entry::Ready { last_used, .. } => Some(last_used.elapsed()),
            Entry::Failed { failed_at, .. } => Some(failed_at.elapsed()),
        }
    }
}

struct Inner<V: Clone> {
    entries: HashMap<QueryKey, Entry<V>>,
    next_generation: u64,
}

/// Outcome of the synchronous lookup done under the lock.
enum Lookup<V: Clone> {
    Hit(V),
    Await { generation: u64, fetch: SharedFetch<V> },
}

pub struct QueryCache<V: Clone> {
    inner: Mutex<Inner<V>>,
    stale_time: Duration,
    gc_time: Duration,
}

/// Default time an unused entry is kept.
pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(300);

impl<V> QueryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(stale_time: Duration) -> Self {
        Self::with_gc_time(stale_time, DEFAULT_GC_TIME)
    }

    pub fn with_gc_time(stale_time: Duration, gc_time: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                next_generation: 0,
            }),
            stale_time,
            gc_time,
        }
    }

    pub fn stale_time(&self) -> Duration {
        self.stale_time
    }

    fn lock(&self) -> MutexGuard<'_, Inner<V>> {
        // Entries stay consistent even if a holder panicked; keep serving.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns the cached value for `key` when fresh, joins an in-flight
    /// request for it, or starts one with `fetch`.
    pub async fn get_or_fetch<F, Fut>(&self, key: QueryKey, fetch: F) -> Result<V, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, FetchError>> + Send + 'static,
    {
        let lookup = {
            let mut inner = self.lock();
            self.collect_garbage(&mut inner);
            match inner.entries.get_mut(&key) {
                Some(Entry::Ready {
                    value,
                    fetched_at,
                    last_used,
                }) if fetched_at.elapsed() < self.stale_time => {
                    debug!("cache hit: {:?}", key);
                    *last_used = Instant::now();
                    Lookup::Hit(value.clone())
                }
                Some(Entry::Loading { generation, fetch }) => {
                    debug!("joining in-flight request: {:?}", key);
                    Lookup::Await {
                        generation: *generation,
                        fetch: fetch.clone(),
                    }
                }
                _ => {
                    let generation = inner.next_generation;
                    inner.next_generation += 1;
                    let shared = fetch().boxed().shared();
                    debug!("cache miss, fetching: {:?}", key);
                    inner.entries.insert(
                        key.clone(),
                        Entry::Loading {
                            generation,
                            fetch: shared.clone(),
                        },
                    );
                    Lookup::Await {
                        generation,
                        fetch: shared,
                    }
                }
            }
        };

        match lookup {
            Lookup::Hit(value) => Ok(value),
            Lookup::Await { generation, fetch } => {
                let result = fetch.await;
                self.settle(&key, generation, &result);
                result
            }
        }
    }

    /// Stores a finished request, unless its entry was invalidated or
    /// replaced while it was in flight.
    fn settle(&self, key: &QueryKey, generation: u64, result: &Result<V, FetchError>) {
        let mut inner = self.lock();
        let current = matches!(
            inner.entries.get(key),
            Some(Entry::Loading { generation: g, .. }) if *g == generation
        );
        if !current {
            return;
        }
        let now = Instant::now();
        let entry = match result {
            Ok(value) => Entry::Ready {
                value: value.clone(),
                fetched_at: now,
                last_used: now,
            },
            Err(e) => Entry::Failed {
                error: e.clone(),
                failed_at: now,
            },
        };
        inner.entries.insert(key.clone(), entry);
    }

    fn collect_garbage(&self, inner: &mut Inner<V>) {
        let gc_time = self.gc_time;
        let before = inner.entries.len();
        inner
            .entries
            .retain(|_, entry| entry.idle_for().is_none_or(|idle| idle < gc_time));
        let removed = before - inner.entries.len();
        if removed > 0 {
            debug!("dropped {} unused cache entries", removed);
        }
    }

    /// Number of entries currently held, in any state.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn status(&self, key: &QueryKey) -> QueryStatus {
        match self.lock().entries.get(key) {
            None => QueryStatus::Idle,
            Some(Entry::Loading { .. }) => QueryStatus::Loading,
            Some(Entry::Ready { .. }) => QueryStatus::Success,
            Some(Entry::Failed { error, .. }) => QueryStatus::Error(error.clone()),
        }
    }

    /// Last successful value, fresh or not.
    pub fn peek(&self, key: &QueryKey) -> Option<V> {
        match self.lock().entries.get(key) {
            Some(Entry::Ready { value, .. }) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn is_fresh(&self, key: &QueryKey) -> bool {
        matches!(
            self.lock().entries.get(key),
            Some(Entry::Ready { fetched_at, .. }) if fetched_at.elapsed() < self.stale_time
        )
    }

    /// Drops every entry matching `prefix`. Returns how many were removed.
    pub fn invalidate(&self, prefix: &KeyPrefix) -> usize {
        let mut inner = self.lock();
        let before = inner.entries.len();
        inner.entries.retain(|key, _| !prefix.matches(key));
        let removed = before - inner.entries.len();
        debug!("invalidated {} entries for {:?}", removed, prefix);
        removed
    }
}
