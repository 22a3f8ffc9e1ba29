//! Match caching.
//!
//! A cache maps a request's routing inputs to a previous [`RouteMatch`].
//! The query takes part in the key only when some route routes on it; the
//! caller passes `None` otherwise.

use super::RouteMatch;
use crate::config::CacheConfig;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};
use switchyard_core::{MediaType, Method, QueryParams, RequestPath};

/// Storage for previous matches. Implementations must be safe to share.
pub trait MatchCache: Send + Sync {
    /// A previous match for these inputs.
    fn get(
        &self,
        method: Method,
        media_type: &MediaType,
        path: &RequestPath,
        query: Option<&QueryParams>,
    ) -> Option<RouteMatch>;

    /// Remember `matched` for these inputs.
    fn put(
        &self,
        matched: RouteMatch,
        method: Method,
        media_type: &MediaType,
        path: &RequestPath,
        query: Option<&QueryParams>,
    );

    /// Forget everything, e.g. after the table was rebuilt.
    fn clear(&self);
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    method: Method,
    media_type: MediaType,
    path: RequestPath,
    query: Option<String>,
}

impl CacheKey {
    fn new(
        method: Method,
        media_type: &MediaType,
        path: &RequestPath,
        query: Option<&QueryParams>,
    ) -> Self {
        Self {
            method,
            media_type: media_type.clone(),
            path: path.clone(),
            query: query.map(ToString::to_string),
        }
    }
}

struct Cached {
    matched: RouteMatch,
    accesses: AtomicU64,
    last_access: AtomicU64,
}

/// A bounded in-memory cache that keeps the most used entries.
///
/// Reads never wait on a purge. After a write, once `min_purge_interval`
/// has passed since the last purge, whichever writer takes the purge lock
/// drops everything beyond `max_entries`, least accessed first.
pub struct SimpleMatchCache {
    entries: DashMap<CacheKey, Cached>,
    max_entries: usize,
    min_purge_interval: Duration,
    epoch: Instant,
    last_purge: AtomicU64,
    purge_lock: Mutex<()>,
}

impl SimpleMatchCache {
    /// A cache bounded by `config`.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: config.max_entries,
            min_purge_interval: config.min_purge_interval(),
            epoch: Instant::now(),
            last_purge: AtomicU64::new(0),
            purge_lock: Mutex::new(()),
        }
    }

    /// Number of cached matches.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn now(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn purge_due(&self, now: u64) -> bool {
        now.saturating_sub(self.last_purge.load(Ordering::Acquire))
            >= self.min_purge_interval.as_millis() as u64
    }

    fn purge_if_due(&self) {
        let now = self.now();
        if !self.purge_due(now) {
            return;
        }
        let Some(_guard) = self.purge_lock.try_lock() else {
            return;
        };
        if !self.purge_due(now) {
            return;
        }
        self.last_purge.store(now, Ordering::Release);

        let len = self.entries.len();
        if len <= self.max_entries {
            return;
        }
        let mut ranked: Vec<(CacheKey, u64, u64)> = self
            .entries
            .iter()
            .map(|e| {
                (
                    e.key().clone(),
                    e.accesses.load(Ordering::Relaxed),
                    e.last_access.load(Ordering::Relaxed),
                )
            })
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(b.2.cmp(&a.2)));
        for (key, _, _) in ranked.into_iter().skip(self.max_entries) {
            self.entries.remove(&key);
        }
        tracing::debug!(before = len, after = self.entries.len(), "purged match cache");
    }
}

impl MatchCache for SimpleMatchCache {
    fn get(
        &self,
        method: Method,
        media_type: &MediaType,
        path: &RequestPath,
        query: Option<&QueryParams>,
    ) -> Option<RouteMatch> {
        let key = CacheKey::new(method, media_type, path, query);
        let cached = self.entries.get(&key)?;
        cached.accesses.fetch_add(1, Ordering::Relaxed);
        cached.last_access.store(self.now(), Ordering::Relaxed);
        Some(cached.matched.clone())
    }

    fn put(
        &self,
        matched: RouteMatch,
        method: Method,
        media_type: &MediaType,
        path: &RequestPath,
        query: Option<&QueryParams>,
    ) {
        let key = CacheKey::new(method, media_type, path, query);
        self.entries.insert(
            key,
            Cached {
                matched,
                accesses: AtomicU64::new(1),
                last_access: AtomicU64::new(self.now()),
            },
        );
        self.purge_if_due();
    }

    fn clear(&self) {
        self.entries.clear();
    }
}
