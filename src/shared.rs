//! Shared handle around an interval store
//!
//! [`IntervalStore`] takes no locks. When one map has to be reachable from
//! several threads, [`SharedIntervalStore`] provides the exclusion the store
//! expects from its callers: `assign` runs under the write lock, lookups and
//! canonical-form checks under the read lock.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::interval::{IntervalError, IntervalStore, SegmentMap};

/// Cloneable, thread-safe handle to one interval store
pub struct SharedIntervalStore<K, V, M = BTreeMap<K, V>> {
    inner: Arc<RwLock<IntervalStore<K, V, M>>>,
}

impl<K, V, M> Clone for SharedIntervalStore<K, V, M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: Ord + Clone, V: PartialEq + Clone> SharedIntervalStore<K, V> {
    /// Create a shared store mapping every key to `default_value`
    pub fn new(default_value: V) -> Self {
        Self::from_store(IntervalStore::new(default_value))
    }
}

impl<K, V, M> SharedIntervalStore<K, V, M>
where
    K: Ord + Clone,
    V: PartialEq + Clone,
    M: SegmentMap<K, V>,
{
    /// Wrap an existing store
    pub fn from_store(store: IntervalStore<K, V, M>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Assign `value` to `[begin, end)` under the write lock
    pub fn assign(&self, begin: K, end: K, value: V) {
        self.inner.write().assign(begin, end, value);
    }

    /// Assign under the write lock, rejecting empty or inverted ranges
    pub fn try_assign(&self, begin: K, end: K, value: V) -> Result<(), IntervalError> {
        self.inner.write().try_assign(begin, end, value)
    }

    /// Value in force at `key`
    ///
    /// The value is cloned so that no reference outlives the read lock.
    pub fn lookup(&self, key: &K) -> V {
        self.inner.read().lookup(key).clone()
    }

    /// Check the canonical-form invariants
    pub fn is_canonical(&self) -> bool {
        self.inner.read().is_canonical()
    }

    /// Number of stored boundaries
    pub fn size(&self) -> usize {
        self.inner.read().size()
    }

    /// Hold the read lock for several queries against one consistent state
    pub fn read(&self) -> RwLockReadGuard<'_, IntervalStore<K, V, M>> {
        self.inner.read()
    }

    /// Take the store back if this is the last handle
    pub fn try_unwrap(self) -> Result<IntervalStore<K, V, M>, Self> {
        Arc::try_unwrap(self.inner)
            .map(|lock| lock.into_inner())
            .map_err(|inner| Self { inner })
    }
}
