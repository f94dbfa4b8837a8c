//! Ordered boundary storage backing the interval store
//!
//! The store only needs a handful of ordered-map primitives: predecessor
//! lookup, ordered insert/erase and range excision. [`SegmentMap`] captures
//! that surface so the store can run on a balanced tree ([`BTreeMap`]) or on a
//! sorted inline vector searched with binary search ([`SortedVecMap`]).

use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::ops::Bound;

/// Number of boundaries a [`SortedVecMap`] keeps inline before spilling to the heap
pub const INLINE_SEGMENTS: usize = 8;

/// Ordered key to value mapping with unique keys
pub trait SegmentMap<K, V> {
    /// Number of stored entries
    fn len(&self) -> usize;

    /// Whether no entry is stored
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value stored exactly at `key`
    fn get(&self, key: &K) -> Option<&V>;

    /// Greatest entry whose key is `<= key`
    fn floor(&self, key: &K) -> Option<(&K, &V)>;

    /// Greatest entry whose key is `< key`
    fn lower(&self, key: &K) -> Option<(&K, &V)>;

    /// Smallest entry whose key is `> key`
    fn higher(&self, key: &K) -> Option<(&K, &V)>;

    /// Entry with the smallest key
    fn first(&self) -> Option<(&K, &V)>;

    /// Entry with the largest key
    fn last(&self) -> Option<(&K, &V)>;

    /// Insert or overwrite the entry at `key`, returning the previous value
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Remove the entry at `key`
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Remove and return the entry with the smallest key
    fn pop_first(&mut self) -> Option<(K, V)>;

    /// Remove and return the entry with the largest key
    fn pop_last(&mut self) -> Option<(K, V)>;

    /// Remove every entry whose key lies in `[begin, end)`, returning how many were removed
    fn remove_range(&mut self, begin: &K, end: &K) -> usize;

    /// Remove every entry
    fn clear(&mut self);

    /// All entries in ascending key order
    fn iter(&self) -> Box<dyn Iterator<Item = (&K, &V)> + '_>;

    /// Entries whose key lies in `[begin, end)`, in ascending key order
    fn range(&self, begin: &K, end: &K) -> Box<dyn Iterator<Item = (&K, &V)> + '_>;
}

impl<K: Ord + Clone, V> SegmentMap<K, V> for BTreeMap<K, V> {
    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn get(&self, key: &K) -> Option<&V> {
        BTreeMap::get(self, key)
    }

    fn floor(&self, key: &K) -> Option<(&K, &V)> {
        BTreeMap::range(self, (Bound::Unbounded, Bound::Included(key))).next_back()
    }

    fn lower(&self, key: &K) -> Option<(&K, &V)> {
        BTreeMap::range(self, (Bound::Unbounded, Bound::Excluded(key))).next_back()
    }

    fn higher(&self, key: &K) -> Option<(&K, &V)> {
        BTreeMap::range(self, (Bound::Excluded(key), Bound::Unbounded)).next()
    }

    fn first(&self) -> Option<(&K, &V)> {
        self.first_key_value()
    }

    fn last(&self) -> Option<(&K, &V)> {
        self.last_key_value()
    }

    fn insert(&mut self, key: K, value: V) -> Option<V> {
        BTreeMap::insert(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        BTreeMap::remove(self, key)
    }

    fn pop_first(&mut self) -> Option<(K, V)> {
        BTreeMap::pop_first(self)
    }

    fn pop_last(&mut self) -> Option<(K, V)> {
        BTreeMap::pop_last(self)
    }

    fn remove_range(&mut self, begin: &K, end: &K) -> usize {
        // BTreeMap has no ranged erase; collect the doomed keys first
        let doomed: SmallVec<[K; INLINE_SEGMENTS]> = SegmentMap::range(self, begin, end)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &doomed {
            BTreeMap::remove(self, key);
        }
        doomed.len()
    }

    fn clear(&mut self) {
        BTreeMap::clear(self)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&K, &V)> + '_> {
        Box::new(BTreeMap::iter(self))
    }

    fn range(&self, begin: &K, end: &K) -> Box<dyn Iterator<Item = (&K, &V)> + '_> {
        // BTreeMap::range panics on inverted bounds
        if !(begin < end) {
            return Box::new(std::iter::empty());
        }
        Box::new(BTreeMap::range(
            self,
            (Bound::Included(begin), Bound::Excluded(end)),
        ))
    }
}

/// Sorted vector of boundaries searched with binary search
///
/// Small maps stay inline; lookups are `O(log n)` while inserts and removals
/// shift the tail, which is cheap for the short boundary lists typical of
/// canonical interval maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedVecMap<K, V> {
    /// Entries in strictly ascending key order
    entries: SmallVec<[(K, V); INLINE_SEGMENTS]>,
}

impl<K, V> SortedVecMap<K, V> {
    /// Create an empty map
    pub fn new() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }

    /// Create an empty map with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: SmallVec::with_capacity(capacity),
        }
    }

    /// Whether the entries no longer fit inline
    pub fn spilled(&self) -> bool {
        self.entries.spilled()
    }
}

impl<K: Ord, V> SortedVecMap<K, V> {
    /// Index of the first entry whose key is not less than `key`
    fn lower_bound(&self, key: &K) -> usize {
        self.entries.partition_point(|(k, _)| k < key)
    }

    /// Index of the first entry whose key is greater than `key`
    fn upper_bound(&self, key: &K) -> usize {
        self.entries.partition_point(|(k, _)| k <= key)
    }

    fn search(&self, key: &K) -> Result<usize, usize> {
        self.entries.binary_search_by(|(k, _)| k.cmp(key))
    }
}

impl<K, V> Default for SortedVecMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> SegmentMap<K, V> for SortedVecMap<K, V> {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn get(&self, key: &K) -> Option<&V> {
        self.search(key).ok().map(|idx| &self.entries[idx].1)
    }

    fn floor(&self, key: &K) -> Option<(&K, &V)> {
        let idx = self.upper_bound(key);
        if idx == 0 {
            return None;
        }
        let (k, v) = &self.entries[idx - 1];
        Some((k, v))
    }

    fn lower(&self, key: &K) -> Option<(&K, &V)> {
        let idx = self.lower_bound(key);
        if idx == 0 {
            return None;
        }
        let (k, v) = &self.entries[idx - 1];
        Some((k, v))
    }

    fn higher(&self, key: &K) -> Option<(&K, &V)> {
        self.entries
            .get(self.upper_bound(key))
            .map(|(k, v)| (k, v))
    }

    fn first(&self) -> Option<(&K, &V)> {
        self.entries.first().map(|(k, v)| (k, v))
    }

    fn last(&self) -> Option<(&K, &V)> {
        self.entries.last().map(|(k, v)| (k, v))
    }

    fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.search(&key) {
            Ok(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            Err(idx) => {
                self.entries.insert(idx, (key, value));
                None
            }
        }
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        match self.search(key) {
            Ok(idx) => Some(self.entries.remove(idx).1),
            Err(_) => None,
        }
    }

    fn pop_first(&mut self) -> Option<(K, V)> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0))
        }
    }

    fn pop_last(&mut self) -> Option<(K, V)> {
        self.entries.pop()
    }

    fn remove_range(&mut self, begin: &K, end: &K) -> usize {
        if !(begin < end) {
            return 0;
        }
        let lo = self.lower_bound(begin);
        let hi = self.lower_bound(end);
        self.entries.drain(lo..hi).count()
    }

    fn clear(&mut self) {
        self.entries.clear()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&K, &V)> + '_> {
        Box::new(self.entries.iter().map(|(k, v)| (k, v)))
    }

    fn range(&self, begin: &K, end: &K) -> Box<dyn Iterator<Item = (&K, &V)> + '_> {
        if !(begin < end) {
            return Box::new(std::iter::empty());
        }
        let lo = self.lower_bound(begin);
        let hi = self.lower_bound(end);
        Box::new(self.entries[lo..hi].iter().map(|(k, v)| (k, v)))
    }
}
