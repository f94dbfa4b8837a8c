//! Canonical interval map
//!
//! [`IntervalStore`] maps every key of a totally ordered key space to a value.
//! Only the keys where the value changes are stored: an entry `(k, v)` means
//! the value is `v` on `[k, next_key)`, and everything below the first entry
//! carries the default value fixed at construction.
//!
//! The representation is kept canonical after every mutation:
//!
//! 1. the first entry never carries the default value,
//! 2. no two consecutive entries carry equal values,
//!
//! so no stored boundary is ever redundant.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use tracing::trace;

use super::segments::SegmentMap;
use super::IntervalError;

/// Interval-keyed map storing only the points where the value changes
#[derive(Debug, Clone)]
pub struct IntervalStore<K, V, M = BTreeMap<K, V>> {
    /// Value of every key not covered by a stored boundary
    default_value: V,
    /// Boundaries in ascending key order
    segments: M,
    _key: PhantomData<K>,
}

/// Statistics about an interval store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct IntervalStoreStats {
    /// Number of stored boundaries
    pub boundary_count: usize,
    /// Number of constant-value runs, counting the leading default run
    pub interval_count: usize,
}

impl<K: Ord + Clone, V: PartialEq + Clone> IntervalStore<K, V> {
    /// Create a store mapping every key to `default_value`
    pub fn new(default_value: V) -> Self {
        Self::with_map(default_value, BTreeMap::new())
    }
}

impl<K, V, M> IntervalStore<K, V, M>
where
    K: Ord + Clone,
    V: PartialEq + Clone,
    M: SegmentMap<K, V>,
{
    /// Create a store on top of a specific boundary backend
    ///
    /// Any entries already present in `map` are discarded.
    pub fn with_map(default_value: V, mut map: M) -> Self {
        map.clear();
        Self {
            default_value,
            segments: map,
            _key: PhantomData,
        }
    }

    /// The value of every key not explicitly assigned
    pub fn default_value(&self) -> &V {
        &self.default_value
    }

    /// Number of stored boundaries
    pub fn size(&self) -> usize {
        self.segments.len()
    }

    /// Whether every key maps to the default value
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Boundaries in ascending key order
    pub fn segments(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.segments.iter()
    }

    /// Get store statistics
    pub fn stats(&self) -> IntervalStoreStats {
        IntervalStoreStats {
            boundary_count: self.segments.len(),
            interval_count: self.segments.len() + 1,
        }
    }

    /// Value in force at `key`
    pub fn lookup(&self, key: &K) -> &V {
        self.segments
            .floor(key)
            .map_or(&self.default_value, |(_, value)| value)
    }

    /// Answer a batch of point queries in parallel
    #[cfg(feature = "parallel")]
    pub fn lookup_many(&self, keys: &[K]) -> Vec<&V>
    where
        K: Sync,
        V: Sync,
        M: Sync,
    {
        use rayon::prelude::*;

        keys.par_iter().map(|key| self.lookup(key)).collect()
    }

    /// Check the canonical-form invariants with a single ordered scan
    pub fn is_canonical(&self) -> bool {
        // Comparing the first entry against the default covers the leading-run rule
        let mut previous = &self.default_value;
        for (_, value) in self.segments.iter() {
            if value == previous {
                return false;
            }
            previous = value;
        }
        true
    }

    /// Assign `value` to every key in `[begin, end)`
    ///
    /// Empty or inverted ranges are ignored, as are assignments that would not
    /// change any key. See [`IntervalStore::try_assign`] for a variant that
    /// reports invalid ranges.
    pub fn assign(&mut self, begin: K, end: K, value: V) {
        if !(begin < end) {
            trace!("ignoring empty or inverted range");
            return;
        }
        if self.is_redundant(&begin, &end, &value) {
            trace!("assignment already in effect");
            return;
        }

        let after = self.value_after(&end);
        self.excise_superseded(&begin, &end, &value);
        self.insert_boundaries(begin.clone(), &end, &value, after);
        self.merge_neighbors(&begin, &value);
        self.trim_default_runs();
        self.seal_tail(&end);
    }

    /// Assign `value` to `[begin, end)`, rejecting empty or inverted ranges
    pub fn try_assign(&mut self, begin: K, end: K, value: V) -> Result<(), IntervalError> {
        if !(begin < end) {
            return Err(IntervalError::InvalidRange);
        }
        self.assign(begin, end, value);
        Ok(())
    }

    /// Whether `[begin, end)` already maps entirely to `value`
    fn is_redundant(&self, begin: &K, end: &K, value: &V) -> bool {
        self.lookup(begin) == value
            && self
                .segments
                .range(begin, end)
                .all(|(_, existing)| existing == value)
    }

    /// Value the keys from `end` onward must keep once the overwrite lands
    fn value_after(&self, end: &K) -> V {
        self.lookup(end).clone()
    }

    /// Drop every boundary the new interval replaces
    fn excise_superseded(&mut self, begin: &K, end: &K, value: &V) {
        let removed = self.segments.remove_range(begin, end);
        // A boundary at `end` restating `value` would split one run in two
        let restates = self
            .segments
            .get(end)
            .is_some_and(|existing| existing == value);
        let merged_end = restates && self.segments.remove(end).is_some();
        trace!(removed, merged_end, "excised superseded boundaries");
    }

    fn insert_boundaries(&mut self, begin: K, end: &K, value: &V, after: V) {
        self.segments.insert(begin, value.clone());
        // An existing boundary at `end` already carries the continuation
        if after != *value && self.segments.get(end).is_none() {
            self.segments.insert(end.clone(), after);
        }
    }

    /// Fold the `begin` boundary into equal-valued neighbors
    fn merge_neighbors(&mut self, begin: &K, value: &V) {
        let next_key = match self.segments.higher(begin) {
            Some((key, next)) if next == value => Some(key.clone()),
            _ => None,
        };
        if let Some(key) = next_key {
            trace!("merging right neighbor");
            self.segments.remove(&key);
        }

        let previous = self
            .segments
            .lower(begin)
            .map_or(&self.default_value, |(_, previous)| previous);
        if previous == value {
            trace!("merging into left neighbor");
            self.segments.remove(begin);
        }
    }

    /// Remove boundaries that only restate the implied default
    fn trim_default_runs(&mut self) {
        while let Some((_, first)) = self.segments.first() {
            if *first != self.default_value {
                break;
            }
            self.segments.pop_first();
        }

        // Two trailing defaults collapse into the earlier one
        loop {
            let collapsible = match self.segments.last() {
                Some((key, last)) if *last == self.default_value => self
                    .segments
                    .lower(key)
                    .is_some_and(|(_, before)| *before == self.default_value),
                _ => false,
            };
            if !collapsible {
                break;
            }
            self.segments.pop_last();
        }
    }

    /// Terminate a trailing non-default run at `end`
    fn seal_tail(&mut self, end: &K) {
        let unsealed = match self.segments.last() {
            Some((key, last)) => *last != self.default_value && key < end,
            None => false,
        };
        if unsealed {
            trace!("sealing trailing run");
            self.segments.insert(end.clone(), self.default_value.clone());
        }
    }
}
