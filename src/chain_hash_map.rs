//! ChainHashMap: the separately chained table engine.
//!
//! Keys are byte slices, copied into the table on first insertion. Values
//! are moved in and handed back on overwrite and removal; the table never
//! disposes of a value it has returned. Bucket count is a power of two and
//! doubles whenever the entry count exceeds three quarters of it.

use crate::bucket::{bucket_count_for, Buckets};
use crate::entry::{Entry, EntryKey};
use crate::error::{Error, Result};
use crate::strategy::{EqualsFn, FnStrategy, HashFn, KeyStrategy, Murmur3};
use core::fmt;
use slotmap::SlotMap;

pub struct ChainHashMap<V, S = Murmur3> {
    strategy: S,
    buckets: Buckets,
    entries: SlotMap<EntryKey, Entry<V>>,
}

impl<V> ChainHashMap<V> {
    /// Empty table with one bucket and the default strategy.
    pub fn new() -> Self {
        Self::with_strategy(Murmur3::new())
    }

    /// Table sized for `hint` entries with the default strategy.
    pub fn with_capacity(hint: usize) -> Result<Self> {
        Self::with_capacity_and_strategy(hint, Murmur3::new())
    }
}

impl<V> Default for ChainHashMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ChainHashMap<V, FnStrategy> {
    /// Table sized for `hint` entries using plain hash and equality
    /// functions. Both are required.
    pub fn with_fns(hint: usize, hash: Option<HashFn>, equals: Option<EqualsFn>) -> Result<Self> {
        let strategy = FnStrategy::new(hash, equals)?;
        Self::with_capacity_and_strategy(hint, strategy)
    }
}

impl<V, S> ChainHashMap<V, S>
where
    S: KeyStrategy,
{
    pub fn with_strategy(strategy: S) -> Self {
        log::trace!("creating chained table with 1 bucket");
        Self {
            strategy,
            buckets: Buckets::single(),
            entries: SlotMap::with_key(),
        }
    }

    /// Table sized for `hint` entries. Fails with [`Error::OutOfMemory`]
    /// if the bucket array cannot be allocated; nothing is retained.
    pub fn with_capacity_and_strategy(hint: usize, strategy: S) -> Result<Self> {
        let count = bucket_count_for(hint)?;
        let buckets = Buckets::try_with_count(count)?;
        log::trace!("creating chained table with {count} buckets for {hint} expected entries");
        Ok(Self {
            strategy,
            buckets,
            entries: SlotMap::with_key(),
        })
    }

    /// Hash `key` with this table's strategy.
    #[inline]
    pub fn hash_key(&self, key: &[u8]) -> u32 {
        self.strategy.hash(key)
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Same as [`len`](Self::len).
    pub fn size(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.count()
    }

    /// Number of entries the current bucket array holds before it grows.
    pub fn capacity(&self) -> usize {
        self.buckets.load_limit()
    }

    fn find_entry(&self, key: &[u8]) -> Option<EntryKey> {
        let hash = self.hash_key(key);
        let mut cursor = self.buckets.head(self.buckets.index_of(hash));
        while let Some(k) = cursor {
            let entry = &self.entries[k];
            if entry.matches(&self.strategy, key, hash) {
                return Some(k);
            }
            cursor = entry.next;
        }
        None
    }

    pub fn find(&self, key: &[u8]) -> Option<&V> {
        self.find_entry(key).map(|k| &self.entries[k].value)
    }

    pub fn find_mut(&mut self, key: &[u8]) -> Option<&mut V> {
        let k = self.find_entry(key)?;
        Some(&mut self.entries[k].value)
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.find_entry(key).is_some()
    }

    /// Insert or overwrite.
    ///
    /// Overwriting an existing key swaps the value in place and returns
    /// the previous one; the stored key is not recopied. A new key is
    /// copied, linked at the end of its chain, and may trigger growth.
    ///
    /// Returns [`Error::OutOfMemory`] if the entry record or the key copy
    /// cannot be allocated, in which case the table is unchanged. A failed
    /// growth is not an error: the entry is inserted and the table stays at
    /// its old size.
    pub fn insert(&mut self, key: &[u8], value: V) -> Result<Option<V>> {
        self.insert_allocating_with(key, value, allocate_entry, Buckets::try_with_count)
    }

    fn insert_allocating_with<E, F>(
        &mut self,
        key: &[u8],
        value: V,
        alloc_entry: E,
        alloc_buckets: F,
    ) -> Result<Option<V>>
    where
        E: FnOnce(&mut SlotMap<EntryKey, Entry<V>>, &[u8], u32, V) -> Result<Entry<V>>,
        F: FnOnce(usize) -> Result<Buckets>,
    {
        let hash = self.hash_key(key);
        let idx = self.buckets.index_of(hash);

        let mut tail = None;
        let mut cursor = self.buckets.head(idx);
        while let Some(k) = cursor {
            let entry = &mut self.entries[k];
            if entry.matches(&self.strategy, key, hash) {
                return Ok(Some(core::mem::replace(&mut entry.value, value)));
            }
            tail = Some(k);
            cursor = entry.next;
        }

        // Nothing is linked or counted until both allocations succeed.
        let entry = alloc_entry(&mut self.entries, key, hash, value)?;
        let k = self.entries.insert(entry);
        match tail {
            Some(t) => self.entries[t].next = Some(k),
            None => self.buckets.set_head(idx, Some(k)),
        }

        self.grow_if_needed(alloc_buckets);
        Ok(None)
    }

    /// Unlink and free the entry for `key`, handing its value back.
    pub fn remove(&mut self, key: &[u8]) -> Option<V> {
        let hash = self.hash_key(key);
        let idx = self.buckets.index_of(hash);

        let mut prev: Option<EntryKey> = None;
        let mut cursor = self.buckets.head(idx);
        while let Some(k) = cursor {
            let (found, next) = {
                let entry = &self.entries[k];
                (entry.matches(&self.strategy, key, hash), entry.next)
            };
            if found {
                match prev {
                    Some(p) => self.entries[p].next = next,
                    None => self.buckets.set_head(idx, next),
                }
                return self.entries.remove(k).map(Entry::into_value);
            }
            prev = Some(k);
            cursor = next;
        }
        None
    }

    /// Release every entry and the bucket array. Same as dropping the table.
    pub fn destroy(self) {
        drop(self)
    }

    /// Double the bucket array once the load limit is exceeded. Entries are
    /// relinked by their cached hash and prepended, so in-bucket order after
    /// a rehash is unspecified. If the new array cannot be allocated the
    /// table keeps its current buckets.
    fn grow_if_needed<F>(&mut self, alloc: F)
    where
        F: FnOnce(usize) -> Result<Buckets>,
    {
        if self.len() <= self.buckets.load_limit() {
            return;
        }
        let grown = self
            .bucket_count()
            .checked_mul(2)
            .ok_or(Error::OutOfMemory)
            .and_then(alloc);
        let mut fresh = match grown {
            Ok(b) => b,
            Err(e) => {
                log::warn!(
                    "could not grow table beyond {} buckets ({e}); {} entries remain chained",
                    self.bucket_count(),
                    self.len()
                );
                return;
            }
        };

        for (k, entry) in self.entries.iter_mut() {
            let idx = fresh.index_of(entry.hash());
            entry.next = fresh.push_front(idx, k);
        }

        log::trace!(
            "grew table from {} to {} buckets at {} entries",
            self.bucket_count(),
            fresh.count(),
            self.len()
        );
        self.buckets = fresh;
    }

    /// Walk every chain and check the structural invariants.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        let mut seen = 0;
        for idx in 0..self.buckets.count() {
            let mut chain: Vec<&[u8]> = Vec::new();
            let mut cursor = self.buckets.head(idx);
            while let Some(k) = cursor {
                let entry = &self.entries[k];
                assert_eq!(self.buckets.index_of(entry.hash()), idx, "entry in wrong bucket");
                assert_eq!(entry.hash(), self.strategy.hash(entry.key()), "stale cached hash");
                assert!(
                    chain.iter().all(|other| !self.strategy.equals(other, entry.key())),
                    "duplicate key in chain"
                );
                chain.push(entry.key());
                seen += 1;
                cursor = entry.next;
            }
        }
        assert_eq!(seen, self.len(), "size does not match chained entries");
        assert!(self.bucket_count().is_power_of_two());
    }
}

impl<V, S> fmt::Debug for ChainHashMap<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainHashMap")
            .field("len", &self.entries.len())
            .field("bucket_count", &self.buckets.count())
            .finish()
    }
}

impl<V, S> Drop for ChainHashMap<V, S> {
    fn drop(&mut self) {
        log::trace!(
            "destroying table with {} entries in {} buckets",
            self.entries.len(),
            self.buckets.count()
        );
    }
}

/// Reserve an arena slot, then copy the key. Either failure leaves the
/// arena's contents untouched.
fn allocate_entry<V>(
    entries: &mut SlotMap<EntryKey, Entry<V>>,
    key: &[u8],
    hash: u32,
    value: V,
) -> Result<Entry<V>> {
    entries.try_reserve(1)?;
    Entry::new(key, hash, value)
}
