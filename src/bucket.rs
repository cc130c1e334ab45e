//! Power-of-two bucket array of chain heads.

use crate::entry::EntryKey;
use crate::error::{Error, Result};

/// Map a hash to its bucket. `bucket_count` must be a power of two.
#[inline]
pub fn bucket_index(bucket_count: usize, hash: u32) -> usize {
    debug_assert!(bucket_count.is_power_of_two());
    (hash as usize) & (bucket_count - 1)
}

/// Bucket count for an expected number of entries: the smallest power of
/// two strictly greater than `hint * 4 / 3`, never less than one.
pub fn bucket_count_for(hint: usize) -> Result<usize> {
    let minimum = hint
        .checked_mul(4)
        .map(|n| n / 3)
        .ok_or(Error::OutOfMemory)?;
    minimum
        .checked_add(1)
        .and_then(usize::checked_next_power_of_two)
        .ok_or(Error::OutOfMemory)
}

pub(crate) struct Buckets {
    heads: Vec<Option<EntryKey>>,
}

impl Buckets {
    /// One empty bucket. Cannot fail in any way worth reporting.
    pub(crate) fn single() -> Self {
        Self { heads: vec![None] }
    }

    /// Allocate `count` empty buckets, reporting allocation failure.
    pub(crate) fn try_with_count(count: usize) -> Result<Self> {
        debug_assert!(count.is_power_of_two());
        let mut heads = Vec::new();
        heads.try_reserve_exact(count)?;
        heads.resize(count, None);
        Ok(Self { heads })
    }

    #[inline]
    pub(crate) fn count(&self) -> usize {
        self.heads.len()
    }

    /// Largest entry count the array holds before it must grow.
    #[inline]
    pub(crate) fn load_limit(&self) -> usize {
        self.count() * 3 / 4
    }

    #[inline]
    pub(crate) fn index_of(&self, hash: u32) -> usize {
        bucket_index(self.count(), hash)
    }

    #[inline]
    pub(crate) fn head(&self, idx: usize) -> Option<EntryKey> {
        self.heads[idx]
    }

    #[inline]
    pub(crate) fn set_head(&mut self, idx: usize, head: Option<EntryKey>) {
        self.heads[idx] = head;
    }

    /// Install `head` at `idx`, returning the chain it displaced.
    #[inline]
    pub(crate) fn push_front(&mut self, idx: usize, head: EntryKey) -> Option<EntryKey> {
        self.heads[idx].replace(head)
    }
}
