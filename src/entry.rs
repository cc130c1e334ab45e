//! Entry records and their owned keys.
//!
//! Entries live in a generational arena; chains link entries by arena key
//! rather than by pointer. Each entry owns a private copy of its key bytes,
//! made once at insertion and freed with the entry, so callers may reuse
//! their key buffers as soon as a call returns.

use crate::error::Result;
use crate::strategy::KeyStrategy;

slotmap::new_key_type! {
    /// Arena key of one entry.
    pub(crate) struct EntryKey;
}

#[derive(Debug)]
pub(crate) struct Entry<V> {
    key: Box<[u8]>,
    hash: u32,
    pub(crate) value: V,
    pub(crate) next: Option<EntryKey>,
}

impl<V> Entry<V> {
    /// Build an unlinked entry holding a copy of `key`.
    pub(crate) fn new(key: &[u8], hash: u32, value: V) -> Result<Self> {
        Ok(Self {
            key: copy_key(key)?,
            hash,
            value,
            next: None,
        })
    }

    #[inline]
    pub(crate) fn key(&self) -> &[u8] {
        &self.key
    }

    /// Hash computed at insertion; rehashing reuses it.
    #[inline]
    pub(crate) fn hash(&self) -> u32 {
        self.hash
    }

    /// Cheap hash comparison first, strategy equality only on a hash match.
    #[inline]
    pub(crate) fn matches<S>(&self, strategy: &S, key: &[u8], hash: u32) -> bool
    where
        S: KeyStrategy + ?Sized,
    {
        self.hash == hash && strategy.equals(self.key(), key)
    }

    pub(crate) fn into_value(self) -> V {
        self.value
    }
}

fn copy_key(key: &[u8]) -> Result<Box<[u8]>> {
    let mut owned = Vec::new();
    owned.try_reserve_exact(key.len())?;
    owned.extend_from_slice(key);
    Ok(owned.into_boxed_slice())
}
