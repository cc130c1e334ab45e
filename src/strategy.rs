//! Hash/equality strategies.
//!
//! A table is parameterized by one [`KeyStrategy`] chosen at construction
//! and used for every lookup, insert and removal. Implementations must be
//! pure and deterministic: keys that compare equal must hash equally, and
//! neither method may depend on anything but its arguments. The table does
//! not synchronize calls into the strategy.

use crate::error::{Error, Result};
use crate::murmur::{murmur3_32, DEFAULT_SEED};

/// Plain hash function over key bytes.
pub type HashFn = fn(&[u8]) -> u32;

/// Plain equality function over two keys.
pub type EqualsFn = fn(&[u8], &[u8]) -> bool;

/// Hashing and equality over byte keys.
pub trait KeyStrategy {
    /// 32-bit hash of `key`; the table keeps its low bits as the bucket index.
    fn hash(&self, key: &[u8]) -> u32;
    /// Key equality. Must agree with `hash`: `equals(a, b)` implies
    /// `hash(a) == hash(b)`, otherwise equal keys land in different chains.
    fn equals(&self, a: &[u8], b: &[u8]) -> bool;
}

impl<T: KeyStrategy + ?Sized> KeyStrategy for &T {
    #[inline]
    fn hash(&self, key: &[u8]) -> u32 {
        (**self).hash(key)
    }

    #[inline]
    fn equals(&self, a: &[u8], b: &[u8]) -> bool {
        (**self).equals(a, b)
    }
}

/// Default strategy: seeded MurmurHash3 x86-32 and byte-wise equality.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Murmur3 {
    seed: u32,
}

impl Murmur3 {
    pub const fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    pub const fn with_seed(seed: u32) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl Default for Murmur3 {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyStrategy for Murmur3 {
    #[inline]
    fn hash(&self, key: &[u8]) -> u32 {
        murmur3_32(key, self.seed)
    }

    #[inline]
    fn equals(&self, a: &[u8], b: &[u8]) -> bool {
        a == b
    }
}

/// Strategy assembled from two function pointers.
#[derive(Copy, Clone, Debug)]
pub struct FnStrategy {
    hash: HashFn,
    equals: EqualsFn,
}

impl FnStrategy {
    /// Both functions are required; a missing one yields
    /// [`Error::InvalidArgument`].
    pub fn new(hash: Option<HashFn>, equals: Option<EqualsFn>) -> Result<Self> {
        let hash = hash.ok_or(Error::InvalidArgument("hash function is required"))?;
        let equals = equals.ok_or(Error::InvalidArgument("equality function is required"))?;
        Ok(Self { hash, equals })
    }
}

impl KeyStrategy for FnStrategy {
    #[inline]
    fn hash(&self, key: &[u8]) -> u32 {
        (self.hash)(key)
    }

    #[inline]
    fn equals(&self, a: &[u8], b: &[u8]) -> bool {
        (self.equals)(a, b)
    }
}
