//! chained-hashmap: a byte-keyed hash table with separate chaining, a
//! pluggable hash/equality strategy, and an external coarse lock.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: an embeddable table engine with a small, exact contract rather
//!   than a general key-value store.
//! - Layers:
//!   - ChainHashMap<V, S>: the engine. Power-of-two bucket array of
//!     singly linked chains; entries live in a generational arena and
//!     link to each other by arena key.
//!   - SharedHashMap<V, S>: the engine plus one lock, shareable between
//!     threads. The engine never takes the lock itself; callers bracket
//!     any sequence of operations that must be atomic.
//!
//! Keys and values
//! - Keys are byte slices. On first insertion the table copies the bytes
//!   into the entry; the caller's buffer is free for reuse once the call
//!   returns. Overwriting an existing key swaps only the value.
//! - Values are moved in and handed back on overwrite and removal. The
//!   table never disposes of a value it has returned.
//!
//! Hashing
//! - A `KeyStrategy` supplies `hash` and `equals`, fixed at construction.
//!   It must be pure: equal keys hash equally.
//! - Each entry caches its 32-bit hash. Lookups compare cached hashes
//!   before calling `equals`, and growth relinks entries by the cached
//!   hash without touching key bytes.
//! - The default strategy is MurmurHash3 x86-32 with seed 2019 and
//!   byte-wise equality; its output is bit-exact with the reference.
//!
//! Sizing and growth
//! - A capacity hint `n` yields the smallest power of two strictly
//!   greater than `n * 4 / 3` buckets, at least one.
//! - `index = hash & (bucket_count - 1)`.
//! - After inserting a new key, if `len > bucket_count * 3 / 4` the bucket
//!   array doubles. If the larger array cannot be allocated the insert
//!   still succeeds and the table keeps running over-loaded.
//! - Removal never shrinks the bucket array. In-bucket order is not
//!   preserved across growth.
//!
//! Errors
//! - `InvalidArgument` when a required hash or equality function is
//!   missing, `OutOfMemory` when the bucket array or a key copy cannot be
//!   allocated. A failed construction returns nothing; a failed insert
//!   leaves the table exactly as it was.
//!
//! Non-goals
//! - No iteration, shrinking, persistence, expiry, or internal locking.

mod bucket;
pub mod chain_hash_map;
mod chain_hash_map_proptest;
mod entry;
mod error;
pub mod lock;
pub mod murmur;
pub mod shared_hash_map;
pub mod strategy;

// Public surface
pub use bucket::{bucket_count_for, bucket_index};
pub use chain_hash_map::ChainHashMap;
pub use error::{Error, Result};
pub use lock::{TableLock, TableLockGuard};
pub use murmur::{default_hash, murmur3_32, DEFAULT_SEED};
pub use shared_hash_map::{SharedGuard, SharedHashMap};
pub use strategy::{EqualsFn, FnStrategy, HashFn, KeyStrategy, Murmur3};
