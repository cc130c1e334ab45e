//! SharedHashMap: a [`ChainHashMap`] paired with its [`TableLock`] so one
//! table can be shared between threads.
//!
//! The table is never locked implicitly. Threads either take the scoped
//! [`guard`](SharedHashMap::guard), which locks for the guard's lifetime
//! and dereferences to the table, or bracket raw
//! [`lock`](SharedHashMap::lock)/[`unlock`](SharedHashMap::unlock) calls
//! around [`table_unchecked`](SharedHashMap::table_unchecked) themselves.
//! Several operations may be batched under one acquisition.

use crate::chain_hash_map::ChainHashMap;
use crate::error::Result;
use crate::lock::TableLock;
use crate::strategy::{KeyStrategy, Murmur3};
use core::cell::UnsafeCell;
use core::fmt;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};

pub struct SharedHashMap<V, S = Murmur3> {
    lock: TableLock,
    table: UnsafeCell<ChainHashMap<V, S>>,
}

// SAFETY: the table is only reachable through `&mut self`, a guard holding
// `lock`, or `table_unchecked`, whose contract requires `lock` to be held.
// Strategy methods run on whichever thread holds the lock.
unsafe impl<V: Send, S: Send> Send for SharedHashMap<V, S> {}
unsafe impl<V: Send, S: Send> Sync for SharedHashMap<V, S> {}

impl<V> SharedHashMap<V> {
    pub fn new() -> Self {
        Self::from_table(ChainHashMap::new())
    }

    pub fn with_capacity(hint: usize) -> Result<Self> {
        ChainHashMap::with_capacity(hint).map(Self::from_table)
    }
}

impl<V> Default for SharedHashMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, S> SharedHashMap<V, S>
where
    S: KeyStrategy,
{
    pub fn with_capacity_and_strategy(hint: usize, strategy: S) -> Result<Self> {
        ChainHashMap::with_capacity_and_strategy(hint, strategy).map(Self::from_table)
    }

    /// Wrap an existing table with a fresh, unlocked lock.
    pub fn from_table(table: ChainHashMap<V, S>) -> Self {
        Self {
            lock: TableLock::new(),
            table: UnsafeCell::new(table),
        }
    }

    /// Block until this table's lock is held.
    pub fn lock(&self) {
        self.lock.lock();
    }

    pub fn try_lock(&self) -> bool {
        self.lock.try_lock()
    }

    /// Release this table's lock.
    ///
    /// # Safety
    ///
    /// The caller must hold the lock through an earlier `lock`/`try_lock`,
    /// and no reference obtained from `table_unchecked` may outlive this
    /// call.
    pub unsafe fn unlock(&self) {
        self.lock.unlock();
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    /// Access the table inside a raw `lock`/`unlock` bracket.
    ///
    /// # Safety
    ///
    /// The caller must hold the lock for as long as the returned reference
    /// is alive, and must not create a second reference through this
    /// method or a guard during that time.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn table_unchecked(&self) -> &mut ChainHashMap<V, S> {
        debug_assert!(self.lock.is_locked(), "table accessed without its lock");
        &mut *self.table.get()
    }

    /// Lock the table for the lifetime of the returned guard.
    pub fn guard(&self) -> SharedGuard<'_, V, S> {
        self.lock.lock();
        SharedGuard {
            map: self,
            _nosend: PhantomData,
        }
    }

    /// Exclusive access needs no lock.
    pub fn get_mut(&mut self) -> &mut ChainHashMap<V, S> {
        self.table.get_mut()
    }

    pub fn into_inner(self) -> ChainHashMap<V, S> {
        self.table.into_inner()
    }

    /// Release the table, its entries and its lock.
    pub fn destroy(self) {
        drop(self)
    }
}

impl<V, S> fmt::Debug for SharedHashMap<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedHashMap")
            .field("lock", &self.lock)
            .finish_non_exhaustive()
    }
}

/// Scoped lock over a [`SharedHashMap`]; dereferences to the table and
/// releases the lock on drop, including during unwinding.
///
/// The guard stays on the thread that took the lock, and is shareable
/// between threads only when the table's contents are:
///
/// ```compile_fail
/// use chained_hashmap::{Murmur3, SharedGuard};
/// fn assert_send<T: Send>() {}
/// assert_send::<SharedGuard<'static, u64, Murmur3>>();
/// ```
///
/// ```compile_fail
/// use chained_hashmap::{Murmur3, SharedGuard};
/// use std::cell::Cell;
/// fn assert_sync<T: Sync>() {}
/// assert_sync::<SharedGuard<'static, Cell<u64>, Murmur3>>();
/// ```
pub struct SharedGuard<'a, V, S> {
    map: &'a SharedHashMap<V, S>,
    // Unlock must happen on the locking thread.
    _nosend: PhantomData<*const ()>,
}

// SAFETY: `&SharedGuard` only hands out `&ChainHashMap`, which exposes `&V`
// and runs `&S` methods; that is sound across threads when both are `Sync`.
unsafe impl<V: Sync, S: Sync> Sync for SharedGuard<'_, V, S> {}

impl<V, S> Deref for SharedGuard<'_, V, S> {
    type Target = ChainHashMap<V, S>;

    fn deref(&self) -> &Self::Target {
        // SAFETY: the guard holds the lock.
        unsafe { &*self.map.table.get() }
    }
}

impl<V, S> DerefMut for SharedGuard<'_, V, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: the guard holds the lock and is borrowed mutably.
        unsafe { &mut *self.map.table.get() }
    }
}

impl<V, S> Drop for SharedGuard<'_, V, S> {
    fn drop(&mut self) {
        // SAFETY: acquired in `guard`; every borrow of the table through
        // this guard has ended.
        unsafe { self.map.lock.unlock() }
    }
}
