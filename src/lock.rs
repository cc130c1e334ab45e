//! Table lock: one raw mutual-exclusion primitive with explicit
//! acquire/release, plus an RAII guard for scoped use.
//!
//! Nothing in the table takes this lock on its own. Callers bracket
//! whatever sequence of operations must appear atomic to other threads.

use core::fmt;
use core::marker::PhantomData;
use parking_lot::lock_api::RawMutex as _;
use parking_lot::RawMutex;

pub struct TableLock {
    raw: RawMutex,
}

impl TableLock {
    pub const fn new() -> Self {
        Self { raw: RawMutex::INIT }
    }

    /// Block until the lock is acquired. There is no timeout.
    #[inline]
    pub fn lock(&self) {
        self.raw.lock();
    }

    #[inline]
    pub fn try_lock(&self) -> bool {
        self.raw.try_lock()
    }

    /// Release the lock.
    ///
    /// # Safety
    ///
    /// The lock must be held, and acquired by the caller's own earlier
    /// `lock`/`try_lock` rather than by a live [`TableLockGuard`].
    #[inline]
    pub unsafe fn unlock(&self) {
        debug_assert!(self.raw.is_locked(), "unlock of a table lock that is not held");
        self.raw.unlock();
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }

    /// Acquire the lock for the lifetime of the returned guard.
    pub fn guard(&self) -> TableLockGuard<'_> {
        self.lock();
        TableLockGuard {
            lock: self,
            _nosend: PhantomData,
        }
    }
}

impl Default for TableLock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TableLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableLock")
            .field("locked", &self.is_locked())
            .finish()
    }
}

/// RAII guard returned by [`TableLock::guard`]; releases on drop.
///
/// The guard cannot leave the thread that acquired the lock:
///
/// ```compile_fail
/// use chained_hashmap::TableLock;
/// let lock = TableLock::new();
/// let g = lock.guard();
/// std::thread::scope(|s| {
///     s.spawn(move || drop(g));
/// });
/// ```
pub struct TableLockGuard<'a> {
    lock: &'a TableLock,
    _nosend: PhantomData<*const ()>,
}

// SAFETY: a shared guard exposes nothing but its lifetime.
unsafe impl Sync for TableLockGuard<'_> {}

impl Drop for TableLockGuard<'_> {
    fn drop(&mut self) {
        // SAFETY: the guard was created by acquiring `lock` and is the only
        // thing that releases it.
        unsafe { self.lock.unlock() }
    }
}
