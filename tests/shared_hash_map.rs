// SharedHashMap and TableLock integration tests.
//
// The table never locks on its own; these tests check that the lock it
// carries serializes callers that do bracket their work, and that the
// raw acquire/release pair and the scoped guard are interchangeable.
use chained_hashmap::{Murmur3, SharedGuard, SharedHashMap, TableLock, TableLockGuard};
use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

// Test: read-modify-write under the guard is atomic across threads.
#[test]
fn counter_increments_are_not_lost() {
    let m = Arc::new(SharedHashMap::<u64>::with_capacity(1).unwrap());
    m.guard().insert(b"hits", 0).unwrap();

    let threads = 8;
    let per_thread = 500;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let m = Arc::clone(&m);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..per_thread {
                    let mut g = m.guard();
                    let current = *g.find(b"hits").unwrap();
                    g.insert(b"hits", current + 1).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let total = (threads * per_thread) as u64;
    assert_eq!(m.guard().find(b"hits").copied(), Some(total));
}

// Test: raw lock/unlock brackets from several threads.
// Verifies: each thread's batch of inserts and removes is observed whole.
#[test]
fn raw_brackets_across_threads() {
    let m = Arc::new(SharedHashMap::<usize>::new());
    let handles: Vec<_> = (0..4usize)
        .map(|t| {
            let m = Arc::clone(&m);
            thread::spawn(move || {
                for round in 0..100usize {
                    m.lock();
                    // SAFETY: the lock is held until the matching unlock below.
                    unsafe {
                        let table = m.table_unchecked();
                        let before = table.len();
                        let key = format!("{t}-{round}");
                        table.insert(key.as_bytes(), round).unwrap();
                        table.insert(b"scratch", t).unwrap();
                        assert_eq!(table.remove(b"scratch"), Some(t));
                        assert_eq!(table.len(), before + 1);
                        m.unlock();
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let m = Arc::try_unwrap(m).unwrap();
    let table = m.into_inner();
    assert_eq!(table.len(), 400);
    assert!(!table.contains(b"scratch"));
}

// Test: a held lock blocks other threads until released.
#[test]
fn lock_blocks_until_released() {
    let lock = Arc::new(TableLock::new());
    let entered = Arc::new(AtomicUsize::new(0));

    lock.lock();
    let waiter = {
        let lock = Arc::clone(&lock);
        let entered = Arc::clone(&entered);
        thread::spawn(move || {
            let _g = lock.guard();
            entered.store(1, Ordering::SeqCst);
        })
    };

    thread::sleep(std::time::Duration::from_millis(50));
    assert_eq!(entered.load(Ordering::SeqCst), 0);
    // SAFETY: acquired above on this thread.
    unsafe { lock.unlock() };
    waiter.join().unwrap();
    assert_eq!(entered.load(Ordering::SeqCst), 1);
    assert!(!lock.is_locked());
}

// Test: try_lock reports contention instead of blocking.
#[test]
fn try_lock_reports_contention() {
    let m: SharedHashMap<()> = SharedHashMap::default();
    let g = m.guard();
    assert!(!m.try_lock());
    drop(g);
    assert!(m.try_lock());
    // SAFETY: acquired by the successful try_lock.
    unsafe { m.unlock() };
    m.destroy();
}

fn assert_sync<T: Sync>() {}

// Test: guards over shareable contents can be read from several threads,
// and a table of non-Sync values is still shareable behind its lock.
#[test]
fn guard_shared_by_reference_across_threads() {
    assert_sync::<SharedGuard<'static, u64, Murmur3>>();
    assert_sync::<TableLockGuard<'static>>();
    assert_sync::<SharedHashMap<Cell<u64>>>();

    let m = SharedHashMap::<u64>::new();
    m.guard().insert(b"k", 7).unwrap();
    let g = m.guard();
    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| assert_eq!(g.find(b"k"), Some(&7)));
        }
    });
    drop(g);
    assert!(!m.is_locked());

    let cells = SharedHashMap::<Cell<u64>>::new();
    cells.guard().insert(b"n", Cell::new(0)).unwrap();
    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                let g = cells.guard();
                let c = g.find(b"n").unwrap();
                c.set(c.get() + 1);
            });
        }
    });
    assert_eq!(cells.guard().find(b"n").map(Cell::get), Some(4));
}
