/*!
 * Reentrant Lock
 *
 * Mutual exclusion that the owning execution context may re-acquire without
 * deadlocking. Ownership is keyed on `OwnerId`, so async tasks must run inside
 * `OwnerId::scope` to keep one identity across worker-thread migrations.
 *
 * # Design
 *
 * - `raw`: parking_lot raw mutex, held for the whole outermost acquisition
 * - `owner`: identity of the holder, 0 when unheld
 * - `depth`: recursion depth, only read or written by the current owner
 *
 * A context can only ever observe its own identity in `owner` if it stored it
 * there itself, so the re-entrant check needs no stronger ordering than Relaxed.
 * The raw mutex provides the acquire/release edges between owners.
 */

use crate::core::id::OwnerId;
use parking_lot::lock_api::RawMutex as _;
use parking_lot::RawMutex;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use tracing::{error, trace};

const UNHELD: u64 = 0;

/// Recursive mutex with explicit acquire/release
///
/// # Examples
///
/// ```
/// use agentos_sync::core::sync::ReentrantLock;
///
/// let lock = ReentrantLock::new();
/// lock.acquire();
/// lock.acquire(); // same thread: does not block
/// assert_eq!(lock.depth(), 2);
/// lock.release();
/// lock.release();
/// assert!(!lock.is_held());
/// ```
///
/// # Panics
///
/// `release` from a context that does not own the lock panics. That is a bug
/// in the caller, never a condition to handle.
pub struct ReentrantLock {
    raw: RawMutex,
    owner: AtomicU64,
    depth: AtomicU32,
}

impl ReentrantLock {
    /// Create an unheld lock
    pub const fn new() -> Self {
        Self {
            raw: RawMutex::INIT,
            owner: AtomicU64::new(UNHELD),
            depth: AtomicU32::new(0),
        }
    }

    /// Acquire the lock, blocking if another context holds it
    ///
    /// Re-entrant acquisition by the owner only bumps the depth and never blocks.
    pub fn acquire(&self) {
        let me = OwnerId::current().as_u64();
        if self.owner.load(Ordering::Relaxed) == me {
            self.increment_depth();
            return;
        }

        if !self.raw.try_lock() {
            trace!(caller = me, "reentrant lock contended, blocking");
            self.raw.lock();
        }
        self.take_ownership(me);
    }

    /// Acquire without blocking
    ///
    /// Returns `true` if the caller now holds the lock (including re-entry).
    pub fn try_acquire(&self) -> bool {
        let me = OwnerId::current().as_u64();
        if self.owner.load(Ordering::Relaxed) == me {
            self.increment_depth();
            return true;
        }

        if self.raw.try_lock() {
            self.take_ownership(me);
            true
        } else {
            false
        }
    }

    /// Release one level of ownership
    ///
    /// The underlying mutex is only unlocked when the depth reaches zero.
    ///
    /// # Panics
    ///
    /// Panics if the calling context is not the current owner.
    pub fn release(&self) {
        let me = OwnerId::current().as_u64();
        if self.owner.load(Ordering::Relaxed) != me {
            ownership_violation(me);
        }

        let depth = self.depth.load(Ordering::Relaxed) - 1;
        self.depth.store(depth, Ordering::Relaxed);
        if depth == 0 {
            self.owner.store(UNHELD, Ordering::Relaxed);
            // SAFETY: `owner == me` means this context locked `raw` in
            // acquire/try_acquire and has not unlocked it since.
            unsafe { self.raw.unlock() };
        }
    }

    /// Acquire and return a guard that releases on drop
    pub fn lock(&self) -> ReentrantGuard<'_> {
        self.acquire();
        ReentrantGuard {
            lock: self,
            _not_send: PhantomData,
        }
    }

    /// Run `f` while holding the lock
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = self.lock();
        f()
    }

    /// Whether any context holds the lock (racy, for diagnostics)
    #[inline]
    pub fn is_held(&self) -> bool {
        self.owner.load(Ordering::Relaxed) != UNHELD
    }

    /// Whether the calling context holds the lock
    #[inline]
    pub fn is_held_by_current(&self) -> bool {
        self.owner.load(Ordering::Relaxed) == OwnerId::current().as_u64()
    }

    /// Recursion depth as seen by the caller (0 unless the caller owns the lock)
    pub fn depth(&self) -> u32 {
        if self.is_held_by_current() {
            self.depth.load(Ordering::Relaxed)
        } else {
            0
        }
    }

    #[inline]
    fn take_ownership(&self, me: u64) {
        self.owner.store(me, Ordering::Relaxed);
        self.depth.store(1, Ordering::Relaxed);
    }

    #[inline]
    fn increment_depth(&self) {
        let depth = self.depth.load(Ordering::Relaxed);
        match depth.checked_add(1) {
            Some(next) => self.depth.store(next, Ordering::Relaxed),
            None => panic!("ReentrantLock recursion depth overflow"),
        }
    }
}

#[cold]
#[track_caller]
fn ownership_violation(caller: u64) -> ! {
    error!(caller, "ReentrantLock released by non-owner");
    panic!("ReentrantLock released by non-owner (caller {caller})");
}

impl Default for ReentrantLock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReentrantLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReentrantLock")
            .field("held", &self.is_held())
            .field("owner", &self.owner.load(Ordering::Relaxed))
            .finish()
    }
}

/// RAII guard for [`ReentrantLock`]
///
/// Not `Send`: the release must happen in the context that acquired.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct ReentrantGuard<'a> {
    lock: &'a ReentrantLock,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ReentrantGuard<'_> {
    fn drop(&mut self) {
        self.lock.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_reentrant_acquire_release() {
        let lock = ReentrantLock::new();

        for expected in 1..=5 {
            lock.acquire();
            assert_eq!(lock.depth(), expected);
        }
        for expected in (0..5).rev() {
            lock.release();
            assert_eq!(lock.depth(), expected);
        }
        assert!(!lock.is_held());
    }

    #[test]
    fn test_other_thread_excluded_until_last_release() {
        let lock = Arc::new(ReentrantLock::new());
        lock.acquire();
        lock.acquire();

        let probe = {
            let lock = lock.clone();
            move || {
                let got = lock.try_acquire();
                if got {
                    lock.release();
                }
                got
            }
        };

        assert!(!thread::spawn(probe.clone()).join().unwrap());
        lock.release();
        assert!(!thread::spawn(probe.clone()).join().unwrap());
        lock.release();
        assert!(thread::spawn(probe).join().unwrap());
    }

    #[test]
    #[should_panic(expected = "ReentrantLock released by non-owner")]
    fn test_release_unheld_panics() {
        let lock = ReentrantLock::new();
        lock.release();
    }

    #[test]
    #[should_panic(expected = "ReentrantLock released by non-owner")]
    fn test_release_by_other_thread_panics() {
        let lock = Arc::new(ReentrantLock::new());
        let holder = lock.clone();
        thread::spawn(move || holder.acquire()).join().unwrap();

        lock.release();
    }

    #[test]
    fn test_guard_and_with() {
        let lock = ReentrantLock::new();
        {
            let _outer = lock.lock();
            let inner = lock.with(|| lock.with(|| lock.depth()));
            assert_eq!(inner, 3);
            assert_eq!(lock.depth(), 1);
        }
        assert!(!lock.is_held());
    }

    #[test]
    fn test_sync_scope_is_a_distinct_owner() {
        let lock = ReentrantLock::new();
        lock.acquire();

        let scoped = OwnerId::sync_scope(|| lock.try_acquire());
        assert!(!scoped);

        lock.release();
    }
}
