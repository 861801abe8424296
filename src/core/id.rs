/*!
 * Owner Identity
 * Stable per-execution-context identities for ownership tracking
 *
 * An `OwnerId` names "who is calling right now". Plain OS threads get an
 * identity assigned on first use and cached in a thread-local. Async tasks
 * that may hop between runtime worker threads must run inside
 * `OwnerId::scope`, which pins a task-local identity for the whole future.
 * Without the scope, a task that migrates between an acquire and its matching
 * release would look like two different owners.
 */

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::future::Future;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of an execution context (OS thread or scoped task)
///
/// Zero is never a valid identity; lock implementations use it as "unheld".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(NonZeroU64);

// Process-wide generator. Identities are never recycled.
static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_OWNER: Cell<Option<OwnerId>> = const { Cell::new(None) };
}

tokio::task_local! {
    static TASK_OWNER: OwnerId;
}

impl OwnerId {
    #[cold]
    fn allocate() -> Self {
        let raw = NEXT_OWNER.fetch_add(1, Ordering::Relaxed);
        match NonZeroU64::new(raw) {
            Some(id) => OwnerId(id),
            None => panic!("owner identity space exhausted"),
        }
    }

    /// Identity of the calling context
    ///
    /// Returns the task-local identity when called inside [`OwnerId::scope`] or
    /// [`OwnerId::sync_scope`], otherwise the identity of the current OS thread.
    #[inline]
    pub fn current() -> Self {
        if let Ok(id) = TASK_OWNER.try_with(|id| *id) {
            return id;
        }

        THREAD_OWNER.with(|cell| match cell.get() {
            Some(id) => id,
            None => {
                let id = Self::allocate();
                cell.set(Some(id));
                id
            }
        })
    }

    /// Run `fut` with a fresh task-local identity
    ///
    /// Use this for tokio tasks that take a `ReentrantLock`: the identity stays
    /// the same even if the runtime moves the task to another worker thread.
    pub async fn scope<F>(fut: F) -> F::Output
    where
        F: Future,
    {
        TASK_OWNER.scope(Self::allocate(), fut).await
    }

    /// Synchronous form of [`OwnerId::scope`]
    pub fn sync_scope<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
    {
        TASK_OWNER.sync_scope(Self::allocate(), f)
    }

    /// Raw non-zero value
    #[inline(always)]
    pub fn as_u64(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_thread_identity_is_stable() {
        let a = OwnerId::current();
        let b = OwnerId::current();
        assert_eq!(a, b);
        assert_ne!(a.as_u64(), 0);
    }

    #[test]
    fn test_threads_have_distinct_identities() {
        let here = OwnerId::current();
        let there = thread::spawn(OwnerId::current).join().unwrap();
        assert_ne!(here, there);
    }

    #[test]
    fn test_sync_scope_overrides_thread_identity() {
        let thread_id = OwnerId::current();
        let (inner, nested) = OwnerId::sync_scope(|| (OwnerId::current(), OwnerId::current()));

        assert_ne!(inner, thread_id);
        assert_eq!(inner, nested);
        assert_eq!(OwnerId::current(), thread_id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_task_scope_survives_yields() {
        let ids = OwnerId::scope(async {
            let mut seen = Vec::new();
            for _ in 0..16 {
                seen.push(OwnerId::current());
                tokio::task::yield_now().await;
            }
            seen
        })
        .await;

        assert!(ids.windows(2).all(|w| w[0] == w[1]));
    }
}
