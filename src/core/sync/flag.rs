/*!
 * Atomic Flag
 * Single-bit state with an exactly-once claim operation
 */

use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Lock-free boolean flag
///
/// # Performance
///
/// - Cache-line aligned to prevent false sharing with neighbouring hot fields
/// - All operations are single atomic instructions except `set_if_unset`,
///   which is a short CAS loop
#[repr(C, align(64))]
pub struct AtomicFlag {
    bit: AtomicBool,
}

impl AtomicFlag {
    /// Create a flag in the given state
    #[inline]
    pub const fn new(initial: bool) -> Self {
        Self {
            bit: AtomicBool::new(initial),
        }
    }

    #[inline(always)]
    pub fn set(&self) {
        self.bit.store(true, Ordering::SeqCst);
    }

    #[inline(always)]
    pub fn unset(&self) {
        self.bit.store(false, Ordering::SeqCst);
    }

    /// Unconditionally write either state
    #[inline(always)]
    pub fn set_to(&self, value: bool) {
        self.bit.store(value, Ordering::SeqCst);
    }

    #[inline(always)]
    pub fn is_set(&self) -> bool {
        self.bit.load(Ordering::SeqCst)
    }

    /// Claim the flag: transition false -> true
    ///
    /// Returns `true` only for the caller that performed the transition. Under
    /// any number of concurrent callers on an unset flag, exactly one wins.
    pub fn set_if_unset(&self) -> bool {
        self.transition(false, true)
    }

    /// Release a claim: transition true -> false
    ///
    /// Returns `true` only for the caller that performed the transition.
    pub fn unset_if_set(&self) -> bool {
        self.transition(true, false)
    }

    // A failed CAS means another caller wrote the bit; the next load sees it.
    #[inline]
    fn transition(&self, from: bool, to: bool) -> bool {
        loop {
            if self.bit.load(Ordering::SeqCst) != from {
                return false;
            }
            if self
                .bit
                .compare_exchange(from, to, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return true;
            }
        }
    }
}

impl Default for AtomicFlag {
    fn default() -> Self {
        Self::new(false)
    }
}

impl fmt::Debug for AtomicFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicFlag").field(&self.is_set()).finish()
    }
}

impl Serialize for AtomicFlag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.is_set())
    }
}
