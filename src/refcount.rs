//! [`RefCount`], the atomic reference counter that [`crate::block::SharedBlock`]
//! and [`crate::chain::Chain`] build their sharing on.
//!
//! Refer to the [module-level documentation][self] for more info.

use core::sync::atomic::{AtomicUsize, Ordering};

/// An atomic, non-negative reference counter that starts at 1.
///
/// `RefCount` is the only piece of this crate that is ever touched from more
/// than one thread concurrently: everything built on top of it (blocks,
/// chains) is single-writer, and callers must already hold exclusive access
/// before mutating. `RefCount` itself only promises that increments,
/// decrements, and the final decrement's synchronization-with a later
/// destructor are race-free.
#[repr(transparent)]
pub struct RefCount(AtomicUsize);

impl RefCount {
    /// Constructs a fresh counter with a count of 1.
    pub const fn new() -> Self {
        RefCount(AtomicUsize::new(1))
    }

    /// Increments the count. Relaxed: the caller already has a live reference,
    /// so there is nothing for this increment to synchronize with.
    #[inline]
    pub fn increment(&self) {
        // Unwrap-style overflow check: a refcount overflowing usize is a logic
        // bug, not a recoverable condition, so a debug assertion is enough.
        let prev = self.0.fetch_add(1, Ordering::Relaxed);
        debug_assert!(prev != 0, "incrementing a dead RefCount");
        debug_assert!(prev != usize::MAX, "RefCount overflow");
    }

    /// Decrements the count. Returns `true` if this was the last reference,
    /// in which case the caller must destroy the owned data.
    ///
    /// Uses acquire-release ordering on the general path so that all writes
    /// made by any prior owner happen-before the destructor that runs after
    /// this call returns `true`. When a relaxed read already observes a
    /// count of 1 (i.e. this is obviously the only reference), the atomic
    /// RMW is skipped in favor of a plain acquire fence equivalent, since no
    /// other thread can be concurrently decrementing.
    #[inline]
    pub fn decrement(&self) -> bool {
        if self.0.load(Ordering::Acquire) == 1 {
            return true;
        }
        let prev = self.0.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(prev != 0, "decrementing a dead RefCount");
        prev == 1
    }

    /// Returns `true` if this is the only live reference.
    ///
    /// Advisory for non-correctness uses (debug output, size estimation).
    /// Callers that need "may I mutate?" to actually be correct must already
    /// hold the only external reference to the owning handle; this method's
    /// acquire load is what makes that check race-free against a concurrent
    /// final `decrement`.
    #[inline]
    pub fn is_unique(&self) -> bool {
        self.0.load(Ordering::Acquire) == 1
    }

    /// Returns a snapshot of the current count. Never used for correctness,
    /// only for diagnostics and `dynamic_sizeof`-style accounting.
    #[inline]
    pub fn count(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for RefCount {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::RefCount;

    #[test]
    fn starts_at_one() {
        let rc = RefCount::new();
        assert!(rc.is_unique());
        assert_eq!(rc.count(), 1);
    }

    #[test]
    fn increment_breaks_uniqueness() {
        let rc = RefCount::new();
        rc.increment();
        assert!(!rc.is_unique());
        assert_eq!(rc.count(), 2);
    }

    #[test]
    fn decrement_reports_last_owner() {
        let rc = RefCount::new();
        rc.increment();
        assert!(!rc.decrement());
        assert!(rc.is_unique());
        assert!(rc.decrement());
    }

    #[test]
    fn many_increments_then_decrements() {
        let rc = RefCount::new();
        for _ in 0..100 {
            rc.increment();
        }
        assert_eq!(rc.count(), 101);
        for _ in 0..100 {
            assert!(!rc.decrement());
        }
        assert!(rc.decrement());
    }
}
