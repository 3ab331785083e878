/*!
 * Hierarchical Mutex
 *
 * Mutex carrying a fixed rank; a thread may only nest acquisitions in
 * strictly decreasing rank order
 */

use super::context::{LockContext, NO_RANK_HELD};
use crate::core::errors::Result;
use parking_lot::{Mutex, MutexGuard};
use std::ops::{Deref, DerefMut};

/// Mutex that refuses acquisitions breaking the rank hierarchy
///
/// If every thread only ever locks in decreasing rank order, no cycle of
/// waiters can form. The check runs before blocking, so a violation is
/// reported instead of deadlocking.
///
/// # Example
///
/// ```ignore
/// let high = HierarchicalMutex::new(10_000, Accounts::default());
/// let low = HierarchicalMutex::new(5_000, AuditLog::default());
///
/// let ctx = LockContext::new();
/// let accounts = high.lock(&ctx)?;
/// let log = low.lock(&ctx)?;
/// // high.lock(&ctx) here would fail with OrderViolation
/// ```
pub struct HierarchicalMutex<T> {
    rank: u64,
    inner: Mutex<T>,
}

impl<T> HierarchicalMutex<T> {
    /// Create a mutex with the given rank
    ///
    /// Higher ranks must be taken first. `u64::MAX` is reserved for
    /// "nothing held".
    pub fn new(rank: u64, value: T) -> Self {
        assert!(rank < NO_RANK_HELD, "rank u64::MAX is reserved");
        Self {
            rank,
            inner: Mutex::new(value),
        }
    }

    /// Rank of this mutex
    #[inline]
    pub fn rank(&self) -> u64 {
        self.rank
    }

    /// Acquire the mutex, blocking while another thread holds it
    ///
    /// Fails with `OrderViolation` without blocking when the calling thread
    /// already holds a mutex of equal or lower rank.
    pub fn lock<'a>(&'a self, ctx: &'a LockContext) -> Result<HierarchyGuard<'a, T>> {
        ctx.check(self.rank)?;
        let guard = self.inner.lock();
        Ok(HierarchyGuard::enter(guard, ctx, self.rank))
    }

    /// Acquire the mutex only if it is free right now
    ///
    /// Returns `Ok(None)` when another thread holds it. The rank check is the
    /// same as for `lock`.
    pub fn try_lock<'a>(&'a self, ctx: &'a LockContext) -> Result<Option<HierarchyGuard<'a, T>>> {
        ctx.check(self.rank)?;
        Ok(self
            .inner
            .try_lock()
            .map(|guard| HierarchyGuard::enter(guard, ctx, self.rank)))
    }

    /// Mutable access without locking (requires exclusive ownership)
    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }

    /// Consume the mutex, returning the protected value
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for HierarchicalMutex<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HierarchicalMutex")
            .field("rank", &self.rank)
            .field("inner", &self.inner)
            .finish()
    }
}

/// Held hierarchical mutex
///
/// Dropping the guard restores the thread's previous rank, then unlocks.
pub struct HierarchyGuard<'a, T> {
    guard: MutexGuard<'a, T>,
    ctx: &'a LockContext,
    rank: u64,
    previous: u64,
}

impl<'a, T> HierarchyGuard<'a, T> {
    fn enter(guard: MutexGuard<'a, T>, ctx: &'a LockContext, rank: u64) -> Self {
        let previous = ctx.enter(rank);
        Self {
            guard,
            ctx,
            rank,
            previous,
        }
    }

    /// Rank of the held mutex
    #[inline]
    pub fn rank(&self) -> u64 {
        self.rank
    }

    /// Release the mutex explicitly
    #[inline]
    pub fn release(self) {
        drop(self);
    }
}

impl<T> Deref for HierarchyGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for HierarchyGuard<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for HierarchyGuard<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HierarchyGuard")
            .field("rank", &self.rank)
            .field("previous", &self.previous)
            .field("value", &*self.guard)
            .finish()
    }
}

impl<T> Drop for HierarchyGuard<'_, T> {
    fn drop(&mut self) {
        // `guard` unlocks after this body returns
        self.ctx.restore(self.rank, self.previous);
    }
}
