/*!
 * Ordered Pairwise Locking
 *
 * Deadlock-free acquisition of two locks of the same type, used to swap or
 * compare guarded payloads
 */

use parking_lot::{Mutex, MutexGuard};
use std::ptr;
use tracing::trace;

/// Value guarded by its own mutex
///
/// Two instances can be locked together with `lock_both` or exchanged with
/// `swap_with` from any number of threads in any argument order without
/// deadlocking: both locks are always taken in ascending address order.
///
/// # Example
///
/// ```ignore
/// let a = Guarded::new(vec![1, 2]);
/// let b = Guarded::new(vec![3]);
///
/// // Thread 1: a.swap_with(&b)
/// // Thread 2: b.swap_with(&a)   // cannot deadlock with thread 1
/// ```
pub struct Guarded<T> {
    inner: Mutex<T>,
}

impl<T> Guarded<T> {
    /// Wrap a value
    pub fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Access with closure (takes lock briefly)
    #[inline]
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    /// Replace value entirely
    #[inline]
    pub fn replace(&self, value: T) -> T {
        std::mem::replace(&mut *self.inner.lock(), value)
    }

    /// Consume the wrapper, returning the value
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }

    /// Lock `self` and `other` together
    ///
    /// Guards come back in argument order, but acquisition always follows
    /// address order. Returns `None` when both arguments are the same
    /// instance, since its lock cannot be taken twice.
    pub fn lock_both<'a>(
        &'a self,
        other: &'a Self,
    ) -> Option<(MutexGuard<'a, T>, MutexGuard<'a, T>)> {
        if ptr::eq(self, other) {
            return None;
        }
        if (self as *const Self) < (other as *const Self) {
            let mine = self.inner.lock();
            let theirs = other.inner.lock();
            Some((mine, theirs))
        } else {
            let theirs = other.inner.lock();
            let mine = self.inner.lock();
            Some((mine, theirs))
        }
    }

    /// Exchange payloads with `other`; a no-op for the same instance
    pub fn swap_with(&self, other: &Self) {
        if let Some((mut mine, mut theirs)) = self.lock_both(other) {
            std::mem::swap(&mut *mine, &mut *theirs);
            trace!("swapped guarded payloads");
        }
    }
}

/// Exchange the payloads of two guarded values
#[inline]
pub fn swap<T>(lhs: &Guarded<T>, rhs: &Guarded<T>) {
    lhs.swap_with(rhs);
}

impl<T: Default> Default for Guarded<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone> Clone for Guarded<T> {
    /// Copies the payload under the source's lock
    fn clone(&self) -> Self {
        Self::new(self.inner.lock().clone())
    }
}

impl<T: PartialEq + Clone> PartialEq for Guarded<T> {
    /// Identity short-circuits; otherwise each side is read under its own
    /// lock, one at a time.
    fn eq(&self, other: &Self) -> bool {
        if ptr::eq(self, other) {
            return true;
        }
        let lhs = self.inner.lock().clone();
        let rhs = other.inner.lock();
        lhs == *rhs
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Guarded<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guarded").field("inner", &self.inner).finish()
    }
}
