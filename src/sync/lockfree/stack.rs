/*!
 * Lock-Free Stack
 * CAS-based LIFO with epoch-based memory reclamation
 */

use crate::core::errors::{Result, SyncError};
use crossbeam_epoch::{self as epoch, Atomic, Owned};
use crossbeam_utils::Backoff;
use std::mem::ManuallyDrop;
use std::ptr;
use std::sync::atomic::Ordering;

struct Node<T> {
    value: ManuallyDrop<T>,
    next: Atomic<Node<T>>,
}

/// Treiber stack with safe reclamation
///
/// # Performance
///
/// - **Push/Pop**: Lock-free, one CAS on the head in the uncontended case
/// - **Contention**: Failed CAS retries back off exponentially
/// - **Memory reclamation**: Deferred via epochs
///
/// # Safety
///
/// A thread popping concurrently may still be reading a node through a
/// stale head it loaded before another thread's successful CAS. Popped nodes
/// are therefore retired to crossbeam-epoch and only deallocated once every
/// thread pinned at the time of retirement has unpinned.
pub struct LockFreeStack<T> {
    head: Atomic<Node<T>>,
}

impl<T> LockFreeStack<T> {
    /// Create an empty stack
    pub fn new() -> Self {
        Self {
            head: Atomic::null(),
        }
    }

    /// Push a value (lock-free)
    pub fn push(&self, value: T) {
        let mut node = Owned::new(Node {
            value: ManuallyDrop::new(value),
            next: Atomic::null(),
        });
        let backoff = Backoff::new();
        let guard = epoch::pin();

        loop {
            let head = self.head.load(Ordering::Relaxed, &guard);
            node.next.store(head, Ordering::Relaxed);

            match self
                .head
                .compare_exchange(head, node, Ordering::Release, Ordering::Relaxed, &guard)
            {
                Ok(_) => return,
                Err(e) => {
                    node = e.new;
                    backoff.spin();
                }
            }
        }
    }

    /// Pop the most recently pushed value (lock-free)
    pub fn try_pop(&self) -> Option<T> {
        let backoff = Backoff::new();
        let guard = epoch::pin();

        loop {
            let head = self.head.load(Ordering::Acquire, &guard);
            // SAFETY: we are pinned, so a node reachable from head cannot be
            // freed before `guard` is dropped.
            let node = unsafe { head.as_ref() }?;
            let next = node.next.load(Ordering::Relaxed, &guard);

            if self
                .head
                .compare_exchange(head, next, Ordering::AcqRel, Ordering::Acquire, &guard)
                .is_ok()
            {
                // SAFETY: the successful CAS made this thread the node's sole
                // owner; the value is read out exactly once and the node is
                // retired without dropping it again (ManuallyDrop).
                unsafe {
                    let value = ptr::read(&*node.value);
                    guard.defer_destroy(head);
                    return Some(value);
                }
            }
            backoff.spin();
        }
    }

    /// Pop, failing with `SyncError::Empty` on an empty stack
    pub fn pop(&self) -> Result<T> {
        self.try_pop().ok_or(SyncError::Empty)
    }

    /// Snapshot of emptiness
    pub fn is_empty(&self) -> bool {
        let guard = epoch::pin();
        self.head.load(Ordering::Acquire, &guard).is_null()
    }
}

impl<T> Default for LockFreeStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for LockFreeStack<T> {
    fn drop(&mut self) {
        // SAFETY: `&mut self` means no other thread can reach these nodes.
        unsafe {
            let guard = epoch::unprotected();
            let mut current = self.head.load(Ordering::Relaxed, guard);
            while !current.is_null() {
                let mut node = current.into_owned();
                current = node.next.load(Ordering::Relaxed, guard);
                ManuallyDrop::drop(&mut node.value);
            }
        }
    }
}

// SAFETY: values move between threads through the stack; nodes are shared
// only through the atomic head.
unsafe impl<T: Send> Send for LockFreeStack<T> {}
unsafe impl<T: Send> Sync for LockFreeStack<T> {}
