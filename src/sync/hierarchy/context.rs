/*!
 * Per-Thread Lock Context
 *
 * Tracks the rank of the innermost hierarchical mutex held by one thread
 */

use crate::core::errors::{Result, SyncError};
use std::cell::Cell;
use std::marker::PhantomData;
use tracing::warn;

/// Rank recorded while no hierarchical mutex is held
pub const NO_RANK_HELD: u64 = u64::MAX;

/// Lock-ordering state for a single thread
///
/// A context is `!Send` and `!Sync`: it belongs to the thread that created it
/// and every guard acquired through it borrows it, so a guard can never be
/// released on another thread.
///
/// # Example
///
/// ```ignore
/// let ctx = LockContext::new();
/// let outer = high.lock(&ctx)?; // rank 10_000
/// let inner = low.lock(&ctx)?;  // rank 5_000, allowed
/// ```
pub struct LockContext {
    current: Cell<u64>,
    _not_send: PhantomData<*const ()>,
}

impl LockContext {
    /// Create a context with nothing held
    pub const fn new() -> Self {
        Self {
            current: Cell::new(NO_RANK_HELD),
            _not_send: PhantomData,
        }
    }

    /// Run `f` with the context attached to the calling thread
    ///
    /// Each OS thread gets its own lazily created context. Use this when the
    /// context cannot be threaded through the call graph explicitly.
    pub fn with_current<R>(f: impl FnOnce(&LockContext) -> R) -> R {
        thread_local! {
            static CURRENT: LockContext = const { LockContext::new() };
        }
        CURRENT.with(f)
    }

    /// Rank of the innermost held mutex, `None` when nothing is held
    #[inline]
    pub fn current_rank(&self) -> Option<u64> {
        match self.current.get() {
            NO_RANK_HELD => None,
            rank => Some(rank),
        }
    }

    /// Check whether `rank` may be acquired next
    pub(crate) fn check(&self, rank: u64) -> Result<()> {
        let held = self.current.get();
        if held <= rank {
            warn!(requested = rank, held, "hierarchical lock order violated");
            return Err(SyncError::OrderViolation {
                requested: rank,
                held,
            });
        }
        Ok(())
    }

    /// Record `rank` as held, returning the rank it replaces
    #[inline]
    pub(crate) fn enter(&self, rank: u64) -> u64 {
        self.current.replace(rank)
    }

    /// Restore the rank that was current before `rank` was acquired
    pub(crate) fn restore(&self, rank: u64, previous: u64) {
        let current = self.current.get();
        if current != rank {
            warn!(
                released = rank,
                current, "hierarchical mutex released out of acquisition order"
            );
        }
        self.current.set(previous);
    }
}

impl Default for LockContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LockContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockContext")
            .field("current_rank", &self.current_rank())
            .finish()
    }
}
