/*!
 * Lock Hierarchy
 *
 * Rank-ordered mutexes that turn potential deadlocks into reported errors.
 *
 * Each `HierarchicalMutex` carries a fixed rank. A thread holding a mutex of
 * rank R may only acquire mutexes ranked strictly below R. The per-thread
 * state lives in an explicit `LockContext` rather than ambient globals.
 */

mod context;
mod mutex;

pub use context::{LockContext, NO_RANK_HELD};
pub use mutex::{HierarchicalMutex, HierarchyGuard};
