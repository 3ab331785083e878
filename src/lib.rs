/*!
 * Concurrent Toolkit
 * Concurrency-safe containers and a lock-ordering mutex exposed as a library
 */

pub mod core;
pub mod sync;

// Re-exports
pub use crate::core::{Result, SyncConfig, SyncError, DEFAULT_BUCKET_COUNT};
pub use crate::sync::{
    BlockingQueue, BlockingStack, ConcurrentList, Guarded, HierarchicalMutex, HierarchyGuard,
    LockContext, LockFreeStack, ShardedMap, TwoLockQueue,
};
