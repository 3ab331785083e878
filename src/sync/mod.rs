/*!
 * Synchronization Primitives
 *
 * Concurrency-safe building blocks for producer/consumer and
 * work-distribution systems:
 * - Hierarchical mutexes that reject lock-order violations
 * - Blocking queues and stacks for handoff between threads
 * - A fine-grained list with per-node locks
 * - A sharded map with per-bucket read/write locks
 * - A lock-free stack with epoch-based reclamation
 * - Ordered pairwise locking for swapping guarded values
 *
 * # Lock Discipline
 *
 * Every mutable piece of state is protected by exactly one lock or atomic.
 * No operation holds more than two locks at once, except `ShardedMap::snapshot`
 * which takes every bucket lock in ascending bucket order.
 */

pub mod blocking;
pub mod hierarchy;
pub mod list;
pub mod lockfree;
pub mod locks;

pub use blocking::{BlockingContainer, BlockingQueue, BlockingStack, Discipline, Fifo, Lifo, TwoLockQueue};
pub use hierarchy::{HierarchicalMutex, HierarchyGuard, LockContext, NO_RANK_HELD};
pub use list::ConcurrentList;
pub use lockfree::LockFreeStack;
pub use locks::{swap, Guarded, ShardedMap};
