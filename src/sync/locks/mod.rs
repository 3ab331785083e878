/*!
 * Lock-Based Synchronization Primitives
 *
 * Lock-based primitives that bound contention and rule out lock-order
 * deadlocks:
 * - Sharded maps (independent per-bucket read/write locks)
 * - Guarded values (ordered pairwise locking for swap and compare)
 */

mod sharded;
mod swap;

// Re-export public API
pub use sharded::ShardedMap;
pub use swap::{swap, Guarded};
