/*!
 * Blocking Containers
 *
 * Producer/consumer handoff built on mutexes and condition variables:
 * - `BlockingQueue` / `BlockingStack`: one lock over the whole collection
 * - `TwoLockQueue`: separate head and tail locks for FIFO handoff
 *
 * Every blocking pop has a non-blocking `try_pop` counterpart.
 */

mod container;
mod traits;
mod two_lock;

pub use container::{BlockingContainer, BlockingQueue, BlockingStack};
pub use traits::{Discipline, Fifo, Lifo};
pub use two_lock::TwoLockQueue;
