/*!
 * Coarse-Grained Blocking Container
 *
 * One mutex guards the whole collection; one condition variable parks
 * consumers until a producer makes a value available
 */

use super::traits::{Discipline, Fifo, Lifo};
use crate::core::config::SyncConfig;
use crate::core::errors::{Result, SyncError};
use parking_lot::{Condvar, Mutex};
use std::marker::PhantomData;
use std::time::{Duration, Instant};
use tracing::trace;

/// Thread-safe container with blocking and non-blocking pops
///
/// # Guarantees
///
/// - A `push` that completes before a consumer wakes is visible to it
/// - Every wake re-checks emptiness, so spurious wakeups are harmless
/// - The condition variable is only signaled after a value was stored
///
/// # Example
///
/// ```ignore
/// let queue = Arc::new(BlockingQueue::new());
///
/// // Producer
/// queue.push(job);
///
/// // Consumer
/// while !shutdown.load(Ordering::Acquire) {
///     if let Ok(job) = queue.wait_and_pop_timeout(Duration::from_millis(100)) {
///         job.run();
///     }
/// }
/// ```
pub struct BlockingContainer<T, D: Discipline<T>> {
    data: Mutex<D>,
    available: Condvar,
    _marker: PhantomData<fn() -> T>,
}

/// FIFO blocking queue
pub type BlockingQueue<T> = BlockingContainer<T, Fifo<T>>;

/// LIFO blocking stack
pub type BlockingStack<T> = BlockingContainer<T, Lifo<T>>;

impl<T, D: Discipline<T>> BlockingContainer<T, D> {
    /// Create an empty container
    pub fn new() -> Self {
        Self::from_storage(D::default())
    }

    /// Create an empty container with pre-allocated slots
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_storage(D::with_capacity(capacity))
    }

    /// Create an empty container sized from `config.queue_capacity`
    pub fn with_config(config: &SyncConfig) -> Self {
        Self::with_capacity(config.queue_capacity)
    }

    fn from_storage(storage: D) -> Self {
        Self {
            data: Mutex::new(storage),
            available: Condvar::new(),
            _marker: PhantomData,
        }
    }

    /// Store a value and wake one waiting consumer
    pub fn push(&self, value: T) {
        let mut data = self.data.lock();
        data.put(value);
        drop(data);
        self.available.notify_one();
    }

    /// Take a value if one is available, without blocking
    pub fn try_pop(&self) -> Option<T> {
        self.data.lock().take()
    }

    /// Take a value, failing with `SyncError::Empty` if there is none
    pub fn pop(&self) -> Result<T> {
        self.try_pop().ok_or(SyncError::Empty)
    }

    /// Block until a value is available, then take it
    pub fn wait_and_pop(&self) -> T {
        let mut data = self.data.lock();
        loop {
            if let Some(value) = data.take() {
                return value;
            }
            trace!(discipline = D::NAME, "consumer parked on empty container");
            self.available.wait(&mut data);
        }
    }

    /// Block until a value is available or `timeout` elapses
    ///
    /// A timeout too large to express as a deadline (e.g. `Duration::MAX`)
    /// waits without limit.
    pub fn wait_and_pop_timeout(&self, timeout: Duration) -> Result<T> {
        let mut data = self.data.lock();
        if let Some(value) = data.take() {
            return Ok(value);
        }

        let Some(deadline) = Instant::now().checked_add(timeout) else {
            loop {
                self.available.wait(&mut data);
                if let Some(value) = data.take() {
                    return Ok(value);
                }
            }
        };

        loop {
            if self.available.wait_until(&mut data, deadline).timed_out() {
                // A push may have landed right at the deadline
                return data.take().ok_or(SyncError::Timeout {
                    millis: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                });
            }
            if let Some(value) = data.take() {
                return Ok(value);
            }
        }
    }

    /// Snapshot of emptiness; stale as soon as it returns
    pub fn is_empty(&self) -> bool {
        self.data.lock().is_empty()
    }

    /// Snapshot of the element count
    pub fn len(&self) -> usize {
        self.data.lock().len()
    }
}

impl<T, D: Discipline<T>> Default for BlockingContainer<T, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, D: Discipline<T> + Clone> Clone for BlockingContainer<T, D> {
    /// Copies the contents under the source's lock
    fn clone(&self) -> Self {
        let snapshot = self.data.lock().clone();
        Self::from_storage(snapshot)
    }
}

impl<T, D: Discipline<T>> std::fmt::Debug for BlockingContainer<T, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingContainer")
            .field("discipline", &D::NAME)
            .field("len", &self.data.try_lock().map(|data| data.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_queue_is_fifo() {
        let queue = BlockingQueue::new();
        queue.push(1);
        queue.push(2);
        queue.push(3);

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.try_pop(), Some(1));
        assert_eq!(queue.wait_and_pop(), 2);
        assert_eq!(queue.pop(), Ok(3));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_stack_is_lifo() {
        let stack = BlockingStack::with_capacity(4);
        stack.push("a");
        stack.push("b");

        assert_eq!(stack.try_pop(), Some("b"));
        assert_eq!(stack.try_pop(), Some("a"));
        assert_eq!(stack.try_pop(), None);
    }

    #[test]
    fn test_pop_on_empty_is_error() {
        let stack: BlockingStack<u8> = BlockingStack::new();
        assert_eq!(stack.pop(), Err(SyncError::Empty));
    }

    #[test]
    fn test_wait_and_pop_blocks_until_push() {
        let queue = Arc::new(BlockingQueue::new());
        let consumer = {
            let queue = queue.clone();
            thread::spawn(move || queue.wait_and_pop())
        };

        thread::sleep(Duration::from_millis(50));
        queue.push(42);

        assert_eq!(consumer.join().unwrap(), 42);
    }

    #[test]
    fn test_wait_timeout_expires() {
        let queue: BlockingQueue<u32> = BlockingQueue::new();
        let start = Instant::now();

        let result = queue.wait_and_pop_timeout(Duration::from_millis(50));

        assert_eq!(result, Err(SyncError::Timeout { millis: 50 }));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_unbounded_timeout_returns_queued_value() {
        let queue = BlockingQueue::new();
        queue.push(1u32);
        assert_eq!(queue.wait_and_pop_timeout(Duration::MAX), Ok(1));
    }

    #[test]
    fn test_unbounded_timeout_waits_for_push() {
        let queue = Arc::new(BlockingStack::new());
        let consumer = {
            let queue = queue.clone();
            thread::spawn(move || queue.wait_and_pop_timeout(Duration::MAX))
        };

        thread::sleep(Duration::from_millis(20));
        queue.push("late");

        assert_eq!(consumer.join().unwrap(), Ok("late"));
    }

    #[test]
    fn test_clone_copies_contents() {
        let queue = BlockingQueue::new();
        queue.push(1);
        queue.push(2);

        let copy = queue.clone();
        assert_eq!(copy.try_pop(), Some(1));
        assert_eq!(queue.len(), 2);
    }
}
