/*!
 * Two-Lock Queue
 *
 * FIFO queue with separate head and tail locks so producers and consumers
 * do not contend with each other
 */

use parking_lot::{Condvar, Mutex};
use std::ptr;

struct Node<T> {
    value: Option<T>,
    next: *mut Node<T>,
}

impl<T> Node<T> {
    fn dummy() -> *mut Node<T> {
        Box::into_raw(Box::new(Node {
            value: None,
            next: ptr::null_mut(),
        }))
    }
}

/// Fine-grained FIFO queue
///
/// The queue always holds one empty dummy node at the tail. A push fills the
/// current dummy and appends a fresh one, touching only the tail lock. A pop
/// detaches the head node, touching only the head lock plus a brief read of
/// the tail pointer to detect emptiness.
///
/// # Lock Order
///
/// Consumers take head, then tail (briefly). Producers release tail before
/// touching head. No thread ever waits for head while holding tail.
pub struct TwoLockQueue<T> {
    head: Mutex<*mut Node<T>>,
    tail: Mutex<*mut Node<T>>,
    available: Condvar,
}

// SAFETY: nodes are owned by the queue and only reached through the two
// mutexes; values cross threads, so T must be Send.
unsafe impl<T: Send> Send for TwoLockQueue<T> {}
unsafe impl<T: Send> Sync for TwoLockQueue<T> {}

impl<T> TwoLockQueue<T> {
    /// Create an empty queue
    pub fn new() -> Self {
        let dummy = Node::dummy();
        Self {
            head: Mutex::new(dummy),
            tail: Mutex::new(dummy),
            available: Condvar::new(),
        }
    }

    #[inline]
    fn tail_ptr(&self) -> *mut Node<T> {
        *self.tail.lock()
    }

    /// Detach the head node if it is not the dummy tail
    ///
    /// Must be called with the head lock held.
    fn pop_head(&self, head: &mut *mut Node<T>) -> Option<T> {
        if *head == self.tail_ptr() {
            return None;
        }
        // SAFETY: the head differs from the tail, so its value and next link
        // were written under the tail lock we just acquired, and no producer
        // will touch it again. The head lock gives us sole ownership.
        let node = unsafe { *Box::from_raw(*head) };
        *head = node.next;
        node.value
    }

    /// Append a value and wake one waiting consumer
    pub fn push(&self, value: T) {
        let dummy = Node::dummy();
        {
            let mut tail = self.tail.lock();
            // SAFETY: the tail node is only written under the tail lock and
            // consumers never detach the tail.
            unsafe {
                (**tail).value = Some(value);
                (**tail).next = dummy;
            }
            *tail = dummy;
        }
        // A consumer between its emptiness check and its wait holds the head
        // lock; taking it here orders the notify after that wait begins.
        drop(self.head.lock());
        self.available.notify_one();
    }

    /// Take the oldest value without blocking
    pub fn try_pop(&self) -> Option<T> {
        let mut head = self.head.lock();
        self.pop_head(&mut head)
    }

    /// Block until a value is available, then take it
    pub fn wait_and_pop(&self) -> T {
        let mut head = self.head.lock();
        loop {
            if let Some(value) = self.pop_head(&mut head) {
                return value;
            }
            self.available.wait(&mut head);
        }
    }

    /// Snapshot of emptiness
    pub fn is_empty(&self) -> bool {
        let head = self.head.lock();
        *head == self.tail_ptr()
    }
}

impl<T> Default for TwoLockQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for TwoLockQueue<T> {
    fn drop(&mut self) {
        let mut current = *self.head.get_mut();
        while !current.is_null() {
            // SAFETY: exclusive access; every node from head to the dummy
            // tail is owned by the queue.
            let node = unsafe { Box::from_raw(current) };
            current = node.next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let queue = TwoLockQueue::new();
        assert!(queue.is_empty());

        queue.push(1);
        queue.push(2);
        queue.push(3);
        assert!(!queue.is_empty());

        assert_eq!(queue.try_pop(), Some(1));
        assert_eq!(queue.try_pop(), Some(2));
        assert_eq!(queue.try_pop(), Some(3));
        assert_eq!(queue.try_pop(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_drop_releases_pending_values() {
        let marker = Arc::new(());
        let queue = TwoLockQueue::new();
        for _ in 0..10 {
            queue.push(marker.clone());
        }
        drop(queue);
        assert_eq!(Arc::strong_count(&marker), 1);
    }

    #[test]
    fn test_wait_and_pop_wakes_on_push() {
        let queue = Arc::new(TwoLockQueue::new());
        let consumer = {
            let queue = queue.clone();
            thread::spawn(move || queue.wait_and_pop())
        };

        thread::sleep(Duration::from_millis(50));
        queue.push("ready");
        assert_eq!(consumer.join().unwrap(), "ready");
    }

    #[test]
    fn test_concurrent_producers_and_consumers() {
        const PER_PRODUCER: usize = 2_000;
        let queue = Arc::new(TwoLockQueue::new());

        let producers: Vec<_> = (0..4)
            .map(|p| {
                let queue = queue.clone();
                thread::spawn(move || {
                    for i in 0..PER_PRODUCER {
                        queue.push(p * PER_PRODUCER + i);
                    }
                })
            })
            .collect();

        let consumers: Vec<_> = (0..4)
            .map(|_| {
                let queue = queue.clone();
                thread::spawn(move || {
                    (0..PER_PRODUCER)
                        .map(|_| queue.wait_and_pop())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for handle in producers {
            handle.join().unwrap();
        }
        let mut seen: Vec<usize> = consumers
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        seen.sort_unstable();

        assert_eq!(seen, (0..4 * PER_PRODUCER).collect::<Vec<_>>());
        assert!(queue.is_empty());
    }
}
