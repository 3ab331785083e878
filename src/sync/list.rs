/*!
 * Fine-Grained Concurrent List
 *
 * Singly linked list with one lock per node, traversed hand-over-hand
 */

use parking_lot::{ArcMutexGuard, Mutex, RawMutex};
use std::sync::Arc;

type Link<T> = Option<Arc<Mutex<Node<T>>>>;
type NodeGuard<T> = ArcMutexGuard<RawMutex, Node<T>>;

struct Node<T> {
    /// `None` only for the head sentinel
    value: Option<T>,
    next: Link<T>,
}

/// Linked list allowing concurrent insertion, traversal, and removal
///
/// Each node's lock guards its value and its `next` link. Traversals lock
/// the next node before releasing the current one, so a thread holds at most
/// two adjacent node locks and never reads a node mid-unlink.
///
/// # Ownership
///
/// The predecessor's `next` link is the only long-lived owner of a node.
/// Traversals hold short-lived handles while a node is locked; an unlinked
/// node is freed when the last such handle is released.
///
/// # Example
///
/// ```ignore
/// let list = ConcurrentList::new();
/// list.push_front(Connection::new(7));
///
/// list.remove_if(|conn| conn.is_closed());
/// let idle = list.find_first_if(|conn| conn.is_idle());
/// ```
pub struct ConcurrentList<T> {
    head: Arc<Mutex<Node<T>>>,
}

impl<T> ConcurrentList<T> {
    /// Create an empty list
    pub fn new() -> Self {
        Self {
            head: Arc::new(Mutex::new(Node {
                value: None,
                next: None,
            })),
        }
    }

    /// Insert a value at the front; only contends on the head lock
    pub fn push_front(&self, value: T) {
        let node = Arc::new(Mutex::new(Node {
            value: Some(value),
            next: None,
        }));
        let mut head = self.head.lock();
        node.lock().next = head.next.take();
        head.next = Some(node);
    }

    /// Step from `current` to its successor, locking the successor first
    ///
    /// Returns `false` at the end of the list.
    #[inline]
    fn advance(current: &mut NodeGuard<T>) -> bool {
        let Some(next) = current.next.clone() else {
            return false;
        };
        // The new guard is acquired before the old one is dropped
        *current = next.lock_arc();
        true
    }

    /// Visit every value from front to back
    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(&T),
    {
        let mut current = self.head.lock_arc();
        while Self::advance(&mut current) {
            if let Some(value) = current.value.as_ref() {
                visitor(value);
            }
        }
    }

    /// Return a copy of the first value matching `predicate`
    pub fn find_first_if<P>(&self, mut predicate: P) -> Option<T>
    where
        P: FnMut(&T) -> bool,
        T: Clone,
    {
        let mut current = self.head.lock_arc();
        while Self::advance(&mut current) {
            if let Some(value) = current.value.as_ref() {
                if predicate(value) {
                    return Some(value.clone());
                }
            }
        }
        None
    }

    /// Unlink and drop every value matching `predicate`
    ///
    /// Returns the number of values removed.
    pub fn remove_if<P>(&self, mut predicate: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        let mut removed = 0;
        let mut current = self.head.lock_arc();
        loop {
            let Some(next) = current.next.clone() else {
                break;
            };
            let mut next_guard = next.lock_arc();
            let matched = next_guard.value.as_ref().is_some_and(&mut predicate);

            if matched {
                // Both locks held: predecessor skips over the matched node
                current.next = next_guard.next.take();
                removed += 1;
            } else {
                current = next_guard;
            }
        }
        removed
    }

    /// Count values by walking the list; stale under concurrent mutation
    pub fn len(&self) -> usize {
        let mut count = 0;
        self.for_each(|_| count += 1);
        count
    }

    /// Whether the list has no values right now
    pub fn is_empty(&self) -> bool {
        self.head.lock().next.is_none()
    }
}

impl<T> Default for ConcurrentList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for ConcurrentList<T> {
    fn drop(&mut self) {
        // Unlink iteratively so long chains do not recurse in Drop
        let mut link = self.head.lock().next.take();
        while let Some(node) = link {
            link = node.lock().next.take();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_push_front_order() {
        let list = ConcurrentList::new();
        list.push_front(1);
        list.push_front(2);
        list.push_front(3);

        let mut seen = Vec::new();
        list.for_each(|v| seen.push(*v));
        assert_eq!(seen, vec![3, 2, 1]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_find_first_if() {
        let list = ConcurrentList::new();
        for i in 0..10 {
            list.push_front(i);
        }

        assert_eq!(list.find_first_if(|v| v % 4 == 0), Some(8));
        assert_eq!(list.find_first_if(|v| *v > 100), None);
    }

    #[test]
    fn test_remove_if() {
        let list = ConcurrentList::new();
        for i in 0..10 {
            list.push_front(i);
        }

        assert_eq!(list.remove_if(|v| v % 2 == 0), 5);

        let mut seen = Vec::new();
        list.for_each(|v| seen.push(*v));
        assert_eq!(seen, vec![9, 7, 5, 3, 1]);

        assert_eq!(list.remove_if(|_| true), 5);
        assert!(list.is_empty());
        assert_eq!(list.remove_if(|_| true), 0);
    }

    #[test]
    fn test_remove_adjacent_matches() {
        let list = ConcurrentList::new();
        for v in [1, 2, 2, 2, 3] {
            list.push_front(v);
        }
        assert_eq!(list.remove_if(|v| *v == 2), 3);
        let mut seen = Vec::new();
        list.for_each(|v| seen.push(*v));
        assert_eq!(seen, vec![3, 1]);
    }

    #[test]
    fn test_removed_values_are_dropped() {
        let marker = Arc::new(());
        let list = ConcurrentList::new();
        for _ in 0..5 {
            list.push_front(marker.clone());
        }
        list.remove_if(|_| true);
        assert_eq!(Arc::strong_count(&marker), 1);
    }

    #[test]
    fn test_long_list_drop_does_not_overflow() {
        let list = ConcurrentList::new();
        for i in 0..200_000u32 {
            list.push_front(i);
        }
        drop(list);
    }

    #[test]
    fn test_concurrent_push_and_traverse() {
        let list = Arc::new(ConcurrentList::new());
        let writers: Vec<_> = (0..4)
            .map(|t| {
                let list = list.clone();
                thread::spawn(move || {
                    for i in 0..1_000 {
                        list.push_front(t * 1_000 + i);
                    }
                })
            })
            .collect();

        let reader = {
            let list = list.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    let mut count = 0;
                    list.for_each(|_| count += 1);
                    assert!(count <= 4_000);
                }
            })
        };

        for handle in writers {
            handle.join().unwrap();
        }
        reader.join().unwrap();
        assert_eq!(list.len(), 4_000);
    }
}
