/*!
 * Ordering Disciplines
 *
 * Storage abstractions that decide which element a blocking container hands
 * out next. The synchronization shape is identical for every discipline.
 */

use std::collections::VecDeque;

/// Element ordering used by a `BlockingContainer`
///
/// Implementations are plain single-threaded collections; the container
/// supplies all locking.
pub trait Discipline<T>: Default {
    /// Short name for logs
    const NAME: &'static str;

    /// Create storage with room for `capacity` elements
    fn with_capacity(capacity: usize) -> Self;

    /// Store a value
    fn put(&mut self, value: T);

    /// Remove the next value according to the discipline
    fn take(&mut self) -> Option<T>;

    /// Number of stored values
    fn len(&self) -> usize;

    /// Whether no values are stored
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// First-in, first-out storage
#[derive(Debug, Clone)]
pub struct Fifo<T>(VecDeque<T>);

impl<T> Default for Fifo<T> {
    fn default() -> Self {
        Self(VecDeque::new())
    }
}

impl<T> Discipline<T> for Fifo<T> {
    const NAME: &'static str = "fifo";

    fn with_capacity(capacity: usize) -> Self {
        Self(VecDeque::with_capacity(capacity))
    }

    #[inline]
    fn put(&mut self, value: T) {
        self.0.push_back(value);
    }

    #[inline]
    fn take(&mut self) -> Option<T> {
        self.0.pop_front()
    }

    #[inline]
    fn len(&self) -> usize {
        self.0.len()
    }
}

/// Last-in, first-out storage
#[derive(Debug, Clone)]
pub struct Lifo<T>(Vec<T>);

impl<T> Default for Lifo<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> Discipline<T> for Lifo<T> {
    const NAME: &'static str = "lifo";

    fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    #[inline]
    fn put(&mut self, value: T) {
        self.0.push(value);
    }

    #[inline]
    fn take(&mut self) -> Option<T> {
        self.0.pop()
    }

    #[inline]
    fn len(&self) -> usize {
        self.0.len()
    }
}
