/*!
 * Concurrent List Tests
 * Hand-over-hand traversal racing insertion and removal
 */

use concurrent_toolkit::sync::ConcurrentList;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Record whose fields must always agree; a torn read would break that
#[derive(Debug, Clone, PartialEq)]
struct Record {
    id: u64,
    doubled: u64,
    label: String,
}

impl Record {
    fn new(id: u64) -> Self {
        Self {
            id,
            doubled: id * 2,
            label: format!("record-{}", id),
        }
    }

    fn is_consistent(&self) -> bool {
        self.doubled == self.id * 2 && self.label == format!("record-{}", self.id)
    }
}

#[test]
fn test_traversal_never_sees_torn_records() {
    let list = Arc::new(ConcurrentList::new());
    for id in 0..2_000 {
        list.push_front(Record::new(id));
    }

    let stop = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let list = list.clone();
            let stop = stop.clone();
            thread::spawn(move || {
                while !stop.load(Ordering::Acquire) {
                    list.for_each(|r| assert!(r.is_consistent(), "torn read: {:?}", r));
                    if let Some(r) = list.find_first_if(|r| r.id % 7 == 3) {
                        assert!(r.is_consistent());
                    }
                }
            })
        })
        .collect();

    let writer = {
        let list = list.clone();
        thread::spawn(move || {
            for id in 2_000..3_000 {
                list.push_front(Record::new(id));
            }
        })
    };

    let remover = {
        let list = list.clone();
        thread::spawn(move || {
            let mut removed = 0;
            for modulus in [2u64, 3, 5] {
                removed += list.remove_if(|r| r.id % modulus == 0);
            }
            removed
        })
    };

    writer.join().unwrap();
    let removed = remover.join().unwrap();
    stop.store(true, Ordering::Release);
    for handle in readers {
        handle.join().unwrap();
    }

    assert!(removed > 0);
    let mut remaining = 0;
    list.for_each(|r| {
        assert!(r.is_consistent());
        remaining += 1;
    });
    assert_eq!(remaining + removed, 3_000);
}

#[test]
fn test_removed_values_never_reappear() {
    let list = Arc::new(ConcurrentList::new());
    for id in 0..1_000 {
        list.push_front(Record::new(id));
    }

    let removers: Vec<_> = (0..2)
        .map(|_| {
            let list = list.clone();
            thread::spawn(move || list.remove_if(|r| r.id % 2 == 0))
        })
        .collect();

    let finder = {
        let list = list.clone();
        thread::spawn(move || {
            for _ in 0..100 {
                let _ = list.find_first_if(|r| r.id == 999);
            }
        })
    };

    let total_removed: usize = removers.into_iter().map(|h| h.join().unwrap()).sum();
    finder.join().unwrap();

    // Each even record is unlinked by exactly one remover
    assert_eq!(total_removed, 500);
    assert_eq!(list.find_first_if(|r| r.id % 2 == 0), None);
    assert_eq!(list.find_first_if(|r| r.id == 999), Some(Record::new(999)));
    assert_eq!(list.len(), 500);
}
