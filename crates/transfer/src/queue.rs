//! Bounded priority queue with FIFO ordering among equal priorities.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Priority reported by items that carry none; capped to the queue's
/// `max_priority`, so they are served last.
pub const LOWEST_PRIORITY: i64 = i64::MAX;

/// Capability of work items that can be scheduled by priority.
///
/// Lower values are served first.
pub trait HasPriority {
    fn priority(&self) -> i64;
}

impl<T: HasPriority + ?Sized> HasPriority for Box<T> {
    fn priority(&self) -> i64 {
        (**self).priority()
    }
}

impl<T: HasPriority + ?Sized> HasPriority for Arc<T> {
    fn priority(&self) -> i64 {
        (**self).priority()
    }
}

/// Adapter for items without a priority of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unprioritized<T>(pub T);

impl<T> HasPriority for Unprioritized<T> {
    fn priority(&self) -> i64 {
        LOWEST_PRIORITY
    }
}

/// How `put`/`get` behave when the queue is full/empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blocking {
    /// Wait as long as it takes.
    Wait,
    /// Wait at most this long.
    Timeout(Duration),
    /// Fail immediately.
    NoWait,
}

/// Returned by [`StablePriorityQueue::put_with`] when the item could not be
/// queued; hands the item back.
pub struct QueueFull<T>(pub T);

impl<T> fmt::Debug for QueueFull<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueFull").finish_non_exhaustive()
    }
}

impl<T> fmt::Display for QueueFull<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("queue is full")
    }
}

impl<T> std::error::Error for QueueFull<T> {}

struct Entry<T> {
    priority: i64,
    sequence: u64,
    item: T,
}

impl<T> Entry<T> {
    fn key(&self) -> (i64, u64) {
        (self.priority, self.sequence)
    }
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed: `BinaryHeap` is a max-heap and the smallest key must pop first.
impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

struct QueueInner<T> {
    heap: BinaryHeap<Entry<T>>,
    next_sequence: u64,
}

/// Thread-safe bounded queue ordered by `(priority, insertion order)`.
///
/// Priorities are clamped to `[0, max_priority]`. Ordering holds globally
/// across all producers. A `maxsize` of 0 means unbounded.
pub struct StablePriorityQueue<T> {
    inner: Mutex<QueueInner<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    maxsize: usize,
    max_priority: i64,
}

impl<T: HasPriority> StablePriorityQueue<T> {
    /// Creates a queue holding at most `maxsize` items (0 = unbounded).
    pub fn new(maxsize: usize, max_priority: i64) -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                heap: BinaryHeap::new(),
                next_sequence: 0,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            maxsize,
            max_priority: max_priority.max(0),
        }
    }

    /// Queues `item`, waiting for room if the queue is full.
    pub fn put(&self, item: T) {
        let priority = self.effective_priority(&item);
        let mut inner = self.inner.lock().unwrap();
        while self.is_full(&inner) {
            inner = self.not_full.wait(inner).unwrap();
        }
        self.push_locked(&mut inner, priority, item);
    }

    /// Queues `item` under the given blocking policy.
    pub fn put_with(&self, item: T, blocking: Blocking) -> Result<(), QueueFull<T>> {
        let priority = self.effective_priority(&item);
        let mut inner = self.inner.lock().unwrap();
        match blocking {
            Blocking::Wait => {
                while self.is_full(&inner) {
                    inner = self.not_full.wait(inner).unwrap();
                }
            }
            Blocking::Timeout(timeout) => {
                inner = self
                    .not_full
                    .wait_timeout_while(inner, timeout, |i| self.is_full(i))
                    .unwrap()
                    .0;
            }
            Blocking::NoWait => {}
        }
        if self.is_full(&inner) {
            return Err(QueueFull(item));
        }
        self.push_locked(&mut inner, priority, item);
        Ok(())
    }

    /// Removes the next item, waiting until one is available.
    pub fn get(&self) -> T {
        let mut inner = self.inner.lock().unwrap();
        loop {
            if let Some(entry) = inner.heap.pop() {
                drop(inner);
                self.not_full.notify_one();
                return entry.item;
            }
            inner = self.not_empty.wait(inner).unwrap();
        }
    }

    /// Removes the next item under the given blocking policy.
    ///
    /// Returns `None` if nothing became available in time.
    pub fn get_with(&self, blocking: Blocking) -> Option<T> {
        let mut inner = self.inner.lock().unwrap();
        match blocking {
            Blocking::Wait => {
                while inner.heap.is_empty() {
                    inner = self.not_empty.wait(inner).unwrap();
                }
            }
            Blocking::Timeout(timeout) => {
                inner = self
                    .not_empty
                    .wait_timeout_while(inner, timeout, |i| i.heap.is_empty())
                    .unwrap()
                    .0;
            }
            Blocking::NoWait => {}
        }
        let entry = inner.heap.pop()?;
        drop(inner);
        self.not_full.notify_one();
        Some(entry.item)
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().heap.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().heap.is_empty()
    }

    /// Capacity (0 = unbounded).
    pub fn maxsize(&self) -> usize {
        self.maxsize
    }

    /// Largest priority value; anything above is capped to it.
    pub fn max_priority(&self) -> i64 {
        self.max_priority
    }

    fn effective_priority(&self, item: &T) -> i64 {
        item.priority().clamp(0, self.max_priority)
    }

    fn is_full(&self, inner: &QueueInner<T>) -> bool {
        self.maxsize > 0 && inner.heap.len() >= self.maxsize
    }

    fn push_locked(&self, inner: &mut QueueInner<T>, priority: i64, item: T) {
        let sequence = inner.next_sequence;
        inner.next_sequence += 1;
        inner.heap.push(Entry {
            priority,
            sequence,
            item,
        });
        self.not_empty.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[derive(Debug, PartialEq, Eq)]
    struct Job {
        name: &'static str,
        priority: i64,
    }

    impl HasPriority for Job {
        fn priority(&self) -> i64 {
            self.priority
        }
    }

    fn job(name: &'static str, priority: i64) -> Job {
        Job { name, priority }
    }

    #[test]
    fn fifo_order_of_same_priorities() {
        let q = StablePriorityQueue::new(10, 20);
        q.put(job("a", 5));
        q.put(job("b", 5));
        q.put(job("c", 1));

        assert_eq!(q.get().name, "c");
        assert_eq!(q.get().name, "a");
        assert_eq!(q.get().name, "b");
    }

    #[test]
    fn queue_length() {
        let q = StablePriorityQueue::new(10, 20);
        assert_eq!(q.len(), 0);
        assert!(q.is_empty());

        q.put(job("a", 5));
        assert_eq!(q.len(), 1);

        q.get();
        assert_eq!(q.len(), 0);
    }

    #[test]
    fn priority_above_max_is_capped() {
        let q = StablePriorityQueue::new(10, 20);
        q.put(job("huge", 100));
        q.put(job("at-max", 20));
        q.put(job("low", 19));

        assert_eq!(q.get().name, "low");
        // Capped to 20, so it keeps its place ahead of the later max-priority item.
        assert_eq!(q.get().name, "huge");
        assert_eq!(q.get().name, "at-max");
    }

    #[test]
    fn negative_priority_is_clamped_to_zero() {
        let q = StablePriorityQueue::new(10, 20);
        q.put(job("zero", 0));
        q.put(job("negative", -5));

        assert_eq!(q.get().name, "zero");
        assert_eq!(q.get().name, "negative");
    }

    #[test]
    fn missing_priority_is_served_last() {
        let q: StablePriorityQueue<Box<dyn HasPriority + Send>> = StablePriorityQueue::new(10, 20);
        q.put(Box::new(Unprioritized("plain")));
        q.put(Box::new(job("prioritized", 5)));

        assert_eq!(q.get().priority(), 5);
        assert_eq!(q.get().priority(), LOWEST_PRIORITY);
    }

    #[test]
    fn unprioritized_items_keep_insertion_order() {
        let q = StablePriorityQueue::new(10, 20);
        q.put(Unprioritized(1));
        q.put(Unprioritized(2));
        q.put(Unprioritized(3));

        assert_eq!(q.get().0, 1);
        assert_eq!(q.get().0, 2);
        assert_eq!(q.get().0, 3);
    }

    #[test]
    fn put_no_wait_on_full_queue_returns_item() {
        let q = StablePriorityQueue::new(1, 20);
        q.put(job("first", 1));

        let err = q.put_with(job("second", 1), Blocking::NoWait).unwrap_err();
        assert_eq!(err.0.name, "second");
        assert_eq!(err.to_string(), "queue is full");
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn put_timeout_on_full_queue() {
        let q = StablePriorityQueue::new(1, 20);
        q.put(job("first", 1));

        let result = q.put_with(job("second", 1), Blocking::Timeout(Duration::from_millis(20)));
        assert!(result.is_err());
    }

    #[test]
    fn unbounded_queue_never_fills() {
        let q = StablePriorityQueue::new(0, 20);
        for i in 0..100 {
            q.put_with(Unprioritized(i), Blocking::NoWait).unwrap();
        }
        assert_eq!(q.len(), 100);
    }

    #[test]
    fn get_no_wait_on_empty_queue() {
        let q: StablePriorityQueue<Unprioritized<u8>> = StablePriorityQueue::new(10, 20);
        assert!(q.get_with(Blocking::NoWait).is_none());
        assert!(q.get_with(Blocking::Timeout(Duration::from_millis(10))).is_none());
    }

    #[test]
    fn blocked_put_resumes_after_get() {
        let q = Arc::new(StablePriorityQueue::new(1, 20));
        q.put(job("first", 1));

        let producer = {
            let q = Arc::clone(&q);
            thread::spawn(move || q.put(job("second", 1)))
        };

        assert_eq!(q.get().name, "first");
        producer.join().unwrap();
        assert_eq!(q.get().name, "second");
    }

    #[test]
    fn blocked_get_resumes_after_put() {
        let q: Arc<StablePriorityQueue<Job>> = Arc::new(StablePriorityQueue::new(10, 20));

        let consumer = {
            let q = Arc::clone(&q);
            thread::spawn(move || q.get())
        };

        thread::sleep(Duration::from_millis(20));
        q.put(job("late", 3));
        assert_eq!(consumer.join().unwrap().name, "late");
    }

    #[test]
    fn concurrent_producers_keep_global_order() {
        #[derive(Debug)]
        struct Tagged {
            priority: i64,
            producer: usize,
            index: usize,
        }
        impl HasPriority for Tagged {
            fn priority(&self) -> i64 {
                self.priority
            }
        }

        let q = Arc::new(StablePriorityQueue::new(0, 20));
        let mut handles = vec![];
        for producer in 0..8 {
            let q = Arc::clone(&q);
            handles.push(thread::spawn(move || {
                for index in 0..50 {
                    q.put(Tagged {
                        priority: (index % 3) as i64,
                        producer,
                        index,
                    });
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        let mut drained = Vec::new();
        while let Some(item) = q.get_with(Blocking::NoWait) {
            drained.push(item);
        }
        assert_eq!(drained.len(), 400);

        // Priorities never decrease.
        assert!(drained.windows(2).all(|w| w[0].priority <= w[1].priority));

        // Within a priority, each producer's items stay in insertion order.
        for producer in 0..8 {
            for priority in 0..3 {
                let indices: Vec<usize> = drained
                    .iter()
                    .filter(|t| t.producer == producer && t.priority == priority)
                    .map(|t| t.index)
                    .collect();
                assert!(indices.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }

    #[test]
    fn concurrent_consumers_drain_everything() {
        let q = Arc::new(StablePriorityQueue::new(4, 20));
        let consumers: Vec<_> = (0..4)
            .map(|_| {
                let q = Arc::clone(&q);
                thread::spawn(move || {
                    let mut seen = 0;
                    while let Some(Unprioritized(n)) = q.get_with(Blocking::Timeout(Duration::from_millis(200))) {
                        if n < 0 {
                            break;
                        }
                        seen += 1;
                    }
                    seen
                })
            })
            .collect();

        for i in 0..200 {
            q.put(Unprioritized(i));
        }
        for _ in 0..4 {
            q.put(Unprioritized(-1));
        }

        let total: i32 = consumers.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 200);
    }
}
