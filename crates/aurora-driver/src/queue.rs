//! Bounded event queue
//!
//! Producer side never blocks: a push into a full queue evicts the oldest
//! record. Consumer side blocks for at most the requested timeout.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug)]
struct Inner<T> {
    items: VecDeque<T>,
    dropped: u64,
}

/// Fixed-capacity FIFO with overwrite-oldest semantics
#[derive(Debug)]
pub struct BoundedQueue<T> {
    inner: Mutex<Inner<T>>,
    available: Condvar,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Queue holding at most `capacity` records (at least 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::with_capacity(capacity),
                dropped: 0,
            }),
            available: Condvar::new(),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `item`, evicting the oldest record if the queue is full
    ///
    /// Returns `true` if a record was evicted.
    pub fn push(&self, item: T) -> bool {
        let evicted = {
            let mut inner = self.lock();
            let evicted = if inner.items.len() >= self.capacity {
                inner.items.pop_front();
                inner.dropped += 1;
                true
            } else {
                false
            };
            inner.items.push_back(item);
            evicted
        };
        self.available.notify_one();
        evicted
    }

    /// Remove the oldest record, waiting up to `timeout` for one to arrive
    pub fn pop(&self, timeout: Duration) -> Option<T> {
        let guard = self.lock();
        let (mut inner, _) = self
            .available
            .wait_timeout_while(guard, timeout, |inner| inner.items.is_empty())
            .unwrap_or_else(PoisonError::into_inner);
        inner.items.pop_front()
    }

    /// Remove the oldest record without waiting
    pub fn try_pop(&self) -> Option<T> {
        self.lock().items.pop_front()
    }

    /// Records currently queued
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    /// True if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    /// Maximum number of records held
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records evicted by overflow since construction
    pub fn dropped(&self) -> u64 {
        self.lock().dropped
    }
}
