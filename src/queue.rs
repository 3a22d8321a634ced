//! Bounded FIFO queue with async blocking `put` / `get`.
//!
//! The buffer lives behind a short-lived mutex; capacity and availability are
//! tracked by two semaphores. `slots` holds one permit per free position and
//! `filled` one permit per stored item. Tokio semaphores hand permits out in
//! request order, so blocked callers are released first-come first-served.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Semaphore;

use crate::error::QueueError;

pub const DEFAULT_CAPACITY: usize = 50;

pub struct BoundedQueue<T> {
    items: Mutex<VecDeque<T>>,
    slots: Semaphore,
    filled: Semaphore,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        if capacity == 0 {
            return Err(QueueError::ZeroCapacity);
        }

        Ok(Self {
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            slots: Semaphore::new(capacity),
            filled: Semaphore::new(0),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.len() == self.capacity
    }

    /// Appends `value` at the tail, waiting while the queue is full.
    ///
    /// Cancel safe: if the future is dropped before it completes the value is
    /// not inserted.
    pub async fn put(&self, value: T) {
        acquire(&self.slots).await;
        self.push(value);
    }

    /// Removes the head item, waiting while the queue is empty.
    ///
    /// Cancel safe: if the future is dropped before it completes no item is
    /// removed.
    pub async fn get(&self) -> T {
        acquire(&self.filled).await;
        self.pop()
    }

    pub fn try_put(&self, value: T) -> Result<(), QueueError<T>> {
        match self.slots.try_acquire() {
            Ok(permit) => {
                permit.forget();
                self.push(value);
                Ok(())
            }
            Err(_) => Err(QueueError::Full(value)),
        }
    }

    pub fn try_get(&self) -> Result<T, QueueError> {
        match self.filled.try_acquire() {
            Ok(permit) => {
                permit.forget();
                Ok(self.pop())
            }
            Err(_) => Err(QueueError::Empty),
        }
    }

    // A slot permit is held by the caller, so there is room for one more item.
    fn push(&self, value: T) {
        self.lock().push_back(value);
        self.filled.add_permits(1);
    }

    // A filled permit is held by the caller, so at least one item is present.
    fn pop(&self) -> T {
        let value = match self.lock().pop_front() {
            Some(value) => value,
            None => unreachable!("filled permit acquired on an empty queue"),
        };
        self.slots.add_permits(1);
        value
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        // The guarded section only pushes or pops, so a poisoned buffer is still consistent.
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> std::fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

async fn acquire(semaphore: &Semaphore) {
    match semaphore.acquire().await {
        Ok(permit) => permit.forget(),
        Err(_) => unreachable!("queue semaphores are never closed"),
    }
}
