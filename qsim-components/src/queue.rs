//! Wait queue of the server pool
//!
//! Entities that find every server busy are parked here until a release hands
//! them a server. Only the FIFO discipline is provided.

use crate::entity::EntityId;
use crate::error::QueueError;
use qsim_core::SimTime;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Item stored in a queue
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    /// The waiting entity
    pub entity: EntityId,
    /// Simulation time when the item was enqueued
    pub enqueued_at: SimTime,
}

impl QueueItem {
    pub fn new(entity: EntityId, enqueued_at: SimTime) -> Self {
        Self { entity, enqueued_at }
    }

    /// Calculate how long this item has been in the queue
    pub fn queue_time(&self, current_time: SimTime) -> SimTime {
        current_time.duration_since(self.enqueued_at)
    }
}

/// Core trait for queue implementations
pub trait Queue: Send {
    /// Add an item to the queue
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Full` if the queue is at capacity and cannot accept
    /// more items.
    fn enqueue(&mut self, item: QueueItem) -> Result<(), QueueError>;

    /// Remove and return the next item from the queue
    fn dequeue(&mut self) -> Option<QueueItem>;

    /// Get the current number of items in the queue
    fn len(&self) -> usize;

    /// Check if the queue is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the maximum capacity of the queue, `None` if unlimited
    fn capacity(&self) -> Option<usize>;

    /// Check if the queue is at capacity
    fn is_full(&self) -> bool {
        if let Some(cap) = self.capacity() {
            self.len() >= cap
        } else {
            false
        }
    }

    /// Peek at the next item without removing it
    fn peek(&self) -> Option<&QueueItem>;
}

/// First-In-First-Out (FIFO) queue implementation
///
/// # Examples
///
/// ```
/// use qsim_components::entity::EntityId;
/// use qsim_components::queue::{FifoQueue, Queue, QueueItem};
/// use qsim_core::SimTime;
///
/// let mut queue = FifoQueue::unbounded();
/// queue.enqueue(QueueItem::new(EntityId(1), SimTime::zero())).unwrap();
/// assert_eq!(queue.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FifoQueue {
    items: VecDeque<QueueItem>,
    capacity: Option<usize>,
    total_enqueued: u64,
    total_dequeued: u64,
}

impl FifoQueue {
    /// Create a new FIFO queue with optional capacity limit
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            items: VecDeque::new(),
            capacity,
            total_enqueued: 0,
            total_dequeued: 0,
        }
    }

    /// Create a new FIFO queue with unlimited capacity
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Create a new FIFO queue with specified capacity
    pub fn bounded(capacity: usize) -> Self {
        Self::new(Some(capacity))
    }

    /// Get the total number of items ever enqueued
    pub fn total_enqueued(&self) -> u64 {
        self.total_enqueued
    }

    /// Get the total number of items ever dequeued
    pub fn total_dequeued(&self) -> u64 {
        self.total_dequeued
    }

    /// Iterate over waiting items from head to tail
    pub fn iter(&self) -> impl Iterator<Item = &QueueItem> {
        self.items.iter()
    }
}

impl Queue for FifoQueue {
    fn enqueue(&mut self, item: QueueItem) -> Result<(), QueueError> {
        if let Some(capacity) = self.capacity {
            if self.items.len() >= capacity {
                return Err(QueueError::Full { capacity });
            }
        }

        self.items.push_back(item);
        self.total_enqueued += 1;
        Ok(())
    }

    fn dequeue(&mut self) -> Option<QueueItem> {
        let item = self.items.pop_front();
        if item.is_some() {
            self.total_dequeued += 1;
        }
        item
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    fn peek(&self) -> Option<&QueueItem> {
        self.items.front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, time: f64) -> QueueItem {
        QueueItem::new(EntityId(id), SimTime::from_minutes(time))
    }

    #[test]
    fn test_fifo_queue_basic_operations() {
        let mut queue = FifoQueue::unbounded();
        assert!(queue.is_empty());
        assert_eq!(queue.capacity(), None);

        queue.enqueue(item(1, 1.0)).unwrap();
        queue.enqueue(item(2, 2.0)).unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.peek().map(|i| i.entity), Some(EntityId(1)));

        // FIFO order: first in, first out
        assert_eq!(queue.dequeue().unwrap().entity, EntityId(1));
        assert_eq!(queue.dequeue().unwrap().entity, EntityId(2));
        assert!(queue.is_empty());
        assert_eq!(queue.dequeue(), None);

        assert_eq!(queue.total_enqueued(), 2);
        assert_eq!(queue.total_dequeued(), 2);
    }

    #[test]
    fn test_fifo_queue_capacity() {
        let mut queue = FifoQueue::bounded(2);
        assert!(!queue.is_full());

        queue.enqueue(item(1, 0.0)).unwrap();
        queue.enqueue(item(2, 0.0)).unwrap();
        assert!(queue.is_full());

        assert_eq!(queue.enqueue(item(3, 0.0)), Err(QueueError::Full { capacity: 2 }));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_queue_time() {
        let queued = item(7, 3.0);
        assert_eq!(queued.queue_time(SimTime::from_minutes(5.5)), SimTime::from_minutes(2.5));
    }
}
