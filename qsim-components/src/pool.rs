//! Pool of identical servers with a FIFO wait queue
//!
//! The pool models `N` interchangeable servers (ramps, bays, ...). A request is
//! granted only when a server is free and nobody is waiting ahead of it; a
//! release hands the freed server straight to the head of the queue, so the
//! next entity's wait ends at the exact instant the previous service ends.
//!
//! Invariant: `busy + available == capacity` and `busy <= capacity`.

use crate::entity::EntityId;
use crate::error::PoolError;
use crate::queue::{FifoQueue, Queue, QueueItem};
use qsim_core::{SimError, SimTime};
use tracing::debug;

/// Outcome of [`ServerPool::acquire`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    /// A server was free; service can start now
    Granted,
    /// Every server is busy; the entity waits at `position` (1 = head)
    Queued { position: usize },
}

/// `N` identical servers plus their wait queue
#[derive(Debug, Clone)]
pub struct ServerPool {
    capacity: usize,
    busy: usize,
    queue: FifoQueue,
    grants: u64,
}

impl ServerPool {
    /// Create a pool with `capacity` servers
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidCapacity`] when `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self, SimError> {
        if capacity == 0 {
            return Err(SimError::InvalidCapacity { server_count: capacity });
        }
        Ok(Self {
            capacity,
            busy: 0,
            queue: FifoQueue::unbounded(),
            grants: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of servers currently held
    pub fn busy(&self) -> usize {
        self.busy
    }

    /// Number of idle servers
    pub fn available(&self) -> usize {
        self.capacity - self.busy
    }

    /// Number of entities waiting for a server
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Total number of grants, immediate or from the queue
    pub fn grants(&self) -> u64 {
        self.grants
    }

    /// Waiting entities from head to tail
    pub fn waiting(&self) -> impl Iterator<Item = &QueueItem> {
        self.queue.iter()
    }

    /// Request a server for `entity` at `now`
    pub fn acquire(&mut self, entity: EntityId, now: SimTime) -> Result<Acquire, PoolError> {
        if self.busy < self.capacity && self.queue.is_empty() {
            self.busy += 1;
            self.grants += 1;
            self.check_capacity()?;
            debug!(%entity, time = %now, busy = self.busy, capacity = self.capacity, "Server granted");
            return Ok(Acquire::Granted);
        }

        self.queue.enqueue(QueueItem::new(entity, now))?;
        let position = self.queue.len();
        debug!(%entity, time = %now, position, "All servers busy, entity queued");
        Ok(Acquire::Queued { position })
    }

    /// Free one server at `now`.
    ///
    /// If somebody is waiting, the server goes to the head of the queue in the
    /// same step and that item is returned; the busy count is unchanged.
    pub fn release(&mut self, now: SimTime) -> Result<Option<QueueItem>, PoolError> {
        if self.busy == 0 {
            return Err(PoolError::ReleaseIdle);
        }

        match self.queue.dequeue() {
            Some(next) => {
                self.grants += 1;
                debug!(
                    entity = %next.entity,
                    time = %now,
                    waited = %next.queue_time(now),
                    "Released server handed to queue head"
                );
                Ok(Some(next))
            }
            None => {
                self.busy -= 1;
                debug!(time = %now, busy = self.busy, "Server released");
                Ok(None)
            }
        }
    }

    fn check_capacity(&self) -> Result<(), PoolError> {
        if self.busy > self.capacity {
            return Err(PoolError::Overcommit {
                busy: self.busy,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}
