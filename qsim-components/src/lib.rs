//! Building blocks of a multi-server queueing station
//!
//! This crate provides the pieces a [`ServiceNode`] is made of: a pool of
//! identical servers with a FIFO wait queue, the entity lifecycle, and the
//! run configuration with its builder.

pub mod builder;
pub mod config;
pub mod entity;
pub mod error;
pub mod node;
pub mod pool;
pub mod queue;

pub use builder::{validate_finite, validate_positive, validate_range, ValidationError, ValidationResult};
pub use config::{FirstArrival, HorizonPolicy, NodeConfig, NodeConfigBuilder, DEFAULT_SEED};
pub use entity::{Entity, EntityId, EntityState};
pub use error::{EntityError, PoolError, QueueError};
pub use node::{NodeEvent, RunContext, ServiceNode};
pub use pool::{Acquire, ServerPool};
pub use queue::{FifoQueue, Queue, QueueItem};
