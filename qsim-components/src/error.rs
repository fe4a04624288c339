//! Error types for simulation components

use crate::entity::{EntityId, EntityState};
use qsim_core::SimError;
use thiserror::Error;

/// Errors related to queue operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueueError {
    #[error("Queue is full (capacity: {capacity})")]
    Full { capacity: usize },
}

/// Server pool invariant violations
///
/// None of these can happen in a correctly wired service node; when one does,
/// the run is aborted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PoolError {
    #[error("Server pool overcommitted: {busy} busy slots for capacity {capacity}")]
    Overcommit { busy: usize, capacity: usize },

    #[error("Release called on a pool with no busy server")]
    ReleaseIdle,

    #[error("Wait queue rejected entity: {0}")]
    Queue(#[from] QueueError),
}

/// Illegal lifecycle transitions of an entity
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntityError {
    #[error("Entity {entity} cannot go from {from:?} to {to:?}")]
    InvalidTransition {
        entity: EntityId,
        from: EntityState,
        to: EntityState,
    },

    #[error("Unknown entity {0}")]
    Unknown(EntityId),
}

impl From<PoolError> for SimError {
    fn from(err: PoolError) -> Self {
        SimError::Internal(err.to_string())
    }
}

impl From<EntityError> for SimError {
    fn from(err: EntityError) -> Self {
        SimError::Internal(err.to_string())
    }
}
