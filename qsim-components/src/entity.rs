//! Entities flowing through a service node
//!
//! An entity is created on arrival, waits in the server pool's queue until a
//! server is granted, holds the server for its service duration and then
//! departs. Each timestamp is written exactly once; the transition methods
//! refuse to overwrite them.

use crate::error::EntityError;
use qsim_core::SimTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an entity: its position in arrival order, starting at 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Lifecycle state of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityState {
    /// Arrived, waiting for a server
    Queued,
    /// Holding a server
    InService,
    /// Released its server and left
    Departed,
}

/// One arriving unit (truck, car, repair job, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    arrival_time: SimTime,
    service_start: Option<SimTime>,
    service_duration: Option<SimTime>,
    departure_time: Option<SimTime>,
    state: EntityState,
}

impl Entity {
    /// Create an entity arriving at `now`
    pub fn arrive(id: EntityId, now: SimTime) -> Self {
        Self {
            id,
            arrival_time: now,
            service_start: None,
            service_duration: None,
            departure_time: None,
            state: EntityState::Queued,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn state(&self) -> EntityState {
        self.state
    }

    pub fn arrival_time(&self) -> SimTime {
        self.arrival_time
    }

    pub fn service_start(&self) -> Option<SimTime> {
        self.service_start
    }

    pub fn service_duration(&self) -> Option<SimTime> {
        self.service_duration
    }

    pub fn departure_time(&self) -> Option<SimTime> {
        self.departure_time
    }

    /// Time spent in the queue, known once service has started
    pub fn wait_time(&self) -> Option<SimTime> {
        self.service_start
            .map(|start| start.duration_since(self.arrival_time))
    }

    /// Record the server grant at `now` with the sampled service duration.
    ///
    /// Returns the wait time.
    pub fn begin_service(&mut self, now: SimTime, duration: SimTime) -> Result<SimTime, EntityError> {
        self.transition(EntityState::Queued, EntityState::InService)?;
        self.service_start = Some(now);
        self.service_duration = Some(duration);
        Ok(now.duration_since(self.arrival_time))
    }

    /// Record the departure at `now`
    pub fn depart(&mut self, now: SimTime) -> Result<(), EntityError> {
        self.transition(EntityState::InService, EntityState::Departed)?;
        self.departure_time = Some(now);
        Ok(())
    }

    fn transition(&mut self, expected: EntityState, next: EntityState) -> Result<(), EntityError> {
        if self.state != expected {
            return Err(EntityError::InvalidTransition {
                entity: self.id,
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }
}
