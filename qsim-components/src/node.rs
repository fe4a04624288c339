//! Service node: arrival generator, server pool and entity lifecycle
//!
//! A [`ServiceNode`] is a single component that drives a whole M/G/s station:
//!
//! - `Start` kicks off the arrival generator.
//! - `Arrival` creates an entity, requests a server and schedules the next
//!   arrival one sampled gap later.
//! - `Departure` ends an entity's service and releases its server, which the
//!   pool hands to the head of the queue in the same step.
//!
//! Wait and service samples are appended to the node's [`RunContext`] at the
//! moment service starts, so an entity that is still being served when the run
//! stops has already contributed both.

use crate::config::{FirstArrival, NodeConfig};
use crate::entity::{Entity, EntityId};
use crate::error::EntityError;
use crate::pool::{Acquire, ServerPool};
use qsim_core::{
    ArrivalPattern, Component, ExponentialArrivals, Key, Scheduler, ServiceTimeSampler, SimError,
    SimTime,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Events handled by a [`ServiceNode`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeEvent {
    /// Start the arrival generator
    Start,
    /// A new entity arrives
    Arrival,
    /// `entity` finishes service
    Departure { entity: EntityId },
}

/// Samples collected during one run, in the order service started
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunContext {
    /// Minutes each served entity spent waiting for a server
    pub wait_times: Vec<f64>,
    /// Sampled service duration of each served entity, in minutes
    pub service_times: Vec<f64>,
    /// Entities created by the arrival generator
    pub arrivals: u64,
    /// Entities that released their server
    pub departures: u64,
}

impl RunContext {
    /// Number of entities that acquired a server
    pub fn served(&self) -> u64 {
        self.wait_times.len() as u64
    }

    /// Entities that arrived but have not departed
    pub fn in_system(&self) -> u64 {
        self.arrivals - self.departures
    }
}

/// M/G/s service station
pub struct ServiceNode {
    name: String,
    arrivals: Box<dyn ArrivalPattern>,
    service: Box<dyn ServiceTimeSampler>,
    pool: ServerPool,
    entities: Vec<Entity>,
    context: RunContext,
    accepting: bool,
    first_arrival: FirstArrival,
}

impl ServiceNode {
    /// Create a node from its parts
    pub fn new(
        name: impl Into<String>,
        server_count: usize,
        arrivals: Box<dyn ArrivalPattern>,
        service: Box<dyn ServiceTimeSampler>,
        first_arrival: FirstArrival,
    ) -> Result<Self, SimError> {
        Ok(Self {
            name: name.into(),
            arrivals,
            service,
            pool: ServerPool::new(server_count)?,
            entities: Vec::new(),
            context: RunContext::default(),
            accepting: true,
            first_arrival,
        })
    }

    /// Create a node with exponential arrivals and the configured service
    /// distribution, both seeded from `config.seed`
    pub fn from_config(config: &NodeConfig) -> Result<Self, SimError> {
        config.validate()?;
        let arrivals = ExponentialArrivals::new(config.inter_arrival_time, config.seed)?;
        let service = config.service.sampler(config.seed)?;
        Self::new(
            format!("node-{}", config.server_count),
            config.server_count,
            Box::new(arrivals),
            service,
            config.first_arrival,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pool(&self) -> &ServerPool {
        &self.pool
    }

    /// Every entity created so far, indexed by [`EntityId`]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    pub fn into_context(self) -> RunContext {
        self.context
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// Stop the arrival generator. Entities already in the system are still
    /// served; the pending arrival is dropped when it fires.
    pub fn close(&mut self) {
        if self.accepting {
            debug!(node = %self.name, arrivals = self.context.arrivals, "Closing arrivals");
        }
        self.accepting = false;
    }

    fn on_start(&mut self, self_id: Key<NodeEvent>, scheduler: &mut Scheduler) -> Result<(), SimError> {
        let delay = match self.first_arrival {
            FirstArrival::AfterGap => self.arrivals.next_arrival_time(),
            FirstArrival::AtStart => SimTime::zero(),
        };
        scheduler.schedule(delay, self_id, NodeEvent::Arrival)?;
        debug!(node = %self.name, first_arrival = %delay, "Arrival generator started");
        Ok(())
    }

    fn on_arrival(&mut self, self_id: Key<NodeEvent>, scheduler: &mut Scheduler) -> Result<(), SimError> {
        if !self.accepting {
            trace!(node = %self.name, time = %scheduler.time(), "Arrival after close dropped");
            return Ok(());
        }

        let now = scheduler.time();
        let id = EntityId(self.entities.len() as u64);
        self.entities.push(Entity::arrive(id, now));
        self.context.arrivals += 1;

        match self.pool.acquire(id, now)? {
            Acquire::Granted => self.start_service(id, self_id, scheduler)?,
            Acquire::Queued { position } => {
                trace!(node = %self.name, entity = %id, position, "Entity waiting");
            }
        }

        let gap = self.arrivals.next_arrival_time();
        scheduler.schedule(gap, self_id, NodeEvent::Arrival)?;
        Ok(())
    }

    fn on_departure(
        &mut self,
        entity: EntityId,
        self_id: Key<NodeEvent>,
        scheduler: &mut Scheduler,
    ) -> Result<(), SimError> {
        let now = scheduler.time();
        self.entity_mut(entity)?.depart(now)?;
        self.context.departures += 1;

        if let Some(next) = self.pool.release(now)? {
            self.start_service(next.entity, self_id, scheduler)?;
        }
        Ok(())
    }

    fn start_service(
        &mut self,
        id: EntityId,
        self_id: Key<NodeEvent>,
        scheduler: &mut Scheduler,
    ) -> Result<(), SimError> {
        let now = scheduler.time();
        let duration = self.service.sample();
        let wait = self.entity_mut(id)?.begin_service(now, duration)?;

        self.context.wait_times.push(wait.as_minutes());
        self.context.service_times.push(duration.as_minutes());
        trace!(
            node = %self.name,
            entity = %id,
            wait = %wait,
            service = %duration,
            "Service started"
        );

        scheduler.schedule(duration, self_id, NodeEvent::Departure { entity: id })?;
        Ok(())
    }

    fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity, EntityError> {
        usize::try_from(id.0)
            .ok()
            .and_then(|index| self.entities.get_mut(index))
            .ok_or(EntityError::Unknown(id))
    }
}

impl Component for ServiceNode {
    type Event = NodeEvent;

    fn process_event(
        &mut self,
        self_id: Key<Self::Event>,
        event: &Self::Event,
        scheduler: &mut Scheduler,
    ) {
        let result = match *event {
            NodeEvent::Start => self.on_start(self_id, scheduler),
            NodeEvent::Arrival => self.on_arrival(self_id, scheduler),
            NodeEvent::Departure { entity } => self.on_departure(entity, self_id, scheduler),
        };
        if let Err(fault) = result {
            scheduler.abort(fault);
        }
    }
}
