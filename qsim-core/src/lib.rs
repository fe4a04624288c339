//! Core discrete event simulation engine.
//!
//! This crate provides the fundamental building blocks for discrete event simulation:
//! time management, event scheduling, random variate generation, and a
//! component-based architecture.
//!
//! # Architecture Overview
//!
//! The simulation is built around two main types:
//!
//! - [`Simulation`]: The main entry point that owns the scheduler and components.
//!   Use this to run simulations, add components, and access simulation state.
//!
//! - [`Scheduler`]: The event queue and clock. Components receive `&mut Scheduler`
//!   while they handle an event and use it to schedule their own continuations.
//!
//! Everything runs on one thread: components are logically concurrent but only
//! one event is handled at a time, in time order with FIFO tie-breaking.
//!
//! # Basic Usage
//!
//! ```rust
//! use qsim_core::{Component, Executor, Key, Scheduler, SimTime, Simulation, SimulationConfig};
//!
//! #[derive(Debug)]
//! struct Tick;
//!
//! struct Counter {
//!     ticks: usize,
//! }
//!
//! impl Component for Counter {
//!     type Event = Tick;
//!
//!     fn process_event(&mut self, self_id: Key<Tick>, _event: &Tick, scheduler: &mut Scheduler) {
//!         self.ticks += 1;
//!         if let Err(e) = scheduler.schedule(SimTime::from_minutes(1.0), self_id, Tick) {
//!             scheduler.abort(e.into());
//!         }
//!     }
//! }
//!
//! let mut simulation = Simulation::new(SimulationConfig { seed: 42 });
//! let key = simulation.add_component(Counter { ticks: 0 });
//! simulation.schedule(SimTime::zero(), key, Tick).unwrap();
//! simulation.execute(Executor::timed(SimTime::from_minutes(10.0)));
//!
//! let counter: Counter = simulation.remove_component(key).unwrap();
//! assert_eq!(counter.ticks, 11);
//! ```
//!
//! # Time Model
//!
//! All timing uses [`SimTime`], which represents simulation time in minutes (not
//! wall-clock time). This ensures deterministic, reproducible behavior across
//! simulation runs.

pub mod dists;
pub mod error;
pub mod execute;
pub mod logging;
pub mod randomness;
pub mod scheduler;
pub mod time;
pub mod types;

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use tracing::{debug, info, instrument, trace, warn};

pub use dists::{
    check_mean, ArrivalPattern, ConstantArrivalPattern, ConstantServiceTime, ExponentialArrivals,
    ExponentialServiceTime, ServiceTimeDistribution, ServiceTimeSampler,
    TruncatedNormalServiceTime,
};
pub use error::{EventError, SimError};
pub use execute::{Execute, Executor};
pub use logging::{
    component_span, init_detailed_simulation_logging, init_simulation_logging,
    init_simulation_logging_with_level, simulation_span,
};
pub use scheduler::{ClockRef, EventEntry, Scheduler};
pub use time::SimTime;
pub use types::EventId;

use uuid::Uuid;

#[derive(Debug)]
pub struct Key<T> {
    id: Uuid,
    _marker: std::marker::PhantomData<T>,
}

impl<T> Key<T> {
    pub fn new_with_id(id: Uuid) -> Self {
        Self {
            id,
            _marker: std::marker::PhantomData,
        }
    }

    /// Get the UUID of this key
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Key<T> {}

impl<T> PartialEq for Key<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl<T> Eq for Key<T> {}

pub trait ProcessEventEntry: Any {
    fn process_event_entry(&mut self, entry: EventEntry, scheduler: &mut Scheduler);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

pub trait Component: ProcessEventEntry {
    type Event: 'static;

    fn process_event(
        &mut self,
        self_id: Key<Self::Event>,
        event: &Self::Event,
        scheduler: &mut Scheduler,
    );
}

impl<E, C> ProcessEventEntry for C
where
    E: std::fmt::Debug + 'static,
    C: Component<Event = E> + 'static,
{
    fn process_event_entry(&mut self, entry: EventEntry, scheduler: &mut Scheduler) {
        match entry.downcast::<E>() {
            Some(typed_entry) => {
                self.process_event(typed_entry.component_key, typed_entry.event, scheduler);
            }
            None => scheduler.abort(SimError::Internal(format!(
                "event {} does not match component type {}",
                entry.id(),
                std::any::type_name::<C>()
            ))),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Configuration shared by everything created inside one [`Simulation`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Seed for component keys and random streams
    pub seed: u64,
}

/// Container holding type-erased components.
pub struct Components {
    seed: u64,
    next_component: u64,
    components: HashMap<Uuid, Box<dyn ProcessEventEntry>>,
}

impl Components {
    fn new(seed: u64) -> Self {
        Self {
            seed,
            next_component: 0,
            components: HashMap::new(),
        }
    }

    /// Process the event on the component given by the event entry.
    pub fn process_event_entry(&mut self, entry: EventEntry, scheduler: &mut Scheduler) {
        if let Some(component) = self.components.get_mut(&entry.component) {
            component.process_event_entry(entry, scheduler);
        } else {
            warn!(event_id = %entry.id(), "Dropping event for unknown component");
        }
    }

    /// Registers a new component and returns its ID.
    #[must_use]
    pub fn register<E: std::fmt::Debug + 'static, C: Component<Event = E> + 'static>(
        &mut self,
        component: C,
    ) -> Key<E> {
        self.next_component += 1;
        let id = randomness::deterministic_uuid(
            self.seed,
            randomness::UUID_DOMAIN_COMPONENT,
            self.next_component,
        );
        self.components.insert(id, Box::new(component));
        Key::new_with_id(id)
    }

    pub fn remove<E: 'static, C: Component<Event = E> + 'static>(&mut self, key: Key<E>) -> Option<C> {
        self.components.remove(&key.id).and_then(|boxed_trait| {
            // Since ProcessEventEntry extends Any, we can cast the Box
            let boxed_any: Box<dyn Any> = boxed_trait;
            boxed_any.downcast::<C>().ok().map(|boxed_c| *boxed_c)
        })
    }

    /// Get shared access to a component
    pub fn get_component<E: 'static, C: Component<Event = E> + 'static>(&self, key: Key<E>) -> Option<&C> {
        self.components
            .get(&key.id)
            .and_then(|boxed_trait| boxed_trait.as_any().downcast_ref::<C>())
    }

    /// Get mutable access to a component
    pub fn get_component_mut<E: 'static, C: Component<Event = E> + 'static>(
        &mut self,
        key: Key<E>,
    ) -> Option<&mut C> {
        self.components
            .get_mut(&key.id)
            .and_then(|boxed_trait| boxed_trait.as_any_mut().downcast_mut::<C>())
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Simulation struct that puts different parts of the simulation together.
///
/// See the [crate-level documentation](index.html) for more information.
pub struct Simulation {
    config: SimulationConfig,
    scheduler: Scheduler,
    /// Component container.
    pub components: Components,
    events_processed: u64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

impl Simulation {
    /// Create an empty simulation
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            scheduler: Scheduler::default(),
            components: Components::new(config.seed),
            events_processed: 0,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Returns the current simulation time.
    #[must_use]
    pub fn time(&self) -> SimTime {
        self.scheduler.time()
    }

    /// Number of events dispatched so far
    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// Performs one step of the simulation. Returns `true` if there was in fact an event
    /// available to process, and `false` otherwise, which signifies that the simulation
    /// ended.
    pub fn step(&mut self) -> bool {
        match self.scheduler.pop() {
            Some(event) => {
                trace!(
                    event_time = %event.time(),
                    event_id = %event.id(),
                    "Processing simulation step"
                );
                self.events_processed += 1;
                self.components.process_event_entry(event, &mut self.scheduler);
                true
            }
            None => false,
        }
    }

    /// Runs the entire simulation.
    ///
    /// The stopping condition and other execution details depend on the executor used.
    /// See [`Execute`] and [`Executor`] for more details.
    #[instrument(skip(self, executor), fields(initial_time = %self.time()))]
    pub fn execute<E: Execute>(&mut self, executor: E) {
        debug!("Starting simulation execution");
        executor.execute(self);
        debug!(
            final_time = %self.time(),
            events_processed = self.events_processed,
            "Simulation execution completed"
        );
    }

    /// Process every event scheduled at or before `horizon`.
    ///
    /// Events scheduled strictly after the horizon stay in the queue,
    /// unexecuted. Returns the number of events processed by this call.
    pub fn run_until(&mut self, horizon: SimTime) -> u64 {
        let before = self.events_processed;
        Executor::timed(horizon).execute(self);
        let processed = self.events_processed - before;
        info!(
            horizon = %horizon,
            final_time = %self.time(),
            events_processed = processed,
            pending_events = self.scheduler.pending_events(),
            "Reached simulation horizon"
        );
        processed
    }

    /// Adds a new component.
    #[must_use]
    pub fn add_component<E: std::fmt::Debug + 'static, C: Component<Event = E> + 'static>(
        &mut self,
        component: C,
    ) -> Key<E> {
        let key = self.components.register(component);
        debug!(
            component_id = %key.id(),
            component_type = std::any::type_name::<C>(),
            "Added component to simulation"
        );
        key
    }

    /// Remove a component: usually at the end of the simulation to peek at the state
    #[must_use]
    pub fn remove_component<E: std::fmt::Debug + 'static, C: Component<Event = E> + 'static>(
        &mut self,
        key: Key<E>,
    ) -> Option<C> {
        let result = self.components.remove(key);
        if result.is_none() {
            warn!(component_id = %key.id(), "Attempted to remove non-existent component");
        }
        result
    }

    /// Get shared access to a component
    pub fn get_component<E: std::fmt::Debug + 'static, C: Component<Event = E> + 'static>(
        &self,
        key: Key<E>,
    ) -> Option<&C> {
        self.components.get_component(key)
    }

    /// Get mutable access to a component
    pub fn get_component_mut<E: std::fmt::Debug + 'static, C: Component<Event = E> + 'static>(
        &mut self,
        key: Key<E>,
    ) -> Option<&mut C> {
        self.components.get_component_mut(key)
    }

    /// Schedules a new event to be executed `delay` after the current time in component `component`.
    pub fn schedule<E: std::fmt::Debug + 'static>(
        &mut self,
        delay: SimTime,
        component: Key<E>,
        event: E,
    ) -> Result<EventId, EventError> {
        self.scheduler.schedule(delay, component, event)
    }

    /// Returns the time of the next scheduled event, or None if no events are scheduled.
    pub fn peek_next_event_time(&self) -> Option<SimTime> {
        self.scheduler.peek().map(|e| e.time())
    }

    /// Returns a ClockRef for reading the simulation time.
    pub fn clock(&self) -> ClockRef {
        self.scheduler.clock()
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        self.scheduler.peek().is_some()
    }

    /// Number of events still waiting in the queue
    pub fn pending_events(&self) -> usize {
        self.scheduler.pending_events()
    }

    /// Takes the fault recorded by [`Scheduler::abort`], if the run was aborted.
    pub fn take_fault(&mut self) -> Option<SimError> {
        self.scheduler.take_fault()
    }
}
