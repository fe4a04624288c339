use std::any::Any;
use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::rc::Rc;
use tracing::{error, trace};
use uuid::Uuid;

use crate::error::{EventError, SimError};
use crate::types::EventId;
use crate::{Key, SimTime};

/// Entry type stored in the scheduler, including the event value, component key, and the time when
/// it is supposed to occur.
///
/// Besides being stored in the scheduler's internal priority queue,
/// event entries are simply passed to [`crate::Components`] object, which unpacks them, and passes them
/// to the correct component. The boxed event is the continuation of whatever process scheduled it.
#[derive(Debug)]
pub struct EventEntry {
    event_id: EventId,
    time: SimTime,
    pub(crate) component: Uuid,
    inner: Box<dyn Any>,
}

impl EventEntry {
    pub(crate) fn new<E: fmt::Debug + 'static>(
        id: EventId,
        time: SimTime,
        component: Key<E>,
        event: E,
    ) -> Self {
        EventEntry {
            event_id: id,
            time,
            component: component.id(),
            inner: Box::new(event),
        }
    }

    /// Time at which the event fires
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Insertion order of the event
    pub fn id(&self) -> EventId {
        self.event_id
    }

    /// Tries to downcast the event entry to one holding an event of type `E`.
    /// If fails, returns `None`.
    #[must_use]
    pub fn downcast<E: fmt::Debug + 'static>(&self) -> Option<EventEntryTyped<'_, E>> {
        self.inner.downcast_ref::<E>().map(|event| EventEntryTyped {
            id: self.event_id,
            time: self.time,
            component_key: Key::new_with_id(self.component),
            component_idx: self.component,
            event,
        })
    }
}

impl PartialEq for EventEntry {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.event_id == other.event_id
    }
}

impl Eq for EventEntry {}

impl PartialOrd for EventEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse the ordering for min-heap behavior in BinaryHeap.
        // Equal times fall back to insertion order (FIFO).
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.event_id.cmp(&self.event_id))
    }
}

#[derive(Debug)]
pub struct EventEntryTyped<'e, E: fmt::Debug> {
    pub id: EventId,
    pub time: SimTime,
    pub component_key: Key<E>,
    pub component_idx: Uuid,
    pub event: &'e E,
}

type Clock = Rc<Cell<SimTime>>;

/// This struct exposes only immutable access to the simulation clock.
/// The clock itself is owned by the scheduler, while others can obtain `ClockRef`
/// to read the current simulation time.
///
/// # Example
///
/// ```
/// # use qsim_core::Scheduler;
/// let scheduler = Scheduler::default();
/// let clock_ref = scheduler.clock();
/// assert_eq!(clock_ref.time(), scheduler.time());
/// ```
#[derive(Clone)]
pub struct ClockRef {
    clock: Clock,
}

impl From<Clock> for ClockRef {
    fn from(clock: Clock) -> Self {
        Self { clock }
    }
}

impl ClockRef {
    /// Return the current simulation time.
    #[must_use]
    pub fn time(&self) -> SimTime {
        self.clock.get()
    }
}

/// Scheduler is used to keep the current time and information about the upcoming events.
///
/// See the [crate-level documentation](index.html) for more information.
pub struct Scheduler {
    next_event_id: u64,
    events: BinaryHeap<EventEntry>,
    clock: Clock,
    fault: Option<SimError>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            next_event_id: 0,
            events: BinaryHeap::default(),
            clock: Rc::new(Cell::new(SimTime::default())),
            fault: None,
        }
    }
}

impl Scheduler {
    /// Schedules `event` to be executed for `component` at `self.time() + delay`.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::InvalidDelay`] if `delay` is negative or not finite.
    /// Nothing is inserted in that case.
    pub fn schedule<E: fmt::Debug + 'static>(
        &mut self,
        delay: SimTime,
        component: Key<E>,
        event: E,
    ) -> Result<EventId, EventError> {
        if !delay.is_valid_delay() {
            return Err(EventError::InvalidDelay {
                delay: delay.as_minutes(),
            });
        }
        self.next_event_id += 1;
        let id = EventId(self.next_event_id);
        let time = self.time() + delay;
        trace!(event_id = %id, time = %time, "Event scheduled");
        self.events.push(EventEntry::new(id, time, component, event));
        Ok(id)
    }

    /// Schedules `event` to be executed for `component` at `self.time()`.
    pub fn schedule_now<E: fmt::Debug + 'static>(
        &mut self,
        component: Key<E>,
        event: E,
    ) -> Result<EventId, EventError> {
        self.schedule(SimTime::zero(), component, event)
    }

    /// Returns the current simulation time.
    #[must_use]
    pub fn time(&self) -> SimTime {
        self.clock.get()
    }

    /// Returns a structure with immutable access to the simulation time.
    #[must_use]
    pub fn clock(&self) -> ClockRef {
        ClockRef {
            clock: Rc::clone(&self.clock),
        }
    }

    /// Returns a reference to the next scheduled event or `None` if none are left.
    pub fn peek(&self) -> Option<&EventEntry> {
        self.events.peek()
    }

    /// Removes and returns the next scheduled event or `None` if none are left.
    pub fn pop(&mut self) -> Option<EventEntry> {
        self.events.pop().inspect(|event| {
            debug_assert!(event.time() >= self.clock.get(), "clock moved backward");
            self.clock.replace(event.time());
        })
    }

    /// Number of events waiting in the queue
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Abort the run after an internal invariant violation.
    ///
    /// Drops every pending event so the execution loop stops after the current
    /// step. The first fault wins; later ones are only logged.
    pub fn abort(&mut self, fault: SimError) {
        error!(time = %self.time(), error = %fault, "Simulation aborted");
        if self.fault.is_none() {
            self.fault = Some(fault);
        }
        self.events.clear();
    }

    /// Whether [`Scheduler::abort`] was called
    pub fn is_aborted(&self) -> bool {
        self.fault.is_some()
    }

    /// Takes the recorded fault, if any
    pub fn take_fault(&mut self) -> Option<SimError> {
        self.fault.take()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clock_ref() {
        let time = SimTime::from_minutes(1.0);
        let clock = Clock::new(Cell::new(time));
        let clock_ref = ClockRef::from(clock);
        assert_eq!(clock_ref.time(), time);
    }

    #[test]
    fn test_event_entry_downcast() {
        let entry = EventEntry {
            event_id: EventId(0),
            time: SimTime::from_minutes(1.0),
            component: Uuid::nil(),
            inner: Box::new(String::from("inner")),
        };
        assert!(entry.downcast::<String>().is_some());
        assert!(entry.downcast::<i32>().is_none());
    }

    #[test]
    fn test_event_entry_cmp() {
        let make = |id: u64, time: f64| EventEntry {
            event_id: EventId(id),
            time: SimTime::from_minutes(time),
            component: Uuid::nil(),
            inner: Box::new(()),
        };

        // Earlier time has higher priority in the max-heap.
        assert_eq!(make(1, 0.0).cmp(&make(0, 1.0)), Ordering::Greater);
        assert_eq!(make(0, 2.0).cmp(&make(3, 1.0)), Ordering::Less);
        // Same time: lower id (scheduled first) wins.
        assert_eq!(make(1, 1.0).cmp(&make(2, 1.0)), Ordering::Greater);
        assert_eq!(make(5, 1.0), make(5, 1.0));
    }

    #[derive(Debug, Clone, Eq, PartialEq)]
    struct EventA;
    #[derive(Debug, Clone, Eq, PartialEq)]
    struct EventB(u32);

    #[test]
    fn test_scheduler() {
        let mut scheduler = Scheduler::default();
        assert_eq!(scheduler.time(), SimTime::zero());
        assert_eq!(scheduler.pending_events(), 0);

        let component_a = Key::<EventA>::new_with_id(Uuid::from_u128(1));
        let component_b = Key::<EventB>::new_with_id(Uuid::from_u128(2));

        scheduler.schedule(SimTime::from_minutes(1.0), component_a, EventA).unwrap();
        scheduler.schedule_now(component_b, EventB(0)).unwrap();
        scheduler.schedule(SimTime::from_minutes(2.0), component_b, EventB(1)).unwrap();
        assert_eq!(scheduler.pending_events(), 3);

        let entry = scheduler.pop().unwrap();
        let entry = entry.downcast::<EventB>().unwrap();
        assert_eq!(entry.time, SimTime::zero());
        assert_eq!(entry.component_idx, component_b.id());
        assert_eq!(entry.event, &EventB(0));
        assert_eq!(scheduler.time(), SimTime::zero());

        let entry = scheduler.pop().unwrap();
        let entry = entry.downcast::<EventA>().unwrap();
        assert_eq!(entry.time, SimTime::from_minutes(1.0));
        assert_eq!(entry.component_key.id(), component_a.id());
        assert_eq!(scheduler.time(), SimTime::from_minutes(1.0));
        assert_eq!(scheduler.clock().time(), SimTime::from_minutes(1.0));

        let entry = scheduler.pop().unwrap();
        assert_eq!(entry.downcast::<EventB>().unwrap().event, &EventB(1));
        assert_eq!(scheduler.time(), SimTime::from_minutes(2.0));

        assert!(scheduler.pop().is_none());
    }

    #[test]
    fn test_equal_time_events_pop_in_insertion_order() {
        let mut scheduler = Scheduler::default();
        let key = Key::<EventB>::new_with_id(Uuid::from_u128(3));
        for i in 0..100 {
            scheduler.schedule(SimTime::from_minutes(5.0), key, EventB(i)).unwrap();
        }
        let order: Vec<u32> = std::iter::from_fn(|| scheduler.pop())
            .map(|e| e.downcast::<EventB>().unwrap().event.0)
            .collect();
        assert_eq!(order, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_negative_delay_rejected() {
        let mut scheduler = Scheduler::default();
        let key = Key::<EventA>::new_with_id(Uuid::from_u128(4));
        let err = scheduler
            .schedule(SimTime::from_minutes(-1.0), key, EventA)
            .unwrap_err();
        assert_eq!(err, EventError::InvalidDelay { delay: -1.0 });
        assert!(scheduler
            .schedule(SimTime::from_minutes(f64::NAN), key, EventA)
            .is_err());
        assert_eq!(scheduler.pending_events(), 0);
    }

    #[test]
    fn test_abort_drops_pending_events() {
        let mut scheduler = Scheduler::default();
        let key = Key::<EventA>::new_with_id(Uuid::from_u128(5));
        scheduler.schedule(SimTime::from_minutes(1.0), key, EventA).unwrap();
        scheduler.abort(SimError::Internal("first".into()));
        scheduler.abort(SimError::Internal("second".into()));
        assert!(scheduler.is_aborted());
        assert!(scheduler.pop().is_none());
        assert_eq!(scheduler.take_fault(), Some(SimError::Internal("first".into())));
        assert!(!scheduler.is_aborted());
    }
}
