mod event_holder;
pub(super) mod event_traits;

use crate::{Priority, SimState, SimTime};
use event_holder::EventHolder;
use event_traits::Event;

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::ops::Add;

/// Priority queue of scheduled events, together with the simulation clock.
///
/// Events will execute in ascending order of execution time. Events sharing a time execute in ascending order of
/// [`Priority`], and events sharing both execute in the order in which they were pushed onto the queue. This makes
/// the observed order of execution fully deterministic.
///
/// An [`EventQueue`] provides several different methods for scheduling new events, but does not publicly support
/// popping; popping events from the queue only occurs during [`Simulation::run()`].
///
/// Every scheduling method compares the desired execution time against the current clock time. Attempting to schedule
/// an event for a time that is already past will result in an [`Error::InvalidSchedule`] without modifying the queue.
/// This error indicates a logical bug, as the clock of a discrete-event simulation never rewinds.
///
/// [`Simulation::run()`]: crate::engine::Simulation::run
/// [`Error::InvalidSchedule`]: crate::Error::InvalidSchedule
#[derive(Debug, Default)]
pub struct EventQueue<State, Time>
where
    State: SimState<Time>,
    Time: SimTime,
{
    events: BinaryHeap<Reverse<EventHolder<State, Time>>>,
    last_execution_time: Time,
    events_added: u64,
}

impl<State, Time> EventQueue<State, Time>
where
    State: SimState<Time>,
    Time: SimTime,
{
    /// Construct a new [`EventQueue`] with no scheduled events and a clock initialized to the provided time.
    pub(crate) fn new(start_time: Time) -> Self {
        Self {
            events: BinaryHeap::default(),
            last_execution_time: start_time,
            events_added: 0,
        }
    }

    /// Schedule the provided event at the specified time with the default priority.
    ///
    /// # Errors
    ///
    /// If `time` is less than the current clock time on `self`, returns an [`Error::InvalidSchedule`] with no
    /// modifications to the queue.
    ///
    /// [`Error::InvalidSchedule`]: crate::Error::InvalidSchedule
    pub fn schedule<EventType>(&mut self, event: EventType, time: Time) -> crate::Result
    where
        EventType: Event<State, Time> + 'static,
    {
        self.schedule_from_boxed(Box::new(event), time, Priority::default())
    }

    /// Schedule the provided event at the specified time, ordered against other events at that time by `priority`.
    ///
    /// # Errors
    ///
    /// If `time` is less than the current clock time on `self`, returns an [`Error::InvalidSchedule`] with no
    /// modifications to the queue.
    ///
    /// [`Error::InvalidSchedule`]: crate::Error::InvalidSchedule
    pub fn schedule_prioritized<EventType>(&mut self, event: EventType, time: Time, priority: Priority) -> crate::Result
    where
        EventType: Event<State, Time> + 'static,
    {
        self.schedule_from_boxed(Box::new(event), time, priority)
    }

    /// Schedule an already boxed event at the specified time and priority.
    fn schedule_from_boxed(
        &mut self,
        event: Box<dyn Event<State, Time>>,
        time: Time,
        priority: Priority,
    ) -> crate::Result {
        if time < self.last_execution_time {
            return Err(crate::Error::invalid_schedule(&time, &self.last_execution_time));
        }

        let insertion_sequence = self.increment_event_count();
        log::trace!(
            "scheduling {:?} at {:?} (priority {}, sequence {})",
            event,
            time,
            priority,
            insertion_sequence
        );
        self.events.push(Reverse(EventHolder {
            execution_time: time,
            priority,
            event,
            insertion_sequence,
        }));
        Ok(())
    }

    /// Helper function to make sure incrementing the internal count of added events occurs the same way across all
    /// scheduling methods.
    fn increment_event_count(&mut self) -> u64 {
        let count = self.events_added;
        self.events_added += 1;
        count
    }

    /// Crate-internal function to pop an event from the queue. Updates the current clock time to match the execution
    /// time of the popped event.
    pub(crate) fn next(&mut self) -> Option<Box<dyn Event<State, Time>>> {
        let Reverse(holder) = self.events.pop()?;
        self.last_execution_time = holder.execution_time;
        Some(holder.event)
    }

    /// Execution time of the next event to pop, if any.
    pub(crate) fn peek_time(&self) -> Option<&Time> {
        self.events.peek().map(|Reverse(holder)| &holder.execution_time)
    }

    /// Drop every pending event without executing it, returning how many were dropped.
    pub(crate) fn discard_all(&mut self) -> usize {
        let discarded = self.events.len();
        self.events.clear();
        discarded
    }

    /// Get a shared reference to the simulation's current clock time.
    pub fn current_time(&self) -> &Time {
        &self.last_execution_time
    }

    /// Number of events waiting to execute.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events are waiting to execute.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<State, Time> EventQueue<State, Time>
where
    State: SimState<Time>,
    Time: SimTime + Clone,
{
    /// Schedule the provided event to execute at the current sim time. Events previously scheduled for "now" with
    /// the same or a smaller priority will still execute before this event does.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::InvalidSchedule`] only if cloning the current time somehow yields an earlier time.
    ///
    /// [`Error::InvalidSchedule`]: crate::Error::InvalidSchedule
    pub fn schedule_now<EventType>(&mut self, event: EventType, priority: Priority) -> crate::Result
    where
        EventType: Event<State, Time> + 'static,
    {
        let event_time = self.last_execution_time.clone();
        self.schedule_prioritized(event, event_time, priority)
    }
}

impl<State, Time> EventQueue<State, Time>
where
    State: SimState<Time>,
    Time: SimTime + Clone + Add<Output = Time>,
{
    /// Schedule the provided event after the specified delay. The event's execution time will be equal to the result
    /// of `self.current_time().clone() + delay`.
    ///
    /// # Errors
    ///
    /// If the calculated execution time is less than the current clock time on `self`, i.e. the delay is negative,
    /// returns an [`Error::InvalidSchedule`] with no modifications to the queue.
    ///
    /// [`Error::InvalidSchedule`]: crate::Error::InvalidSchedule
    pub fn schedule_with_delay<EventType>(&mut self, event: EventType, delay: Time, priority: Priority) -> crate::Result
    where
        EventType: Event<State, Time> + 'static,
    {
        let event_time = self.last_execution_time.clone() + delay;
        self.schedule_prioritized(event, event_time, priority)
    }
}

impl<State, Time> std::fmt::Display for EventQueue<State, Time>
where
    State: SimState<Time>,
    Time: SimTime,
{
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            formatter,
            "EventQueue with {} scheduled events at current time {:?}",
            self.events.len(),
            self.last_execution_time
        )
    }
}
