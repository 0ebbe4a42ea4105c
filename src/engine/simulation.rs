use super::{Event, EventQueue};
use crate::{Priority, SimState, SimTime};

use std::fmt::Formatter;

/// Contains the event queue and other state belonging to a simulation.
///
/// A [`Simulation`] owns both its state and its event queue, providing both shared and mutable access to each so
/// clients can set up and tear down instances as needed - for example, scheduling initial events or reading the final
/// counters.
///
/// The expected workflow for a Simulation is:
///
/// 1. Initialize a struct that implements [`SimState`].
/// 2. Pass this struct and the start time to [`new()`].
/// 3. Schedule at least one initial event or spawn an initial process.
/// 4. Call [`run()`] or [`run_until()`]. Handle any error it might return.
/// 5. Use the [`state()`] accessor to finish processing the results.
///
/// [`new()`]: Simulation::new
/// [`run()`]: Simulation::run
/// [`run_until()`]: Simulation::run_until
/// [`state()`]: Simulation::state
#[derive(Debug, Default)]
pub struct Simulation<State, Time>
where
    State: SimState<Time>,
    Time: SimTime,
{
    /// A priority queue of events that have been scheduled to execute, ordered ascending by execution time.
    pub(crate) event_queue: EventQueue<State, Time>,
    /// The current shared state of the Simulation. Exclusive access will be granted to each event that executes.
    pub(crate) state: State,
    events_executed: u64,
}

/// How a call to [`Simulation::run()`] or [`Simulation::run_until()`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Events executed during this call.
    pub events_executed: u64,
    /// Events dropped because they were scheduled past the run-length ceiling.
    pub events_discarded: usize,
}

impl<State, Time> Simulation<State, Time>
where
    State: SimState<Time>,
    Time: SimTime,
{
    /// Initialize a Simulation instance with the provided starting state and an event queue with clock set to the
    /// provided starting time.
    pub fn new(initial_state: State, start_time: Time) -> Self {
        Self {
            event_queue: EventQueue::new(start_time),
            state: initial_state,
            events_executed: 0,
        }
    }

    /// Execute events from the priority queue, one at a time, in ascending order by execution time.
    ///
    /// Follows this loop:
    ///
    /// 1. Does [`state.is_complete()`] return true? If so, stop.
    /// 2. Attempt to pop the next event from the queue, advancing the clock to its time. If there isn't one, stop.
    /// 3. Pass exclusive references to the state and event queue to [`event.execute()`].
    ///     1. If an error is returned, forward it as-is to the caller.
    ///     2. Otherwise, go back to step 1.
    ///
    /// # Errors
    ///
    /// Errors encountered while executing events are passed back to the caller unchanged, leaving any remaining
    /// events in the queue.
    ///
    /// [`state.is_complete()`]: SimState::is_complete
    /// [`event.execute()`]: Event::execute
    pub fn run(&mut self) -> crate::Result<RunSummary> {
        self.run_while(|_| true)
    }

    /// Execute events like [`run()`], but stop at the first event whose execution time exceeds `ceiling`. That event
    /// and every other pending event are discarded, so the run cannot be resumed past the ceiling.
    ///
    /// Events scheduled exactly at the ceiling still execute.
    ///
    /// # Errors
    ///
    /// See [`run()`].
    ///
    /// [`run()`]: Simulation::run
    pub fn run_until(&mut self, ceiling: Time) -> crate::Result<RunSummary> {
        let mut summary = self.run_while(|next| *next <= ceiling)?;
        if !self.event_queue.is_empty() && !self.state.is_complete(self.event_queue.current_time()) {
            summary.events_discarded = self.event_queue.discard_all();
            log::info!(
                "run-length ceiling {:?} reached, discarded {} pending events",
                ceiling,
                summary.events_discarded
            );
        }
        Ok(summary)
    }

    fn run_while<Keep>(&mut self, keep_going: Keep) -> crate::Result<RunSummary>
    where
        Keep: Fn(&Time) -> bool,
    {
        log::info!("starting run at {:?}", self.event_queue.current_time());
        let mut summary = RunSummary::default();
        loop {
            if self.state.is_complete(self.event_queue.current_time()) {
                break;
            }

            match self.event_queue.peek_time() {
                Some(next) if keep_going(next) => {}
                _ => break,
            }

            let Some(mut next_event) = self.event_queue.next() else {
                break;
            };
            log::trace!("executing {:?} at {:?}", next_event, self.event_queue.current_time());
            next_event.execute(&mut self.state, &mut self.event_queue)?;
            summary.events_executed += 1;
            self.events_executed += 1;
        }

        log::info!(
            "run stopped at {:?} after {} events, {} still pending",
            self.event_queue.current_time(),
            summary.events_executed,
            self.event_queue.len()
        );
        Ok(summary)
    }

    /// Schedule the provided event at the specified time with the default priority.
    ///
    /// # Errors
    ///
    /// If `time` is less than the current clock time on `self`, returns an [`Error::InvalidSchedule`].
    ///
    /// [`Error::InvalidSchedule`]: crate::Error::InvalidSchedule
    pub fn schedule<EventType>(&mut self, event: EventType, time: Time) -> crate::Result
    where
        EventType: Event<State, Time> + 'static,
    {
        self.event_queue.schedule(event, time)
    }

    /// Schedule the provided event at the specified time and priority.
    ///
    /// # Errors
    ///
    /// If `time` is less than the current clock time on `self`, returns an [`Error::InvalidSchedule`].
    ///
    /// [`Error::InvalidSchedule`]: crate::Error::InvalidSchedule
    pub fn schedule_prioritized<EventType>(&mut self, event: EventType, time: Time, priority: Priority) -> crate::Result
    where
        EventType: Event<State, Time> + 'static,
    {
        self.event_queue.schedule_prioritized(event, time, priority)
    }

    /// Total events executed over the lifetime of this simulation.
    pub fn events_executed(&self) -> u64 {
        self.events_executed
    }

    /// Get a shared reference to the simulation's current clock time.
    pub fn current_time(&self) -> &Time {
        self.event_queue.current_time()
    }

    /// Get a shared reference to the simulation state.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Get an exclusive reference to the simulation state.
    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    /// Get a shared reference to the event queue.
    pub fn event_queue(&self) -> &EventQueue<State, Time> {
        &self.event_queue
    }

    /// Get an exclusive reference to the event queue.
    pub fn event_queue_mut(&mut self) -> &mut EventQueue<State, Time> {
        &mut self.event_queue
    }
}

impl<State, Time> std::fmt::Display for Simulation<State, Time>
where
    State: SimState<Time>,
    Time: SimTime,
{
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Simulation at time {:?}", self.event_queue.current_time())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Infallible, OkEvent};

    #[derive(Debug)]
    struct State {
        executed_event_values: Vec<u32>,
        complete: bool,
    }
    impl SimState<u32> for State {
        fn is_complete(&self, _: &u32) -> bool {
            self.complete
        }
    }

    #[derive(Debug)]
    struct TestEvent {
        value: u32,
    }

    impl Event<State, u32> for TestEvent {
        fn execute(&mut self, simulation_state: &mut State, _: &mut EventQueue<State, u32>) -> crate::Result {
            simulation_state.executed_event_values.push(self.value);
            Ok(())
        }
    }

    #[derive(Debug)]
    struct CompletionEvent {}

    impl OkEvent<State, u32> for CompletionEvent {
        fn execute(&mut self, simulation_state: &mut State, _: &mut EventQueue<State, u32>) {
            simulation_state.complete = true;
        }
    }

    /// Reschedules itself at the same instant with a larger priority until it has run `remaining` more times.
    #[derive(Debug)]
    struct Echo {
        remaining: u32,
    }

    impl Event<State, u32> for Echo {
        fn execute(&mut self, simulation_state: &mut State, event_queue: &mut EventQueue<State, u32>) -> crate::Result {
            simulation_state.executed_event_values.push(100 + self.remaining);
            if self.remaining > 0 {
                event_queue.schedule_now(
                    Echo {
                        remaining: self.remaining - 1,
                    },
                    Priority(1),
                )?;
            }
            Ok(())
        }
    }

    fn setup() -> Simulation<State, u32> {
        let mut sim = Simulation::new(
            State {
                executed_event_values: Vec::with_capacity(3),
                complete: false,
            },
            0,
        );

        let events: [TestEvent; 3] = [TestEvent { value: 1 }, TestEvent { value: 3 }, TestEvent { value: 2 }];

        for (i, event) in events.into_iter().enumerate() {
            sim.event_queue.schedule(event, 2 * i as u32).unwrap();
        }
        sim
    }

    #[test]
    fn simulation_executes_events() {
        let mut sim = setup();
        let summary = sim.run().unwrap();

        let expected = vec![1, 3, 2];
        assert_eq!(
            expected, sim.state.executed_event_values,
            "events did not execute in correct order"
        );
        assert_eq!(3, summary.events_executed);
        assert_eq!(0, summary.events_discarded);
    }

    #[test]
    fn simulation_stops_with_events_still_in_queue() {
        let mut sim = setup();
        sim.event_queue.schedule(Infallible(CompletionEvent {}), 3).unwrap();
        sim.run().unwrap();

        let expected = vec![1, 3];
        assert_eq!(
            expected, sim.state.executed_event_values,
            "simulation did not terminate with completion event"
        );
        assert_eq!(1, sim.event_queue.len(), "pending event should survive a completed run");
    }

    #[test]
    fn ceiling_discards_later_events() {
        let mut sim = setup();
        let summary = sim.run_until(2).unwrap();

        assert_eq!(vec![1, 3], sim.state.executed_event_values, "event at the ceiling should execute");
        assert_eq!(1, summary.events_discarded);
        assert!(sim.event_queue.is_empty());
        assert_eq!(&2, sim.current_time());
    }

    #[test]
    fn same_time_events_scheduled_during_a_turn_run_in_that_instant() {
        let mut sim = setup();
        sim.event_queue.schedule(Echo { remaining: 2 }, 2).unwrap();
        sim.run().unwrap();

        assert_eq!(
            vec![1, 3, 102, 101, 100, 2],
            sim.state.executed_event_values,
            "zero-delay follow-ups should run before later events"
        );
        assert_eq!(6, sim.events_executed());
    }
}
