use super::EventQueue;
use crate::{SimState, SimTime};
use std::fmt::Debug;

/// A behavior or state change that occurs within a simulation.
///
/// This trait has one required method that describes what happens when the implementing type executes. It is generic
/// over the types used to represent simulation state and clock time so that your implementations of each trait work
/// together within the engine.
///
/// Requiring implementors to be [`Debug`] enables printing the full contents of an [`EventQueue`] when necessary.
///
/// Events cannot be withdrawn once scheduled. An event that should sometimes do nothing must check the simulation
/// state when it executes.
pub trait Event<State, Time>: Debug
where
    State: SimState<Time>,
    Time: SimTime,
{
    /// Update the simulation according to the specific type of event. The simulation will invoke this method during
    /// [`Simulation::run()`] for each scheduled event in sequence. Exclusive access will be provided to both the
    /// simulation's current state and the event queue, allowing for both mutation of the simulation's state and
    /// scheduling of new events, including events at the current time.
    ///
    /// No other event executes while this method runs. The clock time, accessible on the `event_queue` parameter, is
    /// updated before invoking this method.
    ///
    /// # Errors
    ///
    /// Any error returned here stops [`Simulation::run()`], which hands it back to the caller unchanged. Client errors
    /// that do not fit one of the engine's variants should be wrapped in [`Error::BadExecution`].
    ///
    /// [`Simulation::run()`]: crate::engine::Simulation::run
    /// [`Error::BadExecution`]: crate::Error::BadExecution
    fn execute(&mut self, simulation_state: &mut State, event_queue: &mut EventQueue<State, Time>) -> crate::Result;
}

/// An [`Event`] that is guaranteed not to return an [`Error`] on execution.
///
/// The [`execute()`] method on this trait differs from [`Event::execute()`] only by omitting the return type. Wrap an
/// implementor in [`Infallible`] to schedule it; the wrapper invokes [`OkEvent::execute()`] then returns `Ok(())`.
///
/// [`execute()`]: OkEvent::execute
/// [`Event::execute()`]: Event::execute
/// [`OkEvent::execute()`]: OkEvent::execute
/// [`Error`]: crate::Error
pub trait OkEvent<State, Time>: Debug
where
    State: SimState<Time>,
    Time: SimTime,
{
    /// Update the simulation according to the specific type of event. See [`Event::execute()`].
    fn execute(&mut self, simulation_state: &mut State, event_queue: &mut EventQueue<State, Time>);
}

/// Adapts an [`OkEvent`] into an [`Event`] that always succeeds.
///
/// The wrapper prints as the event it holds.
pub struct Infallible<E>(pub E);

impl<E: Debug> Debug for Infallible<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl<State, Time, OkEventType> Event<State, Time> for Infallible<OkEventType>
where
    State: SimState<Time>,
    Time: SimTime,
    OkEventType: OkEvent<State, Time>,
{
    fn execute(&mut self, simulation_state: &mut State, event_queue: &mut EventQueue<State, Time>) -> crate::Result {
        OkEvent::execute(&mut self.0, simulation_state, event_queue);
        Ok(())
    }
}
