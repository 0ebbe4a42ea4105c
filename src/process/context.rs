use super::{Process, ProcessId, ProcessState};
use crate::engine::EventQueue;
use crate::resource::{PoolId, ResourcePool};
use crate::SimTime;

use std::ops::Add;

/// Everything an actor may touch during its turn.
///
/// Handed to [`Process::resume()`]. Releases, capacity changes and spawns take effect immediately; any actor they
/// wake is activated later in the same instant, after the current turn ends.
pub struct Context<'a, State, Time>
where
    State: ProcessState<Time>,
    Time: SimTime,
{
    process: ProcessId,
    state: &'a mut State,
    queue: &'a mut EventQueue<State, Time>,
}

impl<'a, State, Time> Context<'a, State, Time>
where
    State: ProcessState<Time>,
    Time: SimTime + Clone + Add<Output = Time>,
{
    pub(crate) fn new(process: ProcessId, state: &'a mut State, queue: &'a mut EventQueue<State, Time>) -> Self {
        Self { process, state, queue }
    }

    /// The actor being resumed.
    pub fn id(&self) -> ProcessId {
        self.process
    }

    pub fn now(&self) -> &Time {
        self.queue.current_time()
    }

    pub fn state(&self) -> &State {
        &*self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut *self.state
    }

    /// # Errors
    ///
    /// [`Error::UnknownPool`] if `pool` is not registered.
    ///
    /// [`Error::UnknownPool`]: crate::Error::UnknownPool
    pub fn pool(&self, pool: PoolId) -> crate::Result<&ResourcePool> {
        self.state.runtime().pool(pool)
    }

    /// Start a new, independent actor. It first runs later in the current instant.
    ///
    /// # Errors
    ///
    /// Propagates scheduling errors from the event queue.
    pub fn spawn<P>(&mut self, process: P) -> crate::Result<ProcessId>
    where
        P: Process<State, Time> + 'static,
    {
        self.state.runtime_mut().spawn(&mut *self.queue, Box::new(process))
    }

    /// Give back units this actor holds. Waiters admitted by the release are woken in the current instant.
    ///
    /// # Errors
    ///
    /// [`Error::ExcessRelease`] if this actor holds fewer units of `pool` than `units`.
    ///
    /// [`Error::ExcessRelease`]: crate::Error::ExcessRelease
    pub fn release(&mut self, pool: PoolId, units: usize) -> crate::Result {
        self.state.runtime_mut().release(&mut *self.queue, self.process, pool, units)
    }

    /// Change a pool's capacity on the spot. Waiters an increase makes room for are woken in the current instant.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownPool`] if `pool` is not registered, [`Error::UnsatisfiableRequest`] if a waiter on the pool
    /// needs more units than `capacity`.
    ///
    /// [`Error::UnknownPool`]: crate::Error::UnknownPool
    /// [`Error::UnsatisfiableRequest`]: crate::Error::UnsatisfiableRequest
    pub fn set_capacity(&mut self, pool: PoolId, capacity: usize) -> crate::Result {
        self.state.runtime_mut().set_capacity(&mut *self.queue, pool, capacity)
    }
}
