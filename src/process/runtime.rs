use super::{Context, Process, ProcessId, ProcessState, Step};
use crate::engine::{Event, EventQueue};
use crate::resource::{Admission, PoolId, PoolSnapshot, ResourcePool, Waiter};
use crate::{Error, Priority, SimTime};

use std::collections::BTreeMap;
use std::ops::Add;

/// What a live actor is currently doing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProcessStatus {
    /// An activation at the current instant is pending: freshly spawned, or just granted pool units.
    Ready,
    /// Executing its current turn.
    Running,
    /// Suspended for a duration.
    Holding,
    /// Parked on the wait-line of a pool.
    Waiting(PoolId),
}

#[derive(Debug)]
struct Slot<State, Time>
where
    State: ProcessState<Time>,
    Time: SimTime,
{
    /// `None` while the actor is executing its turn.
    process: Option<Box<dyn Process<State, Time>>>,
    priority: Priority,
    status: ProcessStatus,
    holdings: Vec<(PoolId, usize)>,
}

impl<State, Time> Slot<State, Time>
where
    State: ProcessState<Time>,
    Time: SimTime,
{
    fn held(&self, pool: PoolId) -> usize {
        self.holdings
            .iter()
            .find(|(held_pool, _)| *held_pool == pool)
            .map_or(0, |(_, units)| *units)
    }

    fn hold(&mut self, pool: PoolId, units: usize) {
        match self.holdings.iter_mut().find(|(held_pool, _)| *held_pool == pool) {
            Some((_, held)) => *held += units,
            None => self.holdings.push((pool, units)),
        }
    }

    fn give_back(&mut self, pool: PoolId, units: usize) {
        if let Some((_, held)) = self.holdings.iter_mut().find(|(held_pool, _)| *held_pool == pool) {
            *held -= units;
        }
        self.holdings.retain(|(_, held)| *held > 0);
    }
}

/// Owns every live actor and every resource pool of a simulation.
///
/// Actors are handed over on spawn and dropped when their behavior completes. The runtime never lets the spawner keep
/// a reference, so a spawned actor is fully independent of its parent.
#[derive(Debug)]
pub struct Runtime<State, Time>
where
    State: ProcessState<Time>,
    Time: SimTime,
{
    pools: Vec<ResourcePool>,
    processes: BTreeMap<ProcessId, Slot<State, Time>>,
    next_id: u64,
    completed: u64,
}

impl<State, Time> Default for Runtime<State, Time>
where
    State: ProcessState<Time>,
    Time: SimTime,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<State, Time> Runtime<State, Time>
where
    State: ProcessState<Time>,
    Time: SimTime,
{
    pub fn new() -> Self {
        Self {
            pools: Vec::new(),
            processes: BTreeMap::new(),
            next_id: 0,
            completed: 0,
        }
    }

    pub fn add_pool(&mut self, pool: ResourcePool) -> PoolId {
        let id = PoolId(self.pools.len());
        log::debug!("registered {} as {} with capacity {}", pool.name(), id, pool.capacity());
        self.pools.push(pool);
        id
    }

    /// # Errors
    ///
    /// [`Error::UnknownPool`] if `pool` was not registered with this runtime.
    pub fn pool(&self, pool: PoolId) -> crate::Result<&ResourcePool> {
        self.pools.get(pool.0).ok_or(Error::UnknownPool(pool.0))
    }

    fn pool_mut(&mut self, pool: PoolId) -> crate::Result<&mut ResourcePool> {
        self.pools.get_mut(pool.0).ok_or(Error::UnknownPool(pool.0))
    }

    pub fn snapshots(&self) -> Vec<PoolSnapshot> {
        self.pools.iter().map(ResourcePool::snapshot).collect()
    }

    /// Number of actors that have not finished yet.
    pub fn live(&self) -> usize {
        self.processes.len()
    }

    /// Number of actors parked on a pool's wait-line.
    pub fn waiting(&self) -> usize {
        self.processes
            .values()
            .filter(|slot| matches!(slot.status, ProcessStatus::Waiting(_)))
            .count()
    }

    /// Number of actors whose behavior has completed.
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Status of a live actor, `None` once it has finished.
    pub fn status(&self, process: ProcessId) -> Option<ProcessStatus> {
        self.processes.get(&process).map(|slot| slot.status)
    }

    /// Units of `pool` currently held by `process`.
    pub fn holdings(&self, process: ProcessId, pool: PoolId) -> usize {
        self.processes.get(&process).map_or(0, |slot| slot.held(pool))
    }

    fn slot_mut(&mut self, process: ProcessId) -> crate::Result<&mut Slot<State, Time>> {
        self.processes
            .get_mut(&process)
            .ok_or(Error::UnknownProcess(process.0))
    }

    /// Take an actor out of its slot for the duration of its turn.
    fn check_out(&mut self, process: ProcessId) -> crate::Result<Box<dyn Process<State, Time>>> {
        let slot = self.slot_mut(process)?;
        let behavior = slot.process.take().ok_or(Error::UnknownProcess(process.0))?;
        slot.status = ProcessStatus::Running;
        Ok(behavior)
    }

    /// Put a suspended actor back, returning its priority.
    fn check_in(
        &mut self,
        process: ProcessId,
        behavior: Box<dyn Process<State, Time>>,
        status: ProcessStatus,
    ) -> crate::Result<Priority> {
        let slot = self.slot_mut(process)?;
        slot.process = Some(behavior);
        slot.status = status;
        Ok(slot.priority)
    }

    fn acquire(&mut self, process: ProcessId, pool: PoolId, units: usize) -> crate::Result<Admission> {
        let priority = self.slot_mut(process)?.priority;
        let admission = self.pool_mut(pool)?.acquire(process, units, priority)?;
        if admission == Admission::Granted {
            self.slot_mut(process)?.hold(pool, units);
        }
        Ok(admission)
    }
}

impl<State, Time> Runtime<State, Time>
where
    State: ProcessState<Time>,
    Time: SimTime + Clone + Add<Output = Time>,
{
    /// Take ownership of a new actor and schedule its first activation at the current time.
    pub(crate) fn spawn(
        &mut self,
        queue: &mut EventQueue<State, Time>,
        behavior: Box<dyn Process<State, Time>>,
    ) -> crate::Result<ProcessId> {
        let id = ProcessId(self.next_id);
        self.next_id += 1;
        let priority = behavior.priority();
        log::debug!("spawned {} as {:?} at {:?}", id, behavior, queue.current_time());
        self.processes.insert(
            id,
            Slot {
                process: Some(behavior),
                priority,
                status: ProcessStatus::Ready,
                holdings: Vec::new(),
            },
        );
        queue.schedule_now(Activation { process: id }, priority)?;
        Ok(id)
    }

    /// Return units held by `process` to `pool` and wake whoever that admits.
    ///
    /// # Errors
    ///
    /// [`Error::ExcessRelease`] if the actor holds fewer units than it releases.
    pub(crate) fn release(
        &mut self,
        queue: &mut EventQueue<State, Time>,
        process: ProcessId,
        pool: PoolId,
        units: usize,
    ) -> crate::Result {
        let held = self.slot_mut(process)?.held(pool);
        if units > held {
            return Err(Error::ExcessRelease {
                pool: self.pool(pool)?.name().to_string(),
                released: units,
                held,
            });
        }
        let admitted = self.pool_mut(pool)?.release(units)?;
        self.slot_mut(process)?.give_back(pool, units);
        self.wake(queue, pool, admitted)
    }

    /// Change a pool's capacity, waking waiters that now fit.
    ///
    /// # Errors
    ///
    /// [`Error::UnsatisfiableRequest`] if a waiter on the pool would no longer fit at all.
    pub(crate) fn set_capacity(
        &mut self,
        queue: &mut EventQueue<State, Time>,
        pool: PoolId,
        capacity: usize,
    ) -> crate::Result {
        let admitted = self.pool_mut(pool)?.set_capacity(capacity)?;
        self.wake(queue, pool, admitted)
    }

    /// Record grants made off a wait-line and resume each admitted actor in the current instant.
    fn wake(&mut self, queue: &mut EventQueue<State, Time>, pool: PoolId, admitted: Vec<Waiter>) -> crate::Result {
        for waiter in admitted {
            let slot = self.slot_mut(waiter.process)?;
            slot.hold(pool, waiter.units);
            slot.status = ProcessStatus::Ready;
            queue.schedule_now(
                Activation {
                    process: waiter.process,
                },
                waiter.priority,
            )?;
        }
        Ok(())
    }

    /// Drop a finished actor and return everything it still holds.
    fn terminate(&mut self, queue: &mut EventQueue<State, Time>, process: ProcessId) -> crate::Result {
        let slot = self
            .processes
            .remove(&process)
            .ok_or(Error::UnknownProcess(process.0))?;
        for (pool, units) in slot.holdings {
            log::debug!("{} finished holding {} units of {}", process, units, pool);
            let admitted = self.pool_mut(pool)?.release(units)?;
            self.wake(queue, pool, admitted)?;
        }
        self.completed += 1;
        log::debug!("{} finished at {:?}", process, queue.current_time());
        Ok(())
    }
}

/// Resumes one actor. Scheduled on spawn, after a timed hold, and when a pool grants units.
#[derive(Debug)]
pub(crate) struct Activation {
    process: ProcessId,
}

impl<State, Time> Event<State, Time> for Activation
where
    State: ProcessState<Time>,
    Time: SimTime + Clone + Add<Output = Time>,
{
    fn execute(&mut self, simulation_state: &mut State, event_queue: &mut EventQueue<State, Time>) -> crate::Result {
        let id = self.process;
        let mut behavior = simulation_state.runtime_mut().check_out(id)?;
        loop {
            let step = {
                let mut cx = Context::new(id, simulation_state, event_queue);
                behavior.resume(&mut cx)?
            };

            let runtime = simulation_state.runtime_mut();
            match step {
                Step::Hold(duration) => {
                    let wake_at = event_queue.current_time().clone() + duration;
                    let priority = runtime.check_in(id, behavior, ProcessStatus::Holding)?;
                    return event_queue.schedule_prioritized(Activation { process: id }, wake_at, priority);
                }
                Step::Acquire { pool, units } => match runtime.acquire(id, pool, units)? {
                    Admission::Granted => continue,
                    Admission::Queued => {
                        runtime.check_in(id, behavior, ProcessStatus::Waiting(pool))?;
                        return Ok(());
                    }
                },
                Step::Done => return runtime.terminate(event_queue, id),
            }
        }
    }
}
