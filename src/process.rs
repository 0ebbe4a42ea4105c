//! Cooperative actors built on top of the event queue.
//!
//! A [`Process`] is a small state machine. Each call to [`Process::resume()`] runs the actor from its current stage up
//! to its next suspend point and reports that point as a [`Step`]: a timed hold, a wait for pool units, or the end of
//! the behavior. The [`Runtime`] owns every live actor, turns steps into scheduled activations and keeps track of the
//! pool units each actor holds, so nothing an actor acquired outlives it.
//!
//! Between two suspend points an actor has exclusive access to the simulation through its [`Context`]; no other actor
//! runs until it yields.

mod context;
mod runtime;

pub use context::Context;
pub use runtime::{ProcessStatus, Runtime};

use crate::engine::Simulation;
use crate::resource::{PoolId, ResourcePool};
use crate::{Priority, SimState, SimTime};

use std::fmt::{self, Debug};
use std::ops::Add;

/// Identifies an actor for as long as it is live. Ids are never reused within a run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessId(pub(crate) u64);

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "process#{}", self.0)
    }
}

/// Where an actor suspends after a call to [`Process::resume()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step<Time> {
    /// Resume once the clock has advanced by this duration. A zero duration resumes later in the same instant.
    Hold(Time),
    /// Resume once the pool has granted this many units. Resumes without suspending when they are free right away.
    Acquire { pool: PoolId, units: usize },
    /// The behavior is finished; any units still held go back to their pools.
    Done,
}

/// Simulation state that hosts a process [`Runtime`].
pub trait ProcessState<Time>: SimState<Time> + Sized
where
    Time: SimTime,
{
    fn runtime(&self) -> &Runtime<Self, Time>;

    fn runtime_mut(&mut self) -> &mut Runtime<Self, Time>;
}

/// A suspendable unit of simulated behavior.
///
/// Implementors keep an explicit stage marker and advance it inside [`resume()`]. Whatever an actor needs to carry
/// from one stage to the next lives in its own fields.
///
/// [`resume()`]: Process::resume
pub trait Process<State, Time>: Debug
where
    State: ProcessState<Time>,
    Time: SimTime,
{
    /// Orders this actor's activations against others at the same instant, and its place on pool wait-lines. Read
    /// once, when the actor is spawned.
    fn priority(&self) -> Priority {
        Priority::default()
    }

    /// Run from the current stage to the next suspend point.
    ///
    /// # Errors
    ///
    /// Any error stops the simulation run and is returned from it unchanged.
    fn resume(&mut self, cx: &mut Context<'_, State, Time>) -> crate::Result<Step<Time>>;
}

impl<State, Time> Simulation<State, Time>
where
    State: ProcessState<Time>,
    Time: SimTime + Clone + Add<Output = Time>,
{
    /// Hand a new actor to the runtime. Its first activation happens at the current time.
    ///
    /// # Errors
    ///
    /// Propagates scheduling errors from the event queue.
    pub fn spawn<P>(&mut self, process: P) -> crate::Result<ProcessId>
    where
        P: Process<State, Time> + 'static,
    {
        self.state
            .runtime_mut()
            .spawn(&mut self.event_queue, Box::new(process))
    }

    /// Register a resource pool with the runtime.
    pub fn add_pool(&mut self, pool: ResourcePool) -> PoolId {
        self.state.runtime_mut().add_pool(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::PoolSnapshot;
    use crate::Error;

    #[derive(Debug)]
    struct Shop {
        runtime: Runtime<Shop, i64>,
        journal: Vec<(i64, &'static str, u32)>,
    }

    impl Shop {
        fn new() -> Self {
            Self {
                runtime: Runtime::new(),
                journal: Vec::new(),
            }
        }
    }

    impl SimState<i64> for Shop {}

    impl ProcessState<i64> for Shop {
        fn runtime(&self) -> &Runtime<Self, i64> {
            &self.runtime
        }

        fn runtime_mut(&mut self) -> &mut Runtime<Self, i64> {
            &mut self.runtime
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Stage {
        Arrive,
        Serve,
        Leave,
    }

    /// Takes its units, holds them for `service` ticks and leaves without releasing explicitly.
    #[derive(Debug)]
    struct Customer {
        tag: u32,
        pool: PoolId,
        service: i64,
        units: usize,
        priority: Priority,
        stage: Stage,
    }

    impl Customer {
        fn new(tag: u32, pool: PoolId, service: i64) -> Self {
            Self {
                tag,
                pool,
                service,
                units: 1,
                priority: Priority::default(),
                stage: Stage::Arrive,
            }
        }
    }

    impl Process<Shop, i64> for Customer {
        fn priority(&self) -> Priority {
            self.priority
        }

        fn resume(&mut self, cx: &mut Context<'_, Shop, i64>) -> crate::Result<Step<i64>> {
            let now = *cx.now();
            match self.stage {
                Stage::Arrive => {
                    cx.state_mut().journal.push((now, "arrive", self.tag));
                    self.stage = Stage::Serve;
                    Ok(Step::Acquire {
                        pool: self.pool,
                        units: self.units,
                    })
                }
                Stage::Serve => {
                    cx.state_mut().journal.push((now, "serve", self.tag));
                    self.stage = Stage::Leave;
                    Ok(Step::Hold(self.service))
                }
                Stage::Leave => {
                    cx.state_mut().journal.push((now, "leave", self.tag));
                    Ok(Step::Done)
                }
            }
        }
    }

    /// Resizes a pool after a delay, then finishes.
    #[derive(Debug)]
    struct Resize {
        pool: PoolId,
        after: i64,
        to: usize,
        waited: bool,
    }

    impl Resize {
        fn new(pool: PoolId, after: i64, to: usize) -> Self {
            Self {
                pool,
                after,
                to,
                waited: false,
            }
        }
    }

    impl Process<Shop, i64> for Resize {
        fn resume(&mut self, cx: &mut Context<'_, Shop, i64>) -> crate::Result<Step<i64>> {
            if !self.waited {
                self.waited = true;
                return Ok(Step::Hold(self.after));
            }
            cx.set_capacity(self.pool, self.to)?;
            Ok(Step::Done)
        }
    }

    fn shop_with_pool(capacity: usize) -> (Simulation<Shop, i64>, PoolId) {
        let mut sim = Simulation::new(Shop::new(), 0);
        let pool = sim.add_pool(ResourcePool::new("counter", capacity));
        (sim, pool)
    }

    fn served(sim: &Simulation<Shop, i64>) -> Vec<(i64, u32)> {
        sim.state()
            .journal
            .iter()
            .filter(|(_, what, _)| *what == "serve")
            .map(|(time, _, tag)| (*time, *tag))
            .collect()
    }

    #[test]
    fn customers_are_served_first_come_first_served() {
        let (mut sim, pool) = shop_with_pool(1);
        for tag in 0..3 {
            sim.spawn(Customer::new(tag, pool, 4)).unwrap();
        }
        sim.run().unwrap();

        assert_eq!(vec![(0, 0), (4, 1), (8, 2)], served(&sim));
        let runtime = sim.state().runtime();
        assert_eq!(0, runtime.live());
        assert_eq!(3, runtime.completed());
        assert_eq!(0, runtime.pool(pool).unwrap().in_use(), "units should be released on termination");
    }

    #[test]
    fn wait_line_respects_priority() {
        let (mut sim, pool) = shop_with_pool(1);
        sim.spawn(Customer::new(0, pool, 4)).unwrap();
        sim.spawn(Customer::new(1, pool, 4)).unwrap();
        let mut urgent = Customer::new(2, pool, 4);
        urgent.priority = Priority(-1);
        sim.spawn(urgent).unwrap();
        sim.run().unwrap();

        // the urgent customer arrives first because its activation sorts first at time 0
        assert_eq!(vec![(0, 2), (4, 0), (8, 1)], served(&sim));
    }

    #[test]
    fn waiting_actor_is_parked_until_granted() {
        let (mut sim, pool) = shop_with_pool(1);
        let first = sim.spawn(Customer::new(0, pool, 10)).unwrap();
        let second = sim.spawn(Customer::new(1, pool, 10)).unwrap();
        sim.run_until(5).unwrap();

        let runtime = sim.state().runtime();
        assert_eq!(Some(ProcessStatus::Holding), runtime.status(first));
        assert_eq!(Some(ProcessStatus::Waiting(pool)), runtime.status(second));
        assert_eq!(1, runtime.holdings(first, pool));
        assert_eq!(0, runtime.holdings(second, pool));
        assert_eq!(1, runtime.waiting());
    }

    #[test]
    fn capacity_increase_wakes_waiter_in_the_same_instant() {
        let (mut sim, pool) = shop_with_pool(1);
        sim.spawn(Customer::new(0, pool, 100)).unwrap();
        sim.spawn(Customer::new(1, pool, 100)).unwrap();
        sim.spawn(Resize::new(pool, 7, 2)).unwrap();
        sim.run().unwrap();

        assert_eq!(vec![(0, 0), (7, 1)], served(&sim));
        let snapshots: Vec<PoolSnapshot> = sim.state().runtime().snapshots();
        assert_eq!(2, snapshots[0].capacity);
        assert_eq!(0, snapshots[0].in_use);
    }

    #[test]
    fn unsatisfiable_request_stops_the_run() {
        let (mut sim, pool) = shop_with_pool(0);
        sim.spawn(Customer::new(0, pool, 1)).unwrap();

        let result = sim.run();
        assert!(matches!(result, Err(Error::UnsatisfiableRequest { capacity: 0, .. })));
    }

    #[test]
    fn shrinking_below_a_waiting_request_stops_the_run() {
        let (mut sim, pool) = shop_with_pool(3);
        sim.spawn(Customer::new(0, pool, 100)).unwrap();
        let mut bulk = Customer::new(1, pool, 1);
        bulk.units = 3;
        sim.spawn(bulk).unwrap();
        sim.spawn(Customer::new(2, pool, 1)).unwrap();
        sim.spawn(Resize::new(pool, 7, 2)).unwrap();

        let result = sim.run();
        assert!(matches!(
            result,
            Err(Error::UnsatisfiableRequest {
                requested: 3,
                capacity: 2,
                ..
            })
        ));
        assert_eq!(&7, sim.current_time());
    }

    #[test]
    fn negative_hold_stops_the_run() {
        let (mut sim, pool) = shop_with_pool(1);
        sim.spawn(Customer::new(0, pool, -1)).unwrap();

        let result = sim.run();
        assert!(matches!(result, Err(Error::InvalidSchedule { .. })));
    }

    #[test]
    fn unknown_pool_is_reported() {
        let (mut sim, _) = shop_with_pool(1);
        sim.spawn(Customer::new(0, PoolId(4), 1)).unwrap();

        assert!(matches!(sim.run(), Err(Error::UnknownPool(4))));
    }
}
