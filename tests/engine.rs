mod util;

use ordered_float::NotNan;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};
use rand_pcg::Pcg64;
use servicedesk::engine::{EventQueue, Infallible, OkEvent, Simulation};
use servicedesk::process::{Context, Process, ProcessState, Runtime, Step};
use servicedesk::resource::{PoolId, ResourcePool};
use servicedesk::{Priority, SimState};

type Time = NotNan<f64>;

fn at(value: f64) -> Time {
    NotNan::new(value).expect("test times are never NaN")
}

/// Store with a bank of servers, customers arriving at rate 4 per minute
struct Store {
    runtime: Runtime<Store, Time>,
    servers: Option<PoolId>,
    arrival_distr: Exp<f64>,
    service_distr: Exp<f64>,
    customers_served: usize,
    total_time_in_queue: f64,
    busiest: usize,
    complete: bool,
    rng: Pcg64,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Store({} served)", self.customers_served)
    }
}

impl Store {
    fn new(service_rate: f64, rng: Pcg64) -> Self {
        Self {
            runtime: Runtime::new(),
            servers: None,
            arrival_distr: Exp::new(4.0).unwrap(),
            service_distr: Exp::new(service_rate).unwrap(),
            customers_served: 0,
            total_time_in_queue: 0.0,
            busiest: 0,
            complete: false,
            rng,
        }
    }

    fn draw(&mut self, service: bool) -> Time {
        let distr = if service { self.service_distr } else { self.arrival_distr };
        at(distr.sample(&mut self.rng))
    }
}

impl SimState<Time> for Store {
    fn is_complete(&self, _: &Time) -> bool {
        self.complete
    }
}

impl ProcessState<Time> for Store {
    fn runtime(&self) -> &Runtime<Self, Time> {
        &self.runtime
    }

    fn runtime_mut(&mut self) -> &mut Runtime<Self, Time> {
        &mut self.runtime
    }
}

#[derive(Debug)]
enum CustomerStage {
    Arrive,
    Served,
    Leave,
}

#[derive(Debug)]
struct Customer {
    arrival_time: Time,
    stage: CustomerStage,
}

impl Process<Store, Time> for Customer {
    fn resume(&mut self, cx: &mut Context<'_, Store, Time>) -> servicedesk::Result<Step<Time>> {
        let servers = cx.state().servers.expect("servers are registered before the run");
        match self.stage {
            CustomerStage::Arrive => {
                self.arrival_time = *cx.now();
                self.stage = CustomerStage::Served;
                Ok(Step::Acquire { pool: servers, units: 1 })
            }
            CustomerStage::Served => {
                let pool = cx.pool(servers)?;
                assert!(pool.in_use() <= pool.capacity(), "pool over capacity");
                let in_use = pool.in_use();
                let waited = (*cx.now() - self.arrival_time).into_inner();

                let store = cx.state_mut();
                store.busiest = store.busiest.max(in_use);
                store.total_time_in_queue += waited;
                self.stage = CustomerStage::Leave;
                Ok(Step::Hold(store.draw(true)))
            }
            CustomerStage::Leave => {
                cx.state_mut().customers_served += 1;
                Ok(Step::Done)
            }
        }
    }
}

/// Spawns a customer after every exponential gap, forever
#[derive(Debug)]
struct Arrivals {
    started: bool,
}

impl Process<Store, Time> for Arrivals {
    fn priority(&self) -> Priority {
        Priority(-1)
    }

    fn resume(&mut self, cx: &mut Context<'_, Store, Time>) -> servicedesk::Result<Step<Time>> {
        if self.started {
            cx.spawn(Customer {
                arrival_time: *cx.now(),
                stage: CustomerStage::Arrive,
            })?;
        }
        self.started = true;
        Ok(Step::Hold(cx.state_mut().draw(false)))
    }
}

#[derive(Debug)]
struct EndEvent;

impl OkEvent<Store, Time> for EndEvent {
    fn execute(&mut self, simulation_state: &mut Store, _: &mut EventQueue<Store, Time>) {
        simulation_state.complete = true;
    }
}

fn run_store(seed: u64, servers: usize, service_rate: f64) -> Simulation<Store, Time> {
    let store = Store::new(service_rate, Pcg64::seed_from_u64(seed));
    let mut sim = Simulation::new(store, at(0.0));
    let pool = sim.add_pool(ResourcePool::new("servers", servers));
    sim.state_mut().servers = Some(pool);
    sim.schedule(Infallible(EndEvent), at(540.0)).unwrap();
    sim.spawn(Arrivals { started: false }).unwrap();

    sim.run().expect("simulation should complete normally");
    assert_eq!(at(540.0), *sim.current_time(), "unexpected end time");
    sim
}

#[test]
fn single_server_serves_the_arrival_stream() {
    let sim = run_store(11434450237083315284, 1, 6.0);
    let store = sim.state();
    // about 4 * 540 arrivals
    assert!(
        (1900..2400).contains(&store.customers_served),
        "unexpected number of customers made it through the system: {}",
        store.customers_served
    );
    assert_eq!(1, store.busiest);
    assert!(store.total_time_in_queue > 0.0);
}

#[test]
fn pool_never_exceeds_its_capacity() {
    let sim = run_store(7082446179938253086, 2, 3.0);
    let store = sim.state();
    assert!(store.busiest <= 2);
    assert!(store.customers_served > 1900);
}

#[test]
fn more_servers_mean_less_waiting() {
    let crowded = run_store(13009076887838060007, 1, 6.0);
    let crowded = crowded.state();
    let roomy = run_store(13009076887838060007, 3, 6.0);
    let roomy = roomy.state();
    assert!(
        roomy.total_time_in_queue < crowded.total_time_in_queue / 4.0,
        "three servers waited {} against {} for one",
        roomy.total_time_in_queue,
        crowded.total_time_in_queue
    );
}

#[test]
fn same_seed_replays_exactly() {
    let first = run_store(42, 2, 3.0);
    let first = first.state();
    let second = run_store(42, 2, 3.0);
    let second = second.state();
    assert_eq!(first.customers_served, second.customers_served);
    assert_floats_near_equal!(
        first.total_time_in_queue,
        second.total_time_in_queue,
        "replayed run waited a different amount of time"
    );
}

#[derive(Debug, Default)]
struct Journal {
    executed: Vec<(i64, Priority, usize)>,
}

impl SimState<i64> for Journal {}

#[derive(Debug)]
struct Entry {
    priority: Priority,
    order: usize,
}

impl OkEvent<Journal, i64> for Entry {
    fn execute(&mut self, simulation_state: &mut Journal, event_queue: &mut EventQueue<Journal, i64>) {
        simulation_state
            .executed
            .push((*event_queue.current_time(), self.priority, self.order));
    }
}

#[test]
fn events_execute_in_time_then_priority_then_insertion_order() {
    let mut rng = Pcg64::seed_from_u64(0x5eed);
    let mut sim = Simulation::new(Journal::default(), 0_i64);
    for order in 0..500 {
        let time = rng.random_range(0..20);
        let priority = Priority(rng.random_range(0..4));
        sim.schedule_prioritized(Infallible(Entry { priority, order }), time, priority)
            .unwrap();
    }
    let summary = sim.run().unwrap();
    assert_eq!(500, summary.events_executed);

    let executed = &sim.state().executed;
    for pair in executed.windows(2) {
        assert!(pair[0] < pair[1], "{:?} executed before {:?}", pair[0], pair[1]);
    }
}
