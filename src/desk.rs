//! The IT service desk workday built on the engine, the resource pools and the actor runtime.
//!
//! Requests of three categories arrive over the shift. Each one first goes through a short intake at the office and
//! then hands over to exactly one service task: an on-site repair ride, diagnostics or a software install. A ride
//! request may instead escalate into a network deployment, which ends up adding a worker to the field pool. Once the
//! shift closes, service tasks that get a worker simply give it back and stay counted as unfinished.
//!
//! [`ServiceDesk`] wires everything together from a [`DeskConfig`] and produces a [`DeskReport`].

mod config;
mod generators;
mod intake;
mod report;
mod shift;
mod stats;
mod tasks;

pub use config::{DeskConfig, Targets, UniformRange, WorkloadConfig, SHIFT_LENGTH};
pub use generators::RequestGenerator;
pub use intake::IntakeTask;
pub use report::{CategoryCounts, DeskReport};
pub use shift::{IntakeCutoff, ShiftClose};
pub use stats::{Counter, Statistics};
pub use tasks::{Deployment, ServiceTask};

use crate::engine::{Infallible, RunSummary, Simulation};
use crate::process::{ProcessState, Runtime};
use crate::resource::{PoolId, ResourcePool};
use crate::sampling::{minutes, Delay, Minutes};
use crate::{Priority, SimState};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use std::fmt;

/// Intake tasks go ahead of every service task.
pub const INTAKE_PRIORITY: Priority = Priority(1);
/// Software installs and network deployments.
pub const EXPEDITED_PRIORITY: Priority = Priority(2);
/// Rides and diagnostics.
pub const SERVICE_PRIORITY: Priority = Priority(3);
pub const GENERATOR_PRIORITY: Priority = Priority(3);

/// Kind of customer request.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Ride,
    Diagnostics,
    SoftwareInstall,
}

impl Category {
    pub const COUNT: usize = 3;
    pub const ALL: [Category; Category::COUNT] = [Category::Ride, Category::Diagnostics, Category::SoftwareInstall];

    pub const fn index(self) -> usize {
        match self {
            Category::Ride => 0,
            Category::Diagnostics => 1,
            Category::SoftwareInstall => 2,
        }
    }

    /// Who performs the follow-up service.
    pub const fn service_role(self) -> Role {
        match self {
            Category::Ride => Role::Field,
            Category::Diagnostics | Category::SoftwareInstall => Role::Office,
        }
    }

    pub const fn service_priority(self) -> Priority {
        match self {
            Category::SoftwareInstall => EXPEDITED_PRIORITY,
            Category::Ride | Category::Diagnostics => SERVICE_PRIORITY,
        }
    }

    /// Whether new requests of this category stop arriving at the intake cutoff.
    pub const fn gated_by_cutoff(self) -> bool {
        matches!(self, Category::Diagnostics)
    }

    /// Arrivals per configured target unit; diagnostics arrive twice as densely as their target suggests.
    pub const fn arrival_factor(self) -> f64 {
        match self {
            Category::Diagnostics => 2.0,
            Category::Ride | Category::SoftwareInstall => 1.0,
        }
    }

    /// Short label used in the summary line of the report.
    pub const fn code(self) -> &'static str {
        match self {
            Category::Ride => "RIDE",
            Category::Diagnostics => "DIA",
            Category::SoftwareInstall => "SWI",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Category::Ride => "ride",
            Category::Diagnostics => "diagnostics",
            Category::SoftwareInstall => "software install",
        };
        f.write_str(name)
    }
}

/// Staff category a task draws its worker from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Intake, diagnostics and software installs.
    Office,
    /// Rides and network deployments.
    Field,
}

/// Which pools serve which role.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Staffing {
    Separate { office: PoolId, field: PoolId },
    Universal(PoolId),
}

impl Staffing {
    pub fn pool(&self, role: Role) -> PoolId {
        match (*self, role) {
            (Staffing::Separate { office, .. }, Role::Office) => office,
            (Staffing::Separate { field, .. }, Role::Field) => field,
            (Staffing::Universal(pool), _) => pool,
        }
    }
}

/// Workload constants turned into ready-to-sample durations.
#[derive(Debug, Clone)]
pub(crate) struct Plan {
    intake: [Delay; Category::COUNT],
    ride: [Delay; 3],
    diagnostics: [Delay; 1],
    install: [Delay; 1],
    deployment_setup: Delay,
    /// Deployments hold their worker until this time.
    release_at: Minutes,
    escalation_probability: f64,
    escalation_cap: usize,
}

impl Plan {
    fn new(workload: &WorkloadConfig) -> crate::Result<Self> {
        let travel = Delay::uniform(workload.travel.low, workload.travel.high)?;
        Ok(Self {
            intake: [
                Delay::fixed(workload.intake_duration(Category::Ride))?,
                Delay::fixed(workload.intake_duration(Category::Diagnostics))?,
                Delay::fixed(workload.intake_duration(Category::SoftwareInstall))?,
            ],
            ride: [travel, Delay::exponential(workload.repair_mean)?, travel],
            diagnostics: [Delay::exponential(workload.diagnostics_mean)?],
            install: [Delay::uniform(workload.install.low, workload.install.high)?],
            deployment_setup: Delay::fixed(workload.deployment_setup)?,
            release_at: minutes(workload.shift_length + workload.deployment_overtime)?,
            escalation_probability: workload.escalation_probability,
            escalation_cap: workload.escalation_cap,
        })
    }

    pub(crate) fn intake(&self, category: Category) -> Delay {
        self.intake[category.index()]
    }

    /// Consecutive holds of a service task while it has its worker.
    pub(crate) fn phases(&self, category: Category) -> &[Delay] {
        match category {
            Category::Ride => &self.ride,
            Category::Diagnostics => &self.diagnostics,
            Category::SoftwareInstall => &self.install,
        }
    }
}

/// Simulation state of the desk: the actor runtime, the shift gates, the counters and the random stream.
#[derive(Debug)]
pub struct Desk {
    runtime: Runtime<Desk, Minutes>,
    staffing: Staffing,
    plan: Plan,
    open: bool,
    cutoff_passed: bool,
    stats: Statistics,
    rng: Pcg64,
}

impl Desk {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Whether diagnostics intake and escalations have stopped.
    pub fn cutoff_passed(&self) -> bool {
        self.cutoff_passed
    }

    pub fn pool_for(&self, role: Role) -> PoolId {
        self.staffing.pool(role)
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut Statistics {
        &mut self.stats
    }

    pub(crate) fn plan(&self) -> &Plan {
        &self.plan
    }

    /// Draw the length of a hold starting at `now` from the desk's random stream.
    pub(crate) fn sample(&mut self, delay: &Delay, now: Minutes) -> Minutes {
        delay.sample(&mut self.rng, now)
    }

    /// Decide whether a finished ride intake escalates into a deployment, and record it if so.
    ///
    /// The coin is always tossed, so the random stream does not depend on the cap or the cutoff.
    pub(crate) fn try_escalate(&mut self) -> bool {
        let toss: f64 = self.rng.random();
        if toss >= self.plan.escalation_probability {
            return false;
        }
        if self.cutoff_passed {
            log::debug!("escalation refused, intake cutoff has passed");
            return false;
        }
        if self.stats.get(Counter::Escalations) >= self.plan.escalation_cap {
            log::debug!("escalation refused, cap of {} reached", self.plan.escalation_cap);
            return false;
        }
        self.stats.increment(Counter::Escalations);
        true
    }
}

impl SimState<Minutes> for Desk {}

impl ProcessState<Minutes> for Desk {
    fn runtime(&self) -> &Runtime<Self, Minutes> {
        &self.runtime
    }

    fn runtime_mut(&mut self) -> &mut Runtime<Self, Minutes> {
        &mut self.runtime
    }
}

/// One simulated workday, ready to run.
#[derive(Debug)]
pub struct ServiceDesk {
    simulation: Simulation<Desk, Minutes>,
    universal: bool,
    run_length: Minutes,
    seed: u64,
    last_run: RunSummary,
}

impl ServiceDesk {
    /// Validate the configuration, register the staff pools, and schedule the shift markers and request generators.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if the configuration is inconsistent; nothing is scheduled in that case.
    ///
    /// [`Error::Configuration`]: crate::Error::Configuration
    pub fn new(config: &DeskConfig) -> crate::Result<Self> {
        config.validate()?;
        let workload = &config.workload;
        let plan = Plan::new(workload)?;

        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        log::info!("seeding the desk with {}", seed);

        let mut runtime = Runtime::new();
        let staffing = if config.universal {
            Staffing::Universal(runtime.add_pool(ResourcePool::new("Universal Workers", config.universal_workers)))
        } else {
            Staffing::Separate {
                office: runtime.add_pool(ResourcePool::new("Office Workers", config.office_workers)),
                field: runtime.add_pool(ResourcePool::new("Ride Workers", config.ride_workers)),
            }
        };

        let desk = Desk {
            runtime,
            staffing,
            plan,
            open: true,
            cutoff_passed: false,
            stats: Statistics::new(),
            rng: Pcg64::seed_from_u64(seed),
        };
        let mut simulation = Simulation::new(desk, minutes(0.0)?);

        simulation.schedule_prioritized(Infallible(ShiftClose), minutes(workload.shift_length)?, Priority::URGENT)?;
        simulation.schedule_prioritized(Infallible(IntakeCutoff), minutes(workload.intake_cutoff)?, Priority::URGENT)?;

        for category in Category::ALL {
            let target = config.targets.get(category);
            if target == 0 {
                log::debug!("{} generator is inert, target is zero", category);
                continue;
            }
            let mean_gap = workload.arrival_window / (target as f64 * category.arrival_factor());
            let spacing = Delay::normal(mean_gap, mean_gap * workload.arrival_spread)?;
            simulation.spawn(RequestGenerator::new(category, target, spacing))?;
        }

        Ok(Self {
            simulation,
            universal: config.universal,
            run_length: minutes(workload.run_length)?,
            seed,
            last_run: RunSummary::default(),
        })
    }

    /// Run the day up to the run-length ceiling and report on it.
    ///
    /// # Errors
    ///
    /// Any error raised by an actor stops the run and is returned unchanged.
    pub fn run(&mut self) -> crate::Result<DeskReport> {
        self.last_run = self.simulation.run_until(self.run_length)?;
        Ok(self.report())
    }

    /// Counters and pool snapshots as they stand now.
    pub fn report(&self) -> DeskReport {
        DeskReport::collect(
            self.simulation.state(),
            self.universal,
            *self.simulation.current_time(),
            self.simulation.events_executed(),
            self.last_run.events_discarded,
            self.seed,
        )
    }

    /// Seed of the random stream, either configured or drawn at construction.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn desk(&self) -> &Desk {
        self.simulation.state()
    }

    pub fn simulation(&self) -> &Simulation<Desk, Minutes> {
        &self.simulation
    }

    /// Exclusive access to the underlying simulation, e.g. to spawn extra actors before running.
    pub fn simulation_mut(&mut self) -> &mut Simulation<Desk, Minutes> {
        &mut self.simulation
    }
}
