use super::Category;
use crate::Error;

/// Default shift length in minutes, shared by every duration derived from the shift.
pub const SHIFT_LENGTH: f64 = 480.0;

/// Lower and upper bound of a uniformly distributed duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformRange {
    pub low: f64,
    pub high: f64,
}

impl UniformRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

/// Business constants of the workday. All durations are in minutes.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadConfig {
    /// The desk closes at this time.
    pub shift_length: f64,
    /// Diagnostics intake and escalations stop at this time.
    pub intake_cutoff: f64,
    /// Events past this time are discarded.
    pub run_length: f64,
    /// Window over which each generator spreads its target count.
    pub arrival_window: f64,
    /// Standard deviation of inter-arrival gaps, as a fraction of their mean.
    pub arrival_spread: f64,
    pub ride_intake: f64,
    pub diagnostics_intake: f64,
    pub install_intake: f64,
    /// One-way travel for an on-site repair.
    pub travel: UniformRange,
    pub repair_mean: f64,
    pub diagnostics_mean: f64,
    pub install: UniformRange,
    pub escalation_probability: f64,
    pub escalation_cap: usize,
    /// How long a deployment occupies its worker before the new worker joins the pool.
    pub deployment_setup: f64,
    /// A deployment keeps its worker until this long after the shift ends.
    pub deployment_overtime: f64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            shift_length: SHIFT_LENGTH,
            intake_cutoff: SHIFT_LENGTH / 2.0,
            run_length: 1000.0,
            arrival_window: SHIFT_LENGTH,
            arrival_spread: 0.25,
            ride_intake: 3.0,
            diagnostics_intake: 5.0,
            install_intake: 3.0,
            travel: UniformRange::new(10.0, 15.0),
            repair_mean: 40.0,
            diagnostics_mean: 150.0,
            install: UniformRange::new(10.0, 20.0),
            escalation_probability: 0.1,
            escalation_cap: 3,
            deployment_setup: 120.0,
            deployment_overtime: 90.0,
        }
    }
}

impl WorkloadConfig {
    pub fn intake_duration(&self, category: Category) -> f64 {
        match category {
            Category::Ride => self.ride_intake,
            Category::Diagnostics => self.diagnostics_intake,
            Category::SoftwareInstall => self.install_intake,
        }
    }

    /// # Errors
    ///
    /// [`Error::Configuration`] describing the first inconsistent constant.
    pub fn validate(&self) -> crate::Result {
        let positive = [
            ("shift length", self.shift_length),
            ("run length", self.run_length),
            ("arrival window", self.arrival_window),
            ("repair mean", self.repair_mean),
            ("diagnostics mean", self.diagnostics_mean),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::Configuration(format!("{} must be positive, got {}", name, value)));
            }
        }

        let non_negative = [
            ("intake cutoff", self.intake_cutoff),
            ("arrival spread", self.arrival_spread),
            ("ride intake", self.ride_intake),
            ("diagnostics intake", self.diagnostics_intake),
            ("install intake", self.install_intake),
            ("deployment setup", self.deployment_setup),
            ("deployment overtime", self.deployment_overtime),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::Configuration(format!("{} must not be negative, got {}", name, value)));
            }
        }

        for (name, range) in [("travel", self.travel), ("install", self.install)] {
            if !(range.low.is_finite() && range.high.is_finite() && 0.0 <= range.low && range.low < range.high) {
                return Err(Error::Configuration(format!(
                    "{} range [{}, {}) is not a valid positive interval",
                    name, range.low, range.high
                )));
            }
        }

        if self.intake_cutoff > self.shift_length {
            return Err(Error::Configuration(format!(
                "intake cutoff {} is after the end of the shift {}",
                self.intake_cutoff, self.shift_length
            )));
        }
        if self.run_length < self.shift_length {
            return Err(Error::Configuration(format!(
                "run length {} is shorter than the shift {}",
                self.run_length, self.shift_length
            )));
        }
        if !(0.0..=1.0).contains(&self.escalation_probability) {
            return Err(Error::Configuration(format!(
                "escalation probability {} is outside [0, 1]",
                self.escalation_probability
            )));
        }
        Ok(())
    }
}

/// Number of requests each generator aims to accept over the arrival window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Targets {
    pub ride: usize,
    pub diagnostics: usize,
    pub software_install: usize,
}

impl Targets {
    pub const fn new(ride: usize, diagnostics: usize, software_install: usize) -> Self {
        Self {
            ride,
            diagnostics,
            software_install,
        }
    }

    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::Ride => self.ride,
            Category::Diagnostics => self.diagnostics,
            Category::SoftwareInstall => self.software_install,
        }
    }
}

/// Startup configuration of one simulated workday.
#[derive(Debug, Clone, PartialEq)]
pub struct DeskConfig {
    pub targets: Targets,
    /// Office staff in separate-pool mode: intake, diagnostics and installs.
    pub office_workers: usize,
    /// Field staff in separate-pool mode: rides and deployments.
    pub ride_workers: usize,
    /// Staff every task from one universal pool instead of the office and field pools.
    pub universal: bool,
    pub universal_workers: usize,
    /// Seed for the random number generator; drawn from the thread RNG when absent.
    pub seed: Option<u64>,
    pub workload: WorkloadConfig,
}

impl DeskConfig {
    pub const DEFAULT_UNIVERSAL_WORKERS: usize = 5;

    pub fn new(targets: Targets, office_workers: usize, ride_workers: usize, universal: bool) -> Self {
        Self {
            targets,
            office_workers,
            ride_workers,
            universal,
            universal_workers: Self::DEFAULT_UNIVERSAL_WORKERS,
            seed: None,
            workload: WorkloadConfig::default(),
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_workload(mut self, workload: WorkloadConfig) -> Self {
        self.workload = workload;
        self
    }

    /// # Errors
    ///
    /// [`Error::Configuration`] if the workload constants are inconsistent.
    pub fn validate(&self) -> crate::Result {
        self.workload.validate()
    }
}
