use super::{Category, Counter, Desk};
use crate::process::ProcessState;
use crate::resource::PoolSnapshot;
use crate::sampling::Minutes;

use std::fmt;

/// One number per request category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub ride: usize,
    pub diagnostics: usize,
    pub software_install: usize,
}

impl CategoryCounts {
    fn from_counter(desk: &Desk, counter: impl Fn(Category) -> Counter) -> Self {
        Self {
            ride: desk.stats().get(counter(Category::Ride)),
            diagnostics: desk.stats().get(counter(Category::Diagnostics)),
            software_install: desk.stats().get(counter(Category::SoftwareInstall)),
        }
    }

    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::Ride => self.ride,
            Category::Diagnostics => self.diagnostics,
            Category::SoftwareInstall => self.software_install,
        }
    }

    pub fn total(&self) -> usize {
        self.ride + self.diagnostics + self.software_install
    }
}

/// Final state of a simulated workday.
#[derive(Debug, Clone, PartialEq)]
pub struct DeskReport {
    pub universal: bool,
    pub pools: Vec<PoolSnapshot>,
    /// Requests still queued for, or going through, intake.
    pub request_queues: CategoryCounts,
    /// Service tasks left unfinished.
    pub service_queues: CategoryCounts,
    /// Requests accepted over the day.
    pub requests: CategoryCounts,
    pub escalations: usize,
    pub end_time: Minutes,
    pub events_executed: u64,
    /// Events dropped at the run-length ceiling.
    pub events_discarded: usize,
    pub seed: u64,
}

impl DeskReport {
    pub(crate) fn collect(
        desk: &Desk,
        universal: bool,
        end_time: Minutes,
        events_executed: u64,
        events_discarded: usize,
        seed: u64,
    ) -> Self {
        Self {
            universal,
            pools: desk.runtime().snapshots(),
            request_queues: CategoryCounts::from_counter(desk, Counter::RequestQueue),
            service_queues: CategoryCounts::from_counter(desk, Counter::ServiceQueue),
            requests: CategoryCounts::from_counter(desk, Counter::Requests),
            escalations: desk.stats().get(Counter::Escalations),
            end_time,
            events_executed,
            events_discarded,
            seed,
        }
    }

    pub fn total_requests(&self) -> usize {
        self.requests.total()
    }

    /// Service tasks that never finished, over all categories.
    pub fn still_queued(&self) -> usize {
        self.service_queues.total()
    }

    /// Share of accepted requests whose service was completed; `None` when no request was accepted.
    pub fn success_rate(&self) -> Option<f64> {
        let total = self.total_requests();
        if total == 0 {
            return None;
        }
        let unfinished = self.still_queued().min(total);
        Some((total - unfinished) as f64 / total as f64)
    }
}

impl fmt::Display for DeskReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.universal {
            writeln!(f, "Universal staffing enabled.")?;
        }
        for pool in &self.pools {
            writeln!(f, "{}", pool)?;
        }

        let names = [
            (Category::Ride, "Ride"),
            (Category::Diagnostics, "Diagnostics"),
            (Category::SoftwareInstall, "SW Install"),
        ];
        for (category, name) in names {
            writeln!(
                f,
                "Final {} Request Queue Length: {}",
                name,
                self.request_queues.get(category)
            )?;
        }
        for (category, name) in names {
            writeln!(f, "Final {} Queue Length: {}", name, self.service_queues.get(category))?;
        }

        let codes: Vec<&str> = Category::ALL.iter().map(|category| category.code()).collect();
        let counts: Vec<String> = Category::ALL
            .iter()
            .map(|category| self.requests.get(*category).to_string())
            .collect();
        writeln!(
            f,
            "{}: {} TOTAL:{}",
            codes.join("/"),
            counts.join("/"),
            self.total_requests()
        )?;
        writeln!(f, "Network deployments: {}", self.escalations)?;

        match self.success_rate() {
            Some(rate) => write!(f, "Success rate: {:.2}%", rate * 100.0),
            None => write!(f, "Success rate: n/a (no requests)"),
        }
    }
}
