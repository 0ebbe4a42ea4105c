use super::{Category, Counter, Deployment, Desk, Role, ServiceTask, INTAKE_PRIORITY};
use crate::process::{Context, Process, Step};
use crate::sampling::Minutes;
use crate::Priority;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Arrive,
    Intake,
    HandOff,
}

/// A customer request going through intake at the office.
///
/// Takes an office worker for the fixed intake duration, gives the worker back and hands the request over to exactly
/// one follow-up task. A ride request may escalate into a [`Deployment`] instead of a [`ServiceTask`].
#[derive(Debug)]
pub struct IntakeTask {
    category: Category,
    stage: Stage,
}

impl IntakeTask {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            stage: Stage::Arrive,
        }
    }
}

impl Process<Desk, Minutes> for IntakeTask {
    fn priority(&self) -> Priority {
        INTAKE_PRIORITY
    }

    fn resume(&mut self, cx: &mut Context<'_, Desk, Minutes>) -> crate::Result<Step<Minutes>> {
        let office = cx.state().pool_for(Role::Office);
        match self.stage {
            Stage::Arrive => {
                let stats = cx.state_mut().stats_mut();
                stats.increment(Counter::Requests(self.category));
                stats.increment(Counter::RequestQueue(self.category));
                self.stage = Stage::Intake;
                Ok(Step::Acquire { pool: office, units: 1 })
            }
            Stage::Intake => {
                let now = *cx.now();
                let delay = cx.state().plan().intake(self.category);
                let duration = cx.state_mut().sample(&delay, now);
                self.stage = Stage::HandOff;
                Ok(Step::Hold(duration))
            }
            Stage::HandOff => {
                cx.state_mut()
                    .stats_mut()
                    .decrement(Counter::RequestQueue(self.category));
                cx.release(office, 1)?;

                if self.category == Category::Ride && cx.state_mut().try_escalate() {
                    log::debug!("{} escalated to a network deployment at {}", cx.id(), cx.now());
                    cx.spawn(Deployment::new())?;
                } else {
                    cx.spawn(ServiceTask::new(self.category))?;
                }
                Ok(Step::Done)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desk::{DeskConfig, ServiceDesk, Targets, WorkloadConfig};
    use crate::process::ProcessState;

    fn quiet_desk(workload: WorkloadConfig) -> ServiceDesk {
        let config = DeskConfig::new(Targets::default(), 1, 1, false)
            .with_seed(99)
            .with_workload(workload);
        ServiceDesk::new(&config).unwrap()
    }

    #[test]
    fn intake_counts_the_request_and_hands_over_once() {
        let mut desk = quiet_desk(WorkloadConfig::default());
        desk.simulation_mut().spawn(IntakeTask::new(Category::SoftwareInstall)).unwrap();
        desk.simulation_mut().run_until(crate::sampling::minutes(3.0).unwrap()).unwrap();

        let stats = desk.desk().stats();
        assert_eq!(1, stats.get(Counter::Requests(Category::SoftwareInstall)));
        assert_eq!(0, stats.get(Counter::RequestQueue(Category::SoftwareInstall)));
        // the install task has been spawned and holds the only office worker
        assert_eq!(1, stats.get(Counter::ServiceQueue(Category::SoftwareInstall)));
        let office = desk.desk().pool_for(Role::Office);
        assert_eq!(1, desk.desk().runtime().pool(office).unwrap().in_use());
    }

    #[test]
    fn second_request_waits_for_the_office_worker() {
        let mut desk = quiet_desk(WorkloadConfig::default());
        desk.simulation_mut().spawn(IntakeTask::new(Category::Diagnostics)).unwrap();
        desk.simulation_mut().spawn(IntakeTask::new(Category::Diagnostics)).unwrap();
        desk.simulation_mut().run_until(crate::sampling::minutes(4.0).unwrap()).unwrap();

        let stats = desk.desk().stats();
        assert_eq!(2, stats.get(Counter::Requests(Category::Diagnostics)));
        assert_eq!(2, stats.get(Counter::RequestQueue(Category::Diagnostics)));
        assert_eq!(1, desk.desk().runtime().waiting());
    }

    #[test]
    fn escalation_exactly_at_the_cutoff_is_refused() {
        let at_cutoff = WorkloadConfig {
            intake_cutoff: 3.0,
            escalation_probability: 1.0,
            ..WorkloadConfig::default()
        };
        let mut desk = quiet_desk(at_cutoff);
        desk.simulation_mut().spawn(IntakeTask::new(Category::Ride)).unwrap();
        desk.run().unwrap();
        assert_eq!(0, desk.desk().stats().get(Counter::Escalations));

        let before_cutoff = WorkloadConfig {
            intake_cutoff: 3.5,
            escalation_probability: 1.0,
            ..WorkloadConfig::default()
        };
        let mut desk = quiet_desk(before_cutoff);
        desk.simulation_mut().spawn(IntakeTask::new(Category::Ride)).unwrap();
        desk.run().unwrap();
        assert_eq!(1, desk.desk().stats().get(Counter::Escalations));
    }
}
