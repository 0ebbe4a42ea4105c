use super::{Category, Counter, Desk, Role, EXPEDITED_PRIORITY};
use crate::process::{Context, Process, Step};
use crate::sampling::Minutes;
use crate::Priority;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ServiceStage {
    Arrive,
    Granted,
    Working,
}

/// Follow-up work for an accepted request: a ride, diagnostics or a software install.
///
/// Waits for a worker of the category's role, then goes through the category's phases one hold at a time. A worker
/// granted after the shift has closed is given back straight away and the task stays counted in its service queue.
#[derive(Debug)]
pub struct ServiceTask {
    category: Category,
    stage: ServiceStage,
    next_phase: usize,
}

impl ServiceTask {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            stage: ServiceStage::Arrive,
            next_phase: 0,
        }
    }

    fn advance(&mut self, cx: &mut Context<'_, Desk, Minutes>) -> crate::Result<Step<Minutes>> {
        let now = *cx.now();
        let phase = cx.state().plan().phases(self.category).get(self.next_phase).copied();
        match phase {
            Some(delay) => {
                self.next_phase += 1;
                Ok(Step::Hold(cx.state_mut().sample(&delay, now)))
            }
            None => {
                cx.state_mut()
                    .stats_mut()
                    .decrement(Counter::ServiceQueue(self.category));
                let pool = cx.state().pool_for(self.category.service_role());
                cx.release(pool, 1)?;
                Ok(Step::Done)
            }
        }
    }
}

impl Process<Desk, Minutes> for ServiceTask {
    fn priority(&self) -> Priority {
        self.category.service_priority()
    }

    fn resume(&mut self, cx: &mut Context<'_, Desk, Minutes>) -> crate::Result<Step<Minutes>> {
        match self.stage {
            ServiceStage::Arrive => {
                cx.state_mut()
                    .stats_mut()
                    .increment(Counter::ServiceQueue(self.category));
                self.stage = ServiceStage::Granted;
                let pool = cx.state().pool_for(self.category.service_role());
                Ok(Step::Acquire { pool, units: 1 })
            }
            ServiceStage::Granted => {
                if !cx.state().is_open() {
                    log::debug!("{} got a worker after closing, {} left undone", cx.id(), self.category);
                    let pool = cx.state().pool_for(self.category.service_role());
                    cx.release(pool, 1)?;
                    return Ok(Step::Done);
                }
                self.stage = ServiceStage::Working;
                self.advance(cx)
            }
            ServiceStage::Working => self.advance(cx),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeploymentStage {
    Arrive,
    Setup,
    Staffed,
    Overtime,
}

/// An escalated ride request: deploying network equipment on site.
///
/// Takes a field worker for the setup, after which one extra worker joins the field pool for the rest of the day. The
/// deploying worker itself stays on site until a fixed time after the end of the shift. Counted as a ride while the
/// setup is pending.
#[derive(Debug)]
pub struct Deployment {
    stage: DeploymentStage,
}

impl Deployment {
    pub fn new() -> Self {
        Self {
            stage: DeploymentStage::Arrive,
        }
    }
}

impl Default for Deployment {
    fn default() -> Self {
        Self::new()
    }
}

impl Process<Desk, Minutes> for Deployment {
    fn priority(&self) -> Priority {
        EXPEDITED_PRIORITY
    }

    fn resume(&mut self, cx: &mut Context<'_, Desk, Minutes>) -> crate::Result<Step<Minutes>> {
        let field = cx.state().pool_for(Role::Field);
        match self.stage {
            DeploymentStage::Arrive => {
                cx.state_mut()
                    .stats_mut()
                    .increment(Counter::ServiceQueue(Category::Ride));
                self.stage = DeploymentStage::Setup;
                Ok(Step::Acquire { pool: field, units: 1 })
            }
            DeploymentStage::Setup => {
                let now = *cx.now();
                let setup = cx.state().plan().deployment_setup;
                self.stage = DeploymentStage::Staffed;
                Ok(Step::Hold(cx.state_mut().sample(&setup, now)))
            }
            DeploymentStage::Staffed => {
                let capacity = cx.pool(field)?.capacity();
                cx.set_capacity(field, capacity + 1)?;
                log::debug!("{} added a field worker at {}, capacity now {}", cx.id(), cx.now(), capacity + 1);
                cx.state_mut()
                    .stats_mut()
                    .decrement(Counter::ServiceQueue(Category::Ride));

                let remaining = cx.state().plan().release_at - *cx.now();
                if remaining.into_inner() > 0.0 {
                    self.stage = DeploymentStage::Overtime;
                    return Ok(Step::Hold(remaining));
                }
                cx.release(field, 1)?;
                Ok(Step::Done)
            }
            DeploymentStage::Overtime => {
                cx.release(field, 1)?;
                Ok(Step::Done)
            }
        }
    }
}
