use super::{Category, Desk, IntakeTask, GENERATOR_PRIORITY};
use crate::process::{Context, Process, Step};
use crate::sampling::{Delay, Minutes};
use crate::Priority;

/// Spawns the requests of one category, one sampled gap apart.
///
/// The first request arrives one gap after the start of the day. A generator that finds the desk closed, its quota
/// used up, or (for diagnostics) the intake cutoff passed finishes for good; it never resumes later in the day.
#[derive(Debug)]
pub struct RequestGenerator {
    category: Category,
    remaining: usize,
    spacing: Delay,
    armed: bool,
}

impl RequestGenerator {
    pub fn new(category: Category, target: usize, spacing: Delay) -> Self {
        Self {
            category,
            remaining: target,
            spacing,
            armed: false,
        }
    }

    fn gap(&self, cx: &mut Context<'_, Desk, Minutes>) -> Step<Minutes> {
        let now = *cx.now();
        Step::Hold(cx.state_mut().sample(&self.spacing, now))
    }
}

impl Process<Desk, Minutes> for RequestGenerator {
    fn priority(&self) -> Priority {
        GENERATOR_PRIORITY
    }

    fn resume(&mut self, cx: &mut Context<'_, Desk, Minutes>) -> crate::Result<Step<Minutes>> {
        if !self.armed {
            self.armed = true;
            return Ok(self.gap(cx));
        }

        let desk = cx.state();
        let stop = if !desk.is_open() {
            Some("the desk has closed")
        } else if self.remaining == 0 {
            Some("its quota is used up")
        } else if self.category.gated_by_cutoff() && desk.cutoff_passed() {
            Some("the intake cutoff has passed")
        } else {
            None
        };
        if let Some(reason) = stop {
            log::debug!(
                "{} generator went inert at {} with {} requests left: {}",
                self.category,
                cx.now(),
                self.remaining,
                reason
            );
            return Ok(Step::Done);
        }

        cx.spawn(IntakeTask::new(self.category))?;
        self.remaining -= 1;
        Ok(self.gap(cx))
    }
}
