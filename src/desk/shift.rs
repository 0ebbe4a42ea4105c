use super::Desk;
use crate::engine::{EventQueue, OkEvent};
use crate::sampling::Minutes;

/// End of the workday. Service tasks granted a worker from now on leave their work undone, and generators stop.
#[derive(Debug)]
pub struct ShiftClose;

impl OkEvent<Desk, Minutes> for ShiftClose {
    fn execute(&mut self, desk: &mut Desk, event_queue: &mut EventQueue<Desk, Minutes>) {
        desk.open = false;
        log::debug!("desk closed at {}", event_queue.current_time());
    }
}

/// Point in the shift after which no diagnostics requests are taken and no ride request escalates.
#[derive(Debug)]
pub struct IntakeCutoff;

impl OkEvent<Desk, Minutes> for IntakeCutoff {
    fn execute(&mut self, desk: &mut Desk, event_queue: &mut EventQueue<Desk, Minutes>) {
        desk.cutoff_passed = true;
        log::debug!("intake cutoff passed at {}", event_queue.current_time());
    }
}
