mod events;
mod simulation;

pub use events::event_traits::{Event, Infallible, OkEvent};
pub use events::EventQueue;
pub use simulation::{RunSummary, Simulation};
