//! # Overview
//!
//! servicedesk simulates one workday of an IT service desk as a discrete-event simulation. Customer requests for
//! on-site repair rides, diagnostics and software installs arrive over the shift, queue for a limited number of
//! workers, and are either served or left undone when the shift ends.
//!
//! The crate is layered, leaves first:
//!
//! * [`engine`] holds the clock and the event queue. Events execute in ascending order of time, then of
//!   [`Priority`], then of insertion, so a run is fully deterministic for a given seed. The [`Event`] trait grants each
//!   executing event exclusive access to the simulation's state, without interior mutability or unsafe access to
//!   mutable, static data.
//! * [`resource`] provides finite-capacity pools with a priority-ordered wait-line and capacity changes at runtime.
//! * [`process`] runs cooperative actors on top of the event queue. Each actor is a small state machine that runs up
//!   to its next suspend point: a timed hold, a wait for pool units, or the end of its behavior.
//! * [`sampling`] draws hold durations, fixed or random, and never lets a random draw stall the clock.
//! * [`desk`] is the workday itself: staffing, intake, service tasks, escalations, generators and the final report.
//! * [`cli`] turns command-line parameters into a [`DeskConfig`].
//!
//! Parameterizing the engine over [`SimTime`] and [`SimState`] keeps it independent of the desk; its own tests drive
//! it with integral ticks, while the desk runs on [`Minutes`].
//!
//! [`Event`]: engine::Event
//! [`DeskConfig`]: desk::DeskConfig
//! [`Minutes`]: sampling::Minutes

pub mod cli;
pub mod desk;
pub mod engine;
mod error;
mod generic_parameters;
pub mod process;
pub mod resource;
pub mod sampling;

pub use error::{Error, Result};
pub use generic_parameters::{Priority, SimState, SimTime};
