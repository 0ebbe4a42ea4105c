use std::fmt::Debug;

/// The generic type used for a simulation's clock.
///
/// Kept generic so the engine can be driven by integral ticks in tests and by real-valued minutes in the service desk
/// model. This trait is a superset of [`Ord`] and [`Debug`] with no additional requirements or functionality.
///
/// Events execute in ascending order of execution time; ties are broken by [`Priority`] and then by the order in which
/// events were enqueued, so a run is fully deterministic for a given seed.
///
/// Implementations are provided for integral builtin types, but not for floating-point builtin types as the latter do
/// not implement [`Ord`]. The [`OrderedFloat`] and [`NotNan`] wrappers from [`ordered-float`] are supported instead;
/// the service desk model runs on `NotNan<f64>`.
///
/// [`ordered-float`]: https://docs.rs/ordered-float/4
/// [`OrderedFloat`]: https://docs.rs/ordered-float/4/ordered_float/struct.OrderedFloat.html
/// [`NotNan`]: https://docs.rs/ordered-float/4/ordered_float/struct.NotNan.html
pub trait SimTime: Ord + Debug {}

impl SimTime for u8 {}
impl SimTime for u16 {}
impl SimTime for u32 {}
impl SimTime for u64 {}
impl SimTime for u128 {}
impl SimTime for usize {}
impl SimTime for i8 {}
impl SimTime for i16 {}
impl SimTime for i32 {}
impl SimTime for i64 {}
impl SimTime for i128 {}
impl SimTime for isize {}

impl<Float> SimTime for ordered_float::OrderedFloat<Float> where Float: ordered_float::FloatCore + Debug {}

impl<Float> SimTime for ordered_float::NotNan<Float> where Float: ordered_float::FloatCore + Debug {}

/// The generic type used for a simulation's overall state.
///
/// This type may include to-date summary statistics, collections of simulated entities, resource pools, or whatever
/// else is necessary to describe the real-world process in a program.
///
/// This trait has only one method, which provides a way for [`Simulation::run()`] to ask whether it should wrap up
/// event execution. The default implementation of this method will always answer "no," and so a simulation running
/// with the default will continue until the event queue becomes empty or its run-length ceiling is reached.
///
/// [`Simulation::run()`]: crate::engine::Simulation::run
pub trait SimState<Time>
where
    Time: SimTime,
{
    /// Reports whether the simulation has run to completion. This method will be invoked in [`Simulation::run()`]
    /// before popping each event off the queue: `true` indicates that the simulation is finished and that `run()`
    /// should break out of its loop.
    ///
    /// [`Simulation::run()`]: crate::engine::Simulation::run
    // expect that other implementations will make use of the
    // argument even though this one doesn't
    #[allow(unused_variables)]
    fn is_complete(&self, current_time: &Time) -> bool {
        false
    }
}

/// Tie-breaker between events scheduled for the same instant. Smaller values execute first.
///
/// Actors carry a priority for their whole lifetime; it orders their activations against other activations at the
/// same time and their position in a resource pool's wait-line.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(pub i32);

impl Priority {
    /// Runs before every other priority in common use.
    pub const URGENT: Priority = Priority(0);
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
