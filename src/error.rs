use thiserror::Error as ThisError;

/// Errors that may be encountered while configuring or executing a simulation.
///
/// The [`InvalidSchedule`] variant originates from the safe interface of the [`EventQueue`] to indicate that an
/// event's scheduled execution time is prior to the queue's current time. This error corresponds to a logical bug in
/// the engine or in a behavior, e.g. forgetting to add an offset to the current time when scheduling a new event, and
/// is never clamped away.
///
/// [`UnsatisfiableRequest`] and [`Configuration`] both describe a model that cannot run as configured. The first is
/// raised by a [`ResourcePool`] the moment a request could never be granted, instead of parking the requester forever.
///
/// The [`BadExecution`] variant wraps a client-generated error so that it can pass through [`Simulation::run()`] in a
/// type-safe manner. Invoking [`std::error::Error::source()`] on this variant will acquire a shared reference to the
/// wrapped error.
///
/// [`EventQueue`]: crate::engine::EventQueue
/// [`ResourcePool`]: crate::resource::ResourcePool
/// [`Simulation::run()`]: crate::engine::Simulation::run
/// [`InvalidSchedule`]: Error::InvalidSchedule
/// [`UnsatisfiableRequest`]: Error::UnsatisfiableRequest
/// [`Configuration`]: Error::Configuration
/// [`BadExecution`]: Error::BadExecution
#[derive(Debug, ThisError)]
pub enum Error {
    /// The event queue rejected an event that would have been scheduled for a time that has already passed.
    #[error("cannot schedule an event at {time} before the current time {now}")]
    InvalidSchedule { time: String, now: String },

    /// An acquisition asked a pool for more units than it could ever hold.
    #[error("pool '{pool}' cannot satisfy a request for {requested} units with capacity {capacity}")]
    UnsatisfiableRequest {
        pool: String,
        requested: usize,
        capacity: usize,
    },

    /// Startup parameters were missing, malformed or inconsistent.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A pool handle did not belong to the runtime it was used with.
    #[error("no resource pool registered under id {0}")]
    UnknownPool(usize),

    /// An activation referred to an actor that is not live or is already running.
    #[error("no runnable process with id {0}")]
    UnknownProcess(u64),

    /// An actor tried to give back more units than it holds.
    #[error("cannot release {released} units of pool '{pool}' while holding {held}")]
    ExcessRelease {
        pool: String,
        released: usize,
        held: usize,
    },

    /// A client-generated error was encountered while executing an event. Call [`source()`] or unpack this value to
    /// handle it directly.
    ///
    /// [`source()`]: std::error::Error::source
    #[error("error while executing event: {0}")]
    BadExecution(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    pub(crate) fn invalid_schedule(time: &impl std::fmt::Debug, now: &impl std::fmt::Debug) -> Self {
        Self::InvalidSchedule {
            time: format!("{:?}", time),
            now: format!("{:?}", now),
        }
    }
}

/// [`std::result::Result`]`<T, `[`servicedesk::Error`]`>`, defaulting to `T = ()`.
///
/// A type alias that simplifies the signatures of various functions in this crate.
///
/// [`servicedesk::Error`]: Error
pub type Result<T = ()> = std::result::Result<T, Error>;
