//! Hold durations for actors: fixed ones, and ones drawn from a distribution when the actor suspends.

use crate::Error;

use ordered_float::NotNan;
use rand::Rng;
use rand_distr::{Distribution, Exp, Normal, Uniform};

/// Simulated time and durations in the service desk model, in minutes.
pub type Minutes = NotNan<f64>;

/// Convert a finite float into [`Minutes`].
///
/// # Errors
///
/// [`Error::Configuration`] for NaN or infinite values.
pub fn minutes(value: f64) -> crate::Result<Minutes> {
    if !value.is_finite() {
        return Err(Error::Configuration(format!("{} is not a finite duration", value)));
    }
    NotNan::new(value).map_err(|_| Error::Configuration(format!("{} is not a number", value)))
}

/// How long an actor suspends for.
///
/// Random delays are drawn at the moment of suspension and are always strictly positive: draws that would not move
/// the clock forward are thrown away and drawn again, so time can never stall on a sampled hold.
#[derive(Debug, Clone, Copy)]
pub enum Delay {
    Fixed(Minutes),
    Uniform(Uniform<f64>),
    Exponential(Exp<f64>),
    Normal(Normal<f64>),
}

impl Delay {
    /// # Errors
    ///
    /// [`Error::Configuration`] for negative or non-finite durations.
    pub fn fixed(duration: f64) -> crate::Result<Self> {
        if duration < 0.0 {
            return Err(Error::Configuration(format!("fixed duration {} is negative", duration)));
        }
        Ok(Self::Fixed(minutes(duration)?))
    }

    /// Uniform on `[low, high)`.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] unless `low < high` and both are finite.
    pub fn uniform(low: f64, high: f64) -> crate::Result<Self> {
        Uniform::new(low, high)
            .map(Self::Uniform)
            .map_err(|error| Error::Configuration(format!("uniform({}, {}): {}", low, high, error)))
    }

    /// Exponential with the given mean.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] unless `mean` is finite and positive.
    pub fn exponential(mean: f64) -> crate::Result<Self> {
        if !(mean.is_finite() && mean > 0.0) {
            return Err(Error::Configuration(format!("exponential mean {} must be positive", mean)));
        }
        Exp::new(1.0 / mean)
            .map(Self::Exponential)
            .map_err(|error| Error::Configuration(format!("exponential({}): {}", mean, error)))
    }

    /// # Errors
    ///
    /// [`Error::Configuration`] unless `mean` is finite and `std_dev` is finite and non-negative. A degenerate
    /// distribution with a non-positive mean is rejected too, since no draw could ever advance the clock.
    pub fn normal(mean: f64, std_dev: f64) -> crate::Result<Self> {
        if !mean.is_finite() {
            return Err(Error::Configuration(format!("normal mean {} is not finite", mean)));
        }
        // rand_distr only checks that the deviation is finite
        if !(std_dev.is_finite() && std_dev >= 0.0) {
            return Err(Error::Configuration(format!(
                "normal standard deviation {} must be finite and non-negative",
                std_dev
            )));
        }
        if std_dev == 0.0 && mean <= 0.0 {
            return Err(Error::Configuration(format!("normal({}, 0) never draws a positive duration", mean)));
        }
        Normal::new(mean, std_dev)
            .map(Self::Normal)
            .map_err(|error| Error::Configuration(format!("normal({}, {}): {}", mean, std_dev, error)))
    }

    pub fn is_random(&self) -> bool {
        !matches!(self, Self::Fixed(_))
    }

    /// Duration of a hold that starts at `now`.
    ///
    /// Fixed delays are returned as configured. Random delays are redrawn until `now + delay > now`.
    pub fn sample<R>(&self, rng: &mut R, now: Minutes) -> Minutes
    where
        R: Rng + ?Sized,
    {
        let start = now.into_inner();
        loop {
            let draw = match self {
                Self::Fixed(duration) => return *duration,
                Self::Uniform(distribution) => distribution.sample(&mut *rng),
                Self::Exponential(distribution) => distribution.sample(&mut *rng),
                Self::Normal(distribution) => distribution.sample(&mut *rng),
            };
            if draw.is_finite() && start + draw > start {
                if let Ok(duration) = NotNan::new(draw) {
                    return duration;
                }
            }
            log::trace!("discarding non-positive duration draw {}", draw);
        }
    }
}
