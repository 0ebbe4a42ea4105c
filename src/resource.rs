//! Finite-capacity resource pools with a priority-ordered wait-line.
//!
//! A [`ResourcePool`] only does the bookkeeping: it decides who is granted units and who waits. Waking the actors it
//! admits is the job of the process [`Runtime`], which schedules their activations at the current instant.
//!
//! [`Runtime`]: crate::process::Runtime

use crate::process::ProcessId;
use crate::{Error, Priority};

use std::collections::VecDeque;
use std::fmt;

/// Handle to a pool registered with a [`Runtime`].
///
/// [`Runtime`]: crate::process::Runtime
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolId(pub(crate) usize);

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "pool#{}", self.0)
    }
}

/// Outcome of [`ResourcePool::acquire()`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Admission {
    /// The units were handed out immediately.
    Granted,
    /// The requester has been placed on the wait-line.
    Queued,
}

/// A pending acquisition, or one that has just been admitted off the wait-line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Waiter {
    pub process: ProcessId,
    pub units: usize,
    pub priority: Priority,
    ticket: u64,
}

/// A named counter of capacity units with a wait-line of pending requests.
///
/// `in_use <= capacity` holds whenever units are handed out. Lowering the capacity below the current usage is
/// allowed; units already in use are never taken back, so the pool simply admits nobody until enough units have been
/// released.
#[derive(Debug, Clone)]
pub struct ResourcePool {
    name: String,
    capacity: usize,
    in_use: usize,
    waiting: VecDeque<Waiter>,
    tickets: u64,
    grants: u64,
    peak_waiting: usize,
}

impl ResourcePool {
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            capacity,
            in_use: 0,
            waiting: VecDeque::new(),
            tickets: 0,
            grants: 0,
            peak_waiting: 0,
        }
    }

    /// Request `units` for `process`.
    ///
    /// The request is granted immediately when enough units are free. Otherwise the requester joins the wait-line
    /// behind every waiter with a smaller or equal priority value.
    ///
    /// # Errors
    ///
    /// [`Error::UnsatisfiableRequest`] if `units` exceeds the current capacity. Such a request could only ever be
    /// served by a capacity change, so it is treated as a configuration error rather than parked.
    pub fn acquire(&mut self, process: ProcessId, units: usize, priority: Priority) -> crate::Result<Admission> {
        if units > self.capacity {
            return Err(Error::UnsatisfiableRequest {
                pool: self.name.clone(),
                requested: units,
                capacity: self.capacity,
            });
        }

        if self.fits(units) {
            self.in_use += units;
            self.grants += 1;
            log::debug!("{}: granted {} units to {}", self.name, units, process);
            return Ok(Admission::Granted);
        }

        let waiter = Waiter {
            process,
            units,
            priority,
            ticket: self.tickets,
        };
        self.tickets += 1;
        let position = self
            .waiting
            .partition_point(|queued| (queued.priority, queued.ticket) <= (waiter.priority, waiter.ticket));
        self.waiting.insert(position, waiter);
        self.peak_waiting = self.peak_waiting.max(self.waiting.len());
        log::debug!(
            "{}: {} waits for {} units at position {} of {}",
            self.name,
            process,
            units,
            position,
            self.waiting.len()
        );
        Ok(Admission::Queued)
    }

    /// Give back `units` and admit waiters that now fit, head-first.
    ///
    /// The returned waiters already hold their units; the caller only has to resume them.
    ///
    /// # Errors
    ///
    /// [`Error::ExcessRelease`] if more units are released than are in use.
    pub fn release(&mut self, units: usize) -> crate::Result<Vec<Waiter>> {
        if units > self.in_use {
            return Err(Error::ExcessRelease {
                pool: self.name.clone(),
                released: units,
                held: self.in_use,
            });
        }
        self.in_use -= units;
        Ok(self.admit_waiting())
    }

    /// Change the capacity immediately, admitting any waiters the new capacity makes room for.
    ///
    /// # Errors
    ///
    /// [`Error::UnsatisfiableRequest`] if a queued request needs more units than `capacity`. Admission is head-of-line,
    /// so such a waiter would block the pool for good. The pool is left unchanged.
    pub fn set_capacity(&mut self, capacity: usize) -> crate::Result<Vec<Waiter>> {
        if let Some(stranded) = self.waiting.iter().find(|waiter| waiter.units > capacity) {
            return Err(Error::UnsatisfiableRequest {
                pool: self.name.clone(),
                requested: stranded.units,
                capacity,
            });
        }
        if capacity != self.capacity {
            log::debug!("{}: capacity {} -> {}", self.name, self.capacity, capacity);
        }
        self.capacity = capacity;
        Ok(self.admit_waiting())
    }

    fn admit_waiting(&mut self) -> Vec<Waiter> {
        let mut admitted = Vec::new();
        while let Some(head) = self.waiting.front() {
            if !self.fits(head.units) {
                break;
            }
            if let Some(waiter) = self.waiting.pop_front() {
                self.in_use += waiter.units;
                self.grants += 1;
                log::debug!("{}: admitted {} from the wait-line", self.name, waiter.process);
                admitted.push(waiter);
            }
        }
        admitted
    }

    fn fits(&self, units: usize) -> bool {
        self.in_use + units <= self.capacity
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn in_use(&self) -> usize {
        self.in_use
    }

    /// Number of requests on the wait-line.
    pub fn waiting(&self) -> usize {
        self.waiting.len()
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            name: self.name.clone(),
            capacity: self.capacity,
            in_use: self.in_use,
            waiting: self.waiting.len(),
            grants: self.grants,
            peak_waiting: self.peak_waiting,
        }
    }
}

/// Utilization of a pool at one instant, typically taken after a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub name: String,
    pub capacity: usize,
    pub in_use: usize,
    pub waiting: usize,
    /// Requests granted over the whole run.
    pub grants: u64,
    /// Longest the wait-line ever got.
    pub peak_waiting: usize,
}

impl fmt::Display for PoolSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: capacity {}, busy {}, waiting {}, served {}, longest wait-line {}",
            self.name, self.capacity, self.in_use, self.waiting, self.grants, self.peak_waiting
        )
    }
}
