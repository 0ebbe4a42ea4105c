use super::Category;

/// A named counter of the desk.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Counter {
    /// Requests of a category that are queued for, or going through, intake.
    RequestQueue(Category),
    /// Service tasks of a category that have not finished their work. Deployments count as rides.
    ServiceQueue(Category),
    /// Requests of a category accepted over the whole day.
    Requests(Category),
    /// Ride requests turned into network deployments.
    Escalations,
}

/// Counters updated by actors as they enter and leave queues, read once the run is over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    request_queue: [usize; Category::COUNT],
    service_queue: [usize; Category::COUNT],
    requests: [usize; Category::COUNT],
    escalations: usize,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, counter: Counter) -> &mut usize {
        match counter {
            Counter::RequestQueue(category) => &mut self.request_queue[category.index()],
            Counter::ServiceQueue(category) => &mut self.service_queue[category.index()],
            Counter::Requests(category) => &mut self.requests[category.index()],
            Counter::Escalations => &mut self.escalations,
        }
    }

    pub fn get(&self, counter: Counter) -> usize {
        match counter {
            Counter::RequestQueue(category) => self.request_queue[category.index()],
            Counter::ServiceQueue(category) => self.service_queue[category.index()],
            Counter::Requests(category) => self.requests[category.index()],
            Counter::Escalations => self.escalations,
        }
    }

    pub fn increment(&mut self, counter: Counter) {
        *self.slot_mut(counter) += 1;
    }

    /// Counters never go below zero; an unmatched decrement is logged and ignored.
    pub fn decrement(&mut self, counter: Counter) {
        let value = self.slot_mut(counter);
        match value.checked_sub(1) {
            Some(decremented) => *value = decremented,
            None => log::warn!("ignoring decrement of {:?} below zero", counter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_independent_per_category() {
        let mut stats = Statistics::new();
        stats.increment(Counter::Requests(Category::Ride));
        stats.increment(Counter::Requests(Category::Ride));
        stats.increment(Counter::ServiceQueue(Category::Diagnostics));
        stats.increment(Counter::Escalations);

        assert_eq!(2, stats.get(Counter::Requests(Category::Ride)));
        assert_eq!(0, stats.get(Counter::Requests(Category::Diagnostics)));
        assert_eq!(1, stats.get(Counter::ServiceQueue(Category::Diagnostics)));
        assert_eq!(0, stats.get(Counter::RequestQueue(Category::Diagnostics)));
        assert_eq!(1, stats.get(Counter::Escalations));
    }

    #[test]
    fn decrement_stops_at_zero() {
        let mut stats = Statistics::new();
        stats.increment(Counter::RequestQueue(Category::SoftwareInstall));
        stats.decrement(Counter::RequestQueue(Category::SoftwareInstall));
        stats.decrement(Counter::RequestQueue(Category::SoftwareInstall));
        assert_eq!(0, stats.get(Counter::RequestQueue(Category::SoftwareInstall)));
    }
}
