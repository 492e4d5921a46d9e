/// Decides when a worker that found nothing to steal leaves the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TerminationPolicy {
    /// A worker exits after a single failed cyclic steal scan.
    ///
    /// Cheapest, but a worker can exit just before a sibling buffers new work. No work is lost (the producer drains
    /// its own stack), the run just finishes with fewer threads than it could have.
    #[default]
    SinglePass,
    /// A worker whose scan fails keeps rescanning until no worker is active anywhere.
    ActiveWorkers,
}

/// Tuning knobs for one continuation engine run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParallelContinueConfig {
    pub termination: TerminationPolicy,
    /// Maximum nesting of inline recursion before the run fails. `None` leaves the depth to the problem structure.
    pub maximum_recursion_depth: Option<usize>,
    /// Caps the number of dispatched workers below the dispatcher's thread count.
    pub maximum_worker_count: Option<usize>,
}

impl ParallelContinueConfig {
    #[inline]
    pub fn with_termination(mut self, termination: TerminationPolicy) -> Self {
        self.termination = termination;
        self
    }

    #[inline]
    pub fn with_maximum_recursion_depth(mut self, maximum_recursion_depth: usize) -> Self {
        self.maximum_recursion_depth = Some(maximum_recursion_depth);
        self
    }

    #[inline]
    pub fn with_maximum_worker_count(mut self, maximum_worker_count: usize) -> Self {
        self.maximum_worker_count = Some(maximum_worker_count);
        self
    }

    /// Number of workers a run on a dispatcher with `thread_count` threads will use.
    #[inline]
    pub fn worker_count(&self, thread_count: usize) -> usize {
        self.maximum_worker_count
            .map_or(thread_count, |maximum| maximum.min(thread_count))
    }
}
