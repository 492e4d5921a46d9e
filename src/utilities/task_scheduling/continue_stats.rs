/// Counters gathered by a single worker over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Seed continuations claimed through the shared cursor.
    pub claimed: usize,
    /// Continuations popped from a sibling's stack.
    pub stolen: usize,
    /// Continuations popped from the worker's own stack.
    pub drained: usize,
    /// Emitted continuations pushed onto the worker's own stack.
    pub buffered: usize,
    /// Emitted continuations processed inline because they were final or the stack was full.
    pub inlined: usize,
    /// Invocations of the processing function.
    pub processed: usize,
    pub deepest_recursion: usize,
}

impl WorkerStats {
    #[inline]
    pub fn accumulate(&mut self, other: &WorkerStats) {
        self.claimed += other.claimed;
        self.stolen += other.stolen;
        self.drained += other.drained;
        self.buffered += other.buffered;
        self.inlined += other.inlined;
        self.processed += other.processed;
        self.deepest_recursion = self.deepest_recursion.max(other.deepest_recursion);
    }
}

/// Per-worker counters of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContinueStats {
    workers: Vec<WorkerStats>,
}

impl ContinueStats {
    pub(crate) fn new(workers: Vec<WorkerStats>) -> Self {
        Self { workers }
    }

    #[inline]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    #[inline]
    pub fn workers(&self) -> &[WorkerStats] {
        &self.workers
    }

    /// Sums the counters of every worker. `deepest_recursion` is the maximum instead.
    pub fn total(&self) -> WorkerStats {
        let mut total = WorkerStats::default();
        for worker in &self.workers {
            total.accumulate(worker);
        }
        total
    }
}
