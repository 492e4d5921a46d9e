use thiserror::Error;

/// Reasons a continuation engine run can end without processing all of its work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContinueError {
    /// The dispatcher has no threads, or the configuration allows zero workers.
    #[error("No workers available to run continuations")]
    NoWorkers,

    /// Inline recursion nested deeper than the configured limit.
    #[error("Inline recursion depth {depth} on worker {worker_index} exceeded the configured maximum")]
    RecursionDepthExceeded {
        /// Depth of the recursion that was refused.
        depth: usize,
        /// Worker that attempted the recursion.
        worker_index: usize,
    },
}
