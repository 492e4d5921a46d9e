//! Work-stealing continuation engine for recursively decomposable computations.
//!
//! A computation is seeded with a batch of continuations and a processing function. The function emits follow-up
//! continuations, which the engine buffers on per-worker stacks, recurses into, or lets idle workers steal, until
//! everything reachable from the seeds has been processed. `trees::TreeBuilder` is the canonical user.

pub mod trees;
pub mod utilities;

pub use utilities::task_scheduling::{
    parallel_continue, parallel_continue_with_config, Continuation, ContinueError, ContinueStats, ParallelContinue,
    ParallelContinueConfig, TerminationPolicy,
};
pub use utilities::thread_dispatcher::{IThreadDispatcher, SequentialThreadDispatcher, SimpleThreadDispatcher};
