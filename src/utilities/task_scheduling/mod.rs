//! Continuation scheduling for recursive, parallel decompositions.
//!
//! This module provides a work-stealing continuation engine with minimal synchronization overhead. It includes:
//!
//! - `ParallelContinueTask`: Claims seed continuations, recurses, buffers and steals until all work is done
//! - `WorkStack`: The bounded per-worker stack used both as a recursion buffer and as a steal source
//! - `Continuation` / `ParallelContinue`: The contracts between the engine and the algorithm it drives
//! - `ParallelContinueConfig`: Termination policy, recursion limit and worker count
//! - `ContinueStats`: Per-worker counters of a finished run

mod continuation;
mod continue_error;
mod continue_stats;
mod parallel_continue;
mod parallel_continue_config;
mod work_stack;

pub use continuation::{Continuation, ParallelContinue};
pub use continue_error::ContinueError;
pub use continue_stats::{ContinueStats, WorkerStats};
pub use parallel_continue::{
    parallel_continue, parallel_continue_with_config, ParallelContinueTask, WORK_STACK_CAPACITY,
};
pub use parallel_continue_config::{ParallelContinueConfig, TerminationPolicy};
pub use work_stack::WorkStack;
