use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use std::cell::Cell;
use std::thread;

/// Function invoked on a worker thread by an `IThreadDispatcher`. Receives the index of the worker executing it.
pub type ThreadDispatcherWorker<'a> = &'a (dyn Fn(usize) + Sync);

/// Provides multithreading dispatch primitives and a thread count for the continuation engine to use.
///
/// Note that the engine does not require a true load balancing for loop implementation. All that's needed is a way to jumpstart some threads.
/// The engine does its own distribution of work through its claim cursor and per-worker stacks, so a general purpose thread pool wrapped
/// in this trait will do fine.
pub trait IThreadDispatcher: Send + Sync {
    /// Gets the number of workers available in the thread dispatcher.
    ///
    /// Must stay stable for the duration of a dispatch.
    fn thread_count(&self) -> usize;

    /// Dispatches workers and blocks until every one of them has returned.
    ///
    /// # Arguments
    ///
    /// * `worker_body` - Function to be invoked on every worker. Receives a worker index that is dense in `[0, worker count)`.
    /// * `maximum_worker_count` - Maximum number of workers to dispatch.
    fn dispatch_workers(&self, worker_body: ThreadDispatcherWorker<'_>, maximum_worker_count: usize);
}

thread_local! {
    static CURRENT_WORKER_INDEX: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Gets the index of the worker currently executing on this thread, if the thread is inside a dispatch.
pub fn current_worker_index() -> Option<usize> {
    CURRENT_WORKER_INDEX.with(|index| index.get())
}

/// Restores the thread's previous worker index on drop so nested or unwinding dispatches leave no stale index behind.
struct WorkerIndexScope {
    previous: Option<usize>,
}

impl WorkerIndexScope {
    fn enter(worker_index: usize) -> Self {
        let previous = CURRENT_WORKER_INDEX.with(|index| index.replace(Some(worker_index)));
        Self { previous }
    }
}

impl Drop for WorkerIndexScope {
    fn drop(&mut self) {
        CURRENT_WORKER_INDEX.with(|index| index.set(self.previous));
    }
}

#[inline(always)]
fn run_worker(worker_body: ThreadDispatcherWorker<'_>, worker_index: usize) {
    let _scope = WorkerIndexScope::enter(worker_index);
    worker_body(worker_index);
}

/// Stack size of each pool thread. Continuations processed inline recurse on the worker's stack.
const WORKER_STACK_SIZE: usize = 8 * 1024 * 1024;

/// Fixed pool of worker threads backed by a `rayon::ThreadPool`.
///
/// Every dispatch is a broadcast: each pool thread runs the body once, using its pool index as the worker index.
/// Threads at or above the dispatch's worker count return immediately.
pub struct SimpleThreadDispatcher {
    thread_count: usize,
    pool: ThreadPool,
}

impl SimpleThreadDispatcher {
    /// Creates a dispatcher with the given number of worker threads.
    ///
    /// # Panics
    /// Panics if `thread_count` is zero or the pool cannot be built.
    pub fn new(thread_count: usize) -> Self {
        assert!(thread_count > 0, "A thread dispatcher needs at least one worker.");
        Self::try_new(thread_count).expect("Failed to build dispatcher thread pool.")
    }

    /// Creates a dispatcher with the given number of worker threads, reporting pool construction failures.
    ///
    /// A `thread_count` of zero is rejected by `new`; here it is forwarded to rayon, which picks its default.
    pub fn try_new(thread_count: usize) -> Result<Self, ThreadPoolBuildError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .stack_size(WORKER_STACK_SIZE)
            .thread_name(|worker_index| format!("continue-worker-{worker_index}"))
            .build()?;
        let thread_count = pool.current_num_threads();
        tracing::debug!(thread_count, "started thread dispatcher");
        Ok(Self { thread_count, pool })
    }

    /// Creates a dispatcher with one worker per hardware thread reported by the OS.
    pub fn with_available_parallelism() -> Self {
        let thread_count = thread::available_parallelism().map_or(1, |count| count.get());
        Self::new(thread_count)
    }
}

impl IThreadDispatcher for SimpleThreadDispatcher {
    fn thread_count(&self) -> usize {
        self.thread_count
    }

    fn dispatch_workers(&self, worker_body: ThreadDispatcherWorker<'_>, maximum_worker_count: usize) {
        let worker_count = self.thread_count.min(maximum_worker_count);
        if worker_count == 0 {
            return;
        }
        // Blocks until every pool thread has run the closure; a panicking body is resumed here afterwards.
        self.pool.broadcast(|context| {
            let worker_index = context.index();
            if worker_index < worker_count {
                run_worker(worker_body, worker_index);
            }
        });
    }
}

/// Runs every worker one after another on the calling thread.
///
/// Useful as a deterministic stand-in for a real pool: worker 0 always sees all of the work first.
#[derive(Clone, Copy, Debug)]
pub struct SequentialThreadDispatcher {
    thread_count: usize,
}

impl SequentialThreadDispatcher {
    pub fn new(thread_count: usize) -> Self {
        Self { thread_count }
    }
}

impl IThreadDispatcher for SequentialThreadDispatcher {
    fn thread_count(&self) -> usize {
        self.thread_count
    }

    fn dispatch_workers(&self, worker_body: ThreadDispatcherWorker<'_>, maximum_worker_count: usize) {
        for worker_index in 0..self.thread_count.min(maximum_worker_count) {
            run_worker(worker_body, worker_index);
        }
    }
}
