//! Continuation engine: distributes a recursive decomposition over the workers of a thread dispatcher.
//!
//! Each worker claims seed continuations through a shared atomic cursor, processes them, and keeps anything the
//! processing function emits on its own bounded stack. Emitted continuations that are final, or that don't fit on
//! the stack, are processed immediately on the emitting thread. Once the seeds run out, workers steal from their
//! siblings' stacks in cyclic order starting at their own.

use crate::utilities::thread_dispatcher::IThreadDispatcher;
use crossbeam_utils::{Backoff, CachePadded};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use super::continuation::{Continuation, ParallelContinue};
use super::continue_error::ContinueError;
use super::continue_stats::{ContinueStats, WorkerStats};
use super::parallel_continue_config::{ParallelContinueConfig, TerminationPolicy};
use super::work_stack::WorkStack;

/// Number of slots in each worker's stack.
pub const WORK_STACK_CAPACITY: usize = 64;

/// State shared by all workers of a single run.
pub struct ParallelContinueTask<'a, C: Continuation, F> {
    continuations: &'a [C],
    function: &'a F,
    config: ParallelContinueConfig,
    counter: CachePadded<AtomicUsize>,
    thread_stacks: Box<[CachePadded<WorkStack<C, WORK_STACK_CAPACITY>>]>,
    /// Started workers currently holding or looking for work. Only consulted under `TerminationPolicy::ActiveWorkers`.
    active_workers: CachePadded<AtomicUsize>,
    aborted: AtomicBool,
    failure: Mutex<Option<ContinueError>>,
    worker_stats: Mutex<Vec<WorkerStats>>,
}

/// Emission policy handed to the processing function: buffer locally when possible, otherwise recurse in place.
struct Select<'s, C: Continuation, F> {
    parent: &'s ParallelContinueTask<'s, C, F>,
    worker_index: usize,
    depth: usize,
    stats: &'s mut WorkerStats,
}

impl<'s, C, F> ParallelContinue<C> for Select<'s, C, F>
where
    C: Continuation,
    F: Fn(&C, &mut dyn ParallelContinue<C>) + Sync,
{
    fn emit(&mut self, continuation: C) {
        let parent = self.parent;
        if parent.aborted.load(Ordering::Relaxed) {
            return;
        }
        if !continuation.is_final() && parent.thread_stacks[self.worker_index].push(continuation) {
            self.stats.buffered += 1;
            return;
        }

        let depth = self.depth + 1;
        if let Some(maximum) = parent.config.maximum_recursion_depth {
            if depth > maximum {
                parent.fail(ContinueError::RecursionDepthExceeded {
                    depth,
                    worker_index: self.worker_index,
                });
                return;
            }
        }
        self.stats.inlined += 1;
        parent.process(self.worker_index, &continuation, depth, self.stats);
    }
}

impl<'a, C, F> ParallelContinueTask<'a, C, F>
where
    C: Continuation,
    F: Fn(&C, &mut dyn ParallelContinue<C>) + Sync,
{
    /// Processes every continuation reachable from `continuations` across the dispatcher's workers.
    ///
    /// Blocks until every worker has finished. The seed slice is only read.
    ///
    /// # Arguments
    /// * `dispatcher` - Dispatcher providing the workers.
    /// * `continuations` - Seed continuations, claimed in order through a shared cursor.
    /// * `config` - Termination, recursion and worker count settings.
    /// * `function` - Processes one continuation, emitting follow-ups through the provided capability.
    pub fn run<D>(
        dispatcher: &D,
        continuations: &'a [C],
        config: ParallelContinueConfig,
        function: &'a F,
    ) -> Result<ContinueStats, ContinueError>
    where
        D: IThreadDispatcher + ?Sized,
    {
        let worker_count = config.worker_count(dispatcher.thread_count());
        if worker_count == 0 {
            return Err(ContinueError::NoWorkers);
        }

        let task = Self {
            continuations,
            function,
            config,
            counter: CachePadded::new(AtomicUsize::new(0)),
            thread_stacks: (0..worker_count)
                .map(|_| CachePadded::new(WorkStack::new()))
                .collect(),
            active_workers: CachePadded::new(AtomicUsize::new(0)),
            aborted: AtomicBool::new(false),
            failure: Mutex::new(None),
            worker_stats: Mutex::new(vec![WorkerStats::default(); worker_count]),
        };

        tracing::debug!(
            worker_count,
            seed_count = continuations.len(),
            termination = ?config.termination,
            "starting parallel continue"
        );
        dispatcher.dispatch_workers(&|worker_index| task.task(worker_index), worker_count);

        if let Some(error) = task
            .failure
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
        {
            return Err(error);
        }
        let stats = ContinueStats::new(
            task.worker_stats
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner),
        );
        let total = stats.total();
        tracing::debug!(
            processed = total.processed,
            stolen = total.stolen,
            inlined = total.inlined,
            "finished parallel continue"
        );
        Ok(stats)
    }

    fn task(&self, worker_index: usize) {
        if worker_index >= self.thread_stacks.len() {
            debug_assert!(false, "Dispatcher ran more workers than the run allocated stacks for.");
            return;
        }
        let mut stats = WorkerStats::default();
        // Workers register on entry rather than up front; dispatchers may start them one batch at a time.
        self.active_workers.fetch_add(1, Ordering::AcqRel);

        while !self.aborted.load(Ordering::Relaxed) {
            let continuation = match self.claim(&mut stats) {
                Some(continuation) => continuation,
                // Global work queue empty => try to steal from neighboring stacks.
                None => match self.steal(worker_index, &mut stats) {
                    Some(continuation) => continuation,
                    None => match self.config.termination {
                        TerminationPolicy::SinglePass => break,
                        TerminationPolicy::ActiveWorkers => {
                            match self.wait_for_work(worker_index, &mut stats) {
                                Some(continuation) => continuation,
                                None => break,
                            }
                        }
                    },
                },
            };

            self.process(worker_index, &continuation, 0, &mut stats);
            while !self.aborted.load(Ordering::Relaxed) {
                let Some(continuation) = self.thread_stacks[worker_index].pop() else {
                    break;
                };
                debug_assert!(!continuation.is_final(), "Final continuations are never buffered.");
                stats.drained += 1;
                self.process(worker_index, &continuation, 0, &mut stats);
            }
        }

        tracing::trace!(
            worker_index,
            claimed = stats.claimed,
            stolen = stats.stolen,
            processed = stats.processed,
            inlined = stats.inlined,
            "worker finished"
        );
        self.worker_stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)[worker_index] = stats;
    }

    #[inline(always)]
    fn claim(&self, stats: &mut WorkerStats) -> Option<C> {
        let index = self.counter.fetch_add(1, Ordering::Relaxed);
        let continuation = self.continuations.get(index).copied();
        if continuation.is_some() {
            stats.claimed += 1;
        }
        continuation
    }

    /// Single cyclic scan over every stack, starting with the worker's own.
    fn steal(&self, worker_index: usize, stats: &mut WorkerStats) -> Option<C> {
        let worker_count = self.thread_stacks.len();
        for i in 0..worker_count {
            let victim_index = (worker_index + i) % worker_count;
            if let Some(continuation) = self.thread_stacks[victim_index].pop() {
                debug_assert!(!continuation.is_final(), "Final continuations are never buffered.");
                if victim_index == worker_index {
                    stats.drained += 1;
                } else {
                    stats.stolen += 1;
                    tracing::trace!(worker_index, victim_index, "stole continuation");
                }
                return Some(continuation);
            }
        }
        None
    }

    /// Idles until a steal succeeds or no worker is active anymore.
    ///
    /// A worker re-registers as active before every scan, so any worker holding a stolen continuation is counted.
    /// Stacks are only pushed by their active owners, and owners drain their stacks before going idle. Workers that
    /// have not started yet hold nothing. So an active count of zero means no work is left anywhere.
    fn wait_for_work(&self, worker_index: usize, stats: &mut WorkerStats) -> Option<C> {
        self.active_workers.fetch_sub(1, Ordering::AcqRel);
        let backoff = Backoff::new();
        loop {
            if self.aborted.load(Ordering::Relaxed) || self.active_workers.load(Ordering::Acquire) == 0 {
                return None;
            }
            backoff.snooze();
            self.active_workers.fetch_add(1, Ordering::AcqRel);
            if let Some(continuation) = self.steal(worker_index, stats) {
                return Some(continuation);
            }
            self.active_workers.fetch_sub(1, Ordering::AcqRel);
        }
    }

    fn process(&self, worker_index: usize, continuation: &C, depth: usize, stats: &mut WorkerStats) {
        stats.processed += 1;
        stats.deepest_recursion = stats.deepest_recursion.max(depth);
        let mut select = Select {
            parent: self,
            worker_index,
            depth,
            stats,
        };
        (self.function)(continuation, &mut select);
    }

    fn fail(&self, error: ContinueError) {
        tracing::warn!(%error, "aborting parallel continue");
        self.failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert(error);
        self.aborted.store(true, Ordering::Relaxed);
    }
}

/// Runs the continuation engine with the default configuration.
///
/// # Panics
/// Panics if the dispatcher has no threads.
pub fn parallel_continue<D, C, F>(dispatcher: &D, continuations: &[C], function: F) -> ContinueStats
where
    D: IThreadDispatcher + ?Sized,
    C: Continuation,
    F: Fn(&C, &mut dyn ParallelContinue<C>) + Sync,
{
    match ParallelContinueTask::run(
        dispatcher,
        continuations,
        ParallelContinueConfig::default(),
        &function,
    ) {
        Ok(stats) => stats,
        Err(error) => panic!("parallel_continue cannot run: {error}"),
    }
}

/// Runs the continuation engine with an explicit configuration.
pub fn parallel_continue_with_config<D, C, F>(
    dispatcher: &D,
    continuations: &[C],
    config: ParallelContinueConfig,
    function: F,
) -> Result<ContinueStats, ContinueError>
where
    D: IThreadDispatcher + ?Sized,
    C: Continuation,
    F: Fn(&C, &mut dyn ParallelContinue<C>) + Sync,
{
    ParallelContinueTask::run(dispatcher, continuations, config, &function)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utilities::thread_dispatcher::{SequentialThreadDispatcher, SimpleThreadDispatcher};
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicU32;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    }

    /// Node of a complete `fanout`-ary expansion tree, numbered in heap order within its tree.
    #[derive(Clone, Copy, Debug)]
    struct TreeNode {
        tree: u32,
        id: u32,
        depth: u32,
        is_final: bool,
    }

    impl Continuation for TreeNode {
        fn is_final(&self) -> bool {
            self.is_final
        }
    }

    #[derive(Clone, Copy, Debug)]
    struct ExpansionShape {
        fanout: u32,
        max_depth: u32,
        /// Nodes at or below this depth report themselves as final.
        final_depth: u32,
    }

    impl ExpansionShape {
        fn nodes_per_tree(&self) -> usize {
            (0..=self.max_depth)
                .map(|depth| (self.fanout as usize).pow(depth))
                .sum()
        }

        fn seeds(&self, tree_count: u32) -> Vec<TreeNode> {
            (0..tree_count)
                .map(|tree| TreeNode {
                    tree,
                    id: 0,
                    depth: 0,
                    is_final: self.final_depth == 0,
                })
                .collect()
        }

        fn expand(&self, node: &TreeNode, emitter: &mut dyn ParallelContinue<TreeNode>) {
            if node.depth == self.max_depth {
                return;
            }
            for child in 0..self.fanout {
                let depth = node.depth + 1;
                emitter.emit(TreeNode {
                    tree: node.tree,
                    id: node.id * self.fanout + 1 + child,
                    depth,
                    is_final: depth >= self.final_depth,
                });
            }
        }
    }

    struct VisitCounter {
        nodes_per_tree: usize,
        visits: Vec<AtomicU32>,
    }

    impl VisitCounter {
        fn new(shape: &ExpansionShape, tree_count: u32) -> Self {
            let nodes_per_tree = shape.nodes_per_tree();
            Self {
                nodes_per_tree,
                visits: (0..nodes_per_tree * tree_count as usize)
                    .map(|_| AtomicU32::new(0))
                    .collect(),
            }
        }

        fn visit(&self, node: &TreeNode) {
            let slot = node.tree as usize * self.nodes_per_tree + node.id as usize;
            self.visits[slot].fetch_add(1, Ordering::Relaxed);
        }

        fn assert_each_visited_once(&self) {
            for (slot, visits) in self.visits.iter().enumerate() {
                assert_eq!(visits.load(Ordering::Relaxed), 1, "slot {slot} visited the wrong number of times");
            }
        }
    }

    fn assert_counters_consistent(stats: &ContinueStats) {
        let total = stats.total();
        assert_eq!(
            total.processed,
            total.claimed + total.stolen + total.drained + total.inlined
        );
        assert_eq!(total.buffered, total.stolen + total.drained);
    }

    fn run_expansion(
        dispatcher: &dyn IThreadDispatcher,
        shape: ExpansionShape,
        tree_count: u32,
        config: ParallelContinueConfig,
    ) -> ContinueStats {
        let counter = VisitCounter::new(&shape, tree_count);
        let seeds = shape.seeds(tree_count);
        let stats = parallel_continue_with_config(dispatcher, &seeds, config, |node, emitter| {
            counter.visit(node);
            shape.expand(node, emitter);
        })
        .unwrap();
        counter.assert_each_visited_once();
        assert_eq!(stats.total().processed, counter.visits.len());
        assert_counters_consistent(&stats);
        stats
    }

    #[test]
    fn test_completeness_of_binary_expansion() {
        init_logging();
        let dispatcher = SimpleThreadDispatcher::new(4);
        let shape = ExpansionShape {
            fanout: 2,
            max_depth: 10,
            final_depth: 8,
        };
        let stats = run_expansion(&dispatcher, shape, 8, ParallelContinueConfig::default());
        assert_eq!(stats.worker_count(), 4);
        assert_eq!(stats.total().claimed, 8);
    }

    #[test]
    fn test_completeness_with_active_worker_termination() {
        let dispatcher = SimpleThreadDispatcher::new(4);
        let shape = ExpansionShape {
            fanout: 3,
            max_depth: 7,
            final_depth: 6,
        };
        let config = ParallelContinueConfig::default().with_termination(TerminationPolicy::ActiveWorkers);
        run_expansion(&dispatcher, shape, 5, config);
    }

    #[test]
    fn test_active_worker_termination_on_sequential_dispatcher() {
        // Worker 0 runs to completion before worker 1 starts, so idle workers must not wait on workers that never began.
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let shape = ExpansionShape {
                fanout: 2,
                max_depth: 5,
                final_depth: 3,
            };
            let config = ParallelContinueConfig::default().with_termination(TerminationPolicy::ActiveWorkers);
            let stats = run_expansion(&SequentialThreadDispatcher::new(3), shape, 4, config);
            let _ = sender.send(stats);
        });
        let stats = receiver
            .recv_timeout(Duration::from_secs(30))
            .expect("active worker termination did not finish on a sequential dispatcher");
        assert_eq!(stats.worker_count(), 3);
        assert_eq!(stats.workers()[0].claimed, 4);
        assert_eq!(stats.workers()[1].processed, 0);
        assert_eq!(stats.workers()[2].processed, 0);
    }

    #[test]
    fn test_each_seed_claimed_exactly_once() {
        let dispatcher = SimpleThreadDispatcher::new(4);
        let seeds: Vec<TreeNode> = (0..1000)
            .map(|id| TreeNode {
                tree: 0,
                id,
                depth: 0,
                is_final: false,
            })
            .collect();
        let claims: Vec<AtomicU32> = (0..seeds.len()).map(|_| AtomicU32::new(0)).collect();
        let stats = parallel_continue(&dispatcher, &seeds, |node, _| {
            claims[node.id as usize].fetch_add(1, Ordering::Relaxed);
        });
        assert!(claims.iter().all(|claims| claims.load(Ordering::Relaxed) == 1));
        assert_eq!(
            stats.workers().iter().map(|worker| worker.claimed).sum::<usize>(),
            seeds.len()
        );
    }

    #[test]
    fn test_fanout_beyond_stack_capacity_is_inlined() {
        const CHILD_COUNT: u32 = 500;
        let shape = ExpansionShape {
            fanout: CHILD_COUNT,
            max_depth: 1,
            final_depth: 2,
        };

        // One worker: exactly one stack's worth is buffered, the rest is handled inline.
        let stats = run_expansion(
            &SequentialThreadDispatcher::new(1),
            shape,
            1,
            ParallelContinueConfig::default(),
        );
        let total = stats.total();
        assert_eq!(total.buffered, WORK_STACK_CAPACITY);
        assert_eq!(total.inlined, CHILD_COUNT as usize - WORK_STACK_CAPACITY);
        assert_eq!(total.deepest_recursion, 1);

        // With thieves racing the producer nothing is dropped either.
        run_expansion(
            &SimpleThreadDispatcher::new(4),
            shape,
            3,
            ParallelContinueConfig::default(),
        );
    }

    #[test]
    fn test_fewer_seeds_than_workers_still_completes() {
        let dispatcher = SimpleThreadDispatcher::new(4);
        let shape = ExpansionShape {
            fanout: 2,
            max_depth: 9,
            final_depth: 7,
        };
        run_expansion(&dispatcher, shape, 3, ParallelContinueConfig::default());
    }

    #[test]
    fn test_starved_worker_participates_by_stealing() {
        let dispatcher = SimpleThreadDispatcher::new(4);
        let shape = ExpansionShape {
            fanout: 2,
            max_depth: 7,
            final_depth: 6,
        };
        let tree_count = 3;
        let counter = VisitCounter::new(&shape, tree_count);
        let seeds = shape.seeds(tree_count);
        let config = ParallelContinueConfig::default().with_termination(TerminationPolicy::ActiveWorkers);
        let stats = parallel_continue_with_config(&dispatcher, &seeds, config, |node, emitter| {
            counter.visit(node);
            thread::sleep(Duration::from_micros(200));
            shape.expand(node, emitter);
        })
        .unwrap();

        counter.assert_each_visited_once();
        assert!(stats.total().stolen > 0);
        for (worker_index, worker) in stats.workers().iter().enumerate() {
            assert!(worker.processed > 0, "worker {worker_index} never found work");
        }
    }

    #[test]
    fn test_final_continuations_are_never_buffered() {
        // Every emitted continuation is final.
        let shape = ExpansionShape {
            fanout: 3,
            max_depth: 6,
            final_depth: 1,
        };
        for dispatcher in [
            &SequentialThreadDispatcher::new(2) as &dyn IThreadDispatcher,
            &SimpleThreadDispatcher::new(4),
        ] {
            let stats = run_expansion(dispatcher, shape, 4, ParallelContinueConfig::default());
            let total = stats.total();
            assert_eq!(total.buffered, 0);
            assert_eq!(total.stolen, 0);
            assert_eq!(total.inlined, 4 * (shape.nodes_per_tree() - 1));
        }
    }

    thread_local! {
        static NESTING: Cell<usize> = const { Cell::new(0) };
    }

    #[test]
    fn test_only_non_final_continuations_are_buffered() {
        // Depths 1 and 2 are non-final, depths 3 through 6 are final.
        let shape = ExpansionShape {
            fanout: 2,
            max_depth: 6,
            final_depth: 3,
        };
        let tree_count = 4;
        let non_final_per_tree = 2 + 4;
        let final_per_tree = shape.nodes_per_tree() - 1 - non_final_per_tree;
        for dispatcher in [
            &SequentialThreadDispatcher::new(1) as &dyn IThreadDispatcher,
            &SimpleThreadDispatcher::new(4),
        ] {
            // Inline processing nests inside the emitting call, so a top-level call on a non-seed node is a pop.
            let popped = Mutex::new(Vec::new());
            let counter = VisitCounter::new(&shape, tree_count);
            let seeds = shape.seeds(tree_count);
            let stats = parallel_continue(dispatcher, &seeds, |node, emitter| {
                counter.visit(node);
                let nesting = NESTING.with(|nesting| nesting.replace(nesting.get() + 1));
                if nesting == 0 && node.depth > 0 {
                    popped.lock().unwrap().push(*node);
                }
                shape.expand(node, emitter);
                NESTING.with(|current| current.set(nesting));
            });
            counter.assert_each_visited_once();
            assert_counters_consistent(&stats);

            let popped = popped.into_inner().unwrap();
            assert!(popped.iter().all(|node| !node.is_final), "a final continuation was buffered");
            assert_eq!(popped.len(), tree_count as usize * non_final_per_tree);

            let total = stats.total();
            // Stacks never fill up here, so every non-final emission is buffered and every final one is inlined.
            assert_eq!(total.buffered, tree_count as usize * non_final_per_tree);
            assert_eq!(total.inlined, tree_count as usize * final_per_tree);
            assert_eq!(total.stolen + total.drained, total.buffered);
        }
    }

    #[derive(Clone, Copy, Debug)]
    struct Named {
        name: &'static str,
        is_final: bool,
    }

    impl Continuation for Named {
        fn is_final(&self) -> bool {
            self.is_final
        }
    }

    #[test]
    fn test_two_seed_scenario_on_four_workers() {
        let dispatcher = SimpleThreadDispatcher::new(4);
        let seeds = [
            Named {
                name: "A",
                is_final: false,
            },
            Named {
                name: "B",
                is_final: true,
            },
        ];
        let visited = Mutex::new(HashMap::new());
        let stats = parallel_continue(&dispatcher, &seeds, |continuation, emitter| {
            *visited.lock().unwrap().entry(continuation.name).or_insert(0) += 1;
            if continuation.name == "A" {
                emitter.emit(Named {
                    name: "A.child1",
                    is_final: true,
                });
                emitter.emit(Named {
                    name: "A.child2",
                    is_final: true,
                });
            }
        });

        let visited = visited.into_inner().unwrap();
        assert_eq!(visited.len(), 4);
        for name in ["A", "B", "A.child1", "A.child2"] {
            assert_eq!(visited.get(name), Some(&1), "{name} should be visited once");
        }
        assert_eq!(stats.worker_count(), 4);
        assert_eq!(stats.total().buffered, 0);
    }

    #[test]
    fn test_recursion_depth_limit_aborts_run() {
        // A chain of final continuations recurses one level per link.
        let shape = ExpansionShape {
            fanout: 1,
            max_depth: 100,
            final_depth: 1,
        };
        let seeds = shape.seeds(1);
        let config = ParallelContinueConfig::default().with_maximum_recursion_depth(10);
        let result = parallel_continue_with_config(
            &SequentialThreadDispatcher::new(1),
            &seeds,
            config,
            |node, emitter| shape.expand(node, emitter),
        );
        assert_eq!(
            result,
            Err(ContinueError::RecursionDepthExceeded {
                depth: 11,
                worker_index: 0
            })
        );

        let config = ParallelContinueConfig::default().with_maximum_recursion_depth(100);
        let stats = parallel_continue_with_config(
            &SimpleThreadDispatcher::new(2),
            &seeds,
            config,
            |node, emitter| shape.expand(node, emitter),
        )
        .unwrap();
        assert_eq!(stats.total().deepest_recursion, 100);
    }

    #[test]
    fn test_zero_workers_is_an_error() {
        let seeds = [Named {
            name: "A",
            is_final: true,
        }];
        let config = ParallelContinueConfig::default().with_maximum_worker_count(0);
        let result = parallel_continue_with_config(&SequentialThreadDispatcher::new(4), &seeds, config, |_, _| {});
        assert_eq!(result, Err(ContinueError::NoWorkers));

        let result = parallel_continue_with_config(
            &SequentialThreadDispatcher::new(0),
            &seeds,
            ParallelContinueConfig::default(),
            |_, _| {},
        );
        assert_eq!(result, Err(ContinueError::NoWorkers));
    }

    #[test]
    fn test_empty_seed_array() {
        let dispatcher = SimpleThreadDispatcher::new(3);
        let seeds: [Named; 0] = [];
        for termination in [TerminationPolicy::SinglePass, TerminationPolicy::ActiveWorkers] {
            let config = ParallelContinueConfig::default().with_termination(termination);
            let stats = parallel_continue_with_config(&dispatcher, &seeds, config, |_, _| {
                panic!("nothing should be processed");
            })
            .unwrap();
            assert_eq!(stats.total(), WorkerStats::default());
        }
    }

    #[test]
    fn test_maximum_worker_count_sizes_the_run() {
        let dispatcher = SimpleThreadDispatcher::new(4);
        let shape = ExpansionShape {
            fanout: 2,
            max_depth: 6,
            final_depth: 5,
        };
        let config = ParallelContinueConfig::default().with_maximum_worker_count(2);
        let stats = run_expansion(&dispatcher, shape, 4, config);
        assert_eq!(stats.worker_count(), 2);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_every_expanded_continuation_is_processed_once(
            thread_count in 1usize..5,
            tree_count in 0u32..12,
            fanout in 1u32..4,
            max_depth in 0u32..6,
            final_depth in 0u32..7,
            active_workers in any::<bool>(),
        ) {
            let dispatcher = SimpleThreadDispatcher::new(thread_count);
            let shape = ExpansionShape { fanout, max_depth, final_depth };
            let termination = if active_workers {
                TerminationPolicy::ActiveWorkers
            } else {
                TerminationPolicy::SinglePass
            };
            let config = ParallelContinueConfig::default().with_termination(termination);
            let stats = run_expansion(&dispatcher, shape, tree_count, config);
            prop_assert_eq!(stats.total().claimed, tree_count as usize);
        }
    }
}
