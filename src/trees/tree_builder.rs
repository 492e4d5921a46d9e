use crate::utilities::task_scheduling::{
    Continuation, ContinueError, ContinueStats, ParallelContinue, ParallelContinueConfig, ParallelContinueTask,
};
use crate::utilities::thread_dispatcher::IThreadDispatcher;
use crate::utilities::BoundingBox;
use glam::Vec3;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::leaf::Leaf;
use super::node::{Node, NodeChild};
use super::tree::Tree;

/// Request to build the subtree over `indices[start..start + count]` into node `node_index`.
#[derive(Clone, Copy, Debug)]
struct SubtreeContinuation {
    node_index: u32,
    start: u32,
    count: u32,
    is_final: bool,
}

impl Continuation for SubtreeContinuation {
    #[inline(always)]
    fn is_final(&self) -> bool {
        self.is_final
    }
}

/// Mutable buffer that workers write to at disjoint locations.
struct DisjointBuffer<'a, T> {
    pointer: *mut T,
    len: usize,
    _marker: PhantomData<&'a mut [T]>,
}

unsafe impl<T: Send> Send for DisjointBuffer<'_, T> {}
unsafe impl<T: Send> Sync for DisjointBuffer<'_, T> {}

impl<'a, T> DisjointBuffer<'a, T> {
    fn new(slice: &'a mut [T]) -> Self {
        Self {
            pointer: slice.as_mut_ptr(),
            len: slice.len(),
            _marker: PhantomData,
        }
    }

    /// # Safety
    /// No other live reference may overlap `start..start + count`.
    #[inline(always)]
    unsafe fn slice_mut(&self, start: usize, count: usize) -> &mut [T] {
        debug_assert!(start + count <= self.len);
        std::slice::from_raw_parts_mut(self.pointer.add(start), count)
    }

    /// # Safety
    /// No other thread may access `index` concurrently.
    #[inline(always)]
    unsafe fn write(&self, index: usize, value: T) {
        debug_assert!(index < self.len);
        self.pointer.add(index).write(value);
    }
}

struct BuildContext<'a> {
    leaf_bounds: &'a [BoundingBox],
    centroids: Vec<Vec3>,
    indices: DisjointBuffer<'a, u32>,
    nodes: DisjointBuffer<'a, Node>,
    leaves: DisjointBuffer<'a, Leaf>,
    node_counter: AtomicUsize,
    final_leaf_threshold: usize,
}

impl BuildContext<'_> {
    #[inline(always)]
    fn subtree(&self, node_index: usize, start: usize, count: usize) -> SubtreeContinuation {
        SubtreeContinuation {
            node_index: node_index as u32,
            start: start as u32,
            count: count as u32,
            is_final: count <= self.final_leaf_threshold,
        }
    }

    /// Splits the subtree's leaves at the median centroid along the widest axis, writes the node and emits any
    /// child that still needs a node of its own.
    fn build_node(&self, subtree: &SubtreeContinuation, emitter: &mut dyn ParallelContinue<SubtreeContinuation>) {
        let node_index = subtree.node_index as usize;
        let start = subtree.start as usize;
        let count = subtree.count as usize;
        debug_assert!(count >= 2, "Subtrees with fewer than two leaves don't need a node.");
        let split = count / 2;

        // The index range borrow must end before children are emitted; a thief may claim them immediately.
        let (bounds_a, bounds_b, single_a, single_b) = {
            // Safety: continuation ranges are disjoint, and this range belongs to this continuation alone.
            let indices = unsafe { self.indices.slice_mut(start, count) };
            let mut centroid_bounds = BoundingBox::empty();
            for &index in indices.iter() {
                centroid_bounds.merge_point(self.centroids[index as usize]);
            }
            let span = centroid_bounds.max - centroid_bounds.min;
            let axis = if span.x >= span.y && span.x >= span.z {
                0
            } else if span.y >= span.z {
                1
            } else {
                2
            };
            indices.select_nth_unstable_by(split, |a, b| {
                self.centroids[*a as usize][axis].total_cmp(&self.centroids[*b as usize][axis])
            });
            let (a, b) = indices.split_at(split);
            (self.merge_bounds(a), self.merge_bounds(b), a[0], b[0])
        };

        let mut children = [NodeChild::default(); 2];
        let ranges = [(start, split, bounds_a, single_a), (start + split, count - split, bounds_b, single_b)];
        let mut pending = [None, None];
        for (child_index, (child_start, child_count, bounds, first_leaf)) in ranges.into_iter().enumerate() {
            if child_count == 1 {
                children[child_index] = NodeChild::new(bounds, Tree::encode(first_leaf as i32), 1);
                // Safety: each leaf belongs to exactly one range, and only the node holding it writes its pointer.
                unsafe {
                    self.leaves
                        .write(first_leaf as usize, Leaf::new(node_index, child_index));
                }
            } else {
                let child_node_index = self.node_counter.fetch_add(1, Ordering::Relaxed);
                children[child_index] = NodeChild::new(bounds, child_node_index as i32, child_count as i32);
                pending[child_index] = Some(self.subtree(child_node_index, child_start, child_count));
            }
        }

        // Safety: node indices are handed out once by the counter.
        unsafe {
            self.nodes.write(
                node_index,
                Node {
                    a: children[0],
                    b: children[1],
                },
            );
        }
        for child in pending.into_iter().flatten() {
            emitter.emit(child);
        }
    }

    #[inline(always)]
    fn merge_bounds(&self, indices: &[u32]) -> BoundingBox {
        let mut bounds = BoundingBox::empty();
        for &index in indices {
            bounds.merge(&self.leaf_bounds[index as usize]);
        }
        bounds
    }
}

/// Builds a `Tree` top-down over a set of leaf bounds, spreading the work through the continuation engine.
#[derive(Clone, Copy, Debug)]
pub struct TreeBuilder {
    /// Subtrees with at most this many leaves are built inline by whichever worker reaches them.
    pub final_leaf_threshold: usize,
    /// Number of subtrees to expand sequentially before seeding the engine. `None` uses twice the worker count.
    pub seed_target: Option<usize>,
    pub config: ParallelContinueConfig,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self {
            final_leaf_threshold: 16,
            seed_target: None,
            config: ParallelContinueConfig::default(),
        }
    }
}

impl TreeBuilder {
    /// Builds a tree containing one leaf per entry of `leaf_bounds`. Leaf `i` corresponds to `leaf_bounds[i]`.
    pub fn build<D>(&self, dispatcher: &D, leaf_bounds: &[BoundingBox]) -> Result<(Tree, ContinueStats), ContinueError>
    where
        D: IThreadDispatcher + ?Sized,
    {
        let leaf_count = leaf_bounds.len();
        assert!(leaf_count <= i32::MAX as usize, "Too many leaves for the node encoding.");
        match leaf_count {
            0 => return Ok((Tree::empty(), ContinueStats::default())),
            1 => {
                let tree = Tree {
                    nodes: vec![Node {
                        a: NodeChild::new(leaf_bounds[0], Tree::encode(0), 1),
                        b: NodeChild::default(),
                    }],
                    leaves: vec![Leaf::new(0, 0)],
                };
                return Ok((tree, ContinueStats::default()));
            }
            _ => {}
        }

        let mut indices: Vec<u32> = (0..leaf_count as u32).collect();
        let mut nodes = vec![Node::default(); leaf_count - 1];
        let mut leaves = vec![Leaf::default(); leaf_count];
        let stats = {
            let context = BuildContext {
                leaf_bounds,
                centroids: leaf_bounds.iter().map(BoundingBox::centroid).collect(),
                indices: DisjointBuffer::new(&mut indices),
                nodes: DisjointBuffer::new(&mut nodes),
                leaves: DisjointBuffer::new(&mut leaves),
                node_counter: AtomicUsize::new(1),
                final_leaf_threshold: self.final_leaf_threshold,
            };

            // Expand the largest pending subtrees on this thread until there is enough to go around.
            let seed_target = self
                .seed_target
                .unwrap_or_else(|| 2 * self.config.worker_count(dispatcher.thread_count()));
            let mut seeds = vec![context.subtree(0, 0, leaf_count)];
            while seeds.len() < seed_target {
                let Some(position) = seeds
                    .iter()
                    .enumerate()
                    .filter(|(_, subtree)| !subtree.is_final())
                    .max_by_key(|(_, subtree)| subtree.count)
                    .map(|(position, _)| position)
                else {
                    break;
                };
                let subtree = seeds.swap_remove(position);
                context.build_node(&subtree, &mut seeds);
            }

            tracing::debug!(leaf_count, seed_count = seeds.len(), "building tree");
            ParallelContinueTask::run(dispatcher, &seeds, self.config, &|subtree, emitter| {
                context.build_node(subtree, emitter)
            })?
        };

        Ok((Tree { nodes, leaves }, stats))
    }
}
