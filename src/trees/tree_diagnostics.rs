use super::node::Node;
use super::tree::Tree;
use crate::utilities::{BoundingBox, ContainmentType};

impl Tree {
    /// Measures the SAH cost metric of the tree relative to its root. Lower is better.
    pub fn measure_cost_metric(&self) -> f32 {
        if self.leaf_count() <= 2 {
            return 0.0;
        }
        let root_metric = self.root_bounds().surface_metric();
        let mut total_cost = 0.0f32;
        for node in &self.nodes {
            for child in [&node.a, &node.b] {
                // Both leaf and internal node cost is 1, so just add the metric.
                total_cost += child.bounds().surface_metric();
            }
        }
        total_cost / root_metric
    }

    fn validate_node(
        &self,
        node_index: usize,
        expected_bounds: &BoundingBox,
        visited_nodes: &mut [bool],
        visited_leaves: &mut [bool],
    ) -> i32 {
        assert!(
            node_index < self.node_count(),
            "Implied existence of node {node_index} is outside of count {}.",
            self.node_count()
        );
        assert!(!visited_nodes[node_index], "Node {node_index} is reachable more than once.");
        visited_nodes[node_index] = true;

        let node: &Node = &self.nodes[node_index];
        let mut found_leaf_count = 0i32;
        for child_index in 0..2 {
            let child = node.child(child_index);
            assert!(
                child.leaf_count > 0,
                "Node {node_index} child {child_index} is unoccupied."
            );
            let child_bounds = child.bounds();
            assert!(
                !child_bounds.is_empty(),
                "Node {node_index} child {child_index} has a bad bounding box."
            );
            assert_eq!(
                expected_bounds.contains(&child_bounds),
                ContainmentType::Contains,
                "Node {node_index} child {child_index} escapes its parent's bounds."
            );

            if child.is_leaf() {
                self.validate_leaf(node_index, child_index, child.index, child.leaf_count, visited_leaves);
                found_leaf_count += 1;
            } else {
                let child_found_leaf_count = self.validate_node(
                    child.index as usize,
                    &child_bounds,
                    visited_nodes,
                    visited_leaves,
                );
                assert_eq!(
                    child_found_leaf_count, child.leaf_count,
                    "Bad leaf count for child {child_index} of node {node_index}."
                );
                found_leaf_count += child_found_leaf_count;
            }
        }
        found_leaf_count
    }

    fn validate_leaf(
        &self,
        node_index: usize,
        child_index: usize,
        encoded_index: i32,
        leaf_count: i32,
        visited_leaves: &mut [bool],
    ) {
        assert_eq!(
            leaf_count, 1,
            "Bad leaf count on node {node_index} child {child_index}, it's a leaf but leaf_count is {leaf_count}."
        );
        let leaf_index = Self::encode(encoded_index) as usize;
        assert!(leaf_index < self.leaf_count(), "Bad node-contained leaf index.");
        assert!(!visited_leaves[leaf_index], "Leaf {leaf_index} is referenced more than once.");
        visited_leaves[leaf_index] = true;
        let leaf = self.leaves[leaf_index];
        assert!(
            leaf.node_index() == node_index && leaf.child_index() == child_index,
            "Mismatch between node-held leaf pointer and leaf's pointers."
        );
    }

    /// Checks the structural invariants of the tree, panicking on the first violation.
    ///
    /// Every node and leaf must be reachable exactly once from the root, child bounds must lie inside the bounds
    /// stored for them in the parent, leaf counts must add up and leaves must point back at their slots.
    pub fn validate(&self) {
        let leaf_count = self.leaf_count();
        match leaf_count {
            0 => assert_eq!(self.node_count(), 0, "An empty tree should have no nodes."),
            1 => {
                assert_eq!(self.node_count(), 1, "A single leaf tree should have exactly one node.");
                let root = &self.nodes[0];
                assert_eq!(root.b.leaf_count, 0, "A single leaf tree's second child should be unoccupied.");
                let mut visited_leaves = [false];
                self.validate_leaf(0, 0, root.a.index, root.a.leaf_count, &mut visited_leaves);
            }
            _ => {
                assert_eq!(
                    self.node_count(),
                    leaf_count - 1,
                    "A binary tree with {leaf_count} leaves should have {} nodes.",
                    leaf_count - 1
                );
                let mut visited_nodes = vec![false; self.node_count()];
                let mut visited_leaves = vec![false; leaf_count];
                let found_leaf_count =
                    self.validate_node(0, &self.root_bounds(), &mut visited_nodes, &mut visited_leaves);
                assert_eq!(found_leaf_count as usize, leaf_count, "Leaf count mismatch at the root.");
                assert!(visited_nodes.iter().all(|&visited| visited), "Some nodes are unreachable.");
                assert!(visited_leaves.iter().all(|&visited| visited), "Some leaves are unreachable.");
            }
        }
    }
}
