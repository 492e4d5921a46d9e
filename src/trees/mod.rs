//! Binary bounding volume trees built top-down through the continuation engine.

mod leaf;
mod node;
mod tree;
mod tree_builder;
mod tree_diagnostics;

pub use leaf::Leaf;
pub use node::{Node, NodeChild};
pub use tree::Tree;
pub use tree_builder::TreeBuilder;
