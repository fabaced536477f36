//! Hierarchical checkbox trees for date and duration columns.

pub mod arena;
pub mod builder;

pub use arena::{DateTree, NodeId, TreeNode, consensus};
pub use builder::build_tree;
