//! Branch-and-bound search tree.

mod branching;
mod node;
mod queue;
mod tree;

pub use branching::{BranchDecision, BranchingSelector, Pseudocost};
pub use node::{BoundChange, BranchRecord, BranchSide, NodeOutcome, SearchNode};
pub use queue::NodeQueue;
pub use tree::BranchAndBound;
