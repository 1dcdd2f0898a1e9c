//! Open node queue.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::SearchNode;
use crate::settings::NodeSelection;

/// Heap entry. Larger `key` pops first, then smaller node id.
struct Entry {
    key: f64,
    node: SearchNode,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .total_cmp(&other.key)
            .then_with(|| other.node.id.cmp(&self.node.id))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

/// Priority queue of open nodes under a [`NodeSelection`] strategy.
pub struct NodeQueue {
    strategy: NodeSelection,
    heap: BinaryHeap<Entry>,
    pushed: u64,
    popped: u64,
}

impl NodeQueue {
    /// Empty queue.
    pub fn new(strategy: NodeSelection) -> Self {
        Self {
            strategy,
            heap: BinaryHeap::new(),
            pushed: 0,
            popped: 0,
        }
    }

    /// Queue a node.
    pub fn push(&mut self, node: SearchNode) {
        let key = self.key(&node);
        self.heap.push(Entry { key, node });
        self.pushed += 1;
    }

    /// Take the next node.
    pub fn pop(&mut self) -> Option<SearchNode> {
        let entry = self.heap.pop()?;
        self.popped += 1;
        Some(entry.node)
    }

    /// Lowest dual bound among open nodes, `+inf` when empty.
    pub fn best_bound(&self) -> f64 {
        self.heap
            .iter()
            .map(|e| e.node.dual_bound)
            .fold(f64::INFINITY, f64::min)
    }

    /// Drop every node that cannot beat `incumbent_obj`. Returns how many.
    pub fn prune_by_bound(&mut self, incumbent_obj: f64) -> usize {
        let before = self.heap.len();
        self.heap.retain(|e| !e.node.can_prune(incumbent_obj));
        before - self.heap.len()
    }

    /// True if no node is open.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Number of open nodes.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Nodes ever pushed.
    pub fn total_added(&self) -> u64 {
        self.pushed
    }

    fn key(&self, node: &SearchNode) -> f64 {
        let depth = node.depth as f64;
        match self.strategy {
            NodeSelection::BestBound => -node.dual_bound,
            NodeSelection::DepthFirst => depth,
            NodeSelection::BestEstimate => -node.estimate,
            // Keys are fixed at push time, so the dive decision is too
            NodeSelection::Hybrid { dive_freq } => {
                if self.popped % dive_freq.max(1) as u64 == 0 {
                    depth
                } else {
                    -node.dual_bound
                }
            }
        }
    }
}
