//! Search nodes and the outcome of processing one.

/// What happened to a node once its LP was solved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeOutcome {
    /// LP relaxation infeasible.
    Infeasible,

    /// Bound not better than the incumbent.
    Pruned,

    /// Two children were created (fewer if a domain became empty).
    Branched,

    /// Integral, accepted by every handler, offered as incumbent.
    Feasible {
        /// Objective of the accepted point, minimization form.
        obj: f64,
    },
}

impl NodeOutcome {
    /// True if the subtree was discarded without branching.
    pub fn is_pruned(&self) -> bool {
        matches!(self, NodeOutcome::Infeasible | NodeOutcome::Pruned)
    }
}

/// Which child of a branching a node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchSide {
    /// `x <= floor(value)`.
    Down,
    /// `x >= ceil(value)`.
    Up,
}

impl BranchSide {
    /// Distance the variable has to move from `value` to reach this side.
    pub fn distance(self, value: f64) -> f64 {
        let frac = value - value.floor();
        match self {
            BranchSide::Down => frac,
            BranchSide::Up => 1.0 - frac,
        }
    }
}

/// A single tightened bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundChange {
    /// Variable index.
    pub var: usize,
    /// Upper bound for `Down`, lower bound for `Up`.
    pub side: BranchSide,
    /// The new bound value.
    pub bound: f64,
}

impl BoundChange {
    /// `x <= floor(value)`.
    pub fn down(var: usize, value: f64) -> Self {
        Self {
            var,
            side: BranchSide::Down,
            bound: value.floor(),
        }
    }

    /// `x >= ceil(value)`.
    pub fn up(var: usize, value: f64) -> Self {
        Self {
            var,
            side: BranchSide::Up,
            bound: value.ceil(),
        }
    }

    /// Tighten `lb`/`ub` in place. Never loosens.
    pub fn apply(&self, lb: &mut [f64], ub: &mut [f64]) {
        match self.side {
            BranchSide::Down => ub[self.var] = ub[self.var].min(self.bound),
            BranchSide::Up => lb[self.var] = lb[self.var].max(self.bound),
        }
    }

    /// True if applying the change to `[lb, ub]` leaves no value.
    pub fn empties(&self, lb: f64, ub: f64) -> bool {
        match self.side {
            BranchSide::Down => lb > self.bound + 1e-9,
            BranchSide::Up => self.bound > ub + 1e-9,
        }
    }
}

/// The branching step that created a node, kept for pseudocost updates.
#[derive(Debug, Clone, Copy)]
pub struct BranchRecord {
    /// Branching variable.
    pub var: usize,
    /// Its LP value at the parent.
    pub value: f64,
    /// Parent LP objective.
    pub parent_obj: f64,
    /// Which child this is.
    pub side: BranchSide,
}

/// A node of the branch-and-bound tree.
///
/// Nodes store the full path of bound changes from the root, so a node can
/// be solved without its ancestors.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// Unique id, 0 for the root. Children get increasing ids.
    pub id: u64,
    /// Root distance.
    pub depth: usize,
    /// Bound changes from the root, in application order.
    pub bound_changes: Vec<BoundChange>,
    /// How this node was created; `None` for the root.
    pub branch: Option<BranchRecord>,
    /// Lower bound on every objective in the subtree.
    pub dual_bound: f64,
    /// Pseudocost estimate of the best objective in the subtree.
    pub estimate: f64,
}

impl SearchNode {
    /// The root node.
    pub fn root() -> Self {
        Self {
            id: 0,
            depth: 0,
            bound_changes: Vec::new(),
            branch: None,
            dual_bound: f64::NEG_INFINITY,
            estimate: f64::NEG_INFINITY,
        }
    }

    /// A child with one more bound change. Bounds are inherited.
    pub fn child(&self, id: u64, change: BoundChange, branch: BranchRecord) -> Self {
        let mut bound_changes = Vec::with_capacity(self.bound_changes.len() + 1);
        bound_changes.extend_from_slice(&self.bound_changes);
        bound_changes.push(change);

        Self {
            id,
            depth: self.depth + 1,
            bound_changes,
            branch: Some(branch),
            dual_bound: self.dual_bound,
            estimate: self.estimate,
        }
    }

    /// Bounds at this node, starting from the global bounds.
    pub fn local_bounds(&self, global_lb: &[f64], global_ub: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let mut lb = global_lb.to_vec();
        let mut ub = global_ub.to_vec();
        for change in &self.bound_changes {
            change.apply(&mut lb, &mut ub);
        }
        (lb, ub)
    }

    /// True if the subtree cannot beat `incumbent_obj`.
    pub fn can_prune(&self, incumbent_obj: f64) -> bool {
        self.dual_bound >= incumbent_obj - 1e-9
    }
}
