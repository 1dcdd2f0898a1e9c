//! Branching variable selection.

use super::{BoundChange, BranchSide};
use crate::model::MipProblem;
use crate::settings::BranchingRule;

/// Where to split a node.
#[derive(Debug, Clone)]
pub struct BranchDecision {
    /// Variable to branch on.
    pub var: usize,
    /// Its fractional LP value.
    pub value: f64,
    /// Its domain at the node being split.
    pub domain: (f64, f64),
    /// Selection score, for logging.
    pub score: f64,
}

impl BranchDecision {
    /// The bound change of one child.
    pub fn change(&self, side: BranchSide) -> BoundChange {
        match side {
            BranchSide::Down => BoundChange::down(self.var, self.value),
            BranchSide::Up => BoundChange::up(self.var, self.value),
        }
    }

    /// True if the child on `side` has an empty domain.
    pub fn is_empty(&self, side: BranchSide) -> bool {
        self.change(side).empties(self.domain.0, self.domain.1)
    }
}

/// Average objective increase per unit of movement, per direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pseudocost {
    /// Cost of moving down.
    pub down: f64,
    /// Cost of moving up.
    pub up: f64,
    /// Observations behind `down`.
    pub n_down: u64,
    /// Observations behind `up`.
    pub n_up: u64,
}

impl Pseudocost {
    fn uniform(cost: f64) -> Self {
        Self {
            down: cost,
            up: cost,
            n_down: 0,
            n_up: 0,
        }
    }

    /// Cost toward `side`.
    pub fn get(&self, side: BranchSide) -> f64 {
        match side {
            BranchSide::Down => self.down,
            BranchSide::Up => self.up,
        }
    }

    /// Fold one per-unit observation into the running average. The initial
    /// value counts as one observation.
    fn observe(&mut self, side: BranchSide, per_unit: f64) {
        let (cost, count) = match side {
            BranchSide::Down => (&mut self.down, &mut self.n_down),
            BranchSide::Up => (&mut self.up, &mut self.n_up),
        };
        let weight = *count as f64 + 1.0;
        *cost = (*cost * weight + per_unit) / (weight + 1.0);
        *count += 1;
    }
}

/// Picks branching variables and learns pseudocosts.
pub struct BranchingSelector {
    rule: BranchingRule,
    costs: Vec<Pseudocost>,
    nodes_processed: u64,
}

impl BranchingSelector {
    /// Selector over `num_vars` variables with neutral pseudocosts.
    pub fn new(rule: BranchingRule, num_vars: usize) -> Self {
        Self {
            rule,
            costs: vec![Pseudocost::uniform(1.0); num_vars],
            nodes_processed: 0,
        }
    }

    /// Seed pseudocosts with `|c_j|`, at least 0.1.
    pub fn init_from_objective(&mut self, obj: &[f64]) {
        for (pc, &c) in self.costs.iter_mut().zip(obj) {
            *pc = Pseudocost::uniform(c.abs().max(0.1));
        }
    }

    /// Count one processed node, for the hybrid switch.
    pub fn node_processed(&mut self) {
        self.nodes_processed += 1;
    }

    /// Pseudocost record of a variable.
    pub fn pseudocost(&self, var: usize) -> Pseudocost {
        self.costs[var]
    }

    /// Number of observations in both directions.
    pub fn branch_count(&self, var: usize) -> u64 {
        let pc = &self.costs[var];
        pc.n_down + pc.n_up
    }

    /// Choose a fractional integer variable at a node with bounds `lb`/`ub`.
    ///
    /// `None` means `x` is integral on every integer variable.
    pub fn select(
        &self,
        x: &[f64],
        prob: &MipProblem,
        lb: &[f64],
        ub: &[f64],
        tol: f64,
    ) -> Option<BranchDecision> {
        let fractional = prob.fractional_vars(x, tol);

        let use_pseudocost = match self.rule {
            BranchingRule::MostFractional => false,
            BranchingRule::Pseudocost => true,
            BranchingRule::Hybrid { switch_after_nodes } => {
                self.nodes_processed >= switch_after_nodes
            }
        };

        let scored = fractional.into_iter().map(|(var, value, frac)| {
            let score = if use_pseudocost {
                self.score(var, value)
            } else {
                frac
            };
            (var, value, score)
        });

        // Strictly better only: ties stay with the lowest index
        let (var, value, score) =
            scored.reduce(|best, cand| if cand.2 > best.2 + 1e-12 { cand } else { best })?;

        Some(BranchDecision {
            var,
            value,
            domain: (lb[var], ub[var]),
            score,
        })
    }

    /// Product of the estimated gains of both children.
    fn score(&self, var: usize, value: f64) -> f64 {
        let pc = &self.costs[var];
        let gain = |side: BranchSide| side.distance(value) * pc.get(side);
        (gain(BranchSide::Down) * gain(BranchSide::Up)).max(1e-10)
    }

    /// Record the objective change seen in the child on `side`.
    ///
    /// `value` is the variable's LP value at the parent.
    pub fn update_pseudocost(&mut self, var: usize, value: f64, side: BranchSide, obj_change: f64) {
        let dist = side.distance(value);
        if dist <= 1e-6 || !obj_change.is_finite() {
            return;
        }
        self.costs[var].observe(side, obj_change.max(0.0) / dist);
    }
}
