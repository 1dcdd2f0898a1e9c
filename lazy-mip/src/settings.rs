//! Search and tolerance settings.

use crate::error::{MipError, MipResult};

/// How the variable to branch on is chosen among fractional integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BranchingRule {
    /// Fractional part closest to 0.5, lowest index on ties.
    #[default]
    MostFractional,

    /// Product of the estimated objective gains of both children.
    Pseudocost,

    /// Most fractional until enough nodes have fed the pseudocosts.
    Hybrid {
        /// Nodes processed before pseudocosts take over.
        switch_after_nodes: u64,
    },
}

/// Which open node is processed next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeSelection {
    /// Lowest dual bound; equal bounds go to the older node.
    #[default]
    BestBound,

    /// Deepest node.
    DepthFirst,

    /// Lowest pseudocost estimate.
    BestEstimate,

    /// Best bound, diving every `dive_freq` pops.
    Hybrid {
        /// Pops between dives.
        dive_freq: usize,
    },
}

/// Settings of one [`Model::optimize`](crate::Model::optimize) call.
#[derive(Debug, Clone)]
pub struct MipSettings {
    /// Stop after this many nodes have been processed.
    pub max_nodes: u64,

    /// Wall-clock limit, checked between nodes.
    pub time_limit_ms: Option<u64>,

    /// Relative gap `(incumbent - bound) / |incumbent|` at which the search stops.
    pub gap_tol: f64,

    /// Absolute gap at which the search stops.
    pub gap_abs_tol: f64,

    /// `x` counts as integral if `|x - round(x)| <= int_feas_tol`.
    pub int_feas_tol: f64,

    /// Slack allowed on rows, bounds and lazy constraints.
    /// Handler constraints must be violated by more than this.
    pub feas_tol: f64,

    /// Branching variable choice.
    pub branching_rule: BranchingRule,

    /// Open node choice.
    pub node_selection: NodeSelection,

    /// Round the first LP solution of fractional nodes and offer it as an
    /// incumbent. Candidates still go through every handler's `check`.
    pub rounding_heuristic: bool,

    /// LP re-solves allowed at one node after handlers added constraints.
    pub max_enforce_rounds: usize,

    /// Let presolve fix variables from locks.
    ///
    /// Only sound if every handler declares the locks of the constraints
    /// it will add later.
    pub allow_dual_reductions: bool,

    /// Log progress at `info` level.
    pub verbose: bool,

    /// Progress line every `log_freq` nodes; 0 disables them.
    pub log_freq: u64,
}

impl Default for MipSettings {
    fn default() -> Self {
        Self {
            max_nodes: 1_000_000,
            time_limit_ms: None,
            gap_tol: 1e-4,
            gap_abs_tol: 1e-6,
            int_feas_tol: 1e-6,
            feas_tol: 1e-6,
            branching_rule: BranchingRule::default(),
            node_selection: NodeSelection::default(),
            rounding_heuristic: true,
            max_enforce_rounds: 1_000,
            allow_dual_reductions: true,
            verbose: false,
            log_freq: 100,
        }
    }
}

impl MipSettings {
    /// Default settings with a progress line per node.
    pub fn verbose() -> Self {
        Self {
            verbose: true,
            log_freq: 1,
            ..Self::default()
        }
    }

    /// Set the time limit in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit_ms = Some((seconds * 1000.0) as u64);
        self
    }

    /// Set the node limit.
    pub fn with_max_nodes(mut self, nodes: u64) -> Self {
        self.max_nodes = nodes;
        self
    }

    /// Set the relative gap tolerance.
    pub fn with_gap_tol(mut self, tol: f64) -> Self {
        self.gap_tol = tol;
        self
    }

    /// Set branching and node selection together.
    pub fn with_strategy(mut self, branching: BranchingRule, selection: NodeSelection) -> Self {
        self.branching_rule = branching;
        self.node_selection = selection;
        self
    }

    /// Set the per-node enforcement round limit.
    pub fn with_max_enforce_rounds(mut self, rounds: usize) -> Self {
        self.max_enforce_rounds = rounds;
        self
    }

    /// Turn the rounding heuristic on or off.
    pub fn with_rounding(mut self, enabled: bool) -> Self {
        self.rounding_heuristic = enabled;
        self
    }

    /// Enable or disable dual reductions in presolve.
    pub fn with_dual_reductions(mut self, allow: bool) -> Self {
        self.allow_dual_reductions = allow;
        self
    }

    /// Reject tolerances that are negative or not finite.
    pub fn validate(&self) -> MipResult<()> {
        let tolerances = [
            ("gap_tol", self.gap_tol),
            ("gap_abs_tol", self.gap_abs_tol),
            ("int_feas_tol", self.int_feas_tol),
            ("feas_tol", self.feas_tol),
        ];
        for (name, tol) in tolerances {
            if !tol.is_finite() || tol < 0.0 {
                return Err(MipError::InvalidProblem(format!(
                    "setting {} = {} must be finite and non-negative",
                    name, tol
                )));
            }
        }
        // Integrality is decided by rounding, so the window must stay below 1/2
        if self.int_feas_tol >= 0.5 {
            return Err(MipError::InvalidProblem(format!(
                "setting int_feas_tol = {} must be below 0.5",
                self.int_feas_tol
            )));
        }
        Ok(())
    }
}
