//! Solve results and incumbent bookkeeping.

use std::fmt;

use super::expr::VarId;

/// How a solve ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MipStatus {
    /// Search completed with an incumbent.
    Optimal,
    /// Search completed without an incumbent.
    Infeasible,
    /// Stopped by `max_nodes`.
    NodeLimit,
    /// Stopped by `time_limit_ms`.
    TimeLimit,
    /// Stopped because the gap fell below `gap_tol` or `gap_abs_tol`.
    GapLimit,
}

impl MipStatus {
    /// True unless the model was proven infeasible.
    ///
    /// Limit statuses carry a point only if an incumbent was found; see
    /// [`MipSolution::has_solution`].
    pub fn has_solution(&self) -> bool {
        !matches!(self, MipStatus::Infeasible)
    }

    /// True if the incumbent is optimal within the gap tolerances.
    pub fn is_optimal(&self) -> bool {
        matches!(self, MipStatus::Optimal | MipStatus::GapLimit)
    }
}

impl fmt::Display for MipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MipStatus::Optimal => "optimal",
            MipStatus::Infeasible => "infeasible",
            MipStatus::NodeLimit => "node limit",
            MipStatus::TimeLimit => "time limit",
            MipStatus::GapLimit => "gap limit",
        };
        f.write_str(s)
    }
}

/// Where an incumbent came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncumbentSource {
    /// An integral LP solution accepted by every handler.
    Lp,
    /// A rounded fractional LP solution accepted by every handler.
    Rounding,
}

/// `|primal - dual| / max(|primal|, 1e-10)`, infinite if either side is.
pub fn relative_gap(primal: f64, dual: f64) -> f64 {
    if primal.is_infinite() || dual.is_infinite() {
        return f64::INFINITY;
    }
    (primal - dual).abs() / primal.abs().max(1e-10)
}

/// Result of [`Model::optimize`](crate::Model::optimize).
///
/// Objective and bound are in the model's sense.
#[derive(Debug, Clone)]
pub struct MipSolution {
    /// How the solve ended.
    pub status: MipStatus,
    /// Best point, one value per variable; empty if none was found.
    pub x: Vec<f64>,
    /// Objective of `x`.
    pub obj_val: f64,
    /// Best proven bound.
    pub bound: f64,
    /// Relative gap between `obj_val` and `bound`.
    pub gap: f64,
    /// Nodes whose LP was solved.
    pub nodes_explored: u64,
    /// Nodes discarded by bound, infeasibility or an empty domain.
    pub nodes_pruned: u64,
    /// Nodes ever queued, root included.
    pub nodes_created: u64,
    /// Lazy constraints added by handlers.
    pub cuts_added: u64,
    /// LP re-solves after handlers added constraints.
    pub enforce_rounds: u64,
    /// Variables fixed by dual reductions.
    pub presolve_fixings: usize,
    /// Incumbent improvements.
    pub incumbent_updates: u64,
    /// Origin of `x`.
    pub found_by: Option<IncumbentSource>,
    /// Wall time of the whole call.
    pub solve_time_ms: u64,
}

impl Default for MipSolution {
    fn default() -> Self {
        Self {
            status: MipStatus::Infeasible,
            x: Vec::new(),
            obj_val: f64::INFINITY,
            bound: f64::NEG_INFINITY,
            gap: f64::INFINITY,
            nodes_explored: 0,
            nodes_pruned: 0,
            nodes_created: 0,
            cuts_added: 0,
            enforce_rounds: 0,
            presolve_fixings: 0,
            incumbent_updates: 0,
            found_by: None,
            solve_time_ms: 0,
        }
    }
}

impl MipSolution {
    /// Infeasible result with no statistics.
    pub fn infeasible() -> Self {
        Self::default()
    }

    /// True if a point is attached.
    pub fn has_solution(&self) -> bool {
        self.status.has_solution() && !self.x.is_empty()
    }

    /// Value of a variable in the best point.
    ///
    /// Panics if no point is attached.
    pub fn value(&self, var: VarId) -> f64 {
        self.x[var.index()]
    }

    /// Flip objective and bound for a maximization model.
    pub(crate) fn into_sense(mut self, obj_sign: f64) -> Self {
        if obj_sign < 0.0 {
            self.obj_val = -self.obj_val;
            self.bound = -self.bound;
        }
        self
    }
}

/// A feasible point with its minimization-form objective.
#[derive(Debug, Clone)]
pub struct Incumbent {
    /// Values per variable.
    pub x: Vec<f64>,
    /// Objective.
    pub obj: f64,
    /// Node that produced it.
    pub node: u64,
    /// How it was produced.
    pub source: IncumbentSource,
}

/// Best feasible point found so far, minimization form.
#[derive(Debug, Clone, Default)]
pub struct IncumbentTracker {
    best: Option<Incumbent>,
    updates: u64,
}

impl IncumbentTracker {
    /// No incumbent yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// True once any point was accepted.
    pub fn has_incumbent(&self) -> bool {
        self.best.is_some()
    }

    /// Incumbent objective, `+inf` if none.
    pub fn obj(&self) -> f64 {
        self.best.as_ref().map_or(f64::INFINITY, |inc| inc.obj)
    }

    /// The incumbent, if any.
    pub fn best(&self) -> Option<&Incumbent> {
        self.best.as_ref()
    }

    /// Number of improvements.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Keep `candidate` if it improves the objective by more than 1e-9.
    pub fn offer(&mut self, candidate: Incumbent) -> bool {
        if candidate.obj < self.obj() - 1e-9 {
            self.best = Some(candidate);
            self.updates += 1;
            true
        } else {
            false
        }
    }

    /// Relative gap to `dual_bound`.
    pub fn gap(&self, dual_bound: f64) -> f64 {
        relative_gap(self.obj(), dual_bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(obj: f64, source: IncumbentSource) -> Incumbent {
        Incumbent {
            x: vec![obj],
            obj,
            node: 0,
            source,
        }
    }

    #[test]
    fn test_tracker_keeps_strict_improvements() {
        let mut tracker = IncumbentTracker::new();
        assert!(!tracker.has_incumbent());
        assert_eq!(tracker.obj(), f64::INFINITY);

        assert!(tracker.offer(point(10.0, IncumbentSource::Rounding)));
        assert!(!tracker.offer(point(15.0, IncumbentSource::Lp)));
        assert!(!tracker.offer(point(10.0, IncumbentSource::Lp)));
        assert_eq!(tracker.updates(), 1);

        assert!(tracker.offer(point(5.0, IncumbentSource::Lp)));
        let best = tracker.best().unwrap();
        assert_eq!((best.obj, best.source), (5.0, IncumbentSource::Lp));
        assert_eq!(tracker.updates(), 2);
    }

    #[test]
    fn test_relative_gap() {
        assert!((relative_gap(10.0, 8.0) - 0.2).abs() < 1e-10);
        assert!(relative_gap(10.0, 9.9999) < 0.001);
        assert!(relative_gap(f64::INFINITY, 1.0).is_infinite());
        assert!(relative_gap(1.0, f64::NEG_INFINITY).is_infinite());
    }

    #[test]
    fn test_status() {
        assert!(MipStatus::NodeLimit.has_solution());
        assert!(!MipStatus::Infeasible.has_solution());
        assert!(MipStatus::GapLimit.is_optimal());
        assert!(!MipStatus::TimeLimit.is_optimal());
        assert_eq!(MipStatus::NodeLimit.to_string(), "node limit");
    }

    #[test]
    fn test_solution_sense_and_values() {
        let sol = MipSolution {
            status: MipStatus::Optimal,
            x: vec![0.0, 1.0],
            obj_val: -3.0,
            bound: -3.5,
            ..MipSolution::default()
        }
        .into_sense(-1.0);

        assert!(sol.has_solution());
        assert_eq!(sol.value(VarId(1)), 1.0);
        assert_eq!((sol.obj_val, sol.bound), (3.0, 3.5));
        assert!(!MipSolution::infeasible().has_solution());
    }
}
