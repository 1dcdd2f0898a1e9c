//! Dual-fixing presolve.
//!
//! A variable whose objective does not reward moving away from a bound, and
//! which no constraint prevents from moving toward it, can be fixed at that
//! bound without losing all optimal solutions. The argument only covers the
//! constraints accounted for in the lock table.

use crate::handler::LockTable;
use crate::model::MipProblem;

/// A bound fixing found by presolve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fixing {
    /// Variable index.
    pub var: usize,

    /// Value the variable is fixed at.
    pub value: f64,
}

/// Find dual fixings for a minimization problem.
pub fn dual_fixings(prob: &MipProblem, locks: &LockTable) -> Vec<Fixing> {
    let mut fixings = Vec::new();

    for j in 0..prob.num_vars() {
        let (lb, ub) = (prob.var_lb[j], prob.var_ub[j]);
        // Fixed, or empty and left for the bound check to report
        if lb >= ub {
            continue;
        }
        let c = prob.obj[j];

        if c >= 0.0 && locks.down(j) == 0 && lb.is_finite() {
            fixings.push(Fixing { var: j, value: lb });
        } else if c <= 0.0 && locks.up(j) == 0 && ub.is_finite() {
            fixings.push(Fixing { var: j, value: ub });
        }
    }

    fixings
}

/// Apply fixings to the problem bounds.
pub fn apply_fixings(prob: &mut MipProblem, fixings: &[Fixing]) {
    for f in fixings {
        prob.var_lb[f.var] = f.value;
        prob.var_ub[f.var] = f.value;
    }
}
