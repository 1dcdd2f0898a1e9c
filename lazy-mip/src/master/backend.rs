//! LP relaxation interface and the cut row type.

use crate::error::MipResult;
use crate::model::{Constraint, MipProblem, RowSense};

/// Outcome of one LP solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterStatus {
    /// Optimal point found.
    Optimal,
    /// No point satisfies the current rows, cuts and bounds.
    Infeasible,
    /// Objective unbounded below.
    Unbounded,
}

/// LP solve result.
#[derive(Debug, Clone)]
pub struct MasterResult {
    /// Solve outcome.
    pub status: MasterStatus,
    /// Optimal point; empty unless `Optimal`.
    pub x: Vec<f64>,
    /// Objective, minimization form.
    pub obj_val: f64,
}

impl MasterResult {
    /// A result without a point.
    pub fn without_point(status: MasterStatus) -> Self {
        let obj_val = match status {
            MasterStatus::Unbounded => f64::NEG_INFINITY,
            _ => f64::INFINITY,
        };
        Self {
            status,
            x: Vec::new(),
            obj_val,
        }
    }
}

/// Who produced a cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutOrigin {
    /// Index of the handler in inclusion order.
    pub handler: usize,
    /// Node being enforced.
    pub node: u64,
}

/// A sparse row `a^T x <= rhs`.
#[derive(Debug, Clone)]
pub struct LinearCut {
    /// `(column, coefficient)` sorted by column, no zeros, no repeats.
    pub terms: Vec<(usize, f64)>,
    /// Right-hand side.
    pub rhs: f64,
    /// Name of the constraint it came from.
    pub name: Option<String>,
    /// Producer.
    pub origin: CutOrigin,
}

impl LinearCut {
    /// Unnamed cut.
    pub fn new(terms: Vec<(usize, f64)>, rhs: f64, origin: CutOrigin) -> Self {
        Self {
            terms,
            rhs,
            name: None,
            origin,
        }
    }

    /// Rewrite a constraint as `<=` rows: `>=` is negated, `==` gives two.
    pub fn from_constraint(cons: &Constraint, origin: CutOrigin) -> Vec<LinearCut> {
        let terms = cons.expr.merged();
        let flipped: Vec<(usize, f64)> = terms.iter().map(|&(j, c)| (j, -c)).collect();

        let rows = match cons.sense {
            RowSense::Le => vec![(terms, cons.rhs)],
            RowSense::Ge => vec![(flipped, -cons.rhs)],
            RowSense::Eq => vec![(terms, cons.rhs), (flipped, -cons.rhs)],
        };
        rows.into_iter()
            .map(|(terms, rhs)| LinearCut {
                terms,
                rhs,
                name: cons.name.clone(),
                origin,
            })
            .collect()
    }

    /// `a^T x`.
    pub fn activity(&self, x: &[f64]) -> f64 {
        self.terms.iter().map(|&(j, a)| a * x[j]).sum()
    }

    /// `a^T x - rhs`; positive means violated.
    pub fn violation(&self, x: &[f64]) -> f64 {
        self.activity(x) - self.rhs
    }

    /// True if violated by more than `tol`.
    pub fn is_violated(&self, x: &[f64], tol: f64) -> bool {
        self.violation(x) > tol
    }

    /// Largest absolute coefficient, 0 for an empty row.
    pub fn max_abs_coef(&self) -> f64 {
        self.terms.iter().fold(0.0, |m, &(_, a)| m.max(a.abs()))
    }

    /// True if every coefficient and the right-hand side are finite.
    ///
    /// An empty cut reads `0 <= rhs` and is fine.
    pub fn is_finite(&self) -> bool {
        self.rhs.is_finite() && self.terms.iter().all(|(_, c)| c.is_finite())
    }
}

/// An LP relaxation the search can tighten and re-solve.
///
/// Cuts are only ever added during one solve. Bounds change per node.
pub trait MasterBackend {
    /// Load the base rows, objective and global bounds.
    fn initialize(&mut self, prob: &MipProblem) -> MipResult<()>;

    /// Append a cut. Returns its position.
    fn add_cut(&mut self, cut: &LinearCut) -> usize;

    /// Set the bounds of one variable.
    fn set_var_bounds(&mut self, var: usize, lb: f64, ub: f64);

    /// Set the bounds of every variable.
    fn set_bounds(&mut self, lb: &[f64], ub: &[f64]) {
        for (j, (&l, &u)) in lb.iter().zip(ub).enumerate() {
            self.set_var_bounds(j, l, u);
        }
    }

    /// Solve the current relaxation.
    fn solve(&mut self) -> MipResult<MasterResult>;

    /// Cuts added so far.
    fn num_cuts(&self) -> usize;

    /// Columns.
    fn num_vars(&self) -> usize;

    /// Base rows, cuts excluded.
    fn num_base_constraints(&self) -> usize;
}
