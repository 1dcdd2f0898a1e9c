//! Constraint handler extension point.
//!
//! A constraint handler represents constraints the model never states
//! explicitly. The search calls it at two points:
//!
//! - **check**: a complete candidate solution is about to become the
//!   incumbent. The handler sees the values only and answers feasible or
//!   infeasible. It cannot touch the model.
//! - **enforce**: the LP relaxation at a node produced an integral point.
//!   The handler either accepts it or appends constraints that cut it off,
//!   after which the node LP is solved again.
//!
//! Handlers are invoked synchronously in inclusion order.

use crate::model::{Constraint, MipProblem, RowSense, VarId};

/// Answer of [`ConstraintHandler::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feasibility {
    /// The solution satisfies the handler's constraints.
    Feasible,
    /// The solution violates at least one of them.
    Infeasible,
}

impl Feasibility {
    /// True for [`Feasibility::Feasible`].
    pub fn is_feasible(self) -> bool {
        self == Feasibility::Feasible
    }
}

/// Answer of [`ConstraintHandler::enforce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnforceResult {
    /// The LP solution satisfies the handler's constraints.
    Feasible,
    /// Constraints were added through the context; the node must be
    /// re-solved. At least one of them must cut off the current point.
    ConsAdded,
}

/// Read-only view of a candidate or LP solution.
#[derive(Debug, Clone, Copy)]
pub struct SolutionView<'a> {
    values: &'a [f64],
}

impl<'a> SolutionView<'a> {
    /// Wrap dense values indexed by variable.
    pub fn new(values: &'a [f64]) -> Self {
        Self { values }
    }

    /// Value of a variable.
    pub fn val(&self, var: VarId) -> f64 {
        self.values[var.index()]
    }

    /// All values.
    pub fn values(&self) -> &'a [f64] {
        self.values
    }
}

/// What an enforcing handler may use: the LP solution and a sink for new
/// constraints.
#[derive(Debug)]
pub struct EnforceContext<'a> {
    solution: SolutionView<'a>,
    node: u64,
    added: Vec<Constraint>,
}

impl<'a> EnforceContext<'a> {
    /// Context for the LP solution `values` at `node`.
    pub fn new(values: &'a [f64], node: u64) -> Self {
        Self {
            solution: SolutionView::new(values),
            node,
            added: Vec::new(),
        }
    }

    /// The LP solution being enforced.
    pub fn solution(&self) -> SolutionView<'a> {
        self.solution
    }

    /// Value of a variable in the LP solution.
    pub fn val(&self, var: VarId) -> f64 {
        self.solution.val(var)
    }

    /// Node being processed.
    pub fn node(&self) -> u64 {
        self.node
    }

    /// Append a constraint to the model. It stays for the rest of the solve.
    pub fn add_cons(&mut self, cons: Constraint) {
        self.added.push(cons);
    }

    /// Constraints added so far in this call.
    pub fn added(&self) -> &[Constraint] {
        &self.added
    }

    pub(crate) fn into_added(self) -> Vec<Constraint> {
        self.added
    }
}

/// Per-variable lock counts.
///
/// A down-lock on `x` means decreasing `x` may violate some constraint; an
/// up-lock means increasing it may.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockTable {
    down: Vec<u32>,
    up: Vec<u32>,
}

impl LockTable {
    /// Table with no locks for `n` variables.
    pub fn new(n: usize) -> Self {
        Self {
            down: vec![0; n],
            up: vec![0; n],
        }
    }

    /// Locks implied by the rows of a problem.
    pub fn from_rows(prob: &MipProblem) -> Self {
        let mut locks = Self::new(prob.num_vars());
        for (i, row) in prob.a.outer_iterator().enumerate() {
            let sense = prob.row_sense[i];
            for (j, &coef) in row.iter() {
                let (down, up) = match (sense, coef > 0.0) {
                    (RowSense::Eq, _) => (1, 1),
                    (RowSense::Le, true) | (RowSense::Ge, false) => (0, 1),
                    (RowSense::Le, false) | (RowSense::Ge, true) => (1, 0),
                };
                locks.add_locks(VarId(j), down, up);
            }
        }
        locks
    }

    /// Add lock counts for a variable.
    pub fn add_locks(&mut self, var: VarId, down: u32, up: u32) {
        self.down[var.index()] += down;
        self.up[var.index()] += up;
    }

    /// Down-locks of a variable.
    pub fn down(&self, var: usize) -> u32 {
        self.down[var]
    }

    /// Up-locks of a variable.
    pub fn up(&self, var: usize) -> u32 {
        self.up[var]
    }
}

/// A constraint handler plugged into [`crate::Model`].
pub trait ConstraintHandler {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Decide feasibility of a complete candidate. Must not have side
    /// effects on the model.
    fn check(&mut self, solution: &SolutionView<'_>) -> Feasibility;

    /// Enforce on an integral LP solution.
    fn enforce(&mut self, ctx: &mut EnforceContext<'_>) -> EnforceResult;

    /// Declare locks for the constraints this handler may add.
    ///
    /// The default declares none. Presolve dual reductions are only sound
    /// if every handler declares its locks, see
    /// [`crate::MipSettings::allow_dual_reductions`].
    fn lock(&self, _locks: &mut LockTable) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{cons, ObjSense, VarData, VarType};

    fn var(name: &str) -> VarData {
        VarData {
            name: name.to_string(),
            vtype: VarType::Continuous,
            obj: 0.0,
            lb: 0.0,
            ub: 1.0,
        }
    }

    #[test]
    fn test_locks_from_rows() {
        // x0 + x1 <= 1, x1 - x2 >= 0, x0 == 1
        let vars = vec![var("x0"), var("x1"), var("x2")];
        let rows = vec![
            cons().coef(VarId(0), 1.0).coef(VarId(1), 1.0).le(1.0),
            cons().coef(VarId(1), 1.0).coef(VarId(2), -1.0).ge(0.0),
            cons().coef(VarId(0), 1.0).eq(1.0),
        ];
        let prob = MipProblem::new(&vars, &rows, ObjSense::Minimize).unwrap();
        let locks = LockTable::from_rows(&prob);

        assert_eq!((locks.down(0), locks.up(0)), (1, 2));
        assert_eq!((locks.down(1), locks.up(1)), (1, 1));
        assert_eq!((locks.down(2), locks.up(2)), (0, 1));
    }

    #[test]
    fn test_enforce_context_collects() {
        let values = [0.0, 1.0];
        let mut ctx = EnforceContext::new(&values, 7);

        assert_eq!(ctx.val(VarId(1)), 1.0);
        assert_eq!(ctx.node(), 7);
        assert!(ctx.added().is_empty());

        ctx.add_cons(cons().coef(VarId(1), 1.0).le(0.0));
        assert_eq!(ctx.added().len(), 1);
        assert_eq!(ctx.into_added().len(), 1);
    }
}
