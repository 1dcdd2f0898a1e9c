//! LP relaxation solved with minilp's simplex.
//!
//! minilp problems are immutable once solved, so every solve builds a fresh
//! problem from the base rows, the cuts and the current bounds.

use minilp::{ComparisonOp, LinearExpr, OptimizationDirection, Problem, Variable};

use super::{LinearCut, MasterBackend, MasterResult, MasterStatus};
use crate::error::{MipError, MipResult};
use crate::model::{MipProblem, RowSense};

/// A base row in minilp terms.
#[derive(Debug, Clone)]
struct BaseRow {
    terms: Vec<(usize, f64)>,
    op: ComparisonOp,
    rhs: f64,
}

impl BaseRow {
    /// For a row without terms: does `0 <op> rhs` hold?
    fn constant_holds(&self) -> bool {
        match self.op {
            ComparisonOp::Le => 0.0 <= self.rhs,
            ComparisonOp::Ge => 0.0 >= self.rhs,
            ComparisonOp::Eq => self.rhs == 0.0,
        }
    }
}

/// [`MasterBackend`] over minilp.
#[derive(Default)]
pub struct SimplexMasterBackend {
    obj: Vec<f64>,
    rows: Vec<BaseRow>,
    cuts: Vec<LinearCut>,
    lb: Vec<f64>,
    ub: Vec<f64>,
    initialized: bool,
    lp_solves: u64,
}

impl SimplexMasterBackend {
    /// Uninitialized backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// LP solves so far.
    pub fn lp_solves(&self) -> u64 {
        self.lp_solves
    }

    /// Rows and cuts without terms never reach minilp. True if one of
    /// them fails as a constant.
    fn constant_row_fails(&self) -> bool {
        let rows = self
            .rows
            .iter()
            .any(|r| r.terms.is_empty() && !r.constant_holds());
        rows || self.cuts.iter().any(|c| c.terms.is_empty() && c.rhs < 0.0)
    }

    fn build(&self) -> (Problem, Vec<Variable>) {
        let mut lp = Problem::new(OptimizationDirection::Minimize);
        let vars: Vec<Variable> = self
            .obj
            .iter()
            .zip(self.lb.iter().zip(&self.ub))
            .map(|(&c, (&l, &u))| lp.add_var(c, (l, u)))
            .collect();

        let expr = |terms: &[(usize, f64)]| {
            let mut e = LinearExpr::empty();
            for &(j, a) in terms {
                e.add(vars[j], a);
            }
            e
        };

        for row in self.rows.iter().filter(|r| !r.terms.is_empty()) {
            lp.add_constraint(expr(&row.terms), row.op, row.rhs);
        }
        for cut in self.cuts.iter().filter(|c| !c.terms.is_empty()) {
            lp.add_constraint(expr(&cut.terms), ComparisonOp::Le, cut.rhs);
        }

        (lp, vars)
    }
}

impl MasterBackend for SimplexMasterBackend {
    fn initialize(&mut self, prob: &MipProblem) -> MipResult<()> {
        self.obj = prob.obj.clone();
        self.lb = prob.var_lb.clone();
        self.ub = prob.var_ub.clone();
        self.rows = prob
            .a
            .outer_iterator()
            .zip(prob.row_sense.iter().zip(&prob.rhs))
            .map(|(row, (&sense, &rhs))| BaseRow {
                terms: row.iter().map(|(j, &a)| (j, a)).collect(),
                op: match sense {
                    RowSense::Le => ComparisonOp::Le,
                    RowSense::Ge => ComparisonOp::Ge,
                    RowSense::Eq => ComparisonOp::Eq,
                },
                rhs,
            })
            .collect();
        self.cuts.clear();
        self.initialized = true;
        Ok(())
    }

    fn add_cut(&mut self, cut: &LinearCut) -> usize {
        self.cuts.push(cut.clone());
        self.cuts.len() - 1
    }

    fn set_var_bounds(&mut self, var: usize, lb: f64, ub: f64) {
        if var < self.obj.len() {
            self.lb[var] = lb;
            self.ub[var] = ub;
        }
    }

    fn solve(&mut self) -> MipResult<MasterResult> {
        if !self.initialized {
            return Err(MipError::InternalError(
                "LP solved before initialization".to_string(),
            ));
        }

        // minilp rejects empty domains
        let empty_domain = self.lb.iter().zip(&self.ub).any(|(l, u)| l > u);
        if empty_domain || self.constant_row_fails() {
            return Ok(MasterResult::without_point(MasterStatus::Infeasible));
        }

        let (lp, vars) = self.build();
        self.lp_solves += 1;

        let solution = match lp.solve() {
            Ok(solution) => solution,
            Err(minilp::Error::Infeasible) => {
                return Ok(MasterResult::without_point(MasterStatus::Infeasible))
            }
            Err(minilp::Error::Unbounded) => {
                return Ok(MasterResult::without_point(MasterStatus::Unbounded))
            }
        };

        let x: Vec<f64> = vars.iter().map(|&v| solution[v]).collect();
        let obj_val = solution.objective();
        if !obj_val.is_finite() || x.iter().any(|v| !v.is_finite()) {
            return Err(MipError::MasterSolveError(
                "LP returned non-finite values".to_string(),
            ));
        }
        log::trace!("lp solve {}: obj {:.6e}", self.lp_solves, obj_val);

        Ok(MasterResult {
            status: MasterStatus::Optimal,
            x,
            obj_val,
        })
    }

    fn num_cuts(&self) -> usize {
        self.cuts.len()
    }

    fn num_vars(&self) -> usize {
        self.obj.len()
    }

    fn num_base_constraints(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::master::CutOrigin;
    use crate::model::{cons, ObjSense, VarData, VarId, VarType};

    const ORIGIN: CutOrigin = CutOrigin {
        handler: 0,
        node: 0,
    };

    /// min -x0 - x1, x0 + x1 <= 1.5, both in [0, 1]
    fn simple_lp() -> MipProblem {
        let var = |name: &str, vtype| VarData {
            name: name.into(),
            vtype,
            obj: -1.0,
            lb: 0.0,
            ub: 1.0,
        };
        let vars = vec![var("x0", VarType::Binary), var("x1", VarType::Continuous)];
        let rows = vec![cons().coef(VarId(0), 1.0).coef(VarId(1), 1.0).le(1.5)];
        MipProblem::new(&vars, &rows, ObjSense::Minimize).unwrap()
    }

    fn backend() -> SimplexMasterBackend {
        let mut backend = SimplexMasterBackend::new();
        backend.initialize(&simple_lp()).unwrap();
        backend
    }

    #[test]
    fn test_root_relaxation() {
        let mut backend = backend();
        assert_eq!(backend.num_vars(), 2);
        assert_eq!(backend.num_cuts(), 0);
        assert_eq!(backend.num_base_constraints(), 1);

        let result = backend.solve().unwrap();
        assert_eq!(result.status, MasterStatus::Optimal);
        // The row is binding
        assert!((result.obj_val + 1.5).abs() < 1e-8);
        assert!((result.x[0] + result.x[1] - 1.5).abs() < 1e-8);
    }

    #[test]
    fn test_cut_and_bounds() {
        let mut backend = backend();

        backend.add_cut(&LinearCut::new(vec![(0, 1.0), (1, 1.0)], 1.0, ORIGIN));
        let result = backend.solve().unwrap();
        assert!((result.obj_val + 1.0).abs() < 1e-8);

        // x0 fixed to 1 pushes x1 to 0
        backend.set_bounds(&[1.0, 0.0], &[1.0, 1.0]);
        let result = backend.solve().unwrap();
        assert!((result.x[0] - 1.0).abs() < 1e-8);
        assert!(result.x[1].abs() < 1e-8);
        assert_eq!(backend.lp_solves(), 2);
    }

    #[test]
    fn test_infeasible_relaxations() {
        let mut backend = backend();

        backend.set_var_bounds(0, 1.0, 1.0);
        backend.add_cut(&LinearCut::new(vec![(0, 1.0), (1, 1.0)], 0.5, ORIGIN));
        assert_eq!(backend.solve().unwrap().status, MasterStatus::Infeasible);

        backend.set_var_bounds(1, 1.0, 0.0);
        assert_eq!(backend.solve().unwrap().status, MasterStatus::Infeasible);
    }

    #[test]
    fn test_empty_cuts() {
        let mut backend = backend();

        backend.add_cut(&LinearCut::new(Vec::new(), 0.0, ORIGIN));
        let result = backend.solve().unwrap();
        assert_eq!(result.status, MasterStatus::Optimal);
        assert!((result.obj_val + 1.5).abs() < 1e-8);

        backend.add_cut(&LinearCut::new(Vec::new(), -1.0, ORIGIN));
        assert_eq!(backend.solve().unwrap().status, MasterStatus::Infeasible);
    }

    #[test]
    fn test_uninitialized_backend_errors() {
        let mut backend = SimplexMasterBackend::new();
        assert!(matches!(backend.solve(), Err(MipError::InternalError(_))));
    }
}
