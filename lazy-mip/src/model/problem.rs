//! Compiled problem: minimization objective, CSR rows, tightened bounds.

use sprs::{CsMat, TriMat};

use super::expr::{Constraint, RowSense};
use crate::error::{MipError, MipResult};

/// Integrality class of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    /// Real-valued.
    Continuous,
    /// Integer-valued.
    Integer,
    /// Integer in [0, 1].
    Binary,
}

impl VarType {
    /// True for `Integer` and `Binary`.
    pub fn is_integral(self) -> bool {
        !matches!(self, VarType::Continuous)
    }
}

/// Objective direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjSense {
    /// Minimize the objective.
    #[default]
    Minimize,
    /// Maximize the objective.
    Maximize,
}

/// Column as declared on the model.
#[derive(Debug, Clone)]
pub struct VarData {
    /// Name.
    pub name: String,
    /// Integrality class.
    pub vtype: VarType,
    /// Objective coefficient in the declared sense.
    pub obj: f64,
    /// Lower bound.
    pub lb: f64,
    /// Upper bound.
    pub ub: f64,
}

/// A model compiled for the search.
///
/// The objective is stored for minimization; `obj_sign` is -1 if the model
/// maximizes. Integer bounds are rounded inward and binaries clipped to
/// [0, 1].
#[derive(Debug, Clone)]
pub struct MipProblem {
    /// Objective, minimization form.
    pub obj: Vec<f64>,
    /// +1 to minimize, -1 to maximize.
    pub obj_sign: f64,
    /// One row per model constraint.
    pub a: CsMat<f64>,
    /// Row senses.
    pub row_sense: Vec<RowSense>,
    /// Right-hand sides.
    pub rhs: Vec<f64>,
    /// Integer and binary columns, ascending.
    pub integer_vars: Vec<usize>,
    /// Lower bounds.
    pub var_lb: Vec<f64>,
    /// Upper bounds.
    pub var_ub: Vec<f64>,
}

fn invalid(msg: String) -> MipError {
    MipError::InvalidProblem(msg)
}

impl MipProblem {
    /// Compile declared columns and rows.
    ///
    /// Repeated terms are merged. Every coefficient, objective entry and
    /// right-hand side must be finite, bounds must not be NaN, and rows may
    /// only reference declared variables.
    pub fn new(vars: &[VarData], rows: &[Constraint], sense: ObjSense) -> MipResult<Self> {
        let n = vars.len();
        let obj_sign = match sense {
            ObjSense::Minimize => 1.0,
            ObjSense::Maximize => -1.0,
        };

        let mut obj = Vec::with_capacity(n);
        let mut var_lb = Vec::with_capacity(n);
        let mut var_ub = Vec::with_capacity(n);
        let mut integer_vars = Vec::new();

        for (j, var) in vars.iter().enumerate() {
            if !var.obj.is_finite() {
                return Err(invalid(format!(
                    "variable {} has objective coefficient {}",
                    var.name, var.obj
                )));
            }
            if var.lb.is_nan() || var.ub.is_nan() {
                return Err(invalid(format!("variable {} has a NaN bound", var.name)));
            }

            let (mut lb, mut ub) = (var.lb, var.ub);
            if var.vtype == VarType::Binary {
                lb = lb.max(0.0);
                ub = ub.min(1.0);
            }
            if var.vtype.is_integral() {
                lb = (lb - 1e-9).ceil();
                ub = (ub + 1e-9).floor();
                integer_vars.push(j);
            }

            obj.push(obj_sign * var.obj);
            var_lb.push(lb);
            var_ub.push(ub);
        }

        let m = rows.len();
        let mut tri = TriMat::new((m, n));
        let mut row_sense = Vec::with_capacity(m);
        let mut rhs = Vec::with_capacity(m);

        for (i, row) in rows.iter().enumerate() {
            if !row.rhs.is_finite() {
                return Err(invalid(format!(
                    "constraint {} has right-hand side {}",
                    row.label(),
                    row.rhs
                )));
            }
            for (j, coef) in row.expr.merged() {
                if j >= n {
                    return Err(invalid(format!(
                        "constraint {} references variable {} of {}",
                        row.label(),
                        j,
                        n
                    )));
                }
                if !coef.is_finite() {
                    return Err(invalid(format!(
                        "constraint {} has coefficient {} on variable {}",
                        row.label(),
                        coef,
                        j
                    )));
                }
                tri.add_triplet(i, j, coef);
            }
            row_sense.push(row.sense);
            rhs.push(row.rhs);
        }

        Ok(Self {
            obj,
            obj_sign,
            a: tri.to_csr(),
            row_sense,
            rhs,
            integer_vars,
            var_lb,
            var_ub,
        })
    }

    /// Number of variables.
    pub fn num_vars(&self) -> usize {
        self.obj.len()
    }

    /// Number of rows.
    pub fn num_constraints(&self) -> usize {
        self.rhs.len()
    }

    /// Number of integer and binary variables.
    pub fn num_integers(&self) -> usize {
        self.integer_vars.len()
    }

    /// Objective at `x`, minimization form.
    pub fn objective(&self, x: &[f64]) -> f64 {
        self.obj.iter().zip(x).map(|(c, x)| c * x).sum()
    }

    /// True if every row holds within `tol`.
    pub fn satisfies_rows(&self, x: &[f64], tol: f64) -> bool {
        self.a
            .outer_iterator()
            .zip(self.row_sense.iter().zip(&self.rhs))
            .all(|(row, (&sense, &rhs))| {
                let act: f64 = row.iter().map(|(j, &a)| a * x[j]).sum();
                match sense {
                    RowSense::Le => act <= rhs + tol,
                    RowSense::Ge => act >= rhs - tol,
                    RowSense::Eq => (act - rhs).abs() <= tol,
                }
            })
    }

    /// True if every variable is within its bounds up to `tol`.
    pub fn satisfies_bounds(&self, x: &[f64], tol: f64) -> bool {
        x.iter()
            .zip(self.var_lb.iter().zip(&self.var_ub))
            .all(|(&v, (&lb, &ub))| v >= lb - tol && v <= ub + tol)
    }

    /// True unless some variable has `lb > ub`.
    pub fn bounds_feasible(&self) -> bool {
        self.var_lb
            .iter()
            .zip(&self.var_ub)
            .all(|(&lb, &ub)| lb <= ub + 1e-9)
    }

    /// Round integer variables to the nearest integer.
    pub fn round_integers(&self, x: &mut [f64]) {
        for &j in &self.integer_vars {
            x[j] = x[j].round();
        }
    }

    /// Integer variables farther than `tol` from an integer, as
    /// `(index, value, distance to nearest integer)`, ascending by index.
    pub fn fractional_vars(&self, x: &[f64], tol: f64) -> Vec<(usize, f64, f64)> {
        self.integer_vars
            .iter()
            .map(|&j| (j, x[j], (x[j] - x[j].round()).abs()))
            .filter(|&(_, _, frac)| frac > tol)
            .collect()
    }
}
