//! Linear expressions and constraints.

use std::fmt;

/// Handle to a model variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(pub(crate) usize);

impl VarId {
    /// Column index of this variable in the compiled problem.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Sense of a linear row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSense {
    /// a^T x <= rhs
    Le,
    /// a^T x >= rhs
    Ge,
    /// a^T x == rhs
    Eq,
}

/// Sparse linear expression: sum of coef * var.
///
/// Repeated variables are allowed; they are summed on evaluation and
/// merged when the expression is compiled into a row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinExpr {
    terms: Vec<(VarId, f64)>,
}

impl LinExpr {
    /// Empty expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `coef * var`.
    pub fn add(&mut self, var: VarId, coef: f64) {
        self.terms.push((var, coef));
    }

    /// Builder form of [`LinExpr::add`].
    pub fn with(mut self, var: VarId, coef: f64) -> Self {
        self.add(var, coef);
        self
    }

    /// Terms in insertion order.
    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True if no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluate at a dense point indexed by variable.
    pub fn eval(&self, x: &[f64]) -> f64 {
        self.terms.iter().map(|&(v, c)| c * x[v.0]).sum()
    }

    /// Terms with repeated variables summed and zeros dropped, sorted by
    /// column.
    pub fn merged(&self) -> Vec<(usize, f64)> {
        let mut terms: Vec<(usize, f64)> = self.terms.iter().map(|&(v, c)| (v.0, c)).collect();
        terms.sort_by_key(|&(j, _)| j);

        let mut merged: Vec<(usize, f64)> = Vec::with_capacity(terms.len());
        for (j, c) in terms {
            match merged.last_mut() {
                Some((last, acc)) if *last == j => *acc += c,
                _ => merged.push((j, c)),
            }
        }
        merged.retain(|&(_, c)| c != 0.0);
        merged
    }
}

impl FromIterator<(VarId, f64)> for LinExpr {
    fn from_iter<I: IntoIterator<Item = (VarId, f64)>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}

/// A linear constraint `expr (<=|>=|==) rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Left-hand side.
    pub expr: LinExpr,

    /// Row sense.
    pub sense: RowSense,

    /// Right-hand side.
    pub rhs: f64,

    /// Optional name for logs.
    pub name: Option<String>,
}

/// Start building a constraint. Finish with [`ConsBuilder::le`],
/// [`ConsBuilder::ge`] or [`ConsBuilder::eq`].
pub fn cons() -> ConsBuilder {
    ConsBuilder {
        expr: LinExpr::new(),
        name: None,
    }
}

/// Builder returned by [`cons`].
#[derive(Debug, Clone, Default)]
pub struct ConsBuilder {
    expr: LinExpr,
    name: Option<String>,
}

impl ConsBuilder {
    /// Add `coef * var` to the left-hand side.
    pub fn coef(mut self, var: VarId, coef: f64) -> Self {
        self.expr.add(var, coef);
        self
    }

    /// Add all terms of an iterator to the left-hand side.
    pub fn expr(mut self, terms: impl IntoIterator<Item = (VarId, f64)>) -> Self {
        for (var, coef) in terms {
            self.expr.add(var, coef);
        }
        self
    }

    /// Name the constraint.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// `expr <= rhs`.
    pub fn le(self, rhs: f64) -> Constraint {
        self.finish(RowSense::Le, rhs)
    }

    /// `expr >= rhs`.
    pub fn ge(self, rhs: f64) -> Constraint {
        self.finish(RowSense::Ge, rhs)
    }

    /// `expr == rhs`.
    pub fn eq(self, rhs: f64) -> Constraint {
        self.finish(RowSense::Eq, rhs)
    }

    fn finish(self, sense: RowSense, rhs: f64) -> Constraint {
        Constraint {
            expr: self.expr,
            sense,
            rhs,
            name: self.name,
        }
    }
}

impl Constraint {
    /// Amount by which `x` violates this constraint (0 if satisfied).
    pub fn violation(&self, x: &[f64]) -> f64 {
        let lhs = self.expr.eval(x);
        match self.sense {
            RowSense::Le => (lhs - self.rhs).max(0.0),
            RowSense::Ge => (self.rhs - lhs).max(0.0),
            RowSense::Eq => (lhs - self.rhs).abs(),
        }
    }

    /// Check if `x` satisfies this constraint within `tol`.
    pub fn is_satisfied(&self, x: &[f64], tol: f64) -> bool {
        self.violation(x) <= tol
    }

    /// Name for logging.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merged_terms() {
        let expr = LinExpr::new()
            .with(VarId(2), 1.0)
            .with(VarId(0), 3.0)
            .with(VarId(2), 2.0)
            .with(VarId(1), 1.0)
            .with(VarId(1), -1.0);

        assert_eq!(expr.merged(), vec![(0, 3.0), (2, 3.0)]);
    }

    #[test]
    fn test_constraint_violation() {
        let x0 = VarId(0);
        let x1 = VarId(1);

        let le = cons().coef(x0, 1.0).coef(x1, 1.0).le(1.0);
        assert!(le.is_satisfied(&[0.5, 0.5], 1e-9));
        assert!((le.violation(&[1.0, 1.0]) - 1.0).abs() < 1e-12);

        let ge = cons().expr([(x0, 2.0), (x1, 1.0)]).ge(2.0);
        assert!(ge.is_satisfied(&[1.0, 0.0], 1e-9));
        assert!(!ge.is_satisfied(&[0.0, 1.0], 1e-9));

        let eq = cons().coef(x0, 1.0).eq(2.0);
        assert!((eq.violation(&[3.0, 0.0]) - 1.0).abs() < 1e-12);
        assert!((eq.violation(&[1.0, 0.0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_expression() {
        // 0 <= 0 holds everywhere
        let c = cons().le(0.0);
        assert!(c.expr.is_empty());
        assert!(c.is_satisfied(&[], 0.0));
    }
}
