//! Subtour elimination as a lazy constraint handler.

use std::cell::Cell;
use std::rc::Rc;

use lazy_mip::{
    cons, ConstraintHandler, EnforceContext, EnforceResult, Feasibility, SolutionView,
};

use crate::edge::internal_edges;
use crate::formulation::EdgeVars;
use crate::subtour::{self, Connectivity};

/// Handler name reported to the host.
pub const HANDLER_NAME: &str = "subtour";

/// How [`SubtourEliminator::find_subtours`] may react to subtours.
pub enum SubtourMode<'c, 'a> {
    /// Only report; the model is left untouched.
    CheckOnly(SolutionView<'a>),
    /// Add one subtour elimination constraint per component.
    Generate(&'c mut EnforceContext<'a>),
}

/// Call counters shared between the handler and its owner.
#[derive(Debug, Default)]
pub struct SubtourCounters {
    check_calls: Cell<u64>,
    check_rejections: Cell<u64>,
    enforce_calls: Cell<u64>,
    cuts_generated: Cell<u64>,
}

impl SubtourCounters {
    fn bump(cell: &Cell<u64>, by: u64) {
        cell.set(cell.get() + by);
    }

    /// Current values.
    pub fn snapshot(&self) -> SubtourStats {
        SubtourStats {
            check_calls: self.check_calls.get(),
            check_rejections: self.check_rejections.get(),
            enforce_calls: self.enforce_calls.get(),
            cuts_generated: self.cuts_generated.get(),
        }
    }
}

/// Snapshot of [`SubtourCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubtourStats {
    /// Calls to `check`.
    pub check_calls: u64,
    /// `check` calls that found subtours.
    pub check_rejections: u64,
    /// Calls to `enforce`.
    pub enforce_calls: u64,
    /// Subtour elimination constraints added.
    pub cuts_generated: u64,
}

/// Separates subtour elimination constraints from integral assignments.
///
/// For a component `S` of the selected edges the constraint is
/// `sum_{u<v in S} x(u,v) <= |S| - 1`.
pub struct SubtourEliminator {
    edges: EdgeVars,
    names: Vec<String>,
    eps: f64,
    counters: Rc<SubtourCounters>,
}

impl SubtourEliminator {
    /// Handler over `edges`, naming vertex `i` by `names[i]` in cut names.
    pub fn new(edges: EdgeVars, names: Vec<String>, eps: f64) -> Self {
        debug_assert_eq!(edges.n(), names.len());
        Self {
            edges,
            names,
            eps,
            counters: Rc::new(SubtourCounters::default()),
        }
    }

    /// Shared counters.
    pub fn counters(&self) -> Rc<SubtourCounters> {
        Rc::clone(&self.counters)
    }

    /// Detect subtours in the solution and, in generate mode, cut them off.
    pub fn find_subtours(&self, mode: SubtourMode<'_, '_>) -> Connectivity {
        let solution = match &mode {
            SubtourMode::CheckOnly(solution) => *solution,
            SubtourMode::Generate(ctx) => ctx.solution(),
        };
        let values = self.edges.values(&solution);
        let result = subtour::find_subtours(self.edges.n(), &values, self.eps);

        if let (SubtourMode::Generate(ctx), Connectivity::Subtours(comps)) = (mode, &result) {
            for comp in comps {
                let rhs = comp.len() as f64 - 1.0;
                let name = self.cut_name(comp);
                log::debug!(
                    "cut: {} = {:.3} <= {}",
                    name,
                    subtour::internal_sum(comp, &values),
                    rhs
                );
                ctx.add_cons(
                    cons()
                        .expr(internal_edges(comp).map(|e| (self.edges.var(e), 1.0)))
                        .name(name)
                        .le(rhs),
                );
            }
            SubtourCounters::bump(&self.counters.cuts_generated, comps.len() as u64);
        }

        result
    }

    fn cut_name(&self, comp: &[usize]) -> String {
        let labels: Vec<&str> = comp.iter().map(|&i| self.names[i].as_str()).collect();
        format!("subtour({})", labels.join(","))
    }
}

impl ConstraintHandler for SubtourEliminator {
    fn name(&self) -> &str {
        HANDLER_NAME
    }

    fn check(&mut self, solution: &SolutionView<'_>) -> Feasibility {
        SubtourCounters::bump(&self.counters.check_calls, 1);
        if self.find_subtours(SubtourMode::CheckOnly(*solution)).is_connected() {
            Feasibility::Feasible
        } else {
            SubtourCounters::bump(&self.counters.check_rejections, 1);
            Feasibility::Infeasible
        }
    }

    fn enforce(&mut self, ctx: &mut EnforceContext<'_>) -> EnforceResult {
        SubtourCounters::bump(&self.counters.enforce_calls, 1);
        if self.find_subtours(SubtourMode::Generate(ctx)).is_connected() {
            EnforceResult::Feasible
        } else {
            EnforceResult::ConsAdded
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::{num_edges, Edge};
    use lazy_mip::Model;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn eliminator(n: usize) -> SubtourEliminator {
        let mut model = Model::new("test");
        let edges = EdgeVars::new(n, |e| model.add_binary(format!("x{}", e.index()), 0.0));
        let names = (1..=n).map(|i| i.to_string()).collect();
        SubtourEliminator::new(edges, names, 1e-6)
    }

    /// Values with one entry per host variable. Variables are created in edge
    /// index order, so the two coincide.
    fn assignment(n: usize, selected: &[(usize, usize)]) -> Vec<f64> {
        let mut values = vec![0.0; num_edges(n)];
        for &(a, b) in selected {
            values[Edge::new(a, b).index()] = 1.0;
        }
        values
    }

    #[test]
    fn test_check_is_pure() {
        let mut hdlr = eliminator(6);
        let values = assignment(6, &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5)]);
        let view = SolutionView::new(&values);

        assert_eq!(hdlr.check(&view), Feasibility::Infeasible);
        assert_eq!(hdlr.check(&view), Feasibility::Infeasible);

        let stats = hdlr.counters().snapshot();
        assert_eq!(stats.check_calls, 2);
        assert_eq!(stats.check_rejections, 2);
        assert_eq!(stats.cuts_generated, 0);
        assert_eq!(stats.enforce_calls, 0);
    }

    #[test]
    fn test_enforce_adds_one_cut_per_component() {
        let mut hdlr = eliminator(6);
        let values = assignment(6, &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5)]);
        let mut ctx = EnforceContext::new(&values, 0);

        assert_eq!(hdlr.enforce(&mut ctx), EnforceResult::ConsAdded);
        let added = ctx.added();
        assert_eq!(added.len(), 2);
        assert_eq!(added[0].label(), "subtour(1,2,3)");
        assert_eq!(added[1].label(), "subtour(4,5,6)");
        for c in added {
            assert_eq!(c.rhs, 2.0);
            assert_eq!(c.expr.len(), 3);
            // Each is violated by the triggering assignment
            assert!((c.violation(&values) - 1.0).abs() < 1e-12);
        }
        assert_eq!(hdlr.counters().snapshot().cuts_generated, 2);
    }

    #[test]
    fn test_connected_assignment_is_accepted() {
        let mut hdlr = eliminator(4);
        let values = assignment(4, &[(0, 1), (1, 3), (3, 2), (2, 0)]);

        assert_eq!(hdlr.check(&SolutionView::new(&values)), Feasibility::Feasible);
        let mut ctx = EnforceContext::new(&values, 3);
        assert_eq!(hdlr.enforce(&mut ctx), EnforceResult::Feasible);
        assert!(ctx.added().is_empty());
    }

    #[test]
    fn test_singleton_components_get_trivial_rows() {
        let mut hdlr = eliminator(4);
        let values = assignment(4, &[(0, 1), (1, 2), (0, 2)]);
        let mut ctx = EnforceContext::new(&values, 0);

        assert_eq!(hdlr.enforce(&mut ctx), EnforceResult::ConsAdded);
        let singleton = &ctx.added()[1];
        assert_eq!(singleton.label(), "subtour(4)");
        assert!(singleton.expr.is_empty());
        assert_eq!(singleton.rhs, 0.0);
    }

    #[test]
    fn test_cuts_violated_by_random_disjoint_cycles() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);

        for _ in 0..30 {
            // Shuffle 6..=12 vertices and cut the order into cycles of size >= 3
            let n = rng.gen_range(6..=12);
            let mut order: Vec<usize> = (0..n).collect();
            order.shuffle(&mut rng);

            let mut cycles = Vec::new();
            let mut rest = &order[..];
            while rest.len() >= 6 {
                let len = rng.gen_range(3..=rest.len() - 3);
                cycles.push(&rest[..len]);
                rest = &rest[len..];
            }
            cycles.push(rest);

            let mut selected = Vec::new();
            for cycle in &cycles {
                for i in 0..cycle.len() {
                    selected.push((cycle[i], cycle[(i + 1) % cycle.len()]));
                }
            }
            let values = assignment(n, &selected);

            let mut hdlr = eliminator(n);
            let mut ctx = EnforceContext::new(&values, 0);
            let result = hdlr.enforce(&mut ctx);

            if cycles.len() == 1 {
                assert_eq!(result, EnforceResult::Feasible);
                continue;
            }
            assert_eq!(result, EnforceResult::ConsAdded);
            assert_eq!(ctx.added().len(), cycles.len());
            for c in ctx.added() {
                // Left side equals |S|, bound is |S| - 1
                assert!(c.violation(&values) >= 1.0 - 1e-9, "{} not violated", c.label());
            }
        }
    }
}
