//! TSP model over the complete graph.
//!
//! ```text
//! min  sum_{u<v} c(u,v) x(u,v)
//! s.t. sum_{v != u} x(u,v) = 2     for every vertex u
//!      x(u,v) in {0, 1}
//! ```
//!
//! Subtour elimination constraints are added lazily by
//! [`SubtourEliminator`].

use std::fmt::Debug;
use std::rc::Rc;

use lazy_mip::{cons, LinExpr, Model, ObjSense, SolutionView, VarId};

use crate::conshdlr::{SubtourCounters, SubtourEliminator};
use crate::edge::{edges, num_edges, Edge};
use crate::error::TspResult;
use crate::instance::TspInstance;
use crate::settings::TspSettings;

/// Edge variables in triangular edge order.
#[derive(Debug, Clone)]
pub struct EdgeVars {
    n: usize,
    vars: Vec<VarId>,
}

impl EdgeVars {
    /// Create one variable per edge of the complete graph on `n` vertices.
    pub fn new(n: usize, mut make: impl FnMut(Edge) -> VarId) -> Self {
        let vars = edges(n).map(&mut make).collect();
        Self { n, vars }
    }

    /// Number of vertices.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Variable of the edge between `a` and `b`, in either order.
    ///
    /// Panics if `a == b`.
    pub fn get(&self, a: usize, b: usize) -> VarId {
        self.var(Edge::new(a, b))
    }

    /// Variable of an edge.
    pub fn var(&self, edge: Edge) -> VarId {
        self.vars[edge.index()]
    }

    /// Edges with their variables, in index order.
    pub fn iter(&self) -> impl Iterator<Item = (Edge, VarId)> + '_ {
        edges(self.n).zip(self.vars.iter().copied())
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// True if there are no edges.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Values of the edge variables, in edge index order.
    pub fn values(&self, solution: &SolutionView<'_>) -> Vec<f64> {
        self.vars.iter().map(|&v| solution.val(v)).collect()
    }
}

/// A built TSP model.
pub struct TspModel {
    /// Host model with the subtour handler included.
    pub model: Model,
    /// Edge variables.
    pub edges: EdgeVars,
    /// Counters of the included handler.
    pub counters: Rc<SubtourCounters>,
}

/// Build the degree-2 formulation and include the subtour handler.
///
/// Dual reductions are turned off on the host: they would reason about
/// variable locks without the subtour constraints that do not exist yet.
pub fn create_tsp<V: Ord + Clone + Debug>(
    instance: &TspInstance<V>,
    settings: &TspSettings,
) -> TspResult<TspModel> {
    let n = instance.n();
    let name = |i: usize| format!("{:?}", instance.label(i));

    let mut model = Model::new("tsp").with_settings(settings.mip.clone());
    model.settings_mut().allow_dual_reductions = false;

    let edges = EdgeVars::new(n, |e| {
        model.add_binary(format!("x({},{})", name(e.u), name(e.v)), 0.0)
    });

    for u in 0..n {
        let incident = (0..n).filter(|&v| v != u).map(|v| (edges.get(u, v), 1.0));
        model.add_cons(cons().expr(incident).name(format!("Degree({})", name(u))).eq(2.0));
    }

    let objective: LinExpr = edges.iter().map(|(e, var)| (var, instance.cost(e))).collect();
    model.set_objective(&objective, ObjSense::Minimize)?;

    let handler = SubtourEliminator::new(edges.clone(), (0..n).map(name).collect(), settings.eps);
    let counters = handler.counters();
    model.include_handler(Box::new(handler));

    log::debug!(
        "tsp model: {} vertices, {} edge variables, {} degree rows",
        n,
        num_edges(n),
        model.num_conss()
    );

    Ok(TspModel {
        model,
        edges,
        counters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance() -> TspInstance<u32> {
        TspInstance::from_fn([4, 1, 3, 2], |a, b| f64::from(a * 10 + b)).unwrap()
    }

    #[test]
    fn test_model_shape() {
        let tsp = create_tsp(&instance(), &TspSettings::default()).unwrap();

        assert_eq!(tsp.model.num_vars(), 6);
        assert_eq!(tsp.edges.len(), 6);
        assert_eq!(tsp.model.num_conss(), 4);
        assert_eq!(tsp.model.num_handlers(), 1);
        assert!(!tsp.model.settings().allow_dual_reductions);

        assert_eq!(tsp.model.var_name(tsp.edges.get(3, 0)), "x(1,4)");
        let degree = &tsp.model.constraints()[2];
        assert_eq!(degree.label(), "Degree(3)");
        assert_eq!(degree.expr.len(), 3);
        assert_eq!(degree.rhs, 2.0);
    }

    #[test]
    fn test_edge_vars_lookup() {
        let tsp = create_tsp(&instance(), &TspSettings::default()).unwrap();
        let edges = &tsp.edges;

        assert_eq!(edges.get(1, 2), edges.get(2, 1));
        for (k, (e, var)) in edges.iter().enumerate() {
            assert_eq!(e.index(), k);
            assert_eq!(edges.var(e), var);
        }
    }

    #[test]
    fn test_dual_reductions_forced_off() {
        let settings = TspSettings::default()
            .with_mip_settings(lazy_mip::MipSettings::default().with_dual_reductions(true));
        let tsp = create_tsp(&instance(), &settings).unwrap();
        assert!(!tsp.model.settings().allow_dual_reductions);
    }
}
