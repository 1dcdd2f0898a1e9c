//! Subtour detection on edge assignments.
//!
//! Everything here is a pure function of an assignment given as values in
//! edge index order (see [`crate::edge`]). The constraint handler in
//! [`crate::conshdlr`] adapts it to the MIP host.

use crate::components::connected_components;
use crate::edge::{edges, internal_edges, num_edges, Edge};

/// Connectivity of the selected-edge subgraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Connectivity {
    /// One component spans every vertex.
    Connected,
    /// Two or more components, in canonical order.
    Subtours(Vec<Vec<usize>>),
}

impl Connectivity {
    /// True for [`Connectivity::Connected`].
    pub fn is_connected(&self) -> bool {
        matches!(self, Connectivity::Connected)
    }

    /// Components of a disconnected assignment; empty if connected.
    pub fn subtours(&self) -> &[Vec<usize>] {
        match self {
            Connectivity::Connected => &[],
            Connectivity::Subtours(comps) => comps,
        }
    }
}

/// Edges whose value exceeds `eps`.
pub fn selected_edges(n: usize, values: &[f64], eps: f64) -> Vec<Edge> {
    debug_assert_eq!(values.len(), num_edges(n));
    edges(n).filter(|e| values[e.index()] > eps).collect()
}

/// Components of the subgraph selected at `eps`.
pub fn find_subtours(n: usize, values: &[f64], eps: f64) -> Connectivity {
    let comps = connected_components(n, &selected_edges(n, values, eps));
    if comps.len() == 1 {
        Connectivity::Connected
    } else {
        Connectivity::Subtours(comps)
    }
}

/// Sum of edge values inside `component`: the left side of its subtour
/// elimination constraint.
pub fn internal_sum(component: &[usize], values: &[f64]) -> f64 {
    internal_edges(component).map(|e| values[e.index()]).sum()
}
