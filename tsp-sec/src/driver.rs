//! Solve a TSP instance and extract the tour.

use std::fmt::Debug;

use lazy_mip::{MipStatus, SolutionView};

use crate::components::connected_components;
use crate::conshdlr::SubtourStats;
use crate::edge::Edge;
use crate::error::{TspError, TspResult};
use crate::formulation::create_tsp;
use crate::instance::TspInstance;
use crate::settings::TspSettings;
use crate::subtour::selected_edges;

/// Solve statistics.
#[derive(Debug, Clone, Copy)]
pub struct TspStats {
    /// Branch-and-bound nodes explored.
    pub nodes_explored: u64,
    /// Nodes discarded without branching.
    pub nodes_pruned: u64,
    /// Subtour constraints kept by the host.
    pub lazy_constraints: usize,
    /// Subtour handler counters.
    pub subtour: SubtourStats,
    /// Host solve time.
    pub solve_time_ms: u64,
}

/// An optimal (or best found) tour.
#[derive(Debug, Clone)]
pub struct TspSolution<V> {
    /// Tour cost.
    pub cost: f64,
    /// Selected edges as label pairs, smaller label first, in edge index order.
    pub edges: Vec<(V, V)>,
    /// The cycle as a vertex sequence starting at the smallest label.
    pub tour: Vec<V>,
    /// Host status.
    pub status: MipStatus,
    /// Statistics.
    pub stats: TspStats,
}

/// Build the model, run the host search and extract the tour.
pub fn solve_tsp<V: Ord + Clone + Debug>(
    instance: &TspInstance<V>,
    settings: &TspSettings,
) -> TspResult<TspSolution<V>> {
    let mut tsp = create_tsp(instance, settings)?;
    let sol = tsp.model.optimize()?;

    if !sol.has_solution() {
        return Err(TspError::NoTour(sol.status));
    }

    let n = instance.n();
    let values = tsp.edges.values(&SolutionView::new(&sol.x));
    let selected = selected_edges(n, &values, settings.eps);

    let components = connected_components(n, &selected).len();
    if components != 1 {
        return Err(TspError::DisconnectedSolution(components));
    }
    let order = walk_cycle(n, &selected)?;

    let stats = TspStats {
        nodes_explored: sol.nodes_explored,
        nodes_pruned: sol.nodes_pruned,
        lazy_constraints: tsp.model.lazy_constraints().len(),
        subtour: tsp.counters.snapshot(),
        solve_time_ms: sol.solve_time_ms,
    };
    if settings.mip.verbose {
        log::info!("tsp solved: cost {} with {:?}", sol.obj_val, stats);
    }

    Ok(TspSolution {
        cost: sol.obj_val,
        edges: selected
            .iter()
            .map(|e| (instance.label(e.u).clone(), instance.label(e.v).clone()))
            .collect(),
        tour: order.into_iter().map(|i| instance.label(i).clone()).collect(),
        status: sol.status,
        stats,
    })
}

/// Order the vertices of a connected 2-regular edge set along the cycle,
/// starting at vertex 0 and continuing toward its smaller neighbour.
fn walk_cycle(n: usize, selected: &[Edge]) -> TspResult<Vec<usize>> {
    let mut adj = vec![Vec::with_capacity(2); n];
    for e in selected {
        adj[e.u].push(e.v);
        adj[e.v].push(e.u);
    }
    if let Some(v) = (0..n).find(|&v| adj[v].len() != 2) {
        return Err(TspError::InvalidTour(format!(
            "vertex {} has degree {}",
            v,
            adj[v].len()
        )));
    }
    for nbrs in &mut adj {
        nbrs.sort_unstable();
    }

    let mut tour = Vec::with_capacity(n);
    let (mut prev, mut cur) = (usize::MAX, 0);
    while tour.len() < n {
        tour.push(cur);
        let next = if adj[cur][0] != prev { adj[cur][0] } else { adj[cur][1] };
        prev = cur;
        cur = next;
        if cur == 0 {
            break;
        }
    }

    if tour.len() != n || cur != 0 {
        return Err(TspError::InvalidTour(format!(
            "cycle through vertex 0 has {} of {} vertices",
            tour.len(),
            n
        )));
    }
    Ok(tour)
}
