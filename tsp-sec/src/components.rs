//! Connected components of a selected-edge subgraph.

use petgraph::unionfind::UnionFind;

use crate::edge::Edge;

/// Connected components of the graph on `0..n` with the given edges.
///
/// Every vertex is in exactly one component; vertices without edges are
/// singletons. Each component is sorted, and components are ordered by
/// their smallest vertex.
pub fn connected_components(n: usize, edges: &[Edge]) -> Vec<Vec<usize>> {
    let mut uf = UnionFind::<usize>::new(n);
    for e in edges {
        uf.union(e.u, e.v);
    }
    let roots = uf.into_labeling();

    let mut slot = vec![usize::MAX; n];
    let mut components: Vec<Vec<usize>> = Vec::new();
    for (x, &root) in roots.iter().enumerate() {
        if slot[root] == usize::MAX {
            slot[root] = components.len();
            components.push(Vec::new());
        }
        components[slot[root]].push(x);
    }
    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_isolated_vertices_are_singletons() {
        let comps = connected_components(4, &[]);
        assert_eq!(comps, vec![vec![0], vec![1], vec![2], vec![3]]);
        assert!(connected_components(0, &[]).is_empty());
    }

    #[test]
    fn test_canonical_order() {
        // {0, 4}, {1, 2, 5}, {3}
        let edges = [Edge::new(5, 2), Edge::new(4, 0), Edge::new(1, 5)];
        let comps = connected_components(6, &edges);
        assert_eq!(comps, vec![vec![0, 4], vec![1, 2, 5], vec![3]]);

        // Edge order does not matter
        let mut reversed = edges;
        reversed.reverse();
        assert_eq!(connected_components(6, &reversed), comps);
    }

    #[test]
    fn test_random_subgraphs_partition_vertices() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..50 {
            let n = rng.gen_range(1..15);
            let density = rng.gen_range(0.0..0.4);
            let selected: Vec<Edge> = edge::edges(n).filter(|_| rng.gen_bool(density)).collect();
            let comps = connected_components(n, &selected);

            // Partition: every vertex exactly once
            let mut seen = vec![0; n];
            for comp in &comps {
                assert!(!comp.is_empty());
                assert!(comp.windows(2).all(|w| w[0] < w[1]));
                for &x in comp {
                    seen[x] += 1;
                }
            }
            assert!(seen.iter().all(|&c| c == 1));
            assert!(comps.windows(2).all(|w| w[0][0] < w[1][0]));

            // Edges never cross components
            let mut owner = vec![0; n];
            for (k, comp) in comps.iter().enumerate() {
                for &x in comp {
                    owner[x] = k;
                }
            }
            assert!(selected.iter().all(|e| owner[e.u] == owner[e.v]));
        }
    }
}
