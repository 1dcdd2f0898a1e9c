//! Undirected edges of the complete graph and their triangular indexing.
//!
//! Edge `(u, v)` with `u < v` has index `v * (v - 1) / 2 + u`. Iterating
//! `v` over `1..n` and `u` over `0..v` visits indices in order.

/// An undirected edge between vertex indices, stored with `u < v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge {
    /// Smaller endpoint.
    pub u: usize,
    /// Larger endpoint.
    pub v: usize,
}

impl Edge {
    /// Canonical edge between `a` and `b`.
    ///
    /// Panics if `a == b`.
    pub fn new(a: usize, b: usize) -> Self {
        assert_ne!(a, b, "self-loop edge ({}, {})", a, b);
        if a < b {
            Self { u: a, v: b }
        } else {
            Self { u: b, v: a }
        }
    }

    /// Triangular index.
    pub fn index(self) -> usize {
        self.v * (self.v - 1) / 2 + self.u
    }
}

/// Number of edges of the complete graph on `n` vertices.
pub fn num_edges(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// All edges of the complete graph on `n` vertices, in index order.
pub fn edges(n: usize) -> impl Iterator<Item = Edge> {
    (1..n).flat_map(|v| (0..v).map(move |u| Edge { u, v }))
}

/// Edges with both endpoints in `vertices`.
pub fn internal_edges(vertices: &[usize]) -> impl Iterator<Item = Edge> + '_ {
    vertices
        .iter()
        .enumerate()
        .flat_map(move |(i, &a)| vertices[i + 1..].iter().map(move |&b| Edge::new(a, b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_is_dense_and_ordered() {
        for n in [2, 3, 6, 11] {
            let indices: Vec<usize> = edges(n).map(Edge::index).collect();
            assert_eq!(indices, (0..num_edges(n)).collect::<Vec<_>>());
        }
        assert_eq!(num_edges(0), 0);
        assert_eq!(num_edges(1), 0);
    }

    #[test]
    fn test_canonical_orientation() {
        assert_eq!(Edge::new(4, 1), Edge::new(1, 4));
        assert_eq!(Edge::new(4, 1), Edge { u: 1, v: 4 });
        assert_eq!(Edge::new(0, 1).index(), 0);
        assert_eq!(Edge::new(2, 0).index(), 1);
    }

    #[test]
    #[should_panic]
    fn test_self_loop_panics() {
        Edge::new(3, 3);
    }

    #[test]
    fn test_internal_edges() {
        let inside: Vec<Edge> = internal_edges(&[5, 1, 3]).collect();
        assert_eq!(inside, vec![Edge::new(1, 5), Edge::new(3, 5), Edge::new(1, 3)]);
        assert_eq!(internal_edges(&[2]).count(), 0);
    }
}
