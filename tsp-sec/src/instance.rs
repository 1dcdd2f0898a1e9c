//! Validated symmetric TSP instances.

use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::edge::{edges, num_edges, Edge};
use crate::error::{TspError, TspResult};

/// A symmetric TSP instance over the complete graph.
///
/// Vertex labels are sorted on construction; vertex `i` is the `i`-th
/// smallest label. Costs are stored once per edge in triangular order.
#[derive(Debug, Clone)]
pub struct TspInstance<V> {
    labels: Vec<V>,
    costs: Vec<f64>,
}

impl<V: Ord + Clone + Debug> TspInstance<V> {
    /// Build an instance from a cost function.
    ///
    /// `cost` is called once per unordered pair, with the smaller label first.
    pub fn from_fn(
        labels: impl IntoIterator<Item = V>,
        mut cost: impl FnMut(&V, &V) -> f64,
    ) -> TspResult<Self> {
        let labels = Self::sorted_labels(labels)?;
        let costs = edges(labels.len())
            .map(|e| {
                let (a, b) = (&labels[e.u], &labels[e.v]);
                Self::validate_cost(a, b, cost(a, b))
            })
            .collect::<TspResult<Vec<f64>>>()?;
        Ok(Self { labels, costs })
    }

    /// Build an instance from a table of pair costs.
    ///
    /// Either orientation of a pair is accepted; if both are present the
    /// one with the smaller label first wins.
    pub fn from_pairs(
        labels: impl IntoIterator<Item = V>,
        table: &BTreeMap<(V, V), f64>,
    ) -> TspResult<Self> {
        let labels = Self::sorted_labels(labels)?;
        let mut costs = Vec::with_capacity(num_edges(labels.len()));
        for e in edges(labels.len()) {
            let (a, b) = (&labels[e.u], &labels[e.v]);
            let cost = table
                .get(&(a.clone(), b.clone()))
                .or_else(|| table.get(&(b.clone(), a.clone())))
                .copied()
                .ok_or_else(|| TspError::MissingCost(format!("{:?}", a), format!("{:?}", b)))?;
            costs.push(Self::validate_cost(a, b, cost)?);
        }
        Ok(Self { labels, costs })
    }

    fn sorted_labels(labels: impl IntoIterator<Item = V>) -> TspResult<Vec<V>> {
        let mut labels: Vec<V> = labels.into_iter().collect();
        if labels.len() < 3 {
            return Err(TspError::TooFewVertices(labels.len()));
        }
        labels.sort();
        if let Some(pair) = labels.windows(2).find(|w| w[0] == w[1]) {
            return Err(TspError::DuplicateVertex(format!("{:?}", pair[0])));
        }
        Ok(labels)
    }

    fn validate_cost(a: &V, b: &V, cost: f64) -> TspResult<f64> {
        if cost.is_finite() && cost >= 0.0 {
            Ok(cost)
        } else {
            Err(TspError::InvalidCost {
                a: format!("{:?}", a),
                b: format!("{:?}", b),
                cost,
            })
        }
    }

    /// Index of a label.
    pub fn index_of(&self, label: &V) -> Option<usize> {
        self.labels.binary_search(label).ok()
    }
}

impl<V> TspInstance<V> {
    /// Number of vertices.
    pub fn n(&self) -> usize {
        self.labels.len()
    }

    /// Sorted vertex labels.
    pub fn labels(&self) -> &[V] {
        &self.labels
    }

    /// Label of vertex `i`.
    pub fn label(&self, i: usize) -> &V {
        &self.labels[i]
    }

    /// Cost of an edge.
    pub fn cost(&self, edge: Edge) -> f64 {
        self.costs[edge.index()]
    }

    /// Costs in edge index order.
    pub fn costs(&self) -> &[f64] {
        &self.costs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_sorted() {
        let inst = TspInstance::from_fn([30, 10, 20], |a, b| (a + b) as f64).unwrap();
        assert_eq!(inst.labels(), &[10, 20, 30]);
        assert_eq!(inst.n(), 3);
        assert_eq!(inst.index_of(&20), Some(1));
        assert_eq!(inst.index_of(&25), None);

        // Edge (0, 2) is the pair (10, 30)
        assert_eq!(inst.cost(Edge::new(2, 0)), 40.0);
        assert_eq!(inst.costs(), &[30.0, 40.0, 50.0]);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            TspInstance::from_fn([1, 2], |_, _| 1.0),
            Err(TspError::TooFewVertices(2))
        ));
        assert!(matches!(
            TspInstance::from_fn([1, 2, 2, 3], |_, _| 1.0),
            Err(TspError::DuplicateVertex(ref v)) if v == "2"
        ));
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                TspInstance::from_fn([1, 2, 3], |_, _| bad),
                Err(TspError::InvalidCost { .. })
            ));
        }
        // Zero costs are allowed
        assert!(TspInstance::from_fn([1, 2, 3], |_, _| 0.0).is_ok());
    }

    #[test]
    fn test_from_pairs() {
        let mut table = BTreeMap::new();
        table.insert(("a", "b"), 1.0);
        table.insert(("c", "a"), 2.0); // reversed orientation
        table.insert(("b", "c"), 3.0);

        let inst = TspInstance::from_pairs(["c", "b", "a"], &table).unwrap();
        assert_eq!(inst.labels(), &["a", "b", "c"]);
        assert_eq!(inst.cost(Edge::new(0, 2)), 2.0);
        assert_eq!(inst.cost(Edge::new(1, 2)), 3.0);

        table.remove(&("b", "c"));
        match TspInstance::from_pairs(["a", "b", "c"], &table) {
            Err(TspError::MissingCost(a, b)) => assert_eq!((a.as_str(), b.as_str()), ("\"b\"", "\"c\"")),
            other => panic!("expected MissingCost, got {:?}", other),
        }
    }
}
