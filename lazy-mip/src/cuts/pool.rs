//! Lazy constraint pool.
//!
//! Every row a handler adds during one solve lands here and in the LP.
//! Rows are globally valid, so the pool only grows. A row that is a positive
//! multiple of a pooled one is reported as a duplicate and not stored.

use std::collections::HashMap;

use crate::master::LinearCut;

/// Rows are compared after scaling to unit max coefficient and snapping to
/// this grid.
const KEY_RESOLUTION: f64 = 1e-9;

/// Scale-free identity of a row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CutKey {
    terms: Vec<(usize, i64)>,
    rhs: i64,
}

impl CutKey {
    fn of(cut: &LinearCut) -> Self {
        let scale = match cut.max_abs_coef() {
            m if m > 0.0 => m,
            _ => 1.0,
        };
        let snap = |v: f64| (v / scale / KEY_RESOLUTION).round() as i64;
        Self {
            terms: cut.terms.iter().map(|&(j, a)| (j, snap(a))).collect(),
            rhs: snap(cut.rhs),
        }
    }
}

/// A pooled row with where it came from.
#[derive(Debug, Clone)]
pub struct PooledCut {
    /// The row.
    pub cut: LinearCut,
    /// Position in the pool.
    pub id: usize,
    /// Violation at the assignment that triggered it.
    pub violation: f64,
}

/// Pool counters.
#[derive(Debug, Default, Clone)]
pub struct CutPoolStats {
    /// Rows stored.
    pub total_added: usize,
    /// Rows rejected as duplicates.
    pub duplicates: usize,
}

/// Append-only store of lazy rows with duplicate detection.
#[derive(Debug, Default)]
pub struct CutPool {
    cuts: Vec<PooledCut>,
    index: HashMap<CutKey, usize>,
    stats: CutPoolStats,
}

impl CutPool {
    /// Empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a row unless an equivalent one is pooled.
    ///
    /// Returns the id of the stored or existing row and whether it was a
    /// duplicate.
    pub fn add(&mut self, cut: LinearCut, x: &[f64]) -> (usize, bool) {
        let key = CutKey::of(&cut);
        if let Some(&id) = self.index.get(&key) {
            self.stats.duplicates += 1;
            return (id, true);
        }

        let id = self.cuts.len();
        let violation = cut.violation(x);
        self.index.insert(key, id);
        self.cuts.push(PooledCut { cut, id, violation });
        self.stats.total_added += 1;
        (id, false)
    }

    /// True if `x` satisfies every pooled row within `tol`.
    pub fn satisfied_by(&self, x: &[f64], tol: f64) -> bool {
        self.cuts.iter().all(|p| !p.cut.is_violated(x, tol))
    }

    /// Row by id.
    pub fn get(&self, id: usize) -> Option<&PooledCut> {
        self.cuts.get(id)
    }

    /// Counters.
    pub fn stats(&self) -> &CutPoolStats {
        &self.stats
    }

    /// Number of pooled rows.
    pub fn len(&self) -> usize {
        self.cuts.len()
    }

    /// True if nothing is pooled.
    pub fn is_empty(&self) -> bool {
        self.cuts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::master::CutOrigin;

    fn make_cut(terms: Vec<(usize, f64)>, rhs: f64, node: u64) -> LinearCut {
        LinearCut::new(terms, rhs, CutOrigin { handler: 0, node })
    }

    #[test]
    fn test_add_and_get() {
        let mut pool = CutPool::new();

        let (id1, dup1) = pool.add(make_cut(vec![(0, 1.0), (1, 2.0)], 3.0, 0), &[1.0, 1.0]);
        let (id2, dup2) = pool.add(make_cut(vec![(0, 4.0), (1, 5.0)], 6.0, 3), &[1.0, 1.0]);

        assert!(!dup1 && !dup2);
        assert_ne!(id1, id2);
        assert_eq!(pool.len(), 2);

        let second = pool.get(id2).unwrap();
        assert_eq!(second.cut.origin.node, 3);
        assert!((second.violation - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_duplicates_up_to_positive_scaling() {
        let mut pool = CutPool::new();
        let x = [0.0; 3];

        let (id1, _) = pool.add(make_cut(vec![(0, 1.0), (1, 2.0)], 3.0, 0), &x);
        let (id2, dup2) = pool.add(make_cut(vec![(0, 1.0), (1, 2.0)], 3.0, 1), &x);
        let (id3, dup3) = pool.add(make_cut(vec![(0, 2.0), (1, 4.0)], 6.0, 2), &x);
        let (_, dup4) = pool.add(make_cut(vec![(0, 1.0), (2, 2.0)], 3.0, 2), &x);
        let (_, dup5) = pool.add(make_cut(vec![(0, 1.0), (1, 2.0)], 2.0, 2), &x);

        assert!(dup2 && dup3);
        assert!(!dup4 && !dup5);
        assert_eq!((id1, id1), (id2, id3));
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.stats().duplicates, 2);
        assert_eq!(pool.stats().total_added, 3);
    }

    #[test]
    fn test_opposite_rows_are_distinct() {
        let mut pool = CutPool::new();

        // Together they state x0 == 1
        pool.add(make_cut(vec![(0, 1.0)], 1.0, 0), &[0.0]);
        let (_, dup) = pool.add(make_cut(vec![(0, -1.0)], -1.0, 0), &[0.0]);

        assert!(!dup);
        assert!(pool.satisfied_by(&[1.0], 1e-9));
        assert!(!pool.satisfied_by(&[0.0], 1e-9));
    }

    #[test]
    fn test_empty_rows_dedupe_by_rhs() {
        let mut pool = CutPool::new();
        assert!(!pool.add(make_cut(Vec::new(), 0.0, 0), &[]).1);
        assert!(pool.add(make_cut(Vec::new(), 0.0, 1), &[]).1);
        assert!(!pool.add(make_cut(Vec::new(), 2.0, 1), &[]).1);
    }
}
