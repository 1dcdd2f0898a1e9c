//! Branch-and-bound bookkeeping: queue, incumbent, limits and statistics.

use std::time::Instant;

use super::{BranchDecision, BranchRecord, BranchSide, BranchingSelector, NodeQueue, SearchNode};
use crate::model::{Incumbent, IncumbentTracker, MipProblem, MipSolution, MipStatus};
use crate::settings::MipSettings;

#[derive(Debug, Clone, Copy, Default)]
struct Counters {
    explored: u64,
    pruned: u64,
    cuts: u64,
    enforce_rounds: u64,
}

/// Branch-and-bound tree controller.
///
/// Owns everything about the search except LP solving and handler calls.
/// Objective values are in minimization form.
pub struct BranchAndBound {
    queue: NodeQueue,
    branching: BranchingSelector,
    incumbent: IncumbentTracker,
    next_id: u64,
    counters: Counters,
    start: Option<Instant>,
    settings: MipSettings,
}

impl BranchAndBound {
    /// Controller for a problem with `num_vars` variables.
    pub fn new(settings: MipSettings, num_vars: usize) -> Self {
        Self {
            queue: NodeQueue::new(settings.node_selection),
            branching: BranchingSelector::new(settings.branching_rule, num_vars),
            incumbent: IncumbentTracker::new(),
            next_id: 1,
            counters: Counters::default(),
            start: None,
            settings,
        }
    }

    /// Start the clock, seed pseudocosts and queue the root.
    pub fn initialize(&mut self, prob: &MipProblem) {
        self.start = Some(Instant::now());
        self.branching.init_from_objective(&prob.obj);
        self.queue.push(SearchNode::root());
    }

    /// Next open node.
    pub fn next_node(&mut self) -> Option<SearchNode> {
        self.queue.pop()
    }

    /// Queue a node.
    pub fn enqueue(&mut self, node: SearchNode) {
        self.queue.push(node);
    }

    /// Count a node whose LP was solved.
    pub fn node_explored(&mut self) {
        self.counters.explored += 1;
        self.branching.node_processed();
    }

    /// Count a node discarded without branching.
    pub fn node_pruned(&mut self) {
        self.counters.pruned += 1;
    }

    /// Count lazy constraints that reached the LP.
    pub fn cuts_added(&mut self, count: usize) {
        self.counters.cuts += count as u64;
    }

    /// Count an LP re-solve after enforcement.
    pub fn enforce_round(&mut self) {
        self.counters.enforce_rounds += 1;
    }

    /// Feed a child's first LP objective back into the pseudocosts.
    pub fn record_child_bound(&mut self, node: &SearchNode, obj: f64) {
        if let Some(br) = node.branch {
            self.branching
                .update_pseudocost(br.var, br.value, br.side, obj - br.parent_obj);
        }
    }

    /// Choose a branching variable for an LP solution at a node with bounds
    /// `lb`/`ub`. `None` if `x` is integral.
    pub fn select_branching(
        &self,
        x: &[f64],
        prob: &MipProblem,
        lb: &[f64],
        ub: &[f64],
    ) -> Option<BranchDecision> {
        self.branching
            .select(x, prob, lb, ub, self.settings.int_feas_tol)
    }

    /// Split `parent`. Children start at the parent's LP objective; a child
    /// with an empty domain is counted as pruned and not returned.
    pub fn branch(
        &mut self,
        parent: &SearchNode,
        decision: &BranchDecision,
        parent_obj: f64,
    ) -> Vec<SearchNode> {
        let pc = self.branching.pseudocost(decision.var);
        let mut children = Vec::with_capacity(2);

        for side in [BranchSide::Down, BranchSide::Up] {
            let id = self.next_id;
            self.next_id += 1;

            if decision.is_empty(side) {
                self.counters.pruned += 1;
                continue;
            }

            let record = BranchRecord {
                var: decision.var,
                value: decision.value,
                parent_obj,
                side,
            };
            let mut child = parent.child(id, decision.change(side), record);
            child.dual_bound = parent_obj;
            child.estimate = parent_obj + pc.get(side) * side.distance(decision.value);
            children.push(child);
        }
        children
    }

    /// Incumbent objective, `+inf` if none.
    pub fn incumbent_obj(&self) -> f64 {
        self.incumbent.obj()
    }

    /// Offer a feasible point. On improvement, open nodes it dominates are
    /// dropped.
    pub fn update_incumbent(&mut self, candidate: Incumbent) -> bool {
        let (obj, node, source) = (candidate.obj, candidate.node, candidate.source);
        if !self.incumbent.offer(candidate) {
            return false;
        }

        let pruned = self.queue.prune_by_bound(obj);
        self.counters.pruned += pruned as u64;

        if self.settings.verbose {
            log::info!(
                "New incumbent {:.6e} from node {} ({:?}), pruned {} open nodes",
                obj,
                node,
                source,
                pruned
            );
        } else {
            log::debug!("incumbent {:.6e} from node {} ({:?})", obj, node, source);
        }
        true
    }

    /// Global dual bound between nodes.
    pub fn best_bound(&self) -> f64 {
        self.queue.best_bound().min(self.incumbent.obj())
    }

    /// Relative gap between incumbent and global bound.
    pub fn gap(&self) -> f64 {
        self.incumbent.gap(self.best_bound())
    }

    /// Milliseconds since [`initialize`](Self::initialize).
    pub fn elapsed_ms(&self) -> u64 {
        self.start.map_or(0, |t| t.elapsed().as_millis() as u64)
    }

    /// True once the time limit has passed.
    pub fn time_limit_exceeded(&self) -> bool {
        self.settings
            .time_limit_ms
            .map_or(false, |limit| self.elapsed_ms() >= limit)
    }

    /// Status to stop with, checked between nodes.
    ///
    /// An exhausted queue wins over every limit.
    pub fn check_termination(&self) -> Option<MipStatus> {
        if self.queue.is_empty() {
            return Some(if self.incumbent.has_incumbent() {
                MipStatus::Optimal
            } else {
                MipStatus::Infeasible
            });
        }

        if self.incumbent.has_incumbent() {
            let abs_gap = self.incumbent.obj() - self.best_bound();
            if self.gap() <= self.settings.gap_tol || abs_gap <= self.settings.gap_abs_tol {
                return Some(MipStatus::GapLimit);
            }
        }

        if self.time_limit_exceeded() {
            return Some(MipStatus::TimeLimit);
        }
        if self.counters.explored >= self.settings.max_nodes {
            return Some(MipStatus::NodeLimit);
        }
        None
    }

    /// Build the result, minimization form.
    pub fn finalize(&self, status: MipStatus) -> MipSolution {
        let obj = self.incumbent.obj();
        // A completed search has proven the incumbent
        let bound = if status == MipStatus::Optimal {
            obj
        } else {
            self.best_bound()
        };
        let best = self.incumbent.best();

        MipSolution {
            status,
            x: best.map(|inc| inc.x.clone()).unwrap_or_default(),
            obj_val: obj,
            bound,
            gap: self.incumbent.gap(bound),
            nodes_explored: self.counters.explored,
            nodes_pruned: self.counters.pruned,
            nodes_created: self.queue.total_added(),
            cuts_added: self.counters.cuts,
            enforce_rounds: self.counters.enforce_rounds,
            presolve_fixings: 0,
            incumbent_updates: self.incumbent.updates(),
            found_by: best.map(|inc| inc.source),
            solve_time_ms: self.elapsed_ms(),
        }
    }

    /// Progress line every `log_freq` nodes when verbose.
    pub fn log_progress(&self) {
        let freq = self.settings.log_freq;
        if !self.settings.verbose || freq == 0 || self.counters.explored % freq != 0 {
            return;
        }

        log::info!(
            "Nodes: {} ({} open) | Bound: {:.6e} | Incumbent: {:.6e} | Gap: {:.2}% | Lazy: {} | Time: {:.1}s",
            self.counters.explored,
            self.queue.len(),
            self.best_bound(),
            self.incumbent.obj(),
            self.gap() * 100.0,
            self.counters.cuts,
            self.elapsed_ms() as f64 / 1000.0,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{cons, IncumbentSource, ObjSense, VarData, VarId, VarType};

    fn binary_problem(n: usize) -> MipProblem {
        let vars: Vec<VarData> = (0..n)
            .map(|j| VarData {
                name: format!("x{}", j),
                vtype: VarType::Binary,
                obj: 1.0,
                lb: 0.0,
                ub: 1.0,
            })
            .collect();
        let rows = vec![cons().expr((0..n).map(|j| (VarId(j), 1.0))).ge(1.0)];
        MipProblem::new(&vars, &rows, ObjSense::Minimize).unwrap()
    }

    fn point(n: usize, obj: f64) -> Incumbent {
        Incumbent {
            x: vec![1.0; n],
            obj,
            node: 0,
            source: IncumbentSource::Lp,
        }
    }

    fn tree(settings: MipSettings, prob: &MipProblem) -> BranchAndBound {
        let mut tree = BranchAndBound::new(settings, prob.num_vars());
        tree.initialize(prob);
        tree
    }

    #[test]
    fn test_root_only() {
        let prob = binary_problem(10);
        let mut tree = tree(MipSettings::default(), &prob);
        assert!(tree.next_node().is_some());
        assert!(tree.next_node().is_none());
    }

    #[test]
    fn test_incumbent_update_prunes_open_nodes() {
        let prob = binary_problem(4);
        let mut tree = tree(MipSettings::default(), &prob);
        let mut root = tree.next_node().unwrap();
        root.dual_bound = 120.0;
        tree.enqueue(root);

        assert!(tree.update_incumbent(point(4, 100.0)));
        assert_eq!(tree.incumbent_obj(), 100.0);
        assert!(tree.next_node().is_none());

        assert!(!tree.update_incumbent(point(4, 150.0)));
        assert!(tree.update_incumbent(point(4, 50.0)));

        let sol = tree.finalize(MipStatus::Optimal);
        assert_eq!(sol.nodes_pruned, 1);
        // The root was queued twice
        assert_eq!(sol.nodes_created, 2);
        assert_eq!(sol.incumbent_updates, 2);
    }

    #[test]
    fn test_branch_creates_children() {
        let prob = binary_problem(3);
        let mut tree = tree(MipSettings::default(), &prob);
        let root = tree.next_node().unwrap();

        let x = [0.5, 0.5, 0.0];
        let decision = tree
            .select_branching(&x, &prob, &prob.var_lb, &prob.var_ub)
            .unwrap();
        let children = tree.branch(&root, &decision, 0.5);
        assert_eq!(children.len(), 2);
        let (down, up) = (&children[0], &children[1]);

        assert_eq!((down.id, up.id), (1, 2));
        assert_eq!(down.dual_bound, 0.5);
        assert!(up.estimate >= 0.5);

        let br = up.branch.unwrap();
        assert_eq!((br.var, br.side, br.parent_obj), (decision.var, BranchSide::Up, 0.5));

        tree.record_child_bound(up, 1.0);
        // The root has no branch record
        tree.record_child_bound(&root, 7.0);
        assert_eq!(tree.branching.pseudocost(decision.var).n_up, 1);
        assert_eq!(tree.branching.pseudocost(decision.var).n_down, 0);
    }

    #[test]
    fn test_empty_child_is_pruned() {
        let prob = binary_problem(2);
        let mut tree = tree(MipSettings::default(), &prob);
        let root = tree.next_node().unwrap();

        // Local domain [0, 0.5] has no integer above 0.4
        let decision = tree
            .select_branching(&[0.4, 1.0], &prob, &[0.0, 1.0], &[0.5, 1.0])
            .unwrap();
        let children = tree.branch(&root, &decision, 0.0);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].branch.unwrap().side, BranchSide::Down);
        assert_eq!(tree.finalize(MipStatus::NodeLimit).nodes_pruned, 1);
    }

    #[test]
    fn test_exhausted_queue_is_optimal() {
        let prob = binary_problem(10);
        let mut settings = MipSettings::default();
        settings.gap_tol = 0.1;
        let mut tree = tree(settings, &prob);

        tree.update_incumbent(point(10, 100.0));
        tree.next_node();

        assert_eq!(tree.check_termination(), Some(MipStatus::Optimal));
        let sol = tree.finalize(MipStatus::Optimal);
        assert_eq!(sol.bound, 100.0);
        assert_eq!(sol.gap, 0.0);
        assert_eq!(sol.found_by, Some(IncumbentSource::Lp));
    }

    #[test]
    fn test_infeasible_and_node_limit() {
        let prob = binary_problem(2);
        let mut tree = tree(MipSettings::default().with_max_nodes(1), &prob);
        assert_eq!(tree.check_termination(), None);

        let mut child = tree.next_node().unwrap();
        tree.node_explored();
        child.dual_bound = 0.0;
        tree.enqueue(child);
        assert_eq!(tree.check_termination(), Some(MipStatus::NodeLimit));

        tree.next_node();
        assert_eq!(tree.check_termination(), Some(MipStatus::Infeasible));
        assert!(tree.finalize(MipStatus::Infeasible).x.is_empty());
    }

    #[test]
    fn test_gap_limit() {
        let prob = binary_problem(2);
        let mut settings = MipSettings::default();
        settings.gap_tol = 0.1;
        let mut tree = tree(settings, &prob);

        let mut open = tree.next_node().unwrap();
        open.dual_bound = 95.0;
        tree.enqueue(open);

        tree.update_incumbent(point(2, 100.0));
        assert_eq!(tree.check_termination(), Some(MipStatus::GapLimit));
    }
}
