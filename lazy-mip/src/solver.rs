//! Model building and the optimize loop.

use std::time::Instant;

use crate::cuts::CutPool;
use crate::error::{MipError, MipResult};
use crate::handler::{
    ConstraintHandler, EnforceContext, EnforceResult, Feasibility, LockTable, SolutionView,
};
use crate::master::{CutOrigin, LinearCut, MasterBackend, MasterStatus, SimplexMasterBackend};
use crate::model::{
    Constraint, Incumbent, IncumbentSource, LinExpr, MipProblem, MipSolution, ObjSense, VarData,
    VarId, VarType,
};
use crate::presolve::{apply_fixings, dual_fixings};
use crate::search::{BranchAndBound, NodeOutcome, SearchNode};
use crate::settings::MipSettings;

/// A MIP model: variables, rows, objective and constraint handlers.
///
/// Nothing is validated until [`Model::optimize`] compiles the model.
pub struct Model {
    name: String,
    vars: Vec<VarData>,
    conss: Vec<Constraint>,
    sense: ObjSense,
    handlers: Vec<Box<dyn ConstraintHandler>>,
    settings: MipSettings,
    lazy: Vec<Constraint>,
}

impl Model {
    /// Create an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vars: Vec::new(),
            conss: Vec::new(),
            sense: ObjSense::Minimize,
            handlers: Vec::new(),
            settings: MipSettings::default(),
            lazy: Vec::new(),
        }
    }

    /// Replace the settings.
    pub fn with_settings(mut self, settings: MipSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current settings.
    pub fn settings(&self) -> &MipSettings {
        &self.settings
    }

    /// Mutable access to the settings.
    pub fn settings_mut(&mut self) -> &mut MipSettings {
        &mut self.settings
    }

    /// Add a variable.
    pub fn add_var(
        &mut self,
        name: impl Into<String>,
        vtype: VarType,
        obj: f64,
        lb: f64,
        ub: f64,
    ) -> VarId {
        let id = VarId(self.vars.len());
        self.vars.push(VarData {
            name: name.into(),
            vtype,
            obj,
            lb,
            ub,
        });
        id
    }

    /// Add a binary variable.
    pub fn add_binary(&mut self, name: impl Into<String>, obj: f64) -> VarId {
        self.add_var(name, VarType::Binary, obj, 0.0, 1.0)
    }

    /// Add a row. Returns its index.
    pub fn add_cons(&mut self, cons: Constraint) -> usize {
        self.conss.push(cons);
        self.conss.len() - 1
    }

    /// Set the objective. Coefficients of variables not in `expr` become 0.
    pub fn set_objective(&mut self, expr: &LinExpr, sense: ObjSense) -> MipResult<()> {
        let merged = expr.merged();
        if let Some(&(j, _)) = merged.iter().find(|&&(j, _)| j >= self.vars.len()) {
            return Err(MipError::InvalidProblem(format!(
                "Objective references variable {} but only {} variables",
                j,
                self.vars.len()
            )));
        }

        for var in &mut self.vars {
            var.obj = 0.0;
        }
        for (j, coef) in merged {
            self.vars[j].obj = coef;
        }
        self.sense = sense;
        Ok(())
    }

    /// Plug in a constraint handler. Handlers run in inclusion order.
    pub fn include_handler(&mut self, handler: Box<dyn ConstraintHandler>) {
        log::debug!("model {}: including handler '{}'", self.name, handler.name());
        self.handlers.push(handler);
    }

    /// Number of variables.
    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    /// Number of explicit rows.
    pub fn num_conss(&self) -> usize {
        self.conss.len()
    }

    /// Number of constraint handlers.
    pub fn num_handlers(&self) -> usize {
        self.handlers.len()
    }

    /// Name of a variable.
    pub fn var_name(&self, var: VarId) -> &str {
        &self.vars[var.index()].name
    }

    /// Explicit rows in insertion order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.conss
    }

    /// Constraints added by handlers during the last [`Model::optimize`].
    pub fn lazy_constraints(&self) -> &[Constraint] {
        &self.lazy
    }

    /// Solve the model.
    ///
    /// Infeasibility and limits are reported through [`MipSolution::status`];
    /// errors mean the model or a handler is broken.
    pub fn optimize(&mut self) -> MipResult<MipSolution> {
        let start = Instant::now();
        self.lazy.clear();
        self.settings.validate()?;

        let mut prob = MipProblem::new(&self.vars, &self.conss, self.sense)?;
        let bounds_feasible = prob.bounds_feasible();
        let presolve_fixings = if bounds_feasible {
            self.presolve(&mut prob)
        } else {
            0
        };

        if self.settings.verbose {
            log::info!(
                "Model {}: {} vars ({} integer), {} rows, {} handlers, {} presolve fixings",
                self.name,
                prob.num_vars(),
                prob.num_integers(),
                prob.num_constraints(),
                self.handlers.len(),
                presolve_fixings
            );
        }

        let mut solution = if bounds_feasible {
            let mut search = Search::new(&prob, &self.settings, &mut self.handlers);
            let result = search.run();
            self.lazy = search.lazy;
            result?
        } else {
            log::debug!("model {}: empty variable domain", self.name);
            MipSolution::infeasible()
        };

        solution = solution.into_sense(prob.obj_sign);
        solution.presolve_fixings = presolve_fixings;
        solution.solve_time_ms = start.elapsed().as_millis() as u64;

        if self.settings.verbose {
            log::info!(
                "Model {}: {}, obj={:.6e}, bound={:.6e}, nodes={}, lazy={}, time={}ms",
                self.name,
                solution.status,
                solution.obj_val,
                solution.bound,
                solution.nodes_explored,
                solution.cuts_added,
                solution.solve_time_ms
            );
        }

        Ok(solution)
    }

    /// Dual fixing. Returns the number of fixed variables.
    fn presolve(&self, prob: &mut MipProblem) -> usize {
        if !self.settings.allow_dual_reductions {
            return 0;
        }

        let mut locks = LockTable::from_rows(prob);
        for handler in &self.handlers {
            handler.lock(&mut locks);
        }

        let fixings = dual_fixings(prob, &locks);
        for f in &fixings {
            log::debug!("presolve: fixing {} = {}", self.vars[f.var].name, f.value);
        }
        apply_fixings(prob, &fixings);
        fixings.len()
    }
}

/// Outcome of enforcing all handlers on one LP solution.
enum Enforcement {
    Feasible,
    ConsAdded,
}

/// State of one optimize call.
struct Search<'a> {
    prob: &'a MipProblem,
    settings: &'a MipSettings,
    handlers: &'a mut [Box<dyn ConstraintHandler>],
    backend: SimplexMasterBackend,
    pool: CutPool,
    tree: BranchAndBound,
    lazy: Vec<Constraint>,
}

impl<'a> Search<'a> {
    fn new(
        prob: &'a MipProblem,
        settings: &'a MipSettings,
        handlers: &'a mut [Box<dyn ConstraintHandler>],
    ) -> Self {
        Self {
            prob,
            settings,
            handlers,
            backend: SimplexMasterBackend::new(),
            pool: CutPool::new(),
            tree: BranchAndBound::new(settings.clone(), prob.num_vars()),
            lazy: Vec::new(),
        }
    }

    fn run(&mut self) -> MipResult<MipSolution> {
        self.backend.initialize(self.prob)?;
        self.tree.initialize(self.prob);

        let status = loop {
            if let Some(status) = self.tree.check_termination() {
                break status;
            }
            let node = match self.tree.next_node() {
                Some(node) => node,
                None => continue,
            };

            if node.can_prune(self.tree.incumbent_obj()) {
                self.tree.node_pruned();
                continue;
            }

            let id = node.id;
            let outcome = self.process_node(node)?;
            log::debug!("node {}: {:?}", id, outcome);
            if outcome.is_pruned() {
                self.tree.node_pruned();
            }

            self.tree.node_explored();
            self.tree.log_progress();
        };

        log::debug!(
            "search finished: {:?}, {} lp solves, {} pooled cuts ({} duplicates)",
            status,
            self.backend.lp_solves(),
            self.pool.len(),
            self.pool.stats().duplicates
        );

        Ok(self.tree.finalize(status))
    }

    /// Solve a node until it is pruned, branched or accepted.
    fn process_node(&mut self, mut node: SearchNode) -> MipResult<NodeOutcome> {
        let (lb, ub) = node.local_bounds(&self.prob.var_lb, &self.prob.var_ub);
        self.backend.set_bounds(&lb, &ub);

        let mut rounds = 0;
        loop {
            let lp = self.backend.solve()?;
            match lp.status {
                MasterStatus::Optimal => {}
                MasterStatus::Infeasible => return Ok(NodeOutcome::Infeasible),
                MasterStatus::Unbounded => return Err(MipError::Unbounded),
            }

            if rounds == 0 {
                self.tree.record_child_bound(&node, lp.obj_val);
            }
            node.dual_bound = node.dual_bound.max(lp.obj_val);
            if node.can_prune(self.tree.incumbent_obj()) {
                return Ok(NodeOutcome::Pruned);
            }

            if let Some(decision) = self.tree.select_branching(&lp.x, self.prob, &lb, &ub) {
                if self.settings.rounding_heuristic && rounds == 0 {
                    self.try_rounding(node.id, &lp.x);
                    if node.can_prune(self.tree.incumbent_obj()) {
                        return Ok(NodeOutcome::Pruned);
                    }
                }

                log::debug!(
                    "node {}: branching on {} = {:.4} (score {:.3e})",
                    node.id,
                    decision.var,
                    decision.value,
                    decision.score
                );
                for child in self.tree.branch(&node, &decision, lp.obj_val) {
                    self.tree.enqueue(child);
                }
                return Ok(NodeOutcome::Branched);
            }

            match self.enforce(node.id, &lp.x)? {
                Enforcement::ConsAdded => {
                    rounds += 1;
                    self.tree.enforce_round();
                    if rounds > self.settings.max_enforce_rounds {
                        return Err(MipError::EnforceLimit {
                            node: node.id,
                            rounds: self.settings.max_enforce_rounds,
                        });
                    }
                }
                Enforcement::Feasible => {
                    let mut candidate = lp.x;
                    self.prob.round_integers(&mut candidate);
                    for idx in 0..self.handlers.len() {
                        if !self.handler_accepts(idx, &candidate) {
                            return Err(MipError::handler(
                                self.handlers[idx].name(),
                                "enforce accepted a solution that check rejects",
                            ));
                        }
                    }
                    let obj = self.prob.objective(&candidate);
                    self.tree.update_incumbent(Incumbent {
                        x: candidate,
                        obj,
                        node: node.id,
                        source: IncumbentSource::Lp,
                    });
                    return Ok(NodeOutcome::Feasible { obj });
                }
            }
        }
    }

    /// Run every handler's enforcement on an integral LP solution.
    fn enforce(&mut self, node: u64, x: &[f64]) -> MipResult<Enforcement> {
        let n = self.prob.num_vars();

        for idx in 0..self.handlers.len() {
            let handler = &mut self.handlers[idx];
            let mut ctx = EnforceContext::new(x, node);
            let result = handler.enforce(&mut ctx);
            let added = ctx.into_added();

            match result {
                EnforceResult::Feasible if added.is_empty() => continue,
                EnforceResult::Feasible => {
                    return Err(MipError::handler(
                        handler.name(),
                        "reported Feasible but added constraints",
                    ))
                }
                EnforceResult::ConsAdded if added.is_empty() => {
                    return Err(MipError::handler(
                        handler.name(),
                        "reported ConsAdded without adding constraints",
                    ))
                }
                EnforceResult::ConsAdded => {}
            }

            let mut cuts_off = false;
            let mut new_cuts = 0;
            let mut max_violation = 0.0f64;
            for cons in added {
                let origin = CutOrigin { handler: idx, node };
                let cuts = LinearCut::from_constraint(&cons, origin);
                if cuts.iter().any(|c| !c.is_finite() || c.terms.iter().any(|&(j, _)| j >= n)) {
                    return Err(MipError::handler(
                        handler.name(),
                        format!("constraint {} is malformed", cons.label()),
                    ));
                }

                cuts_off |= cuts.iter().any(|c| c.is_violated(x, self.settings.feas_tol));

                let mut fresh = false;
                for cut in cuts {
                    let (id, duplicate) = self.pool.add(cut, x);
                    if !duplicate {
                        if let Some(pooled) = self.pool.get(id) {
                            self.backend.add_cut(&pooled.cut);
                            max_violation = max_violation.max(pooled.violation);
                        }
                        fresh = true;
                    }
                }
                if fresh {
                    new_cuts += 1;
                    self.lazy.push(cons);
                }
            }

            if !cuts_off {
                return Err(MipError::handler(
                    handler.name(),
                    "none of the added constraints cuts off the current solution",
                ));
            }

            log::debug!(
                "node {}: handler '{}' added {} lazy constraints, max violation {:.3e}",
                node,
                handler.name(),
                new_cuts,
                max_violation
            );
            self.tree.cuts_added(new_cuts);
            return Ok(Enforcement::ConsAdded);
        }

        Ok(Enforcement::Feasible)
    }

    fn handler_accepts(&mut self, idx: usize, x: &[f64]) -> bool {
        self.handlers[idx].check(&SolutionView::new(x)) == Feasibility::Feasible
    }

    /// Round a fractional LP solution and keep it if everything accepts it.
    fn try_rounding(&mut self, node: u64, x: &[f64]) {
        let mut candidate = x.to_vec();
        self.prob.round_integers(&mut candidate);

        let tol = self.settings.feas_tol;
        if !self.prob.satisfies_bounds(&candidate, tol)
            || !self.prob.satisfies_rows(&candidate, tol)
            || !self.pool.satisfied_by(&candidate, tol)
        {
            return;
        }

        let obj = self.prob.objective(&candidate);
        if obj >= self.tree.incumbent_obj() {
            return;
        }

        let rejected =
            (0..self.handlers.len()).find(|&idx| !self.handler_accepts(idx, &candidate));
        if let Some(idx) = rejected {
            log::debug!(
                "rounding at node {}: candidate rejected by '{}'",
                node,
                self.handlers[idx].name()
            );
            return;
        }

        self.tree.update_incumbent(Incumbent {
            x: candidate,
            obj,
            node,
            source: IncumbentSource::Rounding,
        });
    }
}
