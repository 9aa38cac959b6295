// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Optimization through z3's native objective engine

use crate::errors::{Result, SolverError, UnboundedCause};
use crate::goals::{Direction, Goal};
use crate::logics::Logic;
use crate::optimizer::{Optimizer, ParetoPoint};
use crate::options::SolverOptions;
use crate::solver::{SatAnswer, Solver};
use crate::wrappers::clear_pending_pop;
use crate::z3::session::SmtSession;
use crate::z3::sexp;
use crate::z3::smtlib::{self, ObjectiveBound};
use optsmt_core::{Error as CoreError, Model, Sort, Term, Value};

/// Optimizer backed by z3's built-in objective engine.
///
/// Objectives are registered with `minimize`/`maximize` commands and each
/// optimization runs a single check. Instead of diverging on an unbounded
/// objective the engine reports an `oo` or `epsilon` bound, which this
/// wrapper turns into [`SolverError::Unbounded`] before any model is
/// read. The reported optimum is always the model's value of the goal
/// term, never the bound itself.
#[derive(Debug)]
pub struct Z3NativeOptimizer {
    session: SmtSession,
    registered: usize,
}

impl Z3NativeOptimizer {
    pub const LOGICS: &'static [Logic] = super::Z3_LOGICS;

    pub fn new(logic: Option<Logic>) -> Result<Z3NativeOptimizer> {
        Z3NativeOptimizer::with_options(logic, SolverOptions::default())
    }

    pub fn with_options(logic: Option<Logic>, options: SolverOptions) -> Result<Z3NativeOptimizer> {
        Ok(Z3NativeOptimizer {
            session: SmtSession::open(logic, options)?,
            registered: 0,
        })
    }

    /// The direction and term the native engine can register for `goal`.
    ///
    /// MaxSMT goals have no native encoding here and are rejected before
    /// the session is touched.
    fn native_objective(goal: &Goal) -> Result<(Direction, Term)> {
        goal.objective().ok_or(SolverError::UnsupportedGoal {
            backend: "z3",
            kind: goal.kind(),
        })
    }

    /// Register one objective. Returns its reply index in
    /// `(get-objectives)` and the objective's sort.
    fn register(&mut self, direction: Direction, term: &Term) -> Result<(usize, Sort)> {
        let sort = self.session.prepare_term(term)?;
        if !sort.is_numeric() {
            return Err(CoreError::NonNumericOperand {
                found: sort,
                context: "objective",
            }
            .into());
        }
        let command = match direction {
            Direction::Minimize => format!("(minimize {})", smtlib::render_term(term)),
            Direction::Maximize => format!("(maximize {})", smtlib::render_term(term)),
        };
        self.session.expect_success(&command)?;
        let handle = self.registered;
        self.registered += 1;
        Ok((handle, sort))
    }
}

/// Map an unbounded objective bound to the unbounded error, keeping the
/// infinite and infinitesimal causes apart.
fn check_bounded(bound: ObjectiveBound, sort: Sort, term: &Term) -> Result<()> {
    match bound.into_value(sort, &smtlib::render_term(term)) {
        Ok(_) => Ok(()),
        Err(SolverError::InfiniteValue(_)) => {
            Err(SolverError::Unbounded(UnboundedCause::Infinite))
        }
        Err(SolverError::InfinitesimalValue(_)) => {
            Err(SolverError::Unbounded(UnboundedCause::Infinitesimal))
        }
        Err(other) => Err(other),
    }
}

impl Solver for Z3NativeOptimizer {
    fn backend_name(&self) -> &'static str {
        "z3"
    }

    fn logics(&self) -> &'static [Logic] {
        Z3NativeOptimizer::LOGICS
    }

    fn add_assertion(&mut self, formula: &Term) -> Result<()> {
        self.session.add_assertion(formula)
    }

    fn push(&mut self) -> Result<()> {
        self.session.push()
    }

    fn pop(&mut self) -> Result<()> {
        self.session.pop()
    }

    fn solve(&mut self, assumptions: &[Term]) -> Result<bool> {
        self.session.solve(assumptions)
    }

    fn get_model(&mut self) -> Result<Model> {
        self.session.get_model()
    }

    fn get_value(&mut self, term: &Term) -> Result<Value> {
        self.session.get_value(term)
    }
}

impl Optimizer for Z3NativeOptimizer {
    fn optimize(&mut self, goal: &Goal) -> Result<Option<(Model, Value)>> {
        let (direction, term) = Z3NativeOptimizer::native_objective(goal)?;
        clear_pending_pop(&mut self.session)?;
        let (handle, sort) = self.register(direction, &term)?;
        if self.session.check_sat()? != SatAnswer::Sat {
            return Ok(None);
        }
        let reply = self.session.command("(get-objectives)")?;
        let bound = smtlib::objective_bound(&sexp::parse(&reply)?, handle)?;
        check_bounded(bound, sort, &term)?;
        let model = self.session.get_model()?;
        let value = self.session.get_value(&term)?;
        Ok(Some((model, value)))
    }

    fn pareto_optimize<'a>(
        &'a mut self,
        goals: &[Goal],
    ) -> Result<Box<dyn Iterator<Item = Result<ParetoPoint>> + 'a>> {
        let mut objectives = Vec::with_capacity(goals.len());
        for goal in goals {
            objectives.push(Z3NativeOptimizer::native_objective(goal)?);
        }
        if objectives.is_empty() {
            return Ok(Box::new(std::iter::empty()));
        }
        clear_pending_pop(&mut self.session)?;
        // the pareto priority stays set for the rest of the session
        self.session
            .expect_success("(set-option :opt.priority pareto)")?;
        let mut terms = Vec::with_capacity(objectives.len());
        for (direction, term) in objectives {
            self.register(direction, &term)?;
            terms.push(term);
        }
        Ok(Box::new(NativeParetoIter {
            optimizer: self,
            terms,
            done: false,
        }))
    }

    fn lexicographic_optimize(&mut self, goals: &[Goal]) -> Result<Option<(Model, Vec<Value>)>> {
        let mut objectives = Vec::with_capacity(goals.len());
        for goal in goals {
            objectives.push(Z3NativeOptimizer::native_objective(goal)?);
        }
        if objectives.is_empty() {
            return Ok(None);
        }
        clear_pending_pop(&mut self.session)?;
        self.session
            .expect_success("(set-option :opt.priority lex)")?;
        let mut handles = Vec::with_capacity(objectives.len());
        for (direction, term) in objectives {
            let (handle, sort) = self.register(direction, &term)?;
            handles.push((handle, sort, term));
        }
        if self.session.check_sat()? != SatAnswer::Sat {
            return Ok(None);
        }
        let reply = self.session.command("(get-objectives)")?;
        let parsed = sexp::parse(&reply)?;
        for (handle, sort, term) in &handles {
            let bound = smtlib::objective_bound(&parsed, *handle)?;
            check_bounded(bound, *sort, term)?;
        }
        let model = self.session.get_model()?;
        let mut values = Vec::with_capacity(handles.len());
        for (_, _, term) in &handles {
            values.push(self.session.get_value(term)?);
        }
        Ok(Some((model, values)))
    }

    fn boxed_optimize(&mut self, goals: &[Goal]) -> Result<Vec<Option<(Model, Value)>>> {
        clear_pending_pop(&mut self.session)?;
        let mut options = self.session.options().clone();
        options.dump_smtlib = None;
        let mut results = Vec::with_capacity(goals.len());
        for goal in goals {
            // fresh session per goal so objectives stay independent
            let mut sub = Z3NativeOptimizer::with_options(self.session.logic(), options.clone())?;
            for formula in self.session.asserted() {
                sub.session.add_assertion(formula)?;
            }
            results.push(sub.optimize(goal)?);
        }
        Ok(results)
    }

    fn can_diverge_for_unbounded_cases(&self) -> bool {
        false
    }
}

/// Lazy pareto enumeration: in pareto priority every check yields the
/// next point of the front until the answer turns unsat.
struct NativeParetoIter<'a> {
    optimizer: &'a mut Z3NativeOptimizer,
    terms: Vec<Term>,
    done: bool,
}

impl NativeParetoIter<'_> {
    fn step(&mut self) -> Result<Option<ParetoPoint>> {
        if self.optimizer.session.check_sat()? != SatAnswer::Sat {
            return Ok(None);
        }
        let model = self.optimizer.session.get_model()?;
        let mut values = Vec::with_capacity(self.terms.len());
        for term in &self.terms {
            values.push(self.optimizer.session.get_value(term)?);
        }
        Ok(Some((model, values)))
    }
}

impl Iterator for NativeParetoIter<'_> {
    type Item = Result<ParetoPoint>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.step() {
            Ok(Some(point)) => Some(Ok(point)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
