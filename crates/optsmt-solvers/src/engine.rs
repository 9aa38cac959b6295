// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Generic optimization engines over any solving session
//!
//! Two linear-search strategies share one improvement loop shape: the
//! successive-upper-approximation engine probes each candidate bound by
//! solving under a strict-improvement assumption, while the incremental
//! engine asserts improvements permanently inside one pushed frame.
//! Pareto enumeration is a guided improvement walk usable by both. None
//! of this touches native objectives, so it composes with any [`Solver`].

use crate::errors::{Result, SolverError};
use crate::goals::{Direction, Goal};
use crate::logics::Logic;
use crate::optimizer::{Optimizer, ParetoPoint};
use crate::solver::Solver;
use log::debug;
use optsmt_core::{Model, Term, Value};

type SearchFn<S> = fn(&mut S, Direction, &Term) -> Result<Option<(Model, Value)>>;

/// Lower `goal` to a plain registrable objective. MaxSMT becomes the
/// weighted-penalty minimization; goals without an objective are
/// unsupported.
fn normalize(backend: &'static str, goal: &Goal) -> Result<(Direction, Term)> {
    let objective = match goal {
        Goal::MaxSmt(clauses) => Some((Direction::Minimize, Goal::maxsmt_penalty(clauses))),
        other => other.objective(),
    };
    objective.ok_or(SolverError::UnsupportedGoal {
        backend,
        kind: goal.kind(),
    })
}

/// Linear search probing each improvement under an assumption.
fn search_assuming<S: Solver>(
    solver: &mut S,
    direction: Direction,
    term: &Term,
) -> Result<Option<(Model, Value)>> {
    debug!("linear search ({:?}) for {}", direction, term);
    if !solver.solve(&[])? {
        return Ok(None);
    }
    let mut model = solver.get_model()?;
    let mut best = solver.get_value(term)?;
    loop {
        let improvement = direction.strictly_better(term, &best);
        if !solver.solve(&[improvement])? {
            return Ok(Some((model, best)));
        }
        model = solver.get_model()?;
        best = solver.get_value(term)?;
    }
}

/// Linear search asserting improvements inside one pushed frame.
fn search_incremental<S: Solver>(
    solver: &mut S,
    direction: Direction,
    term: &Term,
) -> Result<Option<(Model, Value)>> {
    debug!("incremental search ({:?}) for {}", direction, term);
    if !solver.solve(&[])? {
        return Ok(None);
    }
    let mut model = solver.get_model()?;
    let mut best = solver.get_value(term)?;
    solver.push()?;
    let search = improve_incremental(solver, direction, term, &mut model, &mut best);
    // restore the stack even when the search failed
    let restored = solver.pop();
    search?;
    restored?;
    Ok(Some((model, best)))
}

fn improve_incremental<S: Solver>(
    solver: &mut S,
    direction: Direction,
    term: &Term,
    model: &mut Model,
    best: &mut Value,
) -> Result<()> {
    loop {
        solver.add_assertion(&direction.strictly_better(term, best))?;
        if !solver.solve(&[])? {
            return Ok(());
        }
        *model = solver.get_model()?;
        *best = solver.get_value(term)?;
    }
}

fn lexicographic_core<S: Solver>(
    solver: &mut S,
    goals: &[Goal],
    search: SearchFn<S>,
) -> Result<Option<(Model, Vec<Value>)>> {
    if goals.is_empty() {
        return Ok(None);
    }
    solver.push()?;
    let result = lexicographic_loop(solver, goals, search);
    let restored = solver.pop();
    let outcome = result?;
    restored?;
    Ok(outcome)
}

fn lexicographic_loop<S: Solver>(
    solver: &mut S,
    goals: &[Goal],
    search: SearchFn<S>,
) -> Result<Option<(Model, Vec<Value>)>> {
    let backend = solver.backend_name();
    let mut model = None;
    let mut values = Vec::with_capacity(goals.len());
    for goal in goals {
        let (direction, term) = normalize(backend, goal)?;
        match search(solver, direction, &term)? {
            None => return Ok(None),
            Some((m, v)) => {
                // pin this optimum before the next goal is optimized
                solver.add_assertion(&term.clone().equals(v.to_term()))?;
                model = Some(m);
                values.push(v);
            }
        }
    }
    Ok(model.map(|m| (m, values)))
}

fn objective_values<S: Solver>(
    solver: &mut S,
    objectives: &[(Direction, Term)],
) -> Result<Vec<Value>> {
    let mut values = Vec::with_capacity(objectives.len());
    for (_, term) in objectives {
        values.push(solver.get_value(term)?);
    }
    Ok(values)
}

/// A candidate must match the current point everywhere it is not strictly
/// better, and be strictly better somewhere.
fn improvement_constraint(objectives: &[(Direction, Term)], current: &[Value]) -> Term {
    let weakly = objectives
        .iter()
        .zip(current)
        .map(|((d, t), v)| d.at_least_as_good(t, v));
    let strictly = objectives
        .iter()
        .zip(current)
        .map(|((d, t), v)| d.strictly_better(t, v));
    Term::conj(weakly.chain(std::iter::once(Term::disj(strictly))))
}

/// Future points must beat this one in at least one objective.
fn blocking_constraint(objectives: &[(Direction, Term)], current: &[Value]) -> Term {
    Term::disj(
        objectives
            .iter()
            .zip(current)
            .map(|((d, t), v)| d.strictly_better(t, v)),
    )
}

fn pareto_front<'a, S: Solver>(
    solver: &'a mut S,
    goals: &[Goal],
) -> Result<Box<dyn Iterator<Item = Result<ParetoPoint>> + 'a>> {
    let backend = solver.backend_name();
    let mut objectives = Vec::with_capacity(goals.len());
    for goal in goals {
        objectives.push(normalize(backend, goal)?);
    }
    if objectives.is_empty() {
        return Ok(Box::new(std::iter::empty()));
    }
    Ok(Box::new(GiaIter {
        solver,
        objectives,
        framed: false,
        done: false,
    }))
}

/// Guided-improvement enumeration of the Pareto front. Blocking
/// constraints live in one frame pushed on first use and popped when the
/// iterator finishes or is dropped.
struct GiaIter<'a, S: Solver> {
    solver: &'a mut S,
    objectives: Vec<(Direction, Term)>,
    framed: bool,
    done: bool,
}

impl<S: Solver> GiaIter<'_, S> {
    fn step(&mut self) -> Result<Option<ParetoPoint>> {
        if !self.framed {
            self.solver.push()?;
            self.framed = true;
        }
        if !self.solver.solve(&[])? {
            return Ok(None);
        }
        let mut model = self.solver.get_model()?;
        let mut values = objective_values(&mut *self.solver, &self.objectives)?;
        loop {
            let improvement = improvement_constraint(&self.objectives, &values);
            if !self.solver.solve(&[improvement])? {
                break;
            }
            model = self.solver.get_model()?;
            values = objective_values(&mut *self.solver, &self.objectives)?;
        }
        let block = blocking_constraint(&self.objectives, &values);
        self.solver.add_assertion(&block)?;
        Ok(Some((model, values)))
    }

    fn restore(&mut self) {
        if self.framed {
            self.framed = false;
            if let Err(e) = self.solver.pop() {
                debug!("could not restore the stack after pareto enumeration: {}", e);
            }
        }
    }

    fn finish(&mut self) {
        self.done = true;
        self.restore();
    }
}

impl<S: Solver> Iterator for GiaIter<'_, S> {
    type Item = Result<ParetoPoint>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.step() {
            Ok(Some(point)) => Some(Ok(point)),
            Ok(None) => {
                self.finish();
                None
            }
            Err(e) => {
                self.finish();
                Some(Err(e))
            }
        }
    }
}

impl<S: Solver> Drop for GiaIter<'_, S> {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Optimizer probing improvements by solving under assumptions.
///
/// Composes with any session. An unbounded objective makes the search
/// loop forever, which `can_diverge_for_unbounded_cases` advertises.
#[derive(Debug)]
pub struct SuaOptimizer<S> {
    solver: S,
}

impl<S: Solver> SuaOptimizer<S> {
    pub fn new(solver: S) -> Self {
        SuaOptimizer { solver }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn into_inner(self) -> S {
        self.solver
    }
}

impl<S: Solver> Solver for SuaOptimizer<S> {
    fn backend_name(&self) -> &'static str {
        self.solver.backend_name()
    }

    fn logics(&self) -> &'static [Logic] {
        self.solver.logics()
    }

    fn add_assertion(&mut self, formula: &Term) -> Result<()> {
        self.solver.add_assertion(formula)
    }

    fn push(&mut self) -> Result<()> {
        self.solver.push()
    }

    fn pop(&mut self) -> Result<()> {
        self.solver.pop()
    }

    fn solve(&mut self, assumptions: &[Term]) -> Result<bool> {
        self.solver.solve(assumptions)
    }

    fn get_model(&mut self) -> Result<Model> {
        self.solver.get_model()
    }

    fn get_value(&mut self, term: &Term) -> Result<Value> {
        self.solver.get_value(term)
    }
}

impl<S: Solver> Optimizer for SuaOptimizer<S> {
    fn optimize(&mut self, goal: &Goal) -> Result<Option<(Model, Value)>> {
        let (direction, term) = normalize(self.solver.backend_name(), goal)?;
        search_assuming(&mut self.solver, direction, &term)
    }

    fn pareto_optimize<'a>(
        &'a mut self,
        goals: &[Goal],
    ) -> Result<Box<dyn Iterator<Item = Result<ParetoPoint>> + 'a>> {
        pareto_front(&mut self.solver, goals)
    }

    fn lexicographic_optimize(&mut self, goals: &[Goal]) -> Result<Option<(Model, Vec<Value>)>> {
        lexicographic_core(&mut self.solver, goals, search_assuming::<S>)
    }

    fn boxed_optimize(&mut self, goals: &[Goal]) -> Result<Vec<Option<(Model, Value)>>> {
        goals.iter().map(|goal| self.optimize(goal)).collect()
    }

    fn can_diverge_for_unbounded_cases(&self) -> bool {
        true
    }
}

/// Optimizer asserting improvements inside a pushed frame.
///
/// Same search as [`SuaOptimizer`] but with permanent improvement
/// constraints instead of assumption probes, which suits backends where
/// re-solving under assumptions is expensive.
#[derive(Debug)]
pub struct IncrementalOptimizer<S> {
    solver: S,
}

impl<S: Solver> IncrementalOptimizer<S> {
    pub fn new(solver: S) -> Self {
        IncrementalOptimizer { solver }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn into_inner(self) -> S {
        self.solver
    }
}

impl<S: Solver> Solver for IncrementalOptimizer<S> {
    fn backend_name(&self) -> &'static str {
        self.solver.backend_name()
    }

    fn logics(&self) -> &'static [Logic] {
        self.solver.logics()
    }

    fn add_assertion(&mut self, formula: &Term) -> Result<()> {
        self.solver.add_assertion(formula)
    }

    fn push(&mut self) -> Result<()> {
        self.solver.push()
    }

    fn pop(&mut self) -> Result<()> {
        self.solver.pop()
    }

    fn solve(&mut self, assumptions: &[Term]) -> Result<bool> {
        self.solver.solve(assumptions)
    }

    fn get_model(&mut self) -> Result<Model> {
        self.solver.get_model()
    }

    fn get_value(&mut self, term: &Term) -> Result<Value> {
        self.solver.get_value(term)
    }
}

impl<S: Solver> Optimizer for IncrementalOptimizer<S> {
    fn optimize(&mut self, goal: &Goal) -> Result<Option<(Model, Value)>> {
        let (direction, term) = normalize(self.solver.backend_name(), goal)?;
        search_incremental(&mut self.solver, direction, &term)
    }

    fn pareto_optimize<'a>(
        &'a mut self,
        goals: &[Goal],
    ) -> Result<Box<dyn Iterator<Item = Result<ParetoPoint>> + 'a>> {
        pareto_front(&mut self.solver, goals)
    }

    fn lexicographic_optimize(&mut self, goals: &[Goal]) -> Result<Option<(Model, Vec<Value>)>> {
        lexicographic_core(&mut self.solver, goals, search_incremental::<S>)
    }

    fn boxed_optimize(&mut self, goals: &[Goal]) -> Result<Vec<Option<(Model, Value)>>> {
        goals.iter().map(|goal| self.optimize(goal)).collect()
    }

    fn can_diverge_for_unbounded_cases(&self) -> bool {
        true
    }
}
