// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! The optimization trait

use crate::errors::Result;
use crate::goals::Goal;
use crate::solver::Solver;
use optsmt_core::{Model, Value};

/// One Pareto-optimal point: the model plus the goals' values, in goal
/// order.
pub type ParetoPoint = (Model, Vec<Value>);

/// Optimization over a solving session.
pub trait Optimizer: Solver {
    /// Optimize a single goal.
    ///
    /// Returns `Ok(None)` when the asserted formulas are unsatisfiable
    /// (an unknown check answer counts as not satisfiable here). On
    /// success the returned value is the model's value of the goal term.
    fn optimize(&mut self, goal: &Goal) -> Result<Option<(Model, Value)>>;

    /// Enumerate the Pareto front of `goals` lazily.
    ///
    /// Each step runs one check and yields one Pareto-optimal point; the
    /// iterator ends when the frontier is exhausted. Errors surface
    /// through the yielded items. The iterator borrows the optimizer
    /// mutably, so the session cannot be touched until it is dropped.
    fn pareto_optimize<'a>(
        &'a mut self,
        goals: &[Goal],
    ) -> Result<Box<dyn Iterator<Item = Result<ParetoPoint>> + 'a>>;

    /// Optimize `goals` in priority order: each later goal is optimized
    /// subject to all earlier goals keeping their optimal values.
    fn lexicographic_optimize(&mut self, goals: &[Goal]) -> Result<Option<(Model, Vec<Value>)>>;

    /// Optimize each goal independently of the others.
    fn boxed_optimize(&mut self, goals: &[Goal]) -> Result<Vec<Option<(Model, Value)>>>;

    /// Whether an unbounded objective can make this optimizer run forever
    /// instead of reporting the unbounded error.
    fn can_diverge_for_unbounded_cases(&self) -> bool;
}
