// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Optimization goals
//!
//! Min-max and max-min goals desugar to plain objectives through
//! if-then-else folds, so any backend that can register a minimization can
//! run them. MaxSMT has no single registrable term; backends either
//! support it natively or lower it to the weighted penalty sum.

use optsmt_core::{Term, Value};
use std::fmt;

/// Direction of a registrable objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Minimize,
    Maximize,
}

impl Direction {
    /// Constraint satisfied exactly when `term` is strictly better than
    /// `value` in this direction.
    pub fn strictly_better(&self, term: &Term, value: &Value) -> Term {
        match self {
            Direction::Minimize => term.clone().lt(value.to_term()),
            Direction::Maximize => term.clone().gt(value.to_term()),
        }
    }

    /// Constraint satisfied when `term` is at least as good as `value`.
    pub fn at_least_as_good(&self, term: &Term, value: &Value) -> Term {
        match self {
            Direction::Minimize => term.clone().le(value.to_term()),
            Direction::Maximize => term.clone().ge(value.to_term()),
        }
    }
}

/// A weighted soft clause of a MaxSMT goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftClause {
    pub formula: Term,
    pub weight: Value,
}

impl SoftClause {
    pub fn new(formula: Term, weight: impl Into<Value>) -> SoftClause {
        SoftClause {
            formula,
            weight: weight.into(),
        }
    }
}

/// An optimization goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Goal {
    /// Minimize the term
    Minimize(Term),
    /// Maximize the term
    Maximize(Term),
    /// Minimize the maximum of the terms
    MinMax(Vec<Term>),
    /// Maximize the minimum of the terms
    MaxMin(Vec<Term>),
    /// Minimize the total weight of violated soft clauses
    MaxSmt(Vec<SoftClause>),
}

/// Kind tag naming a goal in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalKind {
    Minimization,
    Maximization,
    MinMax,
    MaxMin,
    MaxSmt,
}

impl fmt::Display for GoalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GoalKind::Minimization => "minimization",
            GoalKind::Maximization => "maximization",
            GoalKind::MinMax => "min-max",
            GoalKind::MaxMin => "max-min",
            GoalKind::MaxSmt => "maxsmt",
        };
        write!(f, "{}", name)
    }
}

impl Goal {
    pub fn kind(&self) -> GoalKind {
        match self {
            Goal::Minimize(_) => GoalKind::Minimization,
            Goal::Maximize(_) => GoalKind::Maximization,
            Goal::MinMax(_) => GoalKind::MinMax,
            Goal::MaxMin(_) => GoalKind::MaxMin,
            Goal::MaxSmt(_) => GoalKind::MaxSmt,
        }
    }

    /// The `(direction, term)` pair a backend can register natively.
    ///
    /// `None` for MaxSMT and for min-max/max-min over an empty term list;
    /// those have no registrable objective.
    pub fn objective(&self) -> Option<(Direction, Term)> {
        match self {
            Goal::Minimize(t) => Some((Direction::Minimize, t.clone())),
            Goal::Maximize(t) => Some((Direction::Maximize, t.clone())),
            Goal::MinMax(ts) => {
                Term::max_of(ts.iter().cloned()).map(|t| (Direction::Minimize, t))
            }
            Goal::MaxMin(ts) => {
                Term::min_of(ts.iter().cloned()).map(|t| (Direction::Maximize, t))
            }
            Goal::MaxSmt(_) => None,
        }
    }

    /// Penalty term of a MaxSMT goal: the total weight of violated
    /// clauses. Minimizing it maximizes the satisfied weight.
    pub fn maxsmt_penalty(clauses: &[SoftClause]) -> Term {
        Term::sum(clauses.iter().map(|clause| {
            let zero = zero_like(&clause.weight);
            clause
                .formula
                .clone()
                .ite(zero, clause.weight.to_term())
        }))
    }
}

fn zero_like(weight: &Value) -> Term {
    match weight {
        Value::Real(_) => Term::rational(0, 1),
        _ => Term::int(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optsmt_core::Sort;

    #[test]
    fn minmax_desugars_to_an_ite_objective() {
        let a = Term::var("a", Sort::Int);
        let b = Term::var("b", Sort::Int);
        let goal = Goal::MinMax(vec![a.clone(), b.clone()]);
        let (direction, term) = goal.objective().unwrap();
        assert_eq!(direction, Direction::Minimize);
        assert_eq!(term, a.clone().ge(b.clone()).ite(a, b));
    }

    #[test]
    fn empty_minmax_has_no_objective() {
        assert_eq!(Goal::MinMax(vec![]).objective(), None);
        assert_eq!(Goal::MaxSmt(vec![]).objective(), None);
    }

    #[test]
    fn maxsmt_penalty_charges_violated_clauses() {
        let p = Term::var("p", Sort::Bool);
        let q = Term::var("q", Sort::Bool);
        let penalty = Goal::maxsmt_penalty(&[
            SoftClause::new(p.clone(), 2),
            SoftClause::new(q.clone(), 3),
        ]);
        let expected = Term::Add(vec![
            p.ite(Term::int(0), Term::int(2)),
            q.ite(Term::int(0), Term::int(3)),
        ]);
        assert_eq!(penalty, expected);
    }

    #[test]
    fn kinds_have_readable_names() {
        assert_eq!(Goal::MaxSmt(vec![]).kind().to_string(), "maxsmt");
        assert_eq!(
            Goal::Minimize(Term::int(0)).kind().to_string(),
            "minimization"
        );
    }
}
