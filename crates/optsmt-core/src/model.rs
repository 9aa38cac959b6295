// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Satisfying assignments and exact evaluation

use crate::errors::{Error, Result};
use crate::sorts::Sort;
use crate::terms::Term;
use crate::values::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Immutable snapshot of a satisfying assignment.
///
/// The map is keyed by terms so backends can cache values for compound
/// terms (objective functions, for instance) next to plain variables.
/// `eval` consults the cache first and only then folds the term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    assignments: BTreeMap<Term, Value>,
}

impl Model {
    pub fn new(assignments: impl IntoIterator<Item = (Term, Value)>) -> Model {
        Model {
            assignments: assignments.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Term, &Value)> {
        self.assignments.iter()
    }

    /// The stored value for exactly this term, if one was recorded.
    pub fn value(&self, term: &Term) -> Option<&Value> {
        self.assignments.get(term)
    }

    /// Evaluate `term` under this assignment.
    ///
    /// Conjunctions and disjunctions stop at the first decisive operand.
    /// A variable without a recorded value is an error, as is division by
    /// an evaluated zero.
    pub fn eval(&self, term: &Term) -> Result<Value> {
        if let Some(v) = self.assignments.get(term) {
            return Ok(v.clone());
        }
        match term {
            Term::Const(v) => Ok(v.clone()),
            Term::Var { name, .. } => Err(Error::UnassignedVariable(name.clone())),
            Term::Not(t) => Ok(Value::Bool(!self.truth(t)?)),
            Term::And(ts) => {
                for t in ts {
                    if !self.truth(t)? {
                        return Ok(Value::Bool(false));
                    }
                }
                Ok(Value::Bool(true))
            }
            Term::Or(ts) => {
                for t in ts {
                    if self.truth(t)? {
                        return Ok(Value::Bool(true));
                    }
                }
                Ok(Value::Bool(false))
            }
            Term::Implies(a, b) => Ok(Value::Bool(!self.truth(a)? || self.truth(b)?)),
            Term::Eq(a, b) => {
                let (va, vb) = (self.eval(a)?, self.eval(b)?);
                if va.sort() != vb.sort() {
                    return Err(Error::SortMismatch {
                        expected: va.sort(),
                        found: vb.sort(),
                        context: "equality".to_string(),
                    });
                }
                Ok(Value::Bool(va == vb))
            }
            Term::Lt(a, b) => self.order(a, b, |o| o == Ordering::Less),
            Term::Le(a, b) => self.order(a, b, |o| o != Ordering::Greater),
            Term::Gt(a, b) => self.order(a, b, |o| o == Ordering::Greater),
            Term::Ge(a, b) => self.order(a, b, |o| o != Ordering::Less),
            Term::Add(ts) => self.fold(ts, "addition", Value::add),
            Term::Mul(ts) => self.fold(ts, "multiplication", Value::mul),
            Term::Sub(a, b) => self.eval(a)?.sub(&self.eval(b)?),
            Term::Neg(t) => self.eval(t)?.neg(),
            Term::Div(a, b) => self.eval(a)?.div(&self.eval(b)?),
            Term::Ite(c, t, e) => {
                if self.truth(c)? {
                    self.eval(t)
                } else {
                    self.eval(e)
                }
            }
        }
    }

    fn truth(&self, term: &Term) -> Result<bool> {
        let v = self.eval(term)?;
        v.as_bool().ok_or_else(|| Error::SortMismatch {
            expected: Sort::Bool,
            found: v.sort(),
            context: "boolean operand".to_string(),
        })
    }

    fn order(&self, a: &Term, b: &Term, accept: impl Fn(Ordering) -> bool) -> Result<Value> {
        let ord = self.eval(a)?.compare(&self.eval(b)?, "comparison")?;
        Ok(Value::Bool(accept(ord)))
    }

    fn fold(
        &self,
        terms: &[Term],
        context: &'static str,
        op: impl Fn(&Value, &Value) -> Result<Value>,
    ) -> Result<Value> {
        let (first, rest) = terms
            .split_first()
            .ok_or(Error::EmptyOperands(context))?;
        let mut acc = self.eval(first)?;
        for t in rest {
            acc = op(&acc, &self.eval(t)?)?;
        }
        Ok(acc)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (term, value) in &self.assignments {
            writeln!(f, "{} := {}", term, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sorts::Sort;

    fn model(pairs: &[(&str, i64)]) -> Model {
        Model::new(pairs.iter().map(|(name, v)| {
            (Term::var(*name, Sort::Int), Value::from(*v))
        }))
    }

    #[test]
    fn evaluates_arithmetic_and_comparisons() {
        let m = model(&[("x", 3), ("y", 4)]);
        let x = Term::var("x", Sort::Int);
        let y = Term::var("y", Sort::Int);
        assert_eq!(m.eval(&x.clone().plus(y.clone())).unwrap(), Value::from(7));
        assert_eq!(
            m.eval(&x.clone().times(y.clone()).le(Term::int(12))).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(m.eval(&x.lt(y)).unwrap(), Value::Bool(true));
    }

    #[test]
    fn cached_compound_terms_win_over_folding() {
        let objective = Term::var("x", Sort::Int).plus(Term::var("y", Sort::Int));
        let m = Model::new([(objective.clone(), Value::from(99))]);
        assert_eq!(m.eval(&objective).unwrap(), Value::from(99));
        assert_eq!(m.value(&objective), Some(&Value::from(99)));
    }

    #[test]
    fn unassigned_variables_are_reported() {
        let m = model(&[("x", 1)]);
        let err = m.eval(&Term::var("z", Sort::Int)).unwrap_err();
        assert_eq!(err, Error::UnassignedVariable("z".to_string()));
    }

    #[test]
    fn ite_picks_the_right_branch() {
        let m = model(&[("x", 10)]);
        let x = Term::var("x", Sort::Int);
        let t = x.clone().ge(Term::int(5)).ite(x, Term::int(0));
        assert_eq!(m.eval(&t).unwrap(), Value::from(10));
    }

    #[test]
    fn conjunction_short_circuits_on_false() {
        // The second operand references an unassigned variable; the first
        // already decides the result.
        let m = model(&[("x", 1)]);
        let t = Term::bool(false).and(Term::var("unknown", Sort::Bool));
        assert_eq!(m.eval(&t).unwrap(), Value::Bool(false));
    }
}
