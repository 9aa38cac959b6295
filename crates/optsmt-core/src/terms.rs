// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Term representation
//!
//! Terms are plain owned trees. Builder methods mirror the operator
//! vocabulary of the solver layer (`plus`, `times`, `equals`, `lt`, ...);
//! the n-ary helpers `conj`/`disj`/`sum` fold their identity element when
//! given nothing, while `min_of`/`max_of` have no identity and return
//! `None` for an empty input.

use crate::sorts::Sort;
use crate::values::Value;
use num::{BigInt, BigRational};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Term {
    /// Constant value
    Const(Value),
    /// Sorted free variable
    Var { name: String, sort: Sort },
    /// Boolean negation
    Not(Box<Term>),
    /// N-ary conjunction
    And(Vec<Term>),
    /// N-ary disjunction
    Or(Vec<Term>),
    /// Implication
    Implies(Box<Term>, Box<Term>),
    /// Equality between two terms of the same sort
    Eq(Box<Term>, Box<Term>),
    /// Strict less-than over a numeric sort
    Lt(Box<Term>, Box<Term>),
    /// Less-or-equal over a numeric sort
    Le(Box<Term>, Box<Term>),
    /// Strict greater-than over a numeric sort
    Gt(Box<Term>, Box<Term>),
    /// Greater-or-equal over a numeric sort
    Ge(Box<Term>, Box<Term>),
    /// N-ary addition
    Add(Vec<Term>),
    /// Subtraction
    Sub(Box<Term>, Box<Term>),
    /// Arithmetic negation
    Neg(Box<Term>),
    /// N-ary multiplication
    Mul(Vec<Term>),
    /// Real division
    Div(Box<Term>, Box<Term>),
    /// If-then-else; both branches share one sort
    Ite(Box<Term>, Box<Term>, Box<Term>),
}

impl Term {
    pub fn var(name: impl Into<String>, sort: Sort) -> Term {
        Term::Var {
            name: name.into(),
            sort,
        }
    }

    pub fn bool(b: bool) -> Term {
        Term::Const(Value::Bool(b))
    }

    pub fn int(i: impl Into<BigInt>) -> Term {
        Term::Const(Value::Int(i.into()))
    }

    pub fn real(r: BigRational) -> Term {
        Term::Const(Value::Real(r))
    }

    /// Real constant `numer / denom`. The denominator must be nonzero.
    pub fn rational(numer: i64, denom: i64) -> Term {
        Term::real(BigRational::new(BigInt::from(numer), BigInt::from(denom)))
    }

    pub fn not(self) -> Term {
        Term::Not(Box::new(self))
    }

    pub fn and(self, other: Term) -> Term {
        Term::And(vec![self, other])
    }

    pub fn or(self, other: Term) -> Term {
        Term::Or(vec![self, other])
    }

    pub fn implies(self, other: Term) -> Term {
        Term::Implies(Box::new(self), Box::new(other))
    }

    pub fn equals(self, other: Term) -> Term {
        Term::Eq(Box::new(self), Box::new(other))
    }

    pub fn lt(self, other: Term) -> Term {
        Term::Lt(Box::new(self), Box::new(other))
    }

    pub fn le(self, other: Term) -> Term {
        Term::Le(Box::new(self), Box::new(other))
    }

    pub fn gt(self, other: Term) -> Term {
        Term::Gt(Box::new(self), Box::new(other))
    }

    pub fn ge(self, other: Term) -> Term {
        Term::Ge(Box::new(self), Box::new(other))
    }

    pub fn plus(self, other: Term) -> Term {
        Term::Add(vec![self, other])
    }

    pub fn minus(self, other: Term) -> Term {
        Term::Sub(Box::new(self), Box::new(other))
    }

    pub fn times(self, other: Term) -> Term {
        Term::Mul(vec![self, other])
    }

    pub fn divided_by(self, other: Term) -> Term {
        Term::Div(Box::new(self), Box::new(other))
    }

    pub fn neg(self) -> Term {
        Term::Neg(Box::new(self))
    }

    /// If-then-else with `self` as the condition.
    pub fn ite(self, then_branch: Term, else_branch: Term) -> Term {
        Term::Ite(
            Box::new(self),
            Box::new(then_branch),
            Box::new(else_branch),
        )
    }

    /// Conjunction of all terms; `true` when empty.
    pub fn conj(terms: impl IntoIterator<Item = Term>) -> Term {
        let terms: Vec<Term> = terms.into_iter().collect();
        if terms.is_empty() {
            Term::bool(true)
        } else {
            Term::And(terms)
        }
    }

    /// Disjunction of all terms; `false` when empty.
    pub fn disj(terms: impl IntoIterator<Item = Term>) -> Term {
        let terms: Vec<Term> = terms.into_iter().collect();
        if terms.is_empty() {
            Term::bool(false)
        } else {
            Term::Or(terms)
        }
    }

    /// Sum of all terms; the integer zero when empty.
    pub fn sum(terms: impl IntoIterator<Item = Term>) -> Term {
        let terms: Vec<Term> = terms.into_iter().collect();
        if terms.is_empty() {
            Term::int(0)
        } else {
            Term::Add(terms)
        }
    }

    /// Minimum of the terms as a nested if-then-else, `None` when empty.
    pub fn min_of(terms: impl IntoIterator<Item = Term>) -> Option<Term> {
        let mut iter = terms.into_iter();
        let first = iter.next()?;
        Some(iter.fold(first, |best, t| {
            let keep = best.clone().le(t.clone());
            keep.ite(best, t)
        }))
    }

    /// Maximum of the terms as a nested if-then-else, `None` when empty.
    pub fn max_of(terms: impl IntoIterator<Item = Term>) -> Option<Term> {
        let mut iter = terms.into_iter();
        let first = iter.next()?;
        Some(iter.fold(first, |best, t| {
            let keep = best.clone().ge(t.clone());
            keep.ite(best, t)
        }))
    }

    /// All free variables of the term, name to sort. The first occurrence
    /// wins when a name appears with two sorts; the typing context is the
    /// place where that conflict is reported.
    pub fn variables(&self) -> BTreeMap<String, Sort> {
        let mut vars = BTreeMap::new();
        self.collect_variables(&mut vars);
        vars
    }

    fn collect_variables(&self, vars: &mut BTreeMap<String, Sort>) {
        match self {
            Term::Const(_) => {}
            Term::Var { name, sort } => {
                vars.entry(name.clone()).or_insert(*sort);
            }
            Term::Not(t) | Term::Neg(t) => t.collect_variables(vars),
            Term::And(ts) | Term::Or(ts) | Term::Add(ts) | Term::Mul(ts) => {
                for t in ts {
                    t.collect_variables(vars);
                }
            }
            Term::Implies(a, b)
            | Term::Eq(a, b)
            | Term::Lt(a, b)
            | Term::Le(a, b)
            | Term::Gt(a, b)
            | Term::Ge(a, b)
            | Term::Sub(a, b)
            | Term::Div(a, b) => {
                a.collect_variables(vars);
                b.collect_variables(vars);
            }
            Term::Ite(c, t, e) => {
                c.collect_variables(vars);
                t.collect_variables(vars);
                e.collect_variables(vars);
            }
        }
    }
}

fn write_infix(f: &mut fmt::Formatter<'_>, op: &str, terms: &[Term]) -> fmt::Result {
    write!(f, "(")?;
    for (i, t) in terms.iter().enumerate() {
        if i > 0 {
            write!(f, " {} ", op)?;
        }
        write!(f, "{}", t)?;
    }
    write!(f, ")")
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Const(v) => write!(f, "{}", v),
            Term::Var { name, .. } => write!(f, "{}", name),
            Term::Not(t) => write!(f, "(! {})", t),
            Term::And(ts) => write_infix(f, "&", ts),
            Term::Or(ts) => write_infix(f, "|", ts),
            Term::Implies(a, b) => write!(f, "({} -> {})", a, b),
            Term::Eq(a, b) => write!(f, "({} = {})", a, b),
            Term::Lt(a, b) => write!(f, "({} < {})", a, b),
            Term::Le(a, b) => write!(f, "({} <= {})", a, b),
            Term::Gt(a, b) => write!(f, "({} > {})", a, b),
            Term::Ge(a, b) => write!(f, "({} >= {})", a, b),
            Term::Add(ts) => write_infix(f, "+", ts),
            Term::Sub(a, b) => write!(f, "({} - {})", a, b),
            Term::Neg(t) => write!(f, "(- {})", t),
            Term::Mul(ts) => write_infix(f, "*", ts),
            Term::Div(a, b) => write!(f, "({} / {})", a, b),
            Term::Ite(c, t, e) => write!(f, "({} ? {} : {})", c, t, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_render_infix() {
        let x = Term::var("x", Sort::Int);
        let y = Term::var("y", Sort::Int);
        let t = x.plus(y).le(Term::int(5));
        assert_eq!(t.to_string(), "((x + y) <= 5)");
    }

    #[test]
    fn empty_folds_use_identities() {
        assert_eq!(Term::conj([]), Term::bool(true));
        assert_eq!(Term::disj([]), Term::bool(false));
        assert_eq!(Term::sum([]), Term::int(0));
        assert_eq!(Term::max_of([]), None);
    }

    #[test]
    fn max_of_two_is_an_ite() {
        let a = Term::var("a", Sort::Int);
        let b = Term::var("b", Sort::Int);
        let m = Term::max_of([a.clone(), b.clone()]).unwrap();
        assert_eq!(m, a.clone().ge(b.clone()).ite(a, b));
    }

    #[test]
    fn variables_are_collected_once() {
        let x = Term::var("x", Sort::Int);
        let t = x.clone().plus(x.clone()).lt(Term::var("y", Sort::Int));
        let vars = t.variables();
        assert_eq!(vars.len(), 2);
        assert_eq!(vars["x"], Sort::Int);
        assert_eq!(vars["y"], Sort::Int);
    }
}
