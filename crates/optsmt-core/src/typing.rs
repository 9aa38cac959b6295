// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Sort inference with an explicit declaration context
//!
//! The context is a value passed to whatever needs checking. Two sessions
//! never share one by accident, and a context can be dropped to forget its
//! declarations.

use crate::errors::{Error, Result};
use crate::sorts::Sort;
use crate::terms::Term;
use std::collections::BTreeMap;

/// Registry of declared symbols plus the sort checker.
#[derive(Debug, Clone, Default)]
pub struct TypeContext {
    declared: BTreeMap<String, Sort>,
}

impl TypeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declared symbols in name order.
    pub fn declared(&self) -> impl Iterator<Item = (&str, Sort)> {
        self.declared.iter().map(|(name, sort)| (name.as_str(), *sort))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.declared.contains_key(name)
    }

    /// Record `name : sort`, rejecting a conflicting redeclaration.
    pub fn declare(&mut self, name: &str, sort: Sort) -> Result<()> {
        match self.declared.get(name) {
            Some(existing) if *existing != sort => Err(Error::ConflictingDeclaration {
                name: name.to_string(),
                declared: *existing,
                used: sort,
            }),
            Some(_) => Ok(()),
            None => {
                self.declared.insert(name.to_string(), sort);
                Ok(())
            }
        }
    }

    /// Infer the sort of `term`. Variables seen for the first time are
    /// recorded, so later terms using the same name with another sort are
    /// rejected even when each term is well-sorted on its own.
    pub fn sort_of(&mut self, term: &Term) -> Result<Sort> {
        match term {
            Term::Const(v) => Ok(v.sort()),
            Term::Var { name, sort } => {
                self.declare(name, *sort)?;
                Ok(*sort)
            }
            Term::Not(t) => {
                self.expect(t, Sort::Bool, "negation")?;
                Ok(Sort::Bool)
            }
            Term::And(ts) => self.booleans(ts, "conjunction"),
            Term::Or(ts) => self.booleans(ts, "disjunction"),
            Term::Implies(a, b) => {
                self.expect(a, Sort::Bool, "implication")?;
                self.expect(b, Sort::Bool, "implication")?;
                Ok(Sort::Bool)
            }
            Term::Eq(a, b) => {
                let left = self.sort_of(a)?;
                self.expect(b, left, "equality")?;
                Ok(Sort::Bool)
            }
            Term::Lt(a, b) | Term::Le(a, b) | Term::Gt(a, b) | Term::Ge(a, b) => {
                let left = self.numeric(a, "comparison")?;
                self.expect(b, left, "comparison")?;
                Ok(Sort::Bool)
            }
            Term::Add(ts) => self.numeric_chain(ts, "addition"),
            Term::Mul(ts) => self.numeric_chain(ts, "multiplication"),
            Term::Sub(a, b) => {
                let left = self.numeric(a, "subtraction")?;
                self.expect(b, left, "subtraction")?;
                Ok(left)
            }
            Term::Neg(t) => self.numeric(t, "negation"),
            Term::Div(a, b) => {
                self.expect(a, Sort::Real, "real division")?;
                self.expect(b, Sort::Real, "real division")?;
                Ok(Sort::Real)
            }
            Term::Ite(c, t, e) => {
                self.expect(c, Sort::Bool, "if-then-else condition")?;
                let then_sort = self.sort_of(t)?;
                self.expect(e, then_sort, "if-then-else branches")?;
                Ok(then_sort)
            }
        }
    }

    fn expect(&mut self, term: &Term, expected: Sort, context: &str) -> Result<()> {
        let found = self.sort_of(term)?;
        if found != expected {
            return Err(Error::SortMismatch {
                expected,
                found,
                context: context.to_string(),
            });
        }
        Ok(())
    }

    fn numeric(&mut self, term: &Term, context: &'static str) -> Result<Sort> {
        let sort = self.sort_of(term)?;
        if !sort.is_numeric() {
            return Err(Error::NonNumericOperand {
                found: sort,
                context,
            });
        }
        Ok(sort)
    }

    fn booleans(&mut self, terms: &[Term], context: &str) -> Result<Sort> {
        for t in terms {
            self.expect(t, Sort::Bool, context)?;
        }
        Ok(Sort::Bool)
    }

    fn numeric_chain(&mut self, terms: &[Term], context: &'static str) -> Result<Sort> {
        let (first, rest) = match terms.split_first() {
            Some(split) => split,
            None => return Err(Error::EmptyOperands(context)),
        };
        let sort = self.numeric(first, context)?;
        for t in rest {
            self.expect(t, sort, context)?;
        }
        Ok(sort)
    }
}
