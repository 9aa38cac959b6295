// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! A brute-force solver over small integer grids, for exercising the
//! generic engines without an external solver process.

use itertools::Itertools;
use optsmt_core::{Model, Sort, Term, TypeContext, Value};
use optsmt_solvers::{Logic, Result, Solver, SolverError};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

pub fn var(name: &str) -> Term {
    Term::var(name, Sort::Int)
}

/// Enumerates every assignment of the declared variables in lexicographic
/// order and reports the first one satisfying all constraints.
pub struct GridSolver {
    domains: BTreeMap<String, RangeInclusive<i64>>,
    frames: Vec<Vec<Term>>,
    last_model: Option<Model>,
    types: TypeContext,
}

impl GridSolver {
    pub fn new(domains: &[(&str, i64, i64)]) -> GridSolver {
        GridSolver {
            domains: domains
                .iter()
                .map(|(name, lo, hi)| (name.to_string(), *lo..=*hi))
                .collect(),
            frames: vec![Vec::new()],
            last_model: None,
            types: TypeContext::new(),
        }
    }

    /// Frames currently pushed on top of the base assertions.
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    fn candidates(&self) -> impl Iterator<Item = Model> + '_ {
        self.domains
            .iter()
            .map(|(name, range)| {
                let name = name.clone();
                range
                    .clone()
                    .map(move |v| (Term::var(name.as_str(), Sort::Int), Value::from(v)))
            })
            .multi_cartesian_product()
            .map(Model::new)
    }
}

impl Solver for GridSolver {
    fn backend_name(&self) -> &'static str {
        "grid"
    }

    fn logics(&self) -> &'static [Logic] {
        &[]
    }

    fn add_assertion(&mut self, formula: &Term) -> Result<()> {
        if self.types.sort_of(formula)? != Sort::Bool {
            return Err(SolverError::Backend(format!(
                "non-boolean assertion {}",
                formula
            )));
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.push(formula.clone());
        }
        Ok(())
    }

    fn push(&mut self) -> Result<()> {
        self.frames.push(Vec::new());
        Ok(())
    }

    fn pop(&mut self) -> Result<()> {
        if self.frames.len() <= 1 {
            return Err(SolverError::Backend(
                "pop without a matching push".to_string(),
            ));
        }
        self.frames.pop();
        Ok(())
    }

    fn solve(&mut self, assumptions: &[Term]) -> Result<bool> {
        let mut found = None;
        for model in self.candidates() {
            let mut holds = true;
            for constraint in self.frames.iter().flatten().chain(assumptions) {
                match model.eval(constraint)? {
                    Value::Bool(true) => {}
                    _ => {
                        holds = false;
                        break;
                    }
                }
            }
            if holds {
                found = Some(model);
                break;
            }
        }
        match found {
            Some(model) => {
                self.last_model = Some(model);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn get_model(&mut self) -> Result<Model> {
        self.last_model.clone().ok_or(SolverError::NoModel)
    }

    fn get_value(&mut self, term: &Term) -> Result<Value> {
        let model = self.last_model.as_ref().ok_or(SolverError::NoModel)?;
        Ok(model.eval(term)?)
    }
}
