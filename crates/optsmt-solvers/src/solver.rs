// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! The solving-session trait

use crate::errors::Result;
use crate::logics::Logic;
use optsmt_core::{Model, Term, Value};

/// Raw answer of a satisfiability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SatAnswer {
    Sat,
    Unsat,
    Unknown,
}

/// An incremental solving session: an assertion stack plus checks.
///
/// Sessions are single-threaded and strictly sequential; nothing here is
/// safe to share across threads while in use.
pub trait Solver {
    /// Name used in error payloads and logs.
    fn backend_name(&self) -> &'static str;

    /// Fragments the backend accepts.
    fn logics(&self) -> &'static [Logic];

    /// Assert a boolean-sorted formula at the current stack level.
    fn add_assertion(&mut self, formula: &Term) -> Result<()>;

    /// Push one stack frame.
    fn push(&mut self) -> Result<()>;

    /// Pop one stack frame.
    fn pop(&mut self) -> Result<()>;

    /// Check the asserted formulas together with `assumptions`.
    ///
    /// `Ok(true)` is satisfiable, `Ok(false)` unsatisfiable; an unknown
    /// answer is reported as [`crate::SolverError::UnknownResult`].
    fn solve(&mut self, assumptions: &[Term]) -> Result<bool>;

    /// Snapshot of the current satisfying assignment.
    fn get_model(&mut self) -> Result<Model>;

    /// Value of `term` under the current satisfying assignment.
    fn get_value(&mut self, term: &Term) -> Result<Value>;
}
