// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Errors produced while building, typing or evaluating terms

use crate::sorts::Sort;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Two positions that must agree on a sort do not
    #[error("sort mismatch in {context}: expected {expected}, found {found}")]
    SortMismatch {
        expected: Sort,
        found: Sort,
        context: String,
    },

    /// A symbol is used with a sort that conflicts with its declaration
    #[error("symbol `{name}` is declared as {declared} but used as {used}")]
    ConflictingDeclaration {
        name: String,
        declared: Sort,
        used: Sort,
    },

    /// An order relation or arithmetic operation over a non-numeric operand
    #[error("{context} requires a numeric operand, found {found}")]
    NonNumericOperand { found: Sort, context: &'static str },

    /// Evaluation reached a variable the model does not assign
    #[error("variable `{0}` has no assigned value")]
    UnassignedVariable(String),

    /// Division by a zero constant during evaluation
    #[error("division by zero")]
    DivisionByZero,

    /// An n-ary operation was constructed with no operands
    #[error("{0} requires at least one operand")]
    EmptyOperands(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
