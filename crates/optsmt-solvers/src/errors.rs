// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! The error surface of the solver layer

use crate::goals::GoalKind;
use std::fmt;
use thiserror::Error;

/// Why an optimum does not exist as an ordinary value.
///
/// Both causes surface as [`SolverError::Unbounded`]; the payload keeps
/// them distinguishable for callers that care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnboundedCause {
    /// The objective can be improved past any bound
    Infinite,
    /// The objective has a finite infimum or supremum that no model attains
    Infinitesimal,
}

impl fmt::Display for UnboundedCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnboundedCause::Infinite => write!(f, "unbounded"),
            UnboundedCause::Infinitesimal => write!(f, "infinitesimal"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SolverError {
    /// The backend executable cannot be located or executed
    #[error("backend `{backend}` is not available: {reason}")]
    BackendUnavailable {
        backend: &'static str,
        reason: String,
    },

    /// The backend cannot register this kind of goal
    #[error("backend `{backend}` does not support {kind} goals")]
    UnsupportedGoal {
        backend: &'static str,
        kind: GoalKind,
    },

    /// The optimal value is unbounded or infinitesimal
    #[error("the optimal value is {0}")]
    Unbounded(UnboundedCause),

    /// An infinite bound escaped conversion to an ordinary value
    #[error("cannot convert the infinite bound of `{0}` to a value")]
    InfiniteValue(String),

    /// An infinitesimal bound escaped conversion to an ordinary value
    #[error("cannot convert the infinitesimal bound of `{0}` to a value")]
    InfinitesimalValue(String),

    /// A plain satisfiability check came back `unknown`
    #[error("the solver returned `unknown`")]
    UnknownResult,

    /// Model or value queried without a preceding satisfiable check
    #[error("no model is available; run a satisfiable check first")]
    NoModel,

    /// The solver process reported an error
    #[error("solver reported an error: {0}")]
    Backend(String),

    /// The solver process replied with something this layer cannot parse
    #[error("malformed solver response: {0}")]
    Protocol(String),

    /// Typing or evaluation failure in the term layer
    #[error(transparent)]
    Core(#[from] optsmt_core::Error),

    /// Pipe or spawn failure while driving the solver process
    #[error("i/o failure while driving the solver: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SolverError>;
