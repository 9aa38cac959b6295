// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Solver sessions and optimization engines
//!
//! This crate drives an external `z3` process over its SMT-LIB 2 text
//! interface and layers optimization on top of incremental solving:
//! z3's native objective engine, plus generic linear-search and pareto
//! engines that compose with any [`Solver`]. Terms, sorts, models and
//! typing come from `optsmt-core`.

#![forbid(unsafe_code)]

pub mod engine;
pub mod errors;
pub mod goals;
pub mod logics;
pub mod optimizer;
pub mod options;
pub mod solver;
pub mod wrappers;
pub mod z3;

// Errors
pub use errors::{Result, SolverError, UnboundedCause};

// Goals and optimization
pub use goals::{Direction, Goal, GoalKind, SoftClause};
pub use optimizer::{Optimizer, ParetoPoint};

// Sessions and generic engines
pub use engine::{IncrementalOptimizer, SuaOptimizer};
pub use solver::{SatAnswer, Solver};
pub use wrappers::{clear_pending_pop, typecheck_result, Deprecated, PendingPop};

// Configuration
pub use logics::Logic;
pub use options::SolverOptions;

// The z3 backend
pub use z3::{
    z3_available, z3_version, Z3IncrementalOptimizer, Z3NativeOptimizer, Z3Solver, Z3SuaOptimizer,
};
