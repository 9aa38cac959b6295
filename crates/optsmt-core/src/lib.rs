// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Term layer of the optsmt workspace
//!
//! This crate provides the vocabulary the solver layer is written against:
//! sorts, owned term trees, exact constant values, an explicit typing
//! context and model snapshots. It does NOT talk to any solver - that
//! responsibility belongs to optsmt-solvers.

#![forbid(unsafe_code)]

pub mod errors;
pub mod model;
pub mod sorts;
pub mod terms;
pub mod typing;
pub mod values;

// Error type and alias
pub use errors::{Error, Result};

// Term vocabulary
pub use sorts::Sort;
pub use terms::Term;
pub use values::Value;

// Checking and evaluation
pub use model::Model;
pub use typing::TypeContext;
