// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Sorts of the arithmetic fragments this layer drives

use std::fmt;

/// Sort of a term. Optimization targets are arithmetic, so only booleans,
/// integers and reals are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sort {
    Bool,
    Int,
    Real,
}

impl Sort {
    /// Whether the sort admits order relations and arithmetic.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Sort::Int | Sort::Real)
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Sort::Bool => "Bool",
            Sort::Int => "Int",
            Sort::Real => "Real",
        };
        write!(f, "{}", name)
    }
}
